use rpcsim::utils::{network_test_name, to_quantity};
use rpcsim::{dyn_async, Client, EndpointTestSpec, Suite};
use tracing::info;

use crate::comparator::Comparator;
use crate::network::{BlockCase, Network};
use crate::policy::{CallKind, Policy};
use crate::suites::constants::{block_params, method};

pub const SUITE_NAME: &str = "compare-eth-calls";

/// One block-scoped call checked on both clusters.
#[derive(Clone, Debug)]
pub struct BlockScenario {
    pub network: Network,
    pub kind: CallKind,
    pub block: BlockCase,
}

impl BlockScenario {
    pub fn name(&self) -> String {
        format!("{} {}", method(self.kind), self.block)
    }
}

pub fn compare_eth_calls_suite(networks: &[Network]) -> Suite {
    let mut suite = Suite {
        name: SUITE_NAME.to_string(),
        description: "Sends the same block and trace requests to the legacy and bedrock
        clusters and checks they agree up to the fork boundary and diverge after it."
            .to_string(),
        tests: vec![],
    };

    for network in networks {
        for kind in [CallKind::Retrieval, CallKind::Trace] {
            for block in BlockCase::ALL {
                let scenario = BlockScenario {
                    network: network.clone(),
                    kind,
                    block,
                };
                suite.add(EndpointTestSpec {
                    name: network_test_name(scenario.name(), &network.name),
                    description: "".to_string(),
                    always_run: false,
                    run: test_block_comparison,
                    endpoints: network.endpoints(),
                    test_data: scenario,
                });
            }
        }
    }

    suite
}

dyn_async! {
    pub async fn test_block_comparison<'a>(clients: Vec<Client>, scenario: BlockScenario) {
        let comparator = match Comparator::from_clients(clients) {
            Ok(comparator) => comparator,
            Err(err) => panic!("Unable to set up comparator: {err}"),
        };
        let fork = scenario.network.fork;
        let block_number = fork.block_number(scenario.block);
        let policy = Policy::select(scenario.kind, fork.position(block_number));
        let method = method(scenario.kind);

        let pair = match comparator
            .compare(method, block_params(scenario.kind, to_quantity(block_number)))
            .await
        {
            Ok(pair) => pair,
            Err(err) => panic!("{method} for block {block_number} failed: {err}"),
        };

        if let Err(violation) = policy.check(&pair, fork.block_hash(scenario.block)) {
            panic!("{method} for block {block_number} violated {policy:?}: {violation}");
        }
        info!(
            network = %scenario.network.name,
            legacy = %comparator.legacy().url,
            bedrock = %comparator.bedrock().url,
            method,
            block_number,
            ?policy,
            "responses match expectations"
        );
    }
}
