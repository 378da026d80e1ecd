use rpcsim::utils::network_test_name;
use rpcsim::{dyn_async, Client, EndpointTestSpec, Suite};

use crate::comparator::Comparator;
use crate::network::{ForkBoundary, Network};
use crate::policy::{check_block_number, check_not_syncing};
use crate::suites::constants::{BLOCK_NUMBER_SAMPLES, ETH_BLOCK_NUMBER, ETH_SYNCING};

pub const SUITE_NAME: &str = "legacy-eth-calls";

pub fn legacy_eth_calls_suite(networks: &[Network]) -> Suite {
    let mut suite = Suite {
        name: SUITE_NAME.to_string(),
        description: "The legacy cluster is frozen at the fork boundary, so its chain
        head and sync status must never change."
            .to_string(),
        tests: vec![],
    };

    for network in networks {
        suite.add(EndpointTestSpec {
            name: network_test_name(ETH_BLOCK_NUMBER.to_string(), &network.name),
            description: "Legacy chain head equals the last legacy block".to_string(),
            always_run: false,
            run: test_eth_block_number,
            endpoints: network.endpoints(),
            test_data: network.fork,
        });
        suite.add(EndpointTestSpec {
            name: network_test_name(ETH_SYNCING.to_string(), &network.name),
            description: "Legacy reports it is not syncing".to_string(),
            always_run: false,
            run: test_eth_syncing,
            endpoints: network.endpoints(),
            test_data: network.fork,
        });
    }

    suite
}

dyn_async! {
    pub async fn test_eth_block_number<'a>(clients: Vec<Client>, fork: ForkBoundary) {
        let comparator = match Comparator::from_clients(clients) {
            Ok(comparator) => comparator,
            Err(err) => panic!("Unable to set up comparator: {err}"),
        };

        for sample in 1..=BLOCK_NUMBER_SAMPLES {
            let response = match comparator.legacy_only(ETH_BLOCK_NUMBER, vec![]).await {
                Ok(response) => response,
                Err(err) => panic!("{ETH_BLOCK_NUMBER} failed: {err}"),
            };
            if let Err(violation) = check_block_number(&response, fork.last_legacy_block_number) {
                panic!("{ETH_BLOCK_NUMBER} sample {sample}/{BLOCK_NUMBER_SAMPLES}: {violation}");
            }
        }
    }
}

dyn_async! {
    pub async fn test_eth_syncing<'a>(clients: Vec<Client>, _: ForkBoundary) {
        let comparator = match Comparator::from_clients(clients) {
            Ok(comparator) => comparator,
            Err(err) => panic!("Unable to set up comparator: {err}"),
        };

        let response = match comparator.legacy_only(ETH_SYNCING, vec![]).await {
            Ok(response) => response,
            Err(err) => panic!("{ETH_SYNCING} failed: {err}"),
        };
        if let Err(violation) = check_not_syncing(&response) {
            panic!("{ETH_SYNCING}: {violation}");
        }
    }
}
