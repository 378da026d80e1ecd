use crate::client::{RpcClient, RpcClientError};
use crate::types::{EndpointDefinition, EndpointRole, SuiteID};
use crate::Simulation;
use ::std::{boxed::Box, future::Future, pin::Pin};
use async_trait::async_trait;
use core::fmt::Debug;
use dyn_clone::DynClone;

use crate::utils::extract_test_results;

pub type AsyncEndpointTestFunc<T> = fn(
    Vec<Client>,
    T,
) -> Pin<
    Box<
        dyn Future<Output = ()> // future API / pollable
            + Send // required by non-single-threaded executors
            + 'static,
    >,
>;

#[async_trait]
pub trait Testable: DynClone + Send + Sync {
    async fn run_test(&self, simulation: Simulation, suite_id: SuiteID, suite: Suite);
}

impl Debug for dyn Testable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Testable")
    }
}

dyn_clone::clone_trait_object!(Testable);
/// Description of a test suite
#[derive(Clone, Debug)]
pub struct Suite {
    pub name: String,
    pub description: String,
    pub tests: Vec<Box<dyn Testable>>,
}

impl Suite {
    pub fn add<T: Testable + 'static>(&mut self, test: T) {
        self.tests.push(Box::new(test))
    }
}

/// A JSON-RPC endpoint bound to the running test.
#[derive(Debug, Clone)]
pub struct Client {
    pub role: EndpointRole,
    pub url: String,
    pub rpc: RpcClient,
}

#[derive(Clone, Debug)]
pub struct TestRun {
    pub suite_id: SuiteID,
    pub name: String,
    pub desc: String,
}

/// A running test
#[derive(Clone, Debug)]
pub struct Test {
    pub sim: Simulation,
}

impl Test {
    /// Connects to an endpoint using the simulation's request timeout.
    pub fn start_client(&self, endpoint: &EndpointDefinition) -> Result<Client, RpcClientError> {
        let rpc = RpcClient::new(&endpoint.url, self.sim.request_timeout)?;

        Ok(Client {
            role: endpoint.role,
            url: endpoint.url.clone(),
            rpc,
        })
    }
}

#[derive(Clone)]
pub struct EndpointTestSpec<T> {
    /// These fields are displayed in the run log. Be sure to add
    /// a meaningful description here.
    pub name: String,
    pub description: String,
    /// If AlwaysRun is true, the test will run even if Name does not match the test
    /// pattern.
    pub always_run: bool,
    /// The Run function is invoked when the test executes.
    pub run: AsyncEndpointTestFunc<T>,
    /// Endpoints handed to `run`, in this order.
    pub endpoints: Vec<EndpointDefinition>,
    /// test data which is passed to the test
    pub test_data: T,
}

#[async_trait]
impl<T> Testable for EndpointTestSpec<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn run_test(&self, simulation: Simulation, suite_id: SuiteID, suite: Suite) {
        if let Some(test_match) = simulation.test_matcher.clone() {
            if !self.always_run && !test_match.match_test(&suite.name, &self.name) {
                return;
            }
        }

        let test_run = TestRun {
            suite_id,
            name: self.name.to_owned(),
            desc: self.description.to_owned(),
        };

        run_endpoint_test(
            simulation,
            test_run,
            self.endpoints.to_owned(),
            self.test_data.to_owned(),
            self.run,
        )
        .await;
    }
}

// Runs a test against the given endpoints. A panic inside the test is its failure.
async fn run_endpoint_test<T>(
    host: Simulation,
    test: TestRun,
    endpoints: Vec<EndpointDefinition>,
    test_data: T,
    func: AsyncEndpointTestFunc<T>,
) where
    T: Send + 'static,
{
    let test_id = host
        .start_test(test.suite_id, test.name.clone(), test.desc)
        .await;
    let suite_id = test.suite_id;
    let name = test.name;

    let cloned_host = host.clone();
    let test_result = extract_test_results(
        tokio::spawn(async move {
            let test = Test { sim: cloned_host };

            let mut clients: Vec<Client> = Vec::with_capacity(endpoints.len());
            for endpoint in &endpoints {
                match test.start_client(endpoint) {
                    Ok(client) => clients.push(client),
                    Err(err) => panic!("Unable to connect to {} endpoint: {err}", endpoint.role),
                }
            }
            (func)(clients, test_data).await;
        })
        .await,
    );

    host.end_test(suite_id, test_id, name, test_result).await;
}

pub async fn run_suite(host: Simulation, suites: Vec<Suite>) {
    for suite in suites {
        if let Some(test_match) = host.test_matcher.clone() {
            if !test_match.match_test(&suite.name, "") {
                continue;
            }
        }

        let name = suite.clone().name;
        let description = suite.clone().description;

        let suite_id = host.start_suite(name, description).await;

        for test in &suite.tests {
            test.run_test(host.clone(), suite_id, suite.clone()).await;
        }

        host.end_suite(suite_id).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dyn_async, TestMatcher};

    dyn_async! {
        async fn passes<'a>(clients: Vec<Client>, expected: usize) {
            assert_eq!(clients.len(), expected);
        }
    }

    dyn_async! {
        async fn fails<'a>(_clients: Vec<Client>, _: ()) {
            panic!("legacy result was not null");
        }
    }

    fn endpoints() -> Vec<EndpointDefinition> {
        vec![
            EndpointDefinition::new(EndpointRole::Legacy, "http://127.0.0.1:8545"),
            EndpointDefinition::new(EndpointRole::Bedrock, "http://127.0.0.1:9545"),
        ]
    }

    fn suite(name: &str) -> Suite {
        let mut suite = Suite {
            name: name.to_string(),
            description: "".to_string(),
            tests: vec![],
        };
        suite.add(EndpointTestSpec {
            name: "two endpoints".to_string(),
            description: "".to_string(),
            always_run: false,
            run: passes,
            endpoints: endpoints(),
            test_data: 2,
        });
        suite.add(EndpointTestSpec {
            name: "panicking test".to_string(),
            description: "".to_string(),
            always_run: false,
            run: fails,
            endpoints: endpoints(),
            test_data: (),
        });
        suite
    }

    #[tokio::test]
    async fn run_suite_captures_panics_as_failures() {
        let sim = Simulation::new(None);
        run_suite(sim.clone(), vec![suite("compare-eth-calls")]).await;

        let summary = sim.summary().await;
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].name, "panicking test");
        assert_eq!(summary.failed[0].result.details, "legacy result was not null");
    }

    #[tokio::test]
    async fn run_suite_honours_test_pattern() {
        let matcher = TestMatcher::new("compare/two").expect("pattern compiles");
        let sim = Simulation::new(Some(matcher));
        run_suite(
            sim.clone(),
            vec![suite("compare-eth-calls"), suite("legacy-eth-calls")],
        )
        .await;

        let outcomes = sim.outcomes().await;
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].name, "two endpoints");
        assert!(outcomes[0].result.pass);
    }

    #[tokio::test]
    async fn always_run_ignores_test_pattern() {
        let mut compare = suite("compare-eth-calls");
        compare.add(EndpointTestSpec {
            name: "setup".to_string(),
            description: "".to_string(),
            always_run: true,
            run: passes,
            endpoints: vec![],
            test_data: 0,
        });
        let matcher = TestMatcher::new("compare/two").expect("pattern compiles");
        let sim = Simulation::new(Some(matcher));
        run_suite(sim.clone(), vec![compare]).await;

        let names: Vec<String> = sim
            .outcomes()
            .await
            .into_iter()
            .map(|outcome| outcome.name)
            .collect();
        assert_eq!(names, vec!["two endpoints", "setup"]);
    }
}
