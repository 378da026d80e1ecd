use crate::types::{SuiteID, TestID, TestOutcome, TestResult};
use crate::{client::DEFAULT_REQUEST_TIMEOUT, TestMatcher};
use std::collections::HashMap;
use std::env;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{error, info};

pub const TEST_PATTERN_ENV: &str = "RPCSIM_TEST_PATTERN";

/// Local run host: filters tests, hands out ids and records every result.
#[derive(Clone, Debug)]
pub struct Simulation {
    pub test_matcher: Option<TestMatcher>,
    pub request_timeout: Duration,
    state: Arc<RunState>,
}

#[derive(Debug, Default)]
struct RunState {
    next_suite: AtomicU32,
    next_test: AtomicU32,
    suites: Mutex<HashMap<SuiteID, String>>,
    outcomes: Mutex<Vec<TestOutcome>>,
}

/// Aggregated results once every suite has run.
#[derive(Clone, Debug, Default)]
pub struct RunSummary {
    pub passed: usize,
    pub failed: Vec<TestOutcome>,
}

impl RunSummary {
    pub fn success(&self) -> bool {
        self.failed.is_empty()
    }
}

impl Simulation {
    pub fn new(test_matcher: Option<TestMatcher>) -> Self {
        Self {
            test_matcher,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            state: Default::default(),
        }
    }

    /// Builds a simulation whose test filter comes from the
    /// RPCSIM_TEST_PATTERN environment variable. An unset or empty pattern
    /// runs everything.
    pub fn from_env() -> Result<Self, regex::Error> {
        let test_matcher = match env::var(TEST_PATTERN_ENV) {
            Ok(pattern) if !pattern.is_empty() => Some(TestMatcher::new(&pattern)?),
            _ => None,
        };
        Ok(Self::new(test_matcher))
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub async fn start_suite(&self, name: String, description: String) -> SuiteID {
        let suite_id = self.state.next_suite.fetch_add(1, Ordering::Relaxed);
        info!(suite_id, %name, %description, "starting suite");
        self.state.suites.lock().await.insert(suite_id, name);
        suite_id
    }

    pub async fn end_suite(&self, test_suite: SuiteID) {
        let name = self.state.suites.lock().await.remove(&test_suite);
        info!(suite_id = test_suite, name = %name.unwrap_or_default(), "suite finished");
    }

    /// Starts a new test case, returning the testcase id as a context identifier
    pub async fn start_test(&self, test_suite: SuiteID, name: String, description: String) -> TestID {
        let test_id = self.state.next_test.fetch_add(1, Ordering::Relaxed);
        info!(suite_id = test_suite, test_id, %name, %description, "starting test");
        test_id
    }

    /// Finishes the test case and records its result.
    pub async fn end_test(&self, test_suite: SuiteID, test: TestID, name: String, test_result: TestResult) {
        if test_result.pass {
            info!(suite_id = test_suite, test_id = test, %name, "PASS");
        } else {
            error!(suite_id = test_suite, test_id = test, %name, details = %test_result.details, "FAIL");
        }

        self.state.outcomes.lock().await.push(TestOutcome {
            suite_id: test_suite,
            test_id: test,
            name,
            result: test_result,
        });
    }

    pub async fn outcomes(&self) -> Vec<TestOutcome> {
        self.state.outcomes.lock().await.clone()
    }

    pub async fn summary(&self) -> RunSummary {
        let (passed, failed): (Vec<_>, Vec<_>) = self
            .outcomes()
            .await
            .into_iter()
            .partition(|outcome| outcome.result.pass);
        RunSummary {
            passed: passed.len(),
            failed,
        }
    }
}
