use std::fmt::Display;

use serde::{Deserialize, Serialize};

pub type SuiteID = u32;
pub type TestID = u32;

/// Which deployment an endpoint belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointRole {
    /// The frozen pre-migration cluster.
    Legacy,
    /// The post-migration cluster.
    Bedrock,
}

impl Display for EndpointRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EndpointRole::Legacy => f.write_str("legacy"),
            EndpointRole::Bedrock => f.write_str("bedrock"),
        }
    }
}

// EndpointDefinition names a JSON-RPC endpoint a test talks to
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointDefinition {
    pub role: EndpointRole,
    pub url: String,
}

impl EndpointDefinition {
    pub fn new(role: EndpointRole, url: impl Into<String>) -> Self {
        Self {
            role,
            url: url.into(),
        }
    }
}

/// Describes the outcome of a test.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TestResult {
    pub pass: bool,
    pub details: String,
}

/// A finished test as recorded by the simulation.
#[derive(Clone, Debug)]
pub struct TestOutcome {
    pub suite_id: SuiteID,
    pub test_id: TestID,
    pub name: String,
    pub result: TestResult,
}
