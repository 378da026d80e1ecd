use std::fmt::Display;

use alloy_primitives::{b256, B256};
use rpcsim::types::{EndpointDefinition, EndpointRole};
use serde::Deserialize;

pub const DEFAULT_LEGACY_URL: &str = "http://localhost:8545";
pub const DEFAULT_BEDROCK_URL: &str = "http://localhost:9545";

// Bedrock migration rehearsal network
pub const REHEARSAL_NETWORK_NAME: &str = "bedrock-rehearsal";
pub const REHEARSAL_FORK_BOUNDARY: ForkBoundary = ForkBoundary {
    genesis_hash: b256!("c1fc15cd51159b1f1e5cbc4b82e85c1447ddfa33c52cf1d98d14fba0d6354be1"),
    last_legacy_block_number: 3324763,
    last_legacy_block_hash: b256!(
        "019caf8d6982506581455df287f64b2d612cec6797325c87a51c6a634299a430"
    ),
    first_bedrock_block_hash: b256!(
        "cae42e6f83ffc8c6dfdae003eb2ed65f6c4b2c27f5629b1dea2be6857cccb342"
    ),
};

/// Where a network's legacy chain stops and bedrock takes over, plus the
/// block hashes known on either side of that point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForkBoundary {
    pub genesis_hash: B256,
    /// Height the legacy cluster is frozen at.
    pub last_legacy_block_number: u64,
    pub last_legacy_block_hash: B256,
    pub first_bedrock_block_hash: B256,
}

impl ForkBoundary {
    pub fn first_bedrock_block_number(&self) -> u64 {
        self.last_legacy_block_number + 1
    }

    pub fn position(&self, block_number: u64) -> ForkPosition {
        if block_number <= self.last_legacy_block_number {
            ForkPosition::PreFork
        } else {
            ForkPosition::PostFork
        }
    }

    pub fn block_number(&self, block: BlockCase) -> u64 {
        match block {
            BlockCase::Genesis => 0,
            BlockCase::LastLegacy => self.last_legacy_block_number,
            BlockCase::FirstBedrock => self.first_bedrock_block_number(),
        }
    }

    pub fn block_hash(&self, block: BlockCase) -> B256 {
        match block {
            BlockCase::Genesis => self.genesis_hash,
            BlockCase::LastLegacy => self.last_legacy_block_hash,
            BlockCase::FirstBedrock => self.first_bedrock_block_hash,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ForkPosition {
    /// At or below the last legacy block, genesis included.
    PreFork,
    PostFork,
}

/// The blocks every network is checked at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockCase {
    Genesis,
    LastLegacy,
    FirstBedrock,
}

impl BlockCase {
    pub const ALL: [BlockCase; 3] = [
        BlockCase::Genesis,
        BlockCase::LastLegacy,
        BlockCase::FirstBedrock,
    ];
}

impl Display for BlockCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockCase::Genesis => f.write_str("genesis"),
            BlockCase::LastLegacy => f.write_str("pre-fork"),
            BlockCase::FirstBedrock => f.write_str("post-fork"),
        }
    }
}

/// One deployment under test: both clusters and the fork fixtures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Network {
    pub name: String,
    pub legacy: EndpointDefinition,
    pub bedrock: EndpointDefinition,
    pub fork: ForkBoundary,
}

impl Network {
    pub fn new(name: impl Into<String>, legacy_url: &str, bedrock_url: &str, fork: ForkBoundary) -> Self {
        Self {
            name: name.into(),
            legacy: EndpointDefinition::new(EndpointRole::Legacy, legacy_url),
            bedrock: EndpointDefinition::new(EndpointRole::Bedrock, bedrock_url),
            fork,
        }
    }

    /// Endpoints in the order the comparator expects them.
    pub fn endpoints(&self) -> Vec<EndpointDefinition> {
        vec![self.legacy.clone(), self.bedrock.clone()]
    }
}
