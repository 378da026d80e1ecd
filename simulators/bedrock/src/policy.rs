//! Expectations applied to the responses of the two clusters.
//!
//! Which policy applies depends on both the call kind and where the block
//! sits relative to the fork. Block retrieval diverges strictly at the
//! boundary, while traces stay available on legacy up to and including the
//! last legacy block; the two are deliberately kept separate.

use std::str::FromStr;

use alloy_primitives::B256;
use rpcsim::jsonrpc::{is_truthy, Response};
use rpcsim::types::EndpointRole;
use rpcsim::utils::from_quantity;
use serde_json::Value;

use crate::comparator::ResponsePair;
use crate::network::ForkPosition;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PolicyViolation {
    #[error("{role} returned JSON-RPC error {code}: {message}")]
    RpcError {
        role: EndpointRole,
        code: i64,
        message: String,
    },
    #[error("{role} result has no '{field}' field: {actual}")]
    MissingField {
        role: EndpointRole,
        field: String,
        actual: Value,
    },
    #[error("{role} '{field}' mismatch: expected {expected}, got {actual}")]
    FieldMismatch {
        role: EndpointRole,
        field: String,
        expected: String,
        actual: String,
    },
    #[error("responses differ at '{path}': legacy {legacy}, bedrock {bedrock}")]
    ResponsesDiffer {
        path: String,
        legacy: Value,
        bedrock: Value,
    },
    #[error("{role} was expected to return no data, got {actual}")]
    UnexpectedResult { role: EndpointRole, actual: Value },
    #[error("{role} was expected to return data, got {actual}")]
    EmptyResult { role: EndpointRole, actual: Value },
}

/// Kind of RPC call, which decides how the fork affects the expectation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallKind {
    /// Block lookups such as `eth_getBlockByNumber`.
    Retrieval,
    /// Historical execution traces such as `debug_traceBlockByNumber`.
    Trace,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Policy {
    /// Identical responses carrying the expected block hash.
    Equivalence,
    /// Legacy has nothing, bedrock has the expected block.
    RetrievalDivergence,
    /// Both clusters serve a non-empty trace.
    TraceAvailable,
    /// Only bedrock serves a non-empty trace.
    TraceDivergence,
}

impl Policy {
    pub fn select(kind: CallKind, position: ForkPosition) -> Self {
        match (kind, position) {
            (CallKind::Retrieval, ForkPosition::PreFork) => Policy::Equivalence,
            (CallKind::Retrieval, ForkPosition::PostFork) => Policy::RetrievalDivergence,
            (CallKind::Trace, ForkPosition::PreFork) => Policy::TraceAvailable,
            (CallKind::Trace, ForkPosition::PostFork) => Policy::TraceDivergence,
        }
    }

    /// Checks `pair` against this policy. `expected_hash` is only consulted by
    /// the retrieval policies.
    pub fn check(&self, pair: &ResponsePair, expected_hash: B256) -> Result<(), PolicyViolation> {
        match self {
            Policy::Equivalence => check_equivalence(pair, expected_hash),
            Policy::RetrievalDivergence => check_retrieval_divergence(pair, expected_hash),
            Policy::TraceAvailable => check_trace_available(pair),
            Policy::TraceDivergence => check_trace_divergence(pair),
        }
    }
}

pub fn check_equivalence(pair: &ResponsePair, expected_hash: B256) -> Result<(), PolicyViolation> {
    for role in [EndpointRole::Bedrock, EndpointRole::Legacy] {
        check_block_hash(role, pair.get(role), expected_hash)?;
    }
    match first_difference("", &pair.legacy.raw, &pair.bedrock.raw) {
        Some((path, legacy, bedrock)) => Err(PolicyViolation::ResponsesDiffer {
            path: if path.is_empty() { "$".to_string() } else { path },
            legacy: legacy.clone(),
            bedrock: bedrock.clone(),
        }),
        None => Ok(()),
    }
}

pub fn check_retrieval_divergence(
    pair: &ResponsePair,
    expected_hash: B256,
) -> Result<(), PolicyViolation> {
    let legacy = &pair.legacy;
    no_rpc_error(EndpointRole::Legacy, legacy)?;
    if let Some(result) = legacy.result() {
        return Err(PolicyViolation::UnexpectedResult {
            role: EndpointRole::Legacy,
            actual: result.clone(),
        });
    }
    check_block_hash(EndpointRole::Bedrock, &pair.bedrock, expected_hash)
}

pub fn check_trace_available(pair: &ResponsePair) -> Result<(), PolicyViolation> {
    for role in [EndpointRole::Bedrock, EndpointRole::Legacy] {
        require_data(role, pair.get(role))?;
    }
    Ok(())
}

/// Legacy may answer with an empty result or a JSON-RPC error; both mean it
/// has no trace for the block.
pub fn check_trace_divergence(pair: &ResponsePair) -> Result<(), PolicyViolation> {
    if let Some(result) = pair.legacy.result().filter(|result| is_truthy(result)) {
        return Err(PolicyViolation::UnexpectedResult {
            role: EndpointRole::Legacy,
            actual: result.clone(),
        });
    }
    require_data(EndpointRole::Bedrock, &pair.bedrock)
}

/// `eth_blockNumber` on a frozen chain must report its final height.
pub fn check_block_number(response: &Response, expected: u64) -> Result<(), PolicyViolation> {
    let role = EndpointRole::Legacy;
    no_rpc_error(role, response)?;
    let mismatch = |actual: String| PolicyViolation::FieldMismatch {
        role,
        field: "result".to_string(),
        expected: expected.to_string(),
        actual,
    };
    let quantity = match response.result() {
        Some(Value::String(quantity)) => quantity,
        other => return Err(mismatch(format!("{other:?}"))),
    };
    match from_quantity(quantity) {
        Ok(actual) if actual == expected => Ok(()),
        Ok(actual) => Err(mismatch(actual.to_string())),
        Err(err) => Err(mismatch(err.to_string())),
    }
}

/// `eth_syncing` on a frozen chain must be false.
pub fn check_not_syncing(response: &Response) -> Result<(), PolicyViolation> {
    no_rpc_error(EndpointRole::Legacy, response)?;
    match response.result() {
        Some(result) if is_truthy(result) => Err(PolicyViolation::FieldMismatch {
            role: EndpointRole::Legacy,
            field: "result".to_string(),
            expected: "false".to_string(),
            actual: result.to_string(),
        }),
        _ => Ok(()),
    }
}

fn no_rpc_error(role: EndpointRole, response: &Response) -> Result<(), PolicyViolation> {
    match &response.error {
        Some(error) => Err(PolicyViolation::RpcError {
            role,
            code: error.code,
            message: error.message.clone(),
        }),
        None => Ok(()),
    }
}

fn require_data(role: EndpointRole, response: &Response) -> Result<(), PolicyViolation> {
    no_rpc_error(role, response)?;
    match response.result() {
        Some(result) if is_truthy(result) => Ok(()),
        other => Err(PolicyViolation::EmptyResult {
            role,
            actual: other.cloned().unwrap_or(Value::Null),
        }),
    }
}

fn check_block_hash(
    role: EndpointRole,
    response: &Response,
    expected: B256,
) -> Result<(), PolicyViolation> {
    no_rpc_error(role, response)?;
    let Some(hash) = response.result_field("hash") else {
        return Err(PolicyViolation::MissingField {
            role,
            field: "hash".to_string(),
            actual: response.result.clone().unwrap_or(Value::Null),
        });
    };
    let actual = hash.as_str().and_then(|hash| B256::from_str(hash).ok());
    if actual == Some(expected) {
        return Ok(());
    }
    Err(PolicyViolation::FieldMismatch {
        role,
        field: "hash".to_string(),
        expected: expected.to_string(),
        actual: hash.to_string(),
    })
}

static NULL: Value = Value::Null;

/// Depth-first search for the first path where two JSON values differ.
fn first_difference<'a>(
    path: &str,
    left: &'a Value,
    right: &'a Value,
) -> Option<(String, &'a Value, &'a Value)> {
    match (left, right) {
        (Value::Object(l), Value::Object(r)) => {
            let mut keys: Vec<&String> = l.keys().chain(r.keys()).collect();
            keys.sort();
            keys.dedup();
            keys.into_iter().find_map(|key| {
                let child = format!("{path}.{key}");
                match (l.get(key), r.get(key)) {
                    (Some(lv), Some(rv)) => first_difference(&child, lv, rv),
                    (lv, rv) => Some((
                        child,
                        lv.unwrap_or(&NULL),
                        rv.unwrap_or(&NULL),
                    )),
                }
            })
        }
        (Value::Array(l), Value::Array(r)) if l.len() == r.len() => l
            .iter()
            .zip(r)
            .enumerate()
            .find_map(|(index, (lv, rv))| first_difference(&format!("{path}[{index}]"), lv, rv)),
        (l, r) if l == r => None,
        (l, r) => Some((path.to_string(), l, r)),
    }
}
