use serde_json::{json, Value};

use crate::policy::CallKind;

// JSON-RPC methods exercised against the clusters
pub const ETH_GET_BLOCK_BY_NUMBER: &str = "eth_getBlockByNumber";
pub const DEBUG_TRACE_BLOCK_BY_NUMBER: &str = "debug_traceBlockByNumber";
pub const ETH_BLOCK_NUMBER: &str = "eth_blockNumber";
pub const ETH_SYNCING: &str = "eth_syncing";

pub const CALL_TRACER: &str = "callTracer";

// eth_blockNumber is sampled this many times to show the legacy height is frozen
pub const BLOCK_NUMBER_SAMPLES: usize = 3;

pub fn method(kind: CallKind) -> &'static str {
    match kind {
        CallKind::Retrieval => ETH_GET_BLOCK_BY_NUMBER,
        CallKind::Trace => DEBUG_TRACE_BLOCK_BY_NUMBER,
    }
}

/// Params for a block-scoped call: headers only for retrieval, the call
/// tracer for traces.
pub fn block_params(kind: CallKind, block_quantity: String) -> Vec<Value> {
    match kind {
        CallKind::Retrieval => vec![json!(block_quantity), json!(false)],
        CallKind::Trace => vec![json!(block_quantity), json!({ "tracer": CALL_TRACER })],
    }
}
