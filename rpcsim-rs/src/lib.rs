#![allow(dead_code)]
#![warn(clippy::unwrap_used)]
mod client;
pub mod jsonrpc;
mod macros;
mod simulation;
mod testapi;
mod testmatch;
pub mod types;
pub mod utils;

pub use client::{RpcClient, RpcClientError};
pub use simulation::{RunSummary, Simulation};
pub use testapi::{run_suite, Client, EndpointTestSpec, Suite, Test, Testable};
pub use testmatch::TestMatcher;
