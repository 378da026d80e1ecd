use crate::types::TestResult;
use tokio::task::JoinError;

/// Ensures that 'name' contains the network name.
pub fn network_test_name(name: String, network: &str) -> String {
    if name.is_empty() {
        return network.to_string();
    }
    if name.contains("NETWORK") {
        return name.replace("NETWORK", network);
    }
    format!("{} ({})", name, network)
}

pub fn extract_test_results(join_handle: Result<(), JoinError>) -> TestResult {
    match join_handle {
        Ok(()) => TestResult {
            pass: true,
            details: "".to_string(),
        },
        Err(err) if err.is_cancelled() => TestResult {
            pass: false,
            details: "test task was cancelled".to_string(),
        },
        Err(err) => {
            let err = err.into_panic();
            let err = if let Some(err) = err.downcast_ref::<&'static str>() {
                err.to_string()
            } else if let Some(err) = err.downcast_ref::<String>() {
                err.clone()
            } else {
                format!("?{:?}", err)
            };

            TestResult {
                pass: false,
                details: err,
            }
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QuantityError {
    #[error("quantity '{0}' is missing the 0x prefix")]
    MissingPrefix(String),
    #[error("quantity '{0}' has no digits")]
    Empty(String),
    #[error("quantity '{0}' is not valid hex")]
    InvalidHex(String),
}

/// Encodes a number the way JSON-RPC quantities are written: `0x`-prefixed,
/// lowercase, no leading zeros.
pub fn to_quantity(value: u64) -> String {
    format!("{value:#x}")
}

/// Decodes a `0x`-prefixed hex quantity.
pub fn from_quantity(quantity: &str) -> Result<u64, QuantityError> {
    let digits = quantity
        .strip_prefix("0x")
        .or_else(|| quantity.strip_prefix("0X"))
        .ok_or_else(|| QuantityError::MissingPrefix(quantity.to_string()))?;
    if digits.is_empty() {
        return Err(QuantityError::Empty(quantity.to_string()));
    }
    u64::from_str_radix(digits, 16).map_err(|_| QuantityError::InvalidHex(quantity.to_string()))
}
