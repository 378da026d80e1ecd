pub mod compare_eth;
pub mod constants;
pub mod legacy_eth;
