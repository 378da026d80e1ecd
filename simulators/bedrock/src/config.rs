use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use tracing::info;
use url::Url;

use crate::network::{
    ForkBoundary, Network, DEFAULT_BEDROCK_URL, DEFAULT_LEGACY_URL, REHEARSAL_FORK_BOUNDARY,
    REHEARSAL_NETWORK_NAME,
};

pub const CONFIG_PATH_ENV: &str = "BEDROCK_COMPAT_CONFIG";
pub const LEGACY_URL_ENV: &str = "LEGACY_URL";
pub const BEDROCK_URL_ENV: &str = "BEDROCK_URL";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Everything a run needs: the request timeout and the networks to check.
#[derive(Clone, Debug)]
pub struct Config {
    pub request_timeout: Duration,
    pub networks: Vec<Network>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(default = "default_request_timeout_secs")]
    request_timeout_secs: u64,
    networks: Vec<NetworkConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NetworkConfig {
    name: String,
    legacy_url: String,
    bedrock_url: String,
    fork: ForkBoundary,
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Config {
    /// Reads the YAML file named by BEDROCK_COMPAT_CONFIG, or falls back to
    /// the built-in rehearsal network with LEGACY_URL / BEDROCK_URL.
    pub fn from_env() -> Result<Self> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.is_empty() => Self::from_file(path),
            _ => {
                let legacy_url = env_or_default(LEGACY_URL_ENV, DEFAULT_LEGACY_URL);
                let bedrock_url = env_or_default(BEDROCK_URL_ENV, DEFAULT_BEDROCK_URL);
                info!("No {CONFIG_PATH_ENV} set, using built-in {REHEARSAL_NETWORK_NAME} fixtures");
                Self::builtin(&legacy_url, &bedrock_url)
            }
        }
    }

    pub fn builtin(legacy_url: &str, bedrock_url: &str) -> Result<Self> {
        let config = Self {
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            networks: vec![Network::new(
                REHEARSAL_NETWORK_NAME,
                legacy_url,
                bedrock_url,
                REHEARSAL_FORK_BOUNDARY,
            )],
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        let file: FileConfig = serde_yaml::from_str(contents)?;
        let config = Self {
            request_timeout: Duration::from_secs(file.request_timeout_secs),
            networks: file
                .networks
                .into_iter()
                .map(|network| {
                    Network::new(
                        network.name,
                        &network.legacy_url,
                        &network.bedrock_url,
                        network.fork,
                    )
                })
                .collect(),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.request_timeout.is_zero() {
            bail!("request_timeout_secs must be greater than zero");
        }
        if self.networks.is_empty() {
            bail!("at least one network must be configured");
        }

        let mut names = HashSet::new();
        for network in &self.networks {
            if network.name.trim().is_empty() {
                bail!("network names must not be empty");
            }
            if !names.insert(network.name.as_str()) {
                bail!("network '{}' is configured more than once", network.name);
            }
            for endpoint in [&network.legacy, &network.bedrock] {
                let url = Url::parse(&endpoint.url).map_err(|err| {
                    anyhow!(
                        "{} url '{}' of network '{}' is invalid: {err}",
                        endpoint.role,
                        endpoint.url,
                        network.name
                    )
                })?;
                if !matches!(url.scheme(), "http" | "https") {
                    bail!(
                        "{} url '{}' of network '{}' must be http or https",
                        endpoint.role,
                        endpoint.url,
                        network.name
                    );
                }
            }
            if network.fork.last_legacy_block_number == u64::MAX {
                bail!(
                    "last_legacy_block_number of network '{}' leaves no post-fork block",
                    network.name
                );
            }
        }
        Ok(())
    }
}

fn env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).map_or(default.to_string(), |val| {
        if val.is_empty() {
            default.to_string()
        } else {
            val.trim_end_matches('/').to_string()
        }
    })
}
