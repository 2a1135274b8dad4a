//! Agent configuration
//!
//! Layering: built-in defaults, then an optional TOML file, then environment
//! variables.

use crate::util::errors::{AgentError, AgentResult};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const ENV_API_KEY: &str = "ANTHROPIC_API_KEY";
pub const ENV_BASE_URL: &str = "ANTHROPIC_BASE_URL";
pub const ENV_MODEL: &str = "AMADEUS_MODEL";
pub const ENV_MCP_RPC_URL: &str = "AMADEUS_MCP_RPC_URL";
pub const ENV_TOOL_TIMEOUT_SECS: &str = "AMADEUS_TOOL_TIMEOUT_SECS";
pub const ENV_WALLET_ADDRESS: &str = "AMA_WALLET_ADDRESS";
pub const ENV_SECRET_KEY: &str = "AMA_SECRET_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub request_timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.anthropic.com".to_string(),
            model: "claude-3-haiku-20240307".to_string(),
            max_tokens: 2048,
            request_timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct McpConfig {
    pub rpc_url: String,
    pub tool_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://mcp.ama.one/rpc".to_string(),
            tool_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    pub address: Option<String>,
    /// Base58 secret used by the local signer. Stands in for an external wallet.
    pub secret_key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    pub max_rounds: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub model: ModelConfig,
    pub mcp: McpConfig,
    pub wallet: WalletConfig,
    pub agent: LoopConfig,
}

impl AgentConfig {
    pub fn from_toml_str(contents: &str) -> AgentResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Loads defaults, the optional TOML file, then the process environment.
    pub fn load(path: Option<&Path>) -> AgentResult<Self> {
        let mut config = match path {
            Some(path) => {
                let contents = std::fs::read_to_string(path).map_err(|e| {
                    AgentError::Config(format!("Failed to read {}: {}", path.display(), e))
                })?;
                debug!("Loaded config file: {}", path.display());
                Self::from_toml_str(&contents)?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Overrides fields from an environment lookup; empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> AgentResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_API_KEY) {
            self.model.api_key = Some(v);
        }
        if let Some(v) = get(ENV_BASE_URL) {
            self.model.base_url = v;
        }
        if let Some(v) = get(ENV_MODEL) {
            self.model.model = v;
        }
        if let Some(v) = get(ENV_MCP_RPC_URL) {
            self.mcp.rpc_url = v;
        }
        if let Some(v) = get(ENV_TOOL_TIMEOUT_SECS) {
            self.mcp.tool_timeout_secs = v.trim().parse().map_err(|_| {
                AgentError::Config(format!("{} must be a whole number of seconds", ENV_TOOL_TIMEOUT_SECS))
            })?;
        }
        if let Some(v) = get(ENV_WALLET_ADDRESS) {
            self.wallet.address = Some(v);
        }
        if let Some(v) = get(ENV_SECRET_KEY) {
            self.wallet.secret_key = Some(v);
        }
        Ok(())
    }

    pub fn validate(&self) -> AgentResult<()> {
        if self.model.api_key.as_deref().map_or(true, str::is_empty) {
            return Err(AgentError::Config(format!("Missing {}", ENV_API_KEY)));
        }
        if self.mcp.rpc_url.is_empty() {
            return Err(AgentError::Config("MCP RPC URL is empty".to_string()));
        }
        if self.mcp.tool_timeout_secs == 0 {
            return Err(AgentError::Config("Tool timeout must be positive".to_string()));
        }
        if self.model.max_tokens == 0 {
            return Err(AgentError::Config("max_tokens must be positive".to_string()));
        }
        Ok(())
    }

    pub fn require_wallet_address(&self) -> AgentResult<&str> {
        self.wallet
            .address
            .as_deref()
            .filter(|a| !a.is_empty())
            .ok_or_else(|| AgentError::Config(format!("Missing {}", ENV_WALLET_ADDRESS)))
    }

    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.mcp.tool_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.mcp.connect_timeout_secs)
    }

    pub fn model_request_timeout(&self) -> Duration {
        Duration::from_secs(self.model.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_public_endpoints() {
        let config = AgentConfig::default();
        assert_eq!(config.mcp.rpc_url, "https://mcp.ama.one/rpc");
        assert_eq!(config.model.model, "claude-3-haiku-20240307");
        assert_eq!(config.model.max_tokens, 2048);
        assert!(config.validate().is_err());
    }

    #[test]
    fn toml_then_env_layering() {
        let mut config = AgentConfig::from_toml_str(
            r#"
            [model]
            api_key = "from-file"
            max_tokens = 1024

            [mcp]
            tool_timeout_secs = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.model.max_tokens, 1024);
        assert_eq!(config.mcp.rpc_url, "https://mcp.ama.one/rpc");

        let env: HashMap<&str, &str> = [
            (ENV_API_KEY, "from-env"),
            (ENV_WALLET_ADDRESS, "ama1sender"),
            (ENV_MODEL, ""),
        ]
        .into_iter()
        .collect();
        config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.model.api_key.as_deref(), Some("from-env"));
        assert_eq!(config.model.model, "claude-3-haiku-20240307");
        assert_eq!(config.require_wallet_address().unwrap(), "ama1sender");
        assert_eq!(config.tool_timeout(), Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn bad_timeout_is_config_error() {
        let mut config = AgentConfig::default();
        let err = config
            .apply_env(|key| (key == ENV_TOOL_TIMEOUT_SECS).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, AgentError::Config(_)));
    }
}
