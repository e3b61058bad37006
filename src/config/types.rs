use serde::{Deserialize, Serialize};

/// Environment variable that overrides the catalog URL
pub const URL_ENV_VAR: &str = "PROV_CTL_URL";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub remote: RemoteConfig,
    pub provisioning: ProvisioningConfig,
}

/// Remote catalog connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub url: String,
    pub timeout_secs: u64,
    /// Name of the environment variable holding the bearer token
    pub token_env: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080".to_string(),
            timeout_secs: 30,
            token_env: "PROV_CTL_TOKEN".to_string(),
        }
    }
}

impl RemoteConfig {
    /// The configured URL unless `PROV_CTL_URL` is set
    pub fn resolved_url(&self) -> String {
        std::env::var(URL_ENV_VAR)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| self.url.clone())
    }

    pub fn token(&self) -> Option<String> {
        std::env::var(&self.token_env)
            .ok()
            .filter(|v| !v.trim().is_empty())
    }
}

/// Provisioning defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisioningConfig {
    /// Never prompt; fail on missing required values
    pub no_prompt: bool,
    pub default_group: Option<String>,
    /// Offered as the default in the cloud prompt
    pub default_cloud: Option<String>,
}
