use crate::adapters::{PasswordCredentials, TokenCredentials};
use crate::core::{ConfigProvider, CredentialProvider};
use crate::utils::error::{PortfolioError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_range, validate_required_field, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_CONFIG_FILE: &str = "portfolio-client.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiConfig,
    pub auth: Option<AuthConfig>,
    pub display: Option<DisplayConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: Option<u64>,
    pub retry_attempts: Option<u32>,
    pub retry_delay_ms: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: None,
            retry_attempts: None,
            retry_delay_ms: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    #[default]
    Password,
    Token,
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub mode: AuthMode,
    pub username: Option<String>,
    pub password: Option<String>,
    pub user_id: Option<i64>,
    pub token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("mode", &self.mode)
            .field("username", &self.username)
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub decimals: Option<usize>,
    pub currency: Option<String>,
}

impl ClientConfig {
    /// Loads `path`, falling back to defaults when the file does not exist.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(PortfolioError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| PortfolioError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| PortfolioError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn decimals(&self) -> usize {
        self.display.as_ref().and_then(|d| d.decimals).unwrap_or(2)
    }

    pub fn currency(&self) -> &str {
        self.display
            .as_ref()
            .and_then(|d| d.currency.as_deref())
            .unwrap_or("USDT")
    }

    pub fn auth_mut(&mut self) -> &mut AuthConfig {
        self.auth.get_or_insert_with(AuthConfig::default)
    }

    pub fn credentials(&self) -> Result<Box<dyn CredentialProvider>> {
        let auth = validate_required_field("auth", &self.auth)?;
        match auth.mode {
            AuthMode::Password => {
                let username = validate_required_field("auth.username", &auth.username)?;
                let password = validate_required_field("auth.password", &auth.password)?;
                Ok(Box::new(PasswordCredentials::new(
                    username.as_str(),
                    password.as_str(),
                )))
            }
            AuthMode::Token => {
                let user_id = validate_required_field("auth.user_id", &auth.user_id)?;
                let token = validate_required_field("auth.token", &auth.token)?;
                Ok(Box::new(TokenCredentials::new(*user_id, token.as_str())))
            }
        }
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_url("api.base_url", &self.api.base_url)?;

        if let Some(timeout) = self.api.timeout_seconds {
            validate_range("api.timeout_seconds", timeout, 1, 600)?;
        }
        if let Some(attempts) = self.api.retry_attempts {
            validate_range("api.retry_attempts", attempts, 0, 10)?;
        }
        validate_range("display.decimals", self.decimals(), 0, 8)?;

        if let Some(auth) = &self.auth {
            if auth.mode == AuthMode::Token {
                if let Some(token) = &auth.token {
                    validate_non_empty_string("auth.token", token)?;
                }
            }
        }

        Ok(())
    }
}

impl ConfigProvider for ClientConfig {
    fn base_url(&self) -> &str {
        &self.api.base_url
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_seconds.unwrap_or(30))
    }

    fn retry_attempts(&self) -> u32 {
        self.api.retry_attempts.unwrap_or(3)
    }

    fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.api.retry_delay_ms.unwrap_or(100))
    }
}

impl Validate for ClientConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
