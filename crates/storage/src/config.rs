use ironlog_domain::performance::DEFAULT_LOOKUP_CONCURRENCY;
use serde::Deserialize;

pub const DEFAULT_URL: &str = "http://localhost:3000";

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub url: String,
    pub api_key: String,
    /// Sent as bearer token instead of the API key when present.
    pub access_token: Option<String>,
    /// Previous performance lookups in flight at the same time, 0 is treated as 1.
    pub lookup_concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            api_key: String::new(),
            access_token: None,
            lookup_concurrency: DEFAULT_LOOKUP_CONCURRENCY,
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build a configuration from variables looked up by `var`, falling back to defaults.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Config::default();
        if let Some(url) = var("IRONLOG_STORE_URL") {
            config.url = url;
        }
        if let Some(api_key) = var("IRONLOG_STORE_KEY") {
            config.api_key = api_key;
        }
        config.access_token = var("IRONLOG_ACCESS_TOKEN").filter(|t| !t.trim().is_empty());
        if let Some(value) = var("IRONLOG_LOOKUP_CONCURRENCY") {
            config.lookup_concurrency = match value.trim().parse::<usize>() {
                Ok(n) => n.max(1),
                Err(_) => {
                    return Err(ConfigError::InvalidValue {
                        key: "IRONLOG_LOOKUP_CONCURRENCY",
                        value,
                    });
                }
            };
        }
        Ok(config)
    }
}
