//! Runtime configuration loaded from the environment (and `.env` via dotenv)

use std::env;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
}

/// How the recipient account number is shown on a receipt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecipientAccountDisplay {
    #[default]
    Full,
    Masked,
}

impl std::str::FromStr for RecipientAccountDisplay {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "full" => Ok(RecipientAccountDisplay::Full),
            "masked" => Ok(RecipientAccountDisplay::Masked),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScreenshotConfig {
    pub api_url: String,
    pub api_keys: Vec<String>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Base used when building image URLs; falls back to the request Host header
    pub public_base_url: Option<String>,
    pub recipient_account_display: RecipientAccountDisplay,
    pub screenshot: ScreenshotConfig,
    pub receipt_ttl: Duration,
    pub receipt_store_capacity: usize,
    pub render_rate_limit: usize,
    pub keepalive_url: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            public_base_url: None,
            recipient_account_display: RecipientAccountDisplay::Full,
            screenshot: ScreenshotConfig {
                api_url: String::new(),
                api_keys: Vec::new(),
                timeout: Duration::from_secs(15),
            },
            receipt_ttl: Duration::from_secs(3600),
            receipt_store_capacity: 500,
            render_rate_limit: 20,
            keepalive_url: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let recipient_account_display = match optional("RECIPIENT_ACCOUNT_DISPLAY") {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                key: "RECIPIENT_ACCOUNT_DISPLAY",
                value,
            })?,
            None => defaults.recipient_account_display,
        };

        let api_keys = optional("SCREENSHOT_API_KEYS")
            .map(|keys| {
                keys.split(',')
                    .map(|k| k.trim().to_string())
                    .filter(|k| !k.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let public_base_url = match optional("PUBLIC_BASE_URL") {
            Some(value) => {
                let base = value.trim_end_matches('/').to_string();
                if reqwest::Url::parse(&base).is_err() {
                    return Err(ConfigError::InvalidValue {
                        key: "PUBLIC_BASE_URL",
                        value,
                    });
                }
                Some(base)
            }
            None => None,
        };

        Ok(Self {
            host: optional("HOST").unwrap_or(defaults.host),
            port: parse_or("PORT", defaults.port)?,
            public_base_url,
            recipient_account_display,
            screenshot: ScreenshotConfig {
                api_url: optional("SCREENSHOT_API_URL").unwrap_or(defaults.screenshot.api_url),
                api_keys,
                timeout: Duration::from_secs(parse_or(
                    "SCREENSHOT_TIMEOUT_SECS",
                    defaults.screenshot.timeout.as_secs(),
                )?),
            },
            receipt_ttl: Duration::from_secs(parse_or(
                "RECEIPT_TTL_SECS",
                defaults.receipt_ttl.as_secs(),
            )?),
            receipt_store_capacity: parse_or(
                "RECEIPT_STORE_CAPACITY",
                defaults.receipt_store_capacity,
            )?,
            render_rate_limit: parse_or("RENDER_RATE_LIMIT", defaults.render_rate_limit)?,
            keepalive_url: optional("KEEPALIVE_URL")
                .map(|url| url.trim_end_matches('/').to_string()),
        })
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_or<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match optional(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        None => Ok(default),
    }
}
