//! Configuration for the account wizard and its dispatcher.
//!
//! Values come from environment variables or a JSON document. Everything
//! except the operator whitelist has a default.

use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

/// Variable holding the comma-separated operator whitelist.
pub const AUTHORIZED_USER_IDS: &str = "AUTHORIZED_USER_IDS";
/// Optional variable overriding the username pattern.
pub const USERNAME_PATTERN: &str = "USERNAME_PATTERN";

pub const DEFAULT_USERNAME_PATTERN: &str = "^[a-zA-Z0-9_]{3,32}$";

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required variable {0} is not set")]
    MissingVar(&'static str),

    #[error("invalid operator id '{value}' in {var}")]
    InvalidOperatorId { var: &'static str, value: String },

    #[error("invalid configuration document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid username pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Texts the dispatcher replies with when a conversation cannot proceed.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub retry_later: String,
    pub not_allowed: String,
    pub start_hint: String,
    pub removed: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            retry_later: "Unable to serve you, try again later".to_string(),
            not_allowed: "You are not allowed to use this".to_string(),
            start_hint: "To start using bot enter /start".to_string(),
            removed: "Successfully deleted you".to_string(),
        }
    }
}

/// Wizard and dispatcher configuration.
///
/// # Example
///
/// ```rust
/// use stepflow::config::WizardConfig;
///
/// let config = WizardConfig::from_json(r#"{ "authorized_operators": [7, 8] }"#).unwrap();
/// assert_eq!(config.authorized_operators, vec![7, 8]);
/// assert_eq!(config.username_pattern, "^[a-zA-Z0-9_]{3,32}$");
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct WizardConfig {
    pub authorized_operators: Vec<i64>,
    #[serde(default = "default_username_pattern")]
    pub username_pattern: String,
    #[serde(default)]
    pub messages: Messages,
}

fn default_username_pattern() -> String {
    DEFAULT_USERNAME_PATTERN.to_string()
}

impl WizardConfig {
    pub fn new(authorized_operators: Vec<i64>) -> Self {
        Self {
            authorized_operators,
            username_pattern: default_username_pattern(),
            messages: Messages::default(),
        }
    }

    /// Parse a JSON document, then compile-check the username pattern.
    pub fn from_json(document: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(document)?;
        config.username_regex()?;
        Ok(config)
    }

    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars().collect())
    }

    /// Read configuration from a set of variables.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let raw_ids = vars
            .get(AUTHORIZED_USER_IDS)
            .ok_or(ConfigError::MissingVar(AUTHORIZED_USER_IDS))?;

        let authorized_operators = raw_ids
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| {
                id.parse::<i64>()
                    .map_err(|_| ConfigError::InvalidOperatorId {
                        var: AUTHORIZED_USER_IDS,
                        value: id.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut config = Self::new(authorized_operators);
        if let Some(pattern) = vars.get(USERNAME_PATTERN) {
            config.username_pattern = pattern.clone();
        }
        config.username_regex()?;
        Ok(config)
    }

    pub fn username_regex(&self) -> Result<Regex, ConfigError> {
        Ok(Regex::new(&self.username_pattern)?)
    }
}
