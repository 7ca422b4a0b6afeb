//! Langfuse key resolution.
//!
//! # Security
//! - Keys are held as `SecretString` and never logged
//! - Values in the config file win; the environment only fills gaps

use url::Url;

use crate::config::LangfuseConfig;
use crate::integrations::langfuse::types::{LangfuseError, LangfuseResult};
use crate::redaction::SecretString;

pub const PUBLIC_KEY_ENV_VAR: &str = "LANGFUSE_PUBLIC_KEY";
pub const SECRET_KEY_ENV_VAR: &str = "LANGFUSE_SECRET_KEY";
/// Consulted only when the config still carries the default host.
pub const HOST_ENV_VAR: &str = "LANGFUSE_HOST";

/// Everything needed to talk to one Langfuse project.
#[derive(Debug, Clone)]
pub struct LangfuseCredentials {
    pub host: Url,
    pub public_key: SecretString,
    pub secret_key: SecretString,
}

impl LangfuseCredentials {
    /// Resolve from config, falling back to the process environment.
    pub fn resolve(config: &LangfuseConfig) -> LangfuseResult<Self> {
        Self::resolve_with(config, |name| std::env::var(name).ok())
    }

    /// Resolve from config, falling back to `lookup` for unset values.
    pub fn resolve_with<F>(config: &LangfuseConfig, lookup: F) -> LangfuseResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let from_env = |name: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .map(SecretString::new)
        };
        let configured = |key: &Option<SecretString>| key.clone().filter(|k| !k.is_empty());

        let public_key = configured(&config.public_key)
            .or_else(|| from_env(PUBLIC_KEY_ENV_VAR))
            .ok_or(LangfuseError::MissingCredentials(PUBLIC_KEY_ENV_VAR))?;
        let secret_key = configured(&config.secret_key)
            .or_else(|| from_env(SECRET_KEY_ENV_VAR))
            .ok_or(LangfuseError::MissingCredentials(SECRET_KEY_ENV_VAR))?;

        let host = if config.host == LangfuseConfig::default().host {
            lookup(HOST_ENV_VAR)
                .filter(|h| !h.trim().is_empty())
                .unwrap_or_else(|| config.host.clone())
        } else {
            config.host.clone()
        };
        let host = Url::parse(&host).map_err(|source| LangfuseError::InvalidHost {
            host: host.clone(),
            source,
        })?;

        Ok(Self {
            host,
            public_key,
            secret_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn config_keys_take_precedence() {
        let config = LangfuseConfig {
            public_key: Some(SecretString::new("pk-lf-config")),
            secret_key: Some(SecretString::new("sk-lf-config")),
            ..Default::default()
        };
        let creds = LangfuseCredentials::resolve_with(
            &config,
            env(&[(PUBLIC_KEY_ENV_VAR, "pk-lf-env"), (SECRET_KEY_ENV_VAR, "sk-lf-env")]),
        )
        .unwrap();
        assert_eq!(creds.public_key.expose(), "pk-lf-config");
        assert_eq!(creds.secret_key.expose(), "sk-lf-config");
    }

    #[test]
    fn environment_fills_missing_keys_and_host() {
        let creds = LangfuseCredentials::resolve_with(
            &LangfuseConfig::default(),
            env(&[
                (PUBLIC_KEY_ENV_VAR, "pk-lf-env"),
                (SECRET_KEY_ENV_VAR, "sk-lf-env"),
                (HOST_ENV_VAR, "http://localhost:3000"),
            ]),
        )
        .unwrap();
        assert_eq!(creds.public_key.expose(), "pk-lf-env");
        assert_eq!(creds.host.as_str(), "http://localhost:3000/");
    }

    #[test]
    fn missing_secret_key_is_reported_by_name() {
        let err = LangfuseCredentials::resolve_with(
            &LangfuseConfig::default(),
            env(&[(PUBLIC_KEY_ENV_VAR, "pk-lf-env"), (SECRET_KEY_ENV_VAR, "  ")]),
        )
        .unwrap_err();
        assert!(matches!(err, LangfuseError::MissingCredentials(SECRET_KEY_ENV_VAR)));
    }

    #[test]
    fn invalid_host_is_rejected() {
        let config = LangfuseConfig {
            host: "not a host".into(),
            public_key: Some(SecretString::new("pk-lf-a")),
            secret_key: Some(SecretString::new("sk-lf-b")),
            ..Default::default()
        };
        let err = LangfuseCredentials::resolve_with(&config, env(&[])).unwrap_err();
        assert!(matches!(err, LangfuseError::InvalidHost { .. }));
    }
}
