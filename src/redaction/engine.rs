//! Redaction engine.
//!
//! # Responsibilities
//! - Scrub secret tokens from arbitrary text
//! - Scrub structured metadata before it is forwarded
//! - Partially mask API keys kept for diagnostics

use std::sync::OnceLock;

use serde_json::{Map, Value};

use super::patterns::{builtin_patterns, RedactionError, SecretPattern, REDACTED_MARKER};

/// Key fragments whose values are replaced wholesale in structured metadata.
const SENSITIVE_KEYS: &[&str] = &[
    "api_key",
    "apikey",
    "api-key",
    "secret",
    "password",
    "authorization",
    "access_token",
    "private_key",
];

/// An ordered set of secret patterns.
///
/// Cheap to share: wrap in `Arc` or use [`Redactor::global`].
#[derive(Debug, Clone)]
pub struct Redactor {
    patterns: Vec<SecretPattern>,
}

impl Redactor {
    /// Redactor with the built-in families only.
    pub fn new() -> Self {
        Self {
            patterns: builtin_patterns(),
        }
    }

    pub fn builder() -> RedactorBuilder {
        RedactorBuilder::default()
    }

    /// Process-wide default instance.
    pub fn global() -> &'static Redactor {
        static DEFAULT: OnceLock<Redactor> = OnceLock::new();
        DEFAULT.get_or_init(Redactor::new)
    }

    pub fn patterns(&self) -> &[SecretPattern] {
        &self.patterns
    }

    /// Replace every recognised secret in `text` with `[REDACTED_API_KEY]`.
    pub fn redact(&self, text: &str) -> String {
        let mut out = text.to_string();
        for pattern in &self.patterns {
            if pattern.is_match(&out) {
                out = pattern.apply(&out);
            }
        }
        out
    }

    /// Recursively scrub a JSON value.
    pub fn redact_value(&self, value: &Value) -> Value {
        match value {
            Value::Object(map) => {
                let mut scrubbed = Map::with_capacity(map.len());
                for (key, val) in map {
                    if is_sensitive_key(key) && !val.is_null() {
                        scrubbed.insert(key.clone(), Value::String(REDACTED_MARKER.to_string()));
                    } else {
                        scrubbed.insert(key.clone(), self.redact_value(val));
                    }
                }
                Value::Object(scrubbed)
            }
            Value::Array(items) => Value::Array(items.iter().map(|v| self.redact_value(v)).collect()),
            Value::String(s) => Value::String(self.redact(s)),
            _ => value.clone(),
        }
    }
}

impl Default for Redactor {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder that appends custom patterns after the built-in families.
#[derive(Debug, Default)]
pub struct RedactorBuilder {
    extra: Vec<(String, String)>,
    skip_builtin: bool,
}

impl RedactorBuilder {
    pub fn pattern(mut self, name: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.extra.push((name.into(), pattern.into()));
        self
    }

    /// Start from an empty set instead of the built-in families.
    pub fn without_builtin(mut self) -> Self {
        self.skip_builtin = true;
        self
    }

    pub fn build(self) -> Result<Redactor, RedactionError> {
        let mut patterns = if self.skip_builtin {
            Vec::new()
        } else {
            builtin_patterns()
        };
        for (name, pattern) in &self.extra {
            patterns.push(SecretPattern::new(name.clone(), pattern)?);
        }
        Ok(Redactor { patterns })
    }
}

/// Redact `text` with the process-wide default pattern set.
pub fn redact(text: &str) -> String {
    Redactor::global().redact(text)
}

/// Redact a JSON value with the process-wide default pattern set.
pub fn redact_value(value: &Value) -> Value {
    Redactor::global().redact_value(value)
}

/// Mask a credential down to a short recognisable hint.
///
/// Keys of 12 characters or fewer are fully masked.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 12 {
        return "*".repeat(chars.len().max(4));
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}****{}", head, tail)
}

fn is_sensitive_key(key: &str) -> bool {
    let lower = key.to_lowercase();
    SENSITIVE_KEYS.iter().any(|s| lower.contains(s))
}
