//! Secret-token pattern families.
//!
//! Each family is a regex. When the regex defines a `prefix` capture group, only the
//! text after the prefix is replaced, so `api_key=` or `Bearer ` stay readable.

use regex::Regex;
use thiserror::Error;

/// Marker written in place of every matched secret.
pub const REDACTED_MARKER: &str = "[REDACTED_API_KEY]";

/// Version of the built-in pattern set. Bump when a family is added or changed.
pub const PATTERN_SET_VERSION: u32 = 2;

/// Built-in families, in application order.
///
/// Vendor-specific prefixes come before the generic `sk-` family so that a
/// `sk-ant-` key is consumed whole instead of being split at the second dash.
const BUILTIN_FAMILIES: &[(&str, &str)] = &[
    ("anthropic", r"\bsk-ant-[A-Za-z0-9_\-]{8,}"),
    ("langfuse", r"\b(?:sk|pk)-lf-[A-Za-z0-9_\-]{8,}"),
    ("openai", r"\bsk-[A-Za-z0-9_\-]{4,}"),
    ("bearer", r"(?i)(?P<prefix>\bbearer\s+)[A-Za-z0-9._~+/*\-]+=*"),
    (
        "assignment",
        r#"(?i)(?P<prefix>(?:api[_-]?key|secret[_-]?key|access[_-]?token|auth[_-]?token|client[_-]?secret|password)['"]?\s*[:=]\s*['"]?)[A-Za-z0-9._~+/\-]{16,}"#,
    ),
];

/// Errors raised while building a pattern set.
#[derive(Debug, Error)]
pub enum RedactionError {
    /// A configured pattern is not a valid regular expression.
    #[error("invalid redaction pattern '{name}': {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },
}

/// A single named secret matcher.
#[derive(Debug, Clone)]
pub struct SecretPattern {
    name: String,
    regex: Regex,
    keeps_prefix: bool,
}

impl SecretPattern {
    /// Compile a pattern. A `prefix` named group is preserved in the output.
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self, RedactionError> {
        let name = name.into();
        let regex = Regex::new(pattern).map_err(|source| RedactionError::InvalidPattern {
            name: name.clone(),
            source,
        })?;
        let keeps_prefix = regex.capture_names().any(|n| n == Some("prefix"));
        Ok(Self {
            name,
            regex,
            keeps_prefix,
        })
    }

    /// Family name, e.g. `"openai"`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Replace every non-overlapping match in `text`.
    pub(crate) fn apply(&self, text: &str) -> String {
        let replacement = if self.keeps_prefix {
            format!("${{prefix}}{}", REDACTED_MARKER)
        } else {
            REDACTED_MARKER.to_string()
        };
        self.regex
            .replace_all(text, replacement.as_str())
            .into_owned()
    }
}

/// The built-in pattern families.
pub fn builtin_patterns() -> Vec<SecretPattern> {
    BUILTIN_FAMILIES
        .iter()
        .map(|(name, pattern)| {
            SecretPattern::new(*name, pattern).expect("built-in redaction pattern compiles")
        })
        .collect()
}
