//! Live, atomically swappable configuration.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;

use crate::config::schema::{LoggingConfig, RedactionConfig};
use crate::logging::{CallType, LoggingContext, Message};
use crate::redaction::{RedactionError, RedactionPolicy, Redactor};

/// Build a redactor with the built-in families plus any configured patterns.
pub fn build_redactor(config: &RedactionConfig) -> Result<Redactor, RedactionError> {
    config
        .extra_patterns
        .iter()
        .fold(Redactor::builder(), |builder, extra| {
            builder.pattern(extra.name.clone(), extra.pattern.clone())
        })
        .build()
}

/// Current config plus the redactor compiled from it.
///
/// Readers take a snapshot per call; a reload replaces both in one step so a
/// context never pairs a new policy with an old pattern set.
pub struct RuntimeConfig {
    state: ArcSwap<RuntimeState>,
}

struct RuntimeState {
    config: Arc<LoggingConfig>,
    redactor: Arc<Redactor>,
}

impl RuntimeConfig {
    pub fn new(config: LoggingConfig) -> Result<Self, RedactionError> {
        Ok(Self {
            state: ArcSwap::from_pointee(RuntimeState::compile(config)?),
        })
    }

    /// Snapshot of the current config.
    pub fn load(&self) -> Arc<LoggingConfig> {
        Arc::clone(&self.state.load().config)
    }

    /// Snapshot of the current redactor.
    pub fn redactor(&self) -> Arc<Redactor> {
        Arc::clone(&self.state.load().redactor)
    }

    /// Policy for a context created now.
    pub fn policy(&self) -> RedactionPolicy {
        let state = self.state.load();
        RedactionPolicy::new(
            state.config.policy.turn_off_message_logging,
            Arc::clone(&state.redactor),
        )
    }

    pub fn callback_timeout(&self) -> Duration {
        Duration::from_millis(self.state.load().config.callbacks.timeout_ms)
    }

    /// Callback deadline and redactor from the same snapshot.
    pub fn dispatch_settings(&self) -> (Duration, Arc<Redactor>) {
        let state = self.state.load();
        (
            Duration::from_millis(state.config.callbacks.timeout_ms),
            Arc::clone(&state.redactor),
        )
    }

    /// Replace the live config. In-flight contexts keep their snapshot.
    pub fn swap(&self, config: LoggingConfig) -> Result<(), RedactionError> {
        let next = RuntimeState::compile(config)?;
        self.state.store(Arc::new(next));
        tracing::info!("Logging configuration swapped");
        Ok(())
    }

    /// Create a logging context carrying the current policy and capture flag.
    pub fn new_context(
        &self,
        model: impl Into<String>,
        messages: Vec<Message>,
        call_type: CallType,
    ) -> LoggingContext {
        let state = self.state.load();
        LoggingContext::new(model, messages, call_type)
            .with_raw_request_logging(state.config.policy.log_raw_request_response)
            .with_policy(RedactionPolicy::new(
                state.config.policy.turn_off_message_logging,
                Arc::clone(&state.redactor),
            ))
    }
}

impl RuntimeState {
    fn compile(config: LoggingConfig) -> Result<Self, RedactionError> {
        let redactor = build_redactor(&config.redaction)?;
        Ok(Self {
            config: Arc::new(config),
            redactor: Arc::new(redactor),
        })
    }
}

impl std::fmt::Debug for RuntimeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeConfig")
            .field("config", &self.state.load().config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::PatternConfig;

    fn with_pattern() -> LoggingConfig {
        let mut config = LoggingConfig::default();
        config.redaction.extra_patterns.push(PatternConfig {
            name: "internal".into(),
            pattern: "int_[a-f0-9]{12}".into(),
        });
        config
    }

    #[test]
    fn extra_patterns_extend_builtin_set() {
        let redactor = build_redactor(&with_pattern().redaction).unwrap();
        let out = redactor.redact("tok int_0123456789ab and sk-ant-api03-abcdefghijkl");
        assert!(!out.contains("int_0123456789ab"));
        assert!(!out.contains("sk-ant-api03"));
    }

    #[test]
    fn context_inherits_current_policy() {
        let mut config = LoggingConfig::default();
        config.policy.turn_off_message_logging = true;
        config.policy.log_raw_request_response = true;
        let runtime = RuntimeConfig::new(config).unwrap();

        let ctx = runtime.new_context("gpt-4o", vec![], CallType::Completion);
        assert!(ctx.log_raw_request_response());
        assert!(ctx.policy().turn_off_message_logging);
    }

    #[test]
    fn swap_leaves_existing_contexts_alone() {
        let runtime = RuntimeConfig::new(LoggingConfig::default()).unwrap();
        let before = runtime.new_context("gpt-4o", vec![], CallType::Completion);

        let mut next = with_pattern();
        next.policy.turn_off_message_logging = true;
        runtime.swap(next).unwrap();

        assert!(!before.policy().turn_off_message_logging);
        assert!(runtime.policy().turn_off_message_logging);
        assert_eq!(runtime.load().redaction.extra_patterns.len(), 1);
        assert!(runtime.redactor().redact("int_0123456789ab").contains("[REDACTED_API_KEY]"));
    }

    #[test]
    fn invalid_pattern_rejected_on_swap() {
        let runtime = RuntimeConfig::new(LoggingConfig::default()).unwrap();
        let mut next = LoggingConfig::default();
        next.redaction.extra_patterns.push(PatternConfig {
            name: "broken".into(),
            pattern: "(".into(),
        });
        next.callbacks.timeout_ms = 1;
        assert!(runtime.swap(next).is_err());
        assert_eq!(runtime.callback_timeout(), Duration::from_millis(5_000));
    }
}
