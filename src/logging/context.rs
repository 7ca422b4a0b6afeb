//! The logging context owned by one outbound call.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::callbacks::{CallbackDispatcher, CallbackEvent, CallbackPayload, DispatchReport};
use crate::metadata::{ensure_metadata, set_raw_request, LitellmParams, MetadataHandle};
use crate::redaction::{mask_secret, RedactionPolicy, RAW_REQUEST_REDACTED_PLACEHOLDER};

use super::raw_request::format_raw_request;
use super::types::{AdditionalArgs, CallType, Message};

/// Details accumulated by the hooks of one call.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ModelCallDetails {
    pub litellm_params: LitellmParams,

    /// Input as passed to `pre_call`, after content scrubbing.
    pub input: Option<Value>,

    /// Masked API key; the raw key is never stored.
    pub api_key: Option<String>,

    pub additional_args: Option<AdditionalArgs>,

    /// Provider response text captured by `post_call`, scrubbed.
    pub original_response: Option<String>,

    /// Redacted error text recorded by the failure hook.
    pub exception: Option<String>,
}

/// Identity, policy and accumulated data of a single outbound call attempt.
#[derive(Debug, Clone)]
pub struct LoggingContext {
    pub model: String,
    pub messages: Vec<Message>,
    pub stream: bool,
    pub call_type: CallType,
    pub call_id: String,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub function_id: String,
    pub model_call_details: ModelCallDetails,
    log_raw_request_response: bool,
    policy: RedactionPolicy,
}

impl LoggingContext {
    /// Create a context for a new call with a generated call id.
    pub fn new(model: impl Into<String>, messages: Vec<Message>, call_type: CallType) -> Self {
        Self {
            model: model.into(),
            messages,
            stream: false,
            call_type,
            call_id: Uuid::new_v4().to_string(),
            start_time: None,
            end_time: None,
            function_id: String::new(),
            model_call_details: ModelCallDetails::default(),
            log_raw_request_response: false,
            policy: RedactionPolicy::default(),
        }
    }

    pub fn with_call_id(mut self, call_id: impl Into<String>) -> Self {
        self.call_id = call_id.into();
        self
    }

    pub fn with_function_id(mut self, function_id: impl Into<String>) -> Self {
        self.function_id = function_id.into();
        self
    }

    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn with_start_time(mut self, start_time: Option<DateTime<Utc>>) -> Self {
        self.start_time = start_time;
        self
    }

    /// Enable capture of the raw request into `metadata["raw_request"]`.
    pub fn with_raw_request_logging(mut self, enabled: bool) -> Self {
        self.log_raw_request_response = enabled;
        self
    }

    pub fn with_policy(mut self, policy: RedactionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Attach caller-supplied call parameters (including their metadata, if any).
    pub fn with_litellm_params(mut self, params: LitellmParams) -> Self {
        self.model_call_details.litellm_params = params;
        self
    }

    pub fn log_raw_request_response(&self) -> bool {
        self.log_raw_request_response
    }

    pub fn policy(&self) -> &RedactionPolicy {
        &self.policy
    }

    /// Current metadata handle, if one has been attached.
    pub fn metadata(&self) -> Option<MetadataHandle> {
        self.model_call_details.litellm_params.metadata.clone()
    }

    /// Resolve the metadata mapping, attaching an empty one if absent.
    pub fn ensure_metadata(&mut self) -> MetadataHandle {
        ensure_metadata(&mut self.model_call_details.litellm_params)
    }

    /// Record request details before the upstream call is made.
    pub fn pre_call(
        &mut self,
        input: Value,
        api_key: Option<&str>,
        model: &str,
        additional_args: &AdditionalArgs,
    ) {
        let metadata = self.ensure_metadata();

        if !model.is_empty() {
            self.model = model.to_string();
        }
        self.model_call_details.input = Some(self.scrub_value(&input));
        self.model_call_details.api_key = api_key.map(mask_secret);
        self.model_call_details.additional_args = Some(additional_args.clone());

        if !self.log_raw_request_response {
            tracing::trace!(call_id = %self.call_id, "Raw request logging disabled");
            return;
        }

        let raw_request = self.policy.scrub_content(&format_raw_request(additional_args));
        set_raw_request(&metadata, raw_request);

        tracing::debug!(
            call_id = %self.call_id,
            model = %self.model,
            suppressed = self.policy.turn_off_message_logging,
            "Captured raw request"
        );
    }

    /// Record the provider's raw response text.
    pub fn post_call(&mut self, original_response: &str) {
        self.model_call_details.original_response =
            Some(self.policy.scrub_content(original_response));
    }

    /// Stamp completion and notify every registered adapter of success.
    pub async fn success(
        &mut self,
        dispatcher: &CallbackDispatcher,
        response: Option<Value>,
    ) -> DispatchReport {
        self.end_time = Some(Utc::now());
        dispatcher
            .dispatch(CallbackEvent::Success, self, response)
            .await
    }

    /// Stamp completion, record the redacted error and notify adapters of failure.
    pub async fn failure(&mut self, dispatcher: &CallbackDispatcher, error: &str) -> DispatchReport {
        self.end_time = Some(Utc::now());
        self.model_call_details.exception = Some(self.policy.redactor().redact(error));
        dispatcher.dispatch(CallbackEvent::Failure, self, None).await
    }

    /// Build the payload handed to adapters for `event`.
    ///
    /// The payload shares this context's metadata handle.
    pub fn payload(&self, event: CallbackEvent, response: Option<Value>) -> CallbackPayload {
        let messages = if self.policy.turn_off_message_logging {
            self.messages
                .iter()
                .map(|m| Message::new(m.role.clone(), RAW_REQUEST_REDACTED_PLACEHOLDER))
                .collect()
        } else {
            self.messages.clone()
        };

        CallbackPayload {
            event,
            model: self.model.clone(),
            messages,
            stream: self.stream,
            call_type: self.call_type,
            call_id: self.call_id.clone(),
            function_id: self.function_id.clone(),
            start_time: self.start_time,
            end_time: self.end_time,
            litellm_params: self.model_call_details.litellm_params.clone(),
            response: response.map(|r| self.scrub_value(&r)),
            exception: self.model_call_details.exception.clone(),
        }
    }

    fn scrub_value(&self, value: &Value) -> Value {
        if self.policy.turn_off_message_logging {
            Value::String(RAW_REQUEST_REDACTED_PLACEHOLDER.to_string())
        } else {
            self.policy.redactor().redact_value(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::RAW_REQUEST_KEY;
    use serde_json::json;

    fn context(log_raw: bool) -> LoggingContext {
        LoggingContext::new("gpt-3.5-turbo", vec![Message::user("test")], CallType::Completion)
            .with_call_id("test-call-id")
            .with_function_id("test-function-id")
            .with_raw_request_logging(log_raw)
    }

    fn additional_args() -> AdditionalArgs {
        serde_json::from_value(json!({
            "api_base": "https://api.openai.com/v1",
            "headers": {"Authorization": "Bearer test"},
            "complete_input_dict": {"model": "gpt-3.5-turbo", "messages": []}
        }))
        .unwrap()
    }

    fn run_pre_call(ctx: &mut LoggingContext) {
        ctx.pre_call(
            json!([{"role": "user", "content": "test"}]),
            Some("test-key"),
            "gpt-3.5-turbo",
            &additional_args(),
        );
    }

    #[test]
    fn pre_call_does_not_store_raw_api_key() {
        let mut ctx = context(true);
        ctx.pre_call(
            json!("hi"),
            Some("sk-1234567890123456789012345678901234567890"),
            "gpt-4",
            &additional_args(),
        );
        assert_eq!(ctx.model, "gpt-4");
        assert_eq!(ctx.model_call_details.api_key.as_deref(), Some("sk-1****7890"));
    }

    #[test]
    fn pre_call_scrubs_secrets_from_raw_request() {
        let mut ctx = context(true);
        let mut args = additional_args();
        args.complete_input_dict = json!({
            "model": "gpt-4",
            "api_key": "sk-1234567890123456789012345678901234567890"
        });
        ctx.pre_call(json!("hi"), None, "gpt-4", &args);

        let raw = ctx.metadata().unwrap().get_str(RAW_REQUEST_KEY).unwrap();
        assert!(!raw.contains("sk-1234567890123456789012345678901234567890"));
        assert!(raw.contains("[REDACTED_API_KEY]"));
    }

    #[test]
    fn pre_call_keeps_attached_handle() {
        let handle = MetadataHandle::new();
        let mut ctx = context(true).with_litellm_params(LitellmParams {
            metadata: Some(handle.clone()),
            ..Default::default()
        });
        run_pre_call(&mut ctx);

        assert!(ctx.metadata().unwrap().ptr_eq(&handle));
        assert!(handle.contains_key(RAW_REQUEST_KEY));
    }

    #[test]
    fn flag_disabled_attaches_empty_metadata_without_raw_request() {
        let mut ctx = context(false);
        assert!(ctx.metadata().is_none());
        run_pre_call(&mut ctx);

        let metadata = ctx.metadata().unwrap();
        assert!(metadata.is_empty());
        assert!(!metadata.contains_key(RAW_REQUEST_KEY));
        assert!(ctx.model_call_details.additional_args.is_some());
    }

    #[test]
    fn flag_disabled_keeps_existing_metadata_untouched() {
        let handle = MetadataHandle::new();
        handle.insert("team", json!("search"));
        let mut ctx = context(false).with_litellm_params(LitellmParams {
            metadata: Some(handle.clone()),
            ..Default::default()
        });
        run_pre_call(&mut ctx);

        assert!(ctx.metadata().unwrap().ptr_eq(&handle));
        assert_eq!(handle.len(), 1);
        assert_eq!(handle.get("team"), Some(json!("search")));
    }

    #[test]
    fn suppression_replaces_payload_messages_and_response() {
        let mut ctx = context(true).with_policy(RedactionPolicy::suppress_messages());
        run_pre_call(&mut ctx);

        let payload = ctx.payload(CallbackEvent::Success, Some(json!({"content": "secret text"})));
        assert_eq!(payload.messages[0].role, "user");
        assert_eq!(payload.messages[0].content, json!(RAW_REQUEST_REDACTED_PLACEHOLDER));
        assert_eq!(payload.response, Some(json!(RAW_REQUEST_REDACTED_PLACEHOLDER)));
    }

    #[test]
    fn payload_shares_metadata_handle() {
        let mut ctx = context(true);
        run_pre_call(&mut ctx);

        let payload = ctx.payload(CallbackEvent::PreCall, None);
        let shared = payload.metadata().unwrap();
        assert!(shared.ptr_eq(&ctx.metadata().unwrap()));

        shared.insert("written_by_adapter", json!(true));
        assert_eq!(ctx.metadata().unwrap().get("written_by_adapter"), Some(json!(true)));
    }

    #[test]
    fn post_call_scrubs_response() {
        let mut ctx = context(true);
        ctx.post_call("echo Bearer abcdefghijklmnopqrstuvwxyz");
        assert_eq!(
            ctx.model_call_details.original_response.as_deref(),
            Some("echo Bearer [REDACTED_API_KEY]")
        );
    }
}
