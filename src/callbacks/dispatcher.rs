//! Fan-out of lifecycle events to registered adapters.

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use serde::Serialize;
use serde_json::Value;
use tracing::Instrument;

use crate::config::RuntimeConfig;
use crate::logging::LoggingContext;
use crate::observability::{metrics, tracing::callback_span};
use crate::redaction::Redactor;
use crate::resilience::timeouts::with_deadline;

use super::adapter::{CallbackAdapter, CallbackError};
use super::payload::{CallbackEvent, CallbackPayload};

/// Why an adapter invocation did not succeed. Messages are always redacted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum AdapterFailure {
    Error(String),
    Timeout { timeout_ms: u64 },
    Panicked(String),
}

impl AdapterFailure {
    fn label(&self) -> &'static str {
        match self {
            AdapterFailure::Error(_) => "error",
            AdapterFailure::Timeout { .. } => "timeout",
            AdapterFailure::Panicked(_) => "panicked",
        }
    }
}

impl fmt::Display for AdapterFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdapterFailure::Error(msg) => write!(f, "adapter error: {}", msg),
            AdapterFailure::Timeout { timeout_ms } => {
                write!(f, "adapter timed out after {} ms", timeout_ms)
            }
            AdapterFailure::Panicked(msg) => write!(f, "adapter panicked: {}", msg),
        }
    }
}

/// Result of one adapter for one event.
#[derive(Debug, Clone, Serialize)]
pub struct AdapterOutcome {
    pub adapter: String,
    pub duration_ms: u64,
    pub result: Result<(), AdapterFailure>,
}

impl AdapterOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Ordered outcomes of a single dispatch.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchReport {
    pub event: CallbackEvent,
    pub call_id: String,
    pub outcomes: Vec<AdapterOutcome>,
}

impl DispatchReport {
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(AdapterOutcome::is_ok)
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &AdapterFailure)> {
        self.outcomes.iter().filter_map(|o| match &o.result {
            Ok(()) => None,
            Err(failure) => Some((o.adapter.as_str(), failure)),
        })
    }
}

type AdapterList = Vec<Arc<dyn CallbackAdapter>>;

/// Invokes registered adapters and isolates their failures.
///
/// With a live [`RuntimeConfig`] attached, the deadline and redactor are read from it
/// at the start of every dispatch, so config reloads apply without rebuilding.
pub struct CallbackDispatcher {
    adapters: ArcSwap<AdapterList>,
    timeout: Duration,
    redactor: Arc<Redactor>,
    runtime: Option<Arc<RuntimeConfig>>,
}

impl CallbackDispatcher {
    /// Create a dispatcher with no adapters and the default redaction patterns.
    pub fn new(timeout: Duration) -> Self {
        Self {
            adapters: ArcSwap::from_pointee(Vec::new()),
            timeout,
            redactor: Arc::new(Redactor::global().clone()),
            runtime: None,
        }
    }

    /// Follow a live config instead of the fixed timeout and redactor.
    pub fn with_runtime(mut self, runtime: Arc<RuntimeConfig>) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Deadline applied to the next dispatch.
    pub fn timeout(&self) -> Duration {
        self.settings().0
    }

    fn settings(&self) -> (Duration, Arc<Redactor>) {
        match &self.runtime {
            Some(runtime) => runtime.dispatch_settings(),
            None => (self.timeout, Arc::clone(&self.redactor)),
        }
    }

    /// Append an adapter. Dispatches already running keep their adapter list.
    pub fn register(&self, adapter: Arc<dyn CallbackAdapter>) {
        tracing::info!(adapter = %adapter.name(), "Registering callback adapter");
        self.adapters.rcu(|current| {
            let mut next = AdapterList::clone(current);
            next.push(Arc::clone(&adapter));
            next
        });
        metrics::record_registered_adapters(self.adapters.load().len());
    }

    /// Atomically replace the whole adapter list.
    pub fn replace_all(&self, adapters: AdapterList) {
        tracing::info!(count = adapters.len(), "Replacing callback adapters");
        metrics::record_registered_adapters(adapters.len());
        self.adapters.store(Arc::new(adapters));
    }

    pub fn adapter_names(&self) -> Vec<String> {
        self.adapters
            .load()
            .iter()
            .map(|a| a.name().to_string())
            .collect()
    }

    /// Dispatch `event` for the call tracked by `context`.
    pub async fn dispatch(
        &self,
        event: CallbackEvent,
        context: &LoggingContext,
        response: Option<Value>,
    ) -> DispatchReport {
        let payload = Arc::new(context.payload(event, response));
        self.dispatch_payload(payload).await
    }

    /// Dispatch a prepared payload to every adapter.
    ///
    /// Adapters start in registration order and run concurrently, each under its own
    /// deadline. Outcomes are reported in registration order.
    pub async fn dispatch_payload(&self, payload: Arc<CallbackPayload>) -> DispatchReport {
        let adapters = self.adapters.load_full();
        let (limit, redactor) = self.settings();
        let span = callback_span(payload.event, &payload.call_id, &payload.model);

        let mut running = Vec::with_capacity(adapters.len());
        for adapter in adapters.iter() {
            let adapter = Arc::clone(adapter);
            let name = adapter.name().to_string();
            let task_payload = Arc::clone(&payload);
            let started = Instant::now();
            let handle = tokio::spawn(
                async move { with_deadline(limit, invoke(adapter.as_ref(), &task_payload)).await }
                    .instrument(span.clone()),
            );
            running.push((name, started, handle));
        }

        let mut outcomes = Vec::with_capacity(running.len());
        for (name, started, handle) in running {
            let result = match handle.await {
                Ok(Ok(Ok(()))) => Ok(()),
                Ok(Ok(Err(err))) => Err(AdapterFailure::Error(redactor.redact(&err.to_string()))),
                Ok(Err(_)) => Err(AdapterFailure::Timeout {
                    timeout_ms: limit.as_millis() as u64,
                }),
                Err(join_err) => {
                    let message = if join_err.is_panic() {
                        panic_message(join_err.into_panic())
                    } else {
                        "task cancelled".to_string()
                    };
                    Err(AdapterFailure::Panicked(redactor.redact(&message)))
                }
            };
            let elapsed = started.elapsed();

            let outcome_label = match &result {
                Ok(()) => "ok",
                Err(failure) => failure.label(),
            };
            metrics::record_adapter_outcome(&name, payload.event, outcome_label);
            metrics::record_adapter_latency(&name, elapsed);

            if let Err(failure) = &result {
                span.in_scope(|| match failure {
                    AdapterFailure::Timeout { timeout_ms } => tracing::warn!(
                        adapter = %name,
                        timeout_ms = *timeout_ms,
                        "Callback adapter timed out"
                    ),
                    _ => tracing::error!(
                        adapter = %name,
                        error = %failure,
                        "Callback adapter failed"
                    ),
                });
            }

            outcomes.push(AdapterOutcome {
                adapter: name,
                duration_ms: elapsed.as_millis() as u64,
                result,
            });
        }

        DispatchReport {
            event: payload.event,
            call_id: payload.call_id.clone(),
            outcomes,
        }
    }
}

impl fmt::Debug for CallbackDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackDispatcher")
            .field("adapters", &self.adapter_names())
            .field("timeout", &self.timeout())
            .finish()
    }
}

async fn invoke(
    adapter: &dyn CallbackAdapter,
    payload: &CallbackPayload,
) -> Result<(), CallbackError> {
    match payload.event {
        CallbackEvent::PreCall => adapter.log_pre_call(payload).await,
        CallbackEvent::Success => adapter.log_success_event(payload).await,
        CallbackEvent::Failure => adapter.log_failure_event(payload).await,
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
