//! Span helpers for call lifecycle events.
//!
//! # Responsibilities
//! - Name spans consistently across the dispatcher and adapters
//! - Carry call id, model and event on every span

use tracing::Span;

use crate::callbacks::CallbackEvent;

/// Span name for one dispatch of one lifecycle event.
pub const SPAN_CALLBACK_DISPATCH: &str = "callback.dispatch";

/// Span name for work done inside an adapter.
pub const SPAN_ADAPTER_LOG: &str = "callback.adapter";

/// Span wrapping a dispatch; adapter tasks are instrumented with it.
pub fn callback_span(event: CallbackEvent, call_id: &str, model: &str) -> Span {
    tracing::info_span!(
        SPAN_CALLBACK_DISPATCH,
        event = event.as_str(),
        call_id = %call_id,
        model = %model,
    )
}

/// Span for an adapter's own backend calls.
pub fn adapter_span(adapter: &str, call_id: &str) -> Span {
    tracing::debug_span!(SPAN_ADAPTER_LOG, adapter = %adapter, call_id = %call_id)
}
