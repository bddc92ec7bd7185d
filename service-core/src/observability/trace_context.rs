//! W3C Trace Context propagation for outbound HTTP calls.
//!
//! Upstream calls made while handling a request carry `traceparent` (and
//! `tracestate` when present) for the span they were built in, so they show
//! up under that request in the trace backend.
//!
//! See: https://www.w3.org/TR/trace-context/

use opentelemetry::trace::{SpanContext, TraceContextExt};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::RequestBuilder;
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;

pub const TRACEPARENT_HEADER: &str = "traceparent";
pub const TRACESTATE_HEADER: &str = "tracestate";

/// `00-<trace id>-<span id>-<flags>`, or `None` for an invalid context.
pub fn traceparent(span_context: &SpanContext) -> Option<String> {
    span_context.is_valid().then(|| {
        format!(
            "00-{}-{}-{:02x}",
            span_context.trace_id(),
            span_context.span_id(),
            span_context.trace_flags().to_u8()
        )
    })
}

/// Trace headers for the current span. Empty when no OpenTelemetry layer is
/// installed or the span is disabled.
pub fn trace_headers() -> HeaderMap {
    let context = Span::current().context();
    let span = context.span();
    let span_context = span.span_context();

    let mut headers = HeaderMap::new();
    let Some(parent) = traceparent(span_context) else {
        return headers;
    };

    if let Ok(value) = HeaderValue::from_str(&parent) {
        headers.insert(TRACEPARENT_HEADER, value);
    }

    let state = span_context.trace_state().header();
    if !state.is_empty()
        && let Ok(value) = HeaderValue::from_str(&state)
    {
        headers.insert(TRACESTATE_HEADER, value);
    }

    headers
}

/// Attach the current span's trace headers to an outbound request.
pub trait TracedRequestExt {
    fn with_trace_context(self) -> Self;
}

impl TracedRequestExt for RequestBuilder {
    fn with_trace_context(self) -> Self {
        self.headers(trace_headers())
    }
}
