use crate::mcp::envelope::ToolResponse;
use crate::services::access::Identity;
use tracing::{field, info_span, Span};

/// Per-call capability handed to the tool executor. Handlers are written once
/// against this; the plain variant makes every hook a no-op.
pub trait InvocationContext: Send + Sync {
    fn trace_id(&self) -> &str;

    fn identity(&self) -> Option<&Identity>;

    fn span(&self, _tool: &str) -> Span {
        Span::none()
    }

    fn record_outcome(&self, _span: &Span, _response: &ToolResponse, _duration_ms: u64) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Instrumentation {
    #[default]
    Plain,
    Traced,
}

impl Instrumentation {
    pub fn context(
        self,
        trace_id: Option<String>,
        identity: Option<Identity>,
    ) -> Box<dyn InvocationContext> {
        let trace_id = trace_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        match self {
            Instrumentation::Plain => Box::new(PlainContext { trace_id, identity }),
            Instrumentation::Traced => Box::new(TracedContext { trace_id, identity }),
        }
    }
}

pub struct PlainContext {
    trace_id: String,
    identity: Option<Identity>,
}

impl InvocationContext for PlainContext {
    fn trace_id(&self) -> &str {
        &self.trace_id
    }

    fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }
}

/// Opens one span per tool call, tagged with the caller when known.
pub struct TracedContext {
    trace_id: String,
    identity: Option<Identity>,
}

impl InvocationContext for TracedContext {
    fn trace_id(&self) -> &str {
        &self.trace_id
    }

    fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    fn span(&self, tool: &str) -> Span {
        info_span!(
            "tool_call",
            tool = %tool,
            trace_id = %self.trace_id,
            user_id = self.identity.as_ref().map(|i| i.id.as_str()).unwrap_or(""),
            is_error = field::Empty,
            error_code = field::Empty,
            duration_ms = field::Empty,
        )
    }

    fn record_outcome(&self, span: &Span, response: &ToolResponse, duration_ms: u64) {
        span.record("is_error", !response.success);
        span.record("duration_ms", duration_ms);
        if let Some(code) = response.error.as_ref().map(|err| err.code.as_str()) {
            span.record("error_code", code);
        }
    }
}
