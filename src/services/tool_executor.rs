use crate::constants::limits::SUGGESTION_LIMIT;
use crate::errors::ToolError;
use crate::mcp::envelope::ToolResponse;
use crate::services::context::InvocationContext;
use crate::services::logger::Logger;
use crate::utils::suggest::suggest;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

/// A registered tool. Failures are part of the response, not an `Err`.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn handle(&self, args: Value) -> ToolResponse;
}

#[derive(Clone)]
pub struct ToolExecutor {
    logger: Logger,
    handlers: Arc<HashMap<String, Arc<dyn ToolHandler>>>,
}

impl ToolExecutor {
    pub fn new(logger: Logger, handlers: HashMap<String, Arc<dyn ToolHandler>>) -> Self {
        Self {
            logger: logger.child("executor"),
            handlers: Arc::new(handlers),
        }
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }

    fn unknown_tool(&self, name: &str) -> ToolError {
        let known = self.tool_names();
        let suggestions = suggest(name, &known, SUGGESTION_LIMIT);
        let mut hint = format!("Available tools: {}.", known.join(", "));
        if !suggestions.is_empty() {
            hint = format!("Did you mean: {}? {}", suggestions.join(", "), hint);
        }
        ToolError::invalid_params(format!("Unknown tool: {}", name))
            .with_hint(hint)
            .with_details(serde_json::json!({
                "known_tools": known,
                "did_you_mean": suggestions,
            }))
    }

    /// Runs one tool call inside the context's span. Only an unknown tool
    /// name is an `Err`.
    pub async fn execute(
        &self,
        name: &str,
        args: Value,
        ctx: &dyn InvocationContext,
    ) -> Result<ToolResponse, ToolError> {
        let handler = self
            .handlers
            .get(name)
            .cloned()
            .ok_or_else(|| self.unknown_tool(name))?;

        let span = ctx.span(name);
        let started_at = chrono::Utc::now();
        let started = Instant::now();
        let response = handler.handle(args).instrument(span.clone()).await;
        let duration_ms = started.elapsed().as_millis() as u64;
        ctx.record_outcome(&span, &response, duration_ms);

        self.logger.debug(
            "tool call finished",
            Some(&serde_json::json!({
                "tool": name,
                "trace_id": ctx.trace_id(),
                "user_id": ctx.identity().map(|i| i.id.clone()),
                "started_at": started_at.to_rfc3339(),
                "duration_ms": duration_ms,
                "is_error": !response.success,
            })),
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::context::Instrumentation;

    struct Echo;

    #[async_trait]
    impl ToolHandler for Echo {
        async fn handle(&self, args: Value) -> ToolResponse {
            ToolResponse::success("echo", args)
        }
    }

    fn executor() -> ToolExecutor {
        let mut handlers: HashMap<String, Arc<dyn ToolHandler>> = HashMap::new();
        handlers.insert("getReservation".to_string(), Arc::new(Echo));
        ToolExecutor::new(Logger::new("test"), handlers)
    }

    #[tokio::test]
    async fn dispatches_to_registered_handler() {
        let ctx = Instrumentation::Traced.context(None, None);
        let response = executor()
            .execute("getReservation", serde_json::json!({"a": 1}), ctx.as_ref())
            .await
            .unwrap();
        assert!(response.success);
        assert_eq!(response.data, Some(serde_json::json!({"a": 1})));
    }

    #[tokio::test]
    async fn unknown_tool_suggests_close_names() {
        let ctx = Instrumentation::Plain.context(None, None);
        let err = executor()
            .execute("get_reservation", Value::Null, ctx.as_ref())
            .await
            .unwrap_err();
        assert_eq!(err.code, "INVALID_PARAMS");
        assert!(err.hint.unwrap().contains("Did you mean: getReservation?"));
    }
}
