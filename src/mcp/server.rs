use crate::app::App;
use crate::constants::protocol::{PROTOCOL_VERSION, SERVER_NAME, SERVER_VERSION};
use crate::errors::{ErrorCode, McpError, ToolError};
use crate::mcp::catalog::tool_catalog;
use crate::mcp::protocol::{JsonRpcRequest, JsonRpcResponse};
use crate::services::config::ServerConfig;
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};

pub struct McpServer {
    app: Arc<App>,
}

impl McpServer {
    pub fn new(app: App) -> Self {
        Self { app: Arc::new(app) }
    }

    fn handle_initialize(&self) -> Value {
        serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {"tools": {"listChanged": false}},
            "serverInfo": {"name": SERVER_NAME, "version": SERVER_VERSION},
        })
    }

    fn handle_tools_list(&self) -> Value {
        let tools: Vec<&crate::mcp::catalog::ToolDef> = tool_catalog()
            .iter()
            .filter(|tool| self.app.tool_executor.has_tool(&tool.name))
            .collect();
        serde_json::json!({ "tools": tools })
    }

    async fn handle_tools_call(&self, params: &Value) -> Result<Value, McpError> {
        let name = params
            .get("name")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .unwrap_or("");
        if name.is_empty() {
            return Err(McpError::new(ErrorCode::InvalidParams, "Missing tool name"));
        }

        let identity = self
            .app
            .access_gate
            .authorize(params)
            .map_err(|err| self.rejected(name, &err))?;
        let trace_id = params
            .get("_meta")
            .and_then(|meta| meta.get("trace_id"))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());
        let ctx = self.app.instrumentation.context(trace_id, identity);

        let args = params.get("arguments").cloned().unwrap_or(Value::Null);
        let response = self
            .app
            .tool_executor
            .execute(name, args, ctx.as_ref())
            .await
            .map_err(|err| self.rejected(name, &err))?;
        Ok(response.to_call_result())
    }

    fn rejected(&self, tool: &str, err: &ToolError) -> McpError {
        self.app.logger.warn(
            &format!("tools/call rejected: {}", err.message),
            Some(&serde_json::json!({"tool": tool, "code": err.code})),
        );
        McpError::from(err)
    }

    async fn dispatch(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.method.starts_with("notifications/") || request.is_notification() {
            return None;
        }
        let id = request.id.clone().unwrap_or(Value::Null);
        let outcome = match request.method.as_str() {
            "initialize" => Ok(self.handle_initialize()),
            "ping" => Ok(serde_json::json!({})),
            "tools/list" => Ok(self.handle_tools_list()),
            "tools/call" => self.handle_tools_call(&request.params).await,
            other => Err(McpError::new(
                ErrorCode::MethodNotFound,
                format!("Method not found: {}", other),
            )),
        };
        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(err) => JsonRpcResponse::from_error(id, err),
        })
    }

    /// One newline-delimited message in, at most one serialized response out.
    pub async fn handle_line(&self, line: &str) -> Option<String> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }
        let response = match serde_json::from_str::<Value>(trimmed) {
            Err(_) => Some(JsonRpcResponse::failure(
                Value::Null,
                ErrorCode::ParseError,
                "Parse error",
            )),
            Ok(parsed) => match serde_json::from_value::<JsonRpcRequest>(parsed) {
                Err(_) => Some(JsonRpcResponse::failure(
                    Value::Null,
                    ErrorCode::InvalidRequest,
                    "Invalid request",
                )),
                Ok(request) => self.dispatch(request).await,
            },
        };
        response.map(|r| serde_json::to_string(&r).unwrap_or_default())
    }

    pub async fn run_stdio(&self) -> Result<(), ToolError> {
        let stdin = tokio::io::stdin();
        let stdout = tokio::io::stdout();
        let mut reader = BufReader::new(stdin).lines();
        let mut writer = BufWriter::new(stdout);

        self.app.logger.info("listening on stdio", None);
        while let Some(line) = reader.next_line().await? {
            if let Some(payload) = self.handle_line(&line).await {
                writer.write_all(payload.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }
        self.app.logger.info("stdin closed, shutting down", None);
        Ok(())
    }
}

pub async fn run_stdio(config: ServerConfig) -> Result<(), ToolError> {
    let server = McpServer::new(App::initialize(config)?);
    server.run_stdio().await
}
