use crate::errors::ToolError;
use crate::mcp::envelope::ToolResponse;
use crate::models::{GuestLabel, ReservationTool};
use crate::services::backend::BackendClient;
use crate::services::logger::Logger;
use crate::services::normalizer::BackendResult;
use crate::services::tool_executor::ToolHandler;
use crate::services::translator::RequestTranslator;
use crate::services::validation::Validation;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

const NOT_FOUND_HINT: &str =
    "Name and mobile must match the reservation exactly. Use getReservation to check.";

fn people(count: i64) -> String {
    if count == 1 {
        "1 person".to_string()
    } else {
        format!("{} people", count)
    }
}

fn field_str<'a>(record: &'a Value, key: &str) -> Option<&'a str> {
    record
        .get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
}

/// " on <date> at <time>", with either part dropped when unknown.
fn slot(date: Option<&str>, time: Option<&str>) -> String {
    let mut out = String::new();
    if let Some(date) = date {
        out.push_str(&format!(" on {}", date));
    }
    if let Some(time) = time {
        out.push_str(&format!(" at {}", time));
    }
    out
}

/// Guest as stored in the returned row, falling back to what the caller sent.
fn record_guest(record: &Value, fallback: &GuestLabel) -> GuestLabel {
    GuestLabel {
        name: field_str(record, "name").unwrap_or(&fallback.name).to_string(),
        mobile: field_str(record, "mobile").unwrap_or(&fallback.mobile).to_string(),
    }
}

fn single_or_all(mut rows: Vec<Value>) -> Value {
    if rows.len() == 1 {
        rows.remove(0)
    } else {
        Value::Array(rows)
    }
}

pub struct ReservationManager {
    logger: Logger,
    validation: Validation,
    translator: RequestTranslator,
    backend: BackendClient,
}

impl ReservationManager {
    pub fn new(
        logger: Logger,
        validation: Validation,
        translator: RequestTranslator,
        backend: BackendClient,
    ) -> Self {
        Self {
            logger: logger.child("reservation"),
            validation,
            translator,
            backend,
        }
    }

    pub async fn handle_tool(&self, tool: ReservationTool, args: Value) -> ToolResponse {
        let guest = GuestLabel::from_args(&args);
        let response = match tool {
            ReservationTool::Create => self.create(&args, &guest).await,
            ReservationTool::Get => self.lookup(&args, &guest).await,
            ReservationTool::Update => self.update(&args, &guest).await,
            ReservationTool::Delete => self.delete(&args, &guest).await,
        };
        let meta = serde_json::json!({
            "tool": tool.name(),
            "success": response.success,
            "code": response.error_code(),
        });
        if response.success {
            self.logger.info("reservation tool completed", Some(&meta));
        } else {
            self.logger.warn("reservation tool failed", Some(&meta));
        }
        response
    }

    fn failed(&self, tool: ReservationTool, guest: &GuestLabel, err: ToolError) -> ToolResponse {
        let message = format!(
            "Failed to {} the reservation for {}: {}",
            tool.verb(),
            guest,
            err.message
        );
        ToolResponse::failure(message, err)
    }

    /// Non-success round trips, split into transport failures and backend
    /// rejections.
    fn unsuccessful(
        &self,
        tool: ReservationTool,
        guest: &GuestLabel,
        result: &BackendResult,
    ) -> Option<ToolResponse> {
        if result.success {
            return None;
        }
        let message = result
            .error
            .clone()
            .unwrap_or_else(|| "unknown backend error".to_string());
        let err = if result.is_transport_failure() {
            ToolError::transport(message)
        } else {
            ToolError::backend_rejected(message).with_details(serde_json::json!({
                "status": result.status,
                "body": result.data,
                "duration_ms": result.duration_ms,
            }))
        };
        Some(self.failed(tool, guest, err))
    }

    fn not_found(&self, message: String, filters: Value) -> ToolResponse {
        let err = ToolError::empty_result(message.clone())
            .with_hint(NOT_FOUND_HINT)
            .with_details(serde_json::json!({ "filters": filters }));
        ToolResponse::failure(message, err)
    }

    async fn create(&self, args: &Value, guest: &GuestLabel) -> ToolResponse {
        let tool = ReservationTool::Create;
        let input = match self.validation.create(args) {
            Ok(input) => input,
            Err(err) => return self.failed(tool, guest, err),
        };
        let result = self.backend.execute(&self.translator.create(&input)).await;
        if let Some(response) = self.unsuccessful(tool, guest, &result) {
            return response;
        }
        let Some(record) = result.rows().into_iter().next() else {
            return self.failed(
                tool,
                guest,
                ToolError::empty_result("no data returned by the backend"),
            );
        };
        let stored = record_guest(&record, guest);
        let party = record
            .get("nb_people")
            .and_then(|v| v.as_i64())
            .unwrap_or(input.nb_people);
        let message = format!(
            "Created reservation for {}{} for {}.",
            stored,
            slot(
                Some(field_str(&record, "date").unwrap_or(&input.date)),
                Some(field_str(&record, "time").unwrap_or(&input.time)),
            ),
            people(party)
        );
        ToolResponse::success(message, record)
    }

    async fn update(&self, args: &Value, guest: &GuestLabel) -> ToolResponse {
        let tool = ReservationTool::Update;
        let input = match self.validation.update(args) {
            Ok(input) => input,
            Err(err) => return self.failed(tool, guest, err),
        };
        let result = self.backend.execute(&self.translator.update(&input)).await;
        if let Some(response) = self.unsuccessful(tool, guest, &result) {
            return response;
        }
        let rows = result.rows();
        if rows.is_empty() {
            return self.not_found(
                format!("No reservation for {} was found to update.", guest),
                serde_json::json!({"mobile": input.mobile, "name": input.name}),
            );
        }

        let changed = input.changes.count();
        let mut message = format!(
            "Updated reservation for {}: {} field{} changed.",
            guest,
            changed,
            if changed == 1 { "" } else { "s" }
        );
        if input.changes.new_name.is_some() || input.changes.new_mobile.is_some() {
            message.push_str(&format!(" Now listed under {}.", record_guest(&rows[0], guest)));
        }
        if rows.len() > 1 {
            message.push_str(&format!(" {} reservations matched.", rows.len()));
        }
        ToolResponse::success(message, single_or_all(rows))
    }

    async fn delete(&self, args: &Value, guest: &GuestLabel) -> ToolResponse {
        let tool = ReservationTool::Delete;
        let input = match self.validation.delete(args) {
            Ok(input) => input,
            Err(err) => return self.failed(tool, guest, err),
        };
        let result = self.backend.execute(&self.translator.delete(&input)).await;
        if let Some(response) = self.unsuccessful(tool, guest, &result) {
            return response;
        }
        let rows = result.rows();
        let Some(first) = rows.first() else {
            return self.not_found(
                format!("No reservation for {} was found to delete.", guest),
                serde_json::json!({"mobile": input.mobile, "name": input.name}),
            );
        };
        let message = if rows.len() == 1 {
            format!(
                "Deleted reservation for {}{}.",
                guest,
                slot(field_str(first, "date"), field_str(first, "time"))
            )
        } else {
            format!("Deleted {} reservations for {}.", rows.len(), guest)
        };
        ToolResponse::success(message, single_or_all(rows))
    }

    async fn lookup(&self, args: &Value, guest: &GuestLabel) -> ToolResponse {
        let tool = ReservationTool::Get;
        let input = match self.validation.lookup(args) {
            Ok(input) => input,
            Err(err) => return self.failed(tool, guest, err),
        };
        let result = self.backend.execute(&self.translator.lookup(&input)).await;
        if let Some(response) = self.unsuccessful(tool, guest, &result) {
            return response;
        }
        let qualifiers = slot(input.date.as_deref(), input.time.as_deref());
        let rows = result.rows();
        match rows.len() {
            0 => self.not_found(
                format!("No reservation for {}{} was found.", guest, qualifiers),
                serde_json::json!({
                    "mobile": input.mobile,
                    "name": input.name,
                    "date": input.date,
                    "time": input.time,
                }),
            ),
            1 => {
                let record = &rows[0];
                let party = record
                    .get("nb_people")
                    .and_then(|v| v.as_i64())
                    .map(|n| format!(" for {}", people(n)))
                    .unwrap_or_default();
                let message = format!(
                    "Found reservation for {}{}{}.",
                    record_guest(record, guest),
                    slot(field_str(record, "date"), field_str(record, "time")),
                    party
                );
                ToolResponse::success(message, single_or_all(rows))
            }
            count => ToolResponse::success(
                format!("Found {} reservations for {}{}.", count, guest, qualifiers),
                Value::Array(rows),
            ),
        }
    }
}

/// One registered tool name bound to the shared manager.
pub struct ReservationToolHandler {
    manager: Arc<ReservationManager>,
    tool: ReservationTool,
}

impl ReservationToolHandler {
    pub fn new(manager: Arc<ReservationManager>, tool: ReservationTool) -> Self {
        Self { manager, tool }
    }
}

#[async_trait]
impl ToolHandler for ReservationToolHandler {
    async fn handle(&self, args: Value) -> ToolResponse {
        self.manager.handle_tool(self.tool, args).await
    }
}
