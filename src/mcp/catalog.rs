use crate::constants::limits::SUGGESTION_LIMIT;
use crate::errors::ToolError;
use crate::utils::suggest::suggest;
use jsonschema::error::ValidationErrorKind;
use jsonschema::JSONSchema;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDef {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

impl ToolDef {
    pub fn property_names(&self) -> Vec<String> {
        self.input_schema
            .get("properties")
            .and_then(|v| v.as_object())
            .map(|props| props.keys().cloned().collect())
            .unwrap_or_default()
    }
}

static TOOL_CATALOG: Lazy<Vec<ToolDef>> = Lazy::new(|| {
    let raw = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/tool_catalog.json"));
    serde_json::from_str(raw).expect("tool_catalog.json must be valid JSON")
});

static TOOL_MAP: Lazy<HashMap<String, ToolDef>> = Lazy::new(|| {
    TOOL_CATALOG
        .iter()
        .cloned()
        .map(|tool| (tool.name.clone(), tool))
        .collect()
});

static TOOL_VALIDATORS: Lazy<HashMap<String, JSONSchema>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for tool in TOOL_CATALOG.iter() {
        if let Ok(schema) = JSONSchema::compile(&tool.input_schema) {
            map.insert(tool.name.clone(), schema);
        }
    }
    map
});

pub fn tool_catalog() -> &'static Vec<ToolDef> {
    &TOOL_CATALOG
}

pub fn tool_by_name(name: &str) -> Option<&'static ToolDef> {
    TOOL_MAP.get(name)
}

/// Every catalog schema must compile; a broken schema would silently skip
/// unknown-field detection for that tool.
pub fn check_catalog() -> Result<(), ToolError> {
    let broken: Vec<&str> = TOOL_CATALOG
        .iter()
        .filter(|tool| !TOOL_VALIDATORS.contains_key(&tool.name))
        .map(|tool| tool.name.as_str())
        .collect();
    if broken.is_empty() {
        return Ok(());
    }
    Err(ToolError::configuration("Tool catalog contains invalid schemas")
        .with_details(serde_json::json!({ "tools": broken })))
}

/// Unknown argument names for `tool_name`, one message per field, with a
/// did-you-mean hint when a declared property is close enough. Type and
/// bound checks are left to the field rules, which coerce some inputs the
/// schema would reject (numeric strings for `nb_people`).
pub fn unknown_field_violations(tool_name: &str, args: &Value) -> Vec<String> {
    let (Some(tool), Some(schema)) = (tool_by_name(tool_name), TOOL_VALIDATORS.get(tool_name))
    else {
        return Vec::new();
    };
    if !args.is_object() {
        return Vec::new();
    }
    let Err(errors) = schema.validate(args) else {
        return Vec::new();
    };
    let known = tool.property_names();
    let mut out = Vec::new();
    for err in errors {
        let ValidationErrorKind::AdditionalProperties { unexpected } = &err.kind else {
            continue;
        };
        for field in unexpected {
            let suggestions = suggest(field, &known, SUGGESTION_LIMIT);
            match suggestions.first() {
                Some(best) => out.push(format!(
                    "unknown field '{}' (did you mean '{}'?)",
                    field, best
                )),
                None => out.push(format!(
                    "unknown field '{}' (expected one of: {})",
                    field,
                    known.join(", ")
                )),
            }
        }
    }
    out
}
