use crate::constants::limits::{MIN_PARTY_SIZE, NOTES_MAX_CHARS};
use crate::errors::ToolError;
use crate::mcp::catalog::unknown_field_violations;
use crate::models::{
    CreateReservation, DeleteReservation, LookupReservation, ReservationChanges,
    ReservationTool, UpdateReservation,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));

static EMPTY_ARGS: Lazy<Map<String, Value>> = Lazy::new(Map::new);

/// Walks one argument object and records every violated rule instead of
/// stopping at the first.
struct Checker<'a> {
    args: &'a Map<String, Value>,
    violations: Vec<String>,
}

impl<'a> Checker<'a> {
    fn new(tool: ReservationTool, raw: &'a Value) -> Self {
        let mut violations = Vec::new();
        let args = match raw {
            Value::Object(map) => map,
            Value::Null => &*EMPTY_ARGS,
            _ => {
                violations.push("arguments must be an object".to_string());
                &*EMPTY_ARGS
            }
        };
        violations.extend(unknown_field_violations(tool.name(), raw));
        Self { args, violations }
    }

    /// Present means the key exists with a non-null value.
    fn present(&self, field: &str) -> Option<&'a Value> {
        self.args.get(field).filter(|v| !v.is_null())
    }

    fn ensure_string(&mut self, field: &str) -> Option<String> {
        match self.present(field) {
            None => {
                self.violations
                    .push(format!("{} is required", field));
                None
            }
            Some(value) => self.non_empty(field, value),
        }
    }

    fn ensure_optional_string(&mut self, field: &str) -> Option<String> {
        let value = self.present(field)?;
        self.non_empty(field, value)
    }

    fn non_empty(&mut self, field: &str, value: &Value) -> Option<String> {
        match value.as_str().map(str::trim) {
            Some(text) if !text.is_empty() => Some(text.to_string()),
            Some(_) => {
                self.violations
                    .push(format!("{} must be a non-empty string", field));
                None
            }
            None => {
                self.violations.push(format!("{} must be a string", field));
                None
            }
        }
    }

    fn ensure_optional_email(&mut self, field: &str) -> Option<String> {
        let email = self.ensure_optional_string(field)?;
        if EMAIL_RE.is_match(&email) {
            Some(email)
        } else {
            self.violations
                .push(format!("{} must be a valid email address", field));
            None
        }
    }

    /// Free text; may be empty but is capped in characters.
    fn ensure_optional_notes(&mut self, field: &str) -> Option<String> {
        let value = self.present(field)?;
        let Some(text) = value.as_str() else {
            self.violations.push(format!("{} must be a string", field));
            return None;
        };
        let chars = text.chars().count();
        if chars > NOTES_MAX_CHARS {
            self.violations.push(format!(
                "{} must be at most {} characters (got {})",
                field, NOTES_MAX_CHARS, chars
            ));
            return None;
        }
        Some(text.to_string())
    }

    fn ensure_party_size(&mut self, field: &str, required: bool) -> Option<i64> {
        let Some(value) = self.present(field) else {
            if required {
                self.violations.push(format!("{} is required", field));
            }
            return None;
        };
        let number = match coerce_integer(value) {
            Ok(number) => number,
            Err(NotAnInteger::OutOfRange) => {
                self.violations
                    .push(format!("{} is out of range (got {})", field, value));
                return None;
            }
            Err(NotAnInteger::NotWhole) => {
                self.violations.push(format!(
                    "{} must be a whole number (got {})",
                    field, value
                ));
                return None;
            }
        };
        if number < MIN_PARTY_SIZE {
            self.violations.push(format!(
                "{} must be at least {} (got {})",
                field, MIN_PARTY_SIZE, number
            ));
            return None;
        }
        Some(number)
    }

    fn finish<T>(self, value: impl FnOnce() -> Option<T>) -> Result<T, ToolError> {
        if !self.violations.is_empty() {
            return Err(ToolError::validation(self.violations));
        }
        value().ok_or_else(|| ToolError::internal("validated input is incomplete"))
    }
}

#[derive(Debug, PartialEq, Eq)]
enum NotAnInteger {
    NotWhole,
    OutOfRange,
}

/// Accepts JSON integers, integral floats and numeric strings.
fn coerce_integer(value: &Value) -> Result<i64, NotAnInteger> {
    let from_float = |f: f64| {
        if !f.is_finite() || f.fract() != 0.0 {
            Err(NotAnInteger::NotWhole)
        } else if f.abs() > i64::MAX as f64 {
            Err(NotAnInteger::OutOfRange)
        } else {
            Ok(f as i64)
        }
    };
    match value {
        Value::Number(number) => {
            if let Some(n) = number.as_i64() {
                Ok(n)
            } else if number.is_u64() {
                Err(NotAnInteger::OutOfRange)
            } else {
                number
                    .as_f64()
                    .ok_or(NotAnInteger::NotWhole)
                    .and_then(from_float)
            }
        }
        Value::String(text) => {
            let trimmed = text.trim();
            match trimmed.parse::<i64>() {
                Ok(n) => Ok(n),
                Err(_) => trimmed
                    .parse::<f64>()
                    .map_err(|_| NotAnInteger::NotWhole)
                    .and_then(from_float),
            }
        }
        _ => Err(NotAnInteger::NotWhole),
    }
}

/// Turns raw tool arguments into typed reservation inputs.
#[derive(Clone, Default)]
pub struct Validation;

impl Validation {
    pub fn new() -> Self {
        Self
    }

    pub fn create(&self, args: &Value) -> Result<CreateReservation, ToolError> {
        let mut check = Checker::new(ReservationTool::Create, args);
        let mobile = check.ensure_string("mobile");
        let name = check.ensure_string("name");
        let nb_people = check.ensure_party_size("nb_people", true);
        let date = check.ensure_string("date");
        let time = check.ensure_string("time");
        let email = check.ensure_optional_email("email");
        let notes = check.ensure_optional_notes("notes");
        check.finish(|| {
            Some(CreateReservation {
                mobile: mobile?,
                name: name?,
                nb_people: nb_people?,
                date: date?,
                time: time?,
                email,
                notes,
            })
        })
    }

    pub fn update(&self, args: &Value) -> Result<UpdateReservation, ToolError> {
        let mut check = Checker::new(ReservationTool::Update, args);
        let mobile = check.ensure_string("mobile");
        let name = check.ensure_string("name");
        let changes = ReservationChanges {
            new_mobile: check.ensure_optional_string("new_mobile"),
            new_name: check.ensure_optional_string("new_name"),
            nb_people: check.ensure_party_size("nb_people", false),
            email: check.ensure_optional_email("email"),
            date: check.ensure_optional_string("date"),
            time: check.ensure_optional_string("time"),
            notes: check.ensure_optional_notes("notes"),
        };
        let supplied = ReservationChanges::FIELDS
            .iter()
            .any(|field| check.present(field).is_some());
        if !supplied {
            check.violations.push(format!(
                "no-op update: provide at least one of {}",
                ReservationChanges::FIELDS.join(", ")
            ));
        }
        check.finish(|| {
            Some(UpdateReservation {
                mobile: mobile?,
                name: name?,
                changes,
            })
        })
    }

    pub fn delete(&self, args: &Value) -> Result<DeleteReservation, ToolError> {
        let mut check = Checker::new(ReservationTool::Delete, args);
        let mobile = check.ensure_string("mobile");
        let name = check.ensure_string("name");
        check.finish(|| {
            Some(DeleteReservation {
                mobile: mobile?,
                name: name?,
            })
        })
    }

    pub fn lookup(&self, args: &Value) -> Result<LookupReservation, ToolError> {
        let mut check = Checker::new(ReservationTool::Get, args);
        let mobile = check.ensure_string("mobile");
        let name = check.ensure_string("name");
        let date = check.ensure_optional_string("date");
        let time = check.ensure_optional_string("time");
        check.finish(|| {
            Some(LookupReservation {
                mobile: mobile?,
                name: name?,
                date,
                time,
            })
        })
    }
}
