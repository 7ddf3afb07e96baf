use crate::constants::fallback::{UNKNOWN_GUEST, UNKNOWN_MOBILE};
use serde::Serialize;
use serde_json::Value;

/// The four operations exposed to clients, under their stable tool names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReservationTool {
    Create,
    Get,
    Update,
    Delete,
}

impl ReservationTool {
    pub const ALL: [ReservationTool; 4] = [
        ReservationTool::Create,
        ReservationTool::Get,
        ReservationTool::Update,
        ReservationTool::Delete,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ReservationTool::Create => "createReservation",
            ReservationTool::Get => "getReservation",
            ReservationTool::Update => "updateReservation",
            ReservationTool::Delete => "deleteReservation",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    /// Verb used in failure messages ("Failed to <verb> the reservation").
    pub fn verb(self) -> &'static str {
        match self {
            ReservationTool::Create => "create",
            ReservationTool::Get => "look up",
            ReservationTool::Update => "update",
            ReservationTool::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateReservation {
    pub mobile: String,
    pub name: String,
    pub nb_people: i64,
    pub date: String,
    pub time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Fields an update may touch. `new_mobile`/`new_name` rekey the record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReservationChanges {
    pub new_mobile: Option<String>,
    pub new_name: Option<String>,
    pub nb_people: Option<i64>,
    pub email: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub notes: Option<String>,
}

impl ReservationChanges {
    pub const FIELDS: [&'static str; 7] = [
        "new_mobile",
        "new_name",
        "nb_people",
        "email",
        "date",
        "time",
        "notes",
    ];

    pub fn count(&self) -> usize {
        [
            self.new_mobile.is_some(),
            self.new_name.is_some(),
            self.nb_people.is_some(),
            self.email.is_some(),
            self.date.is_some(),
            self.time.is_some(),
            self.notes.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Patch body in backend column names. Absent fields are left out.
    pub fn to_patch(&self) -> serde_json::Map<String, Value> {
        let mut body = serde_json::Map::new();
        let mut put = |column: &str, value: Option<Value>| {
            if let Some(value) = value {
                body.insert(column.to_string(), value);
            }
        };
        put("mobile", self.new_mobile.clone().map(Value::String));
        put("name", self.new_name.clone().map(Value::String));
        put("nb_people", self.nb_people.map(Value::from));
        put("email", self.email.clone().map(Value::String));
        put("date", self.date.clone().map(Value::String));
        put("time", self.time.clone().map(Value::String));
        put("notes", self.notes.clone().map(Value::String));
        body
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateReservation {
    pub mobile: String,
    pub name: String,
    pub changes: ReservationChanges,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteReservation {
    pub mobile: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LookupReservation {
    pub mobile: String,
    pub name: String,
    pub date: Option<String>,
    pub time: Option<String>,
}

/// Name and mobile as the caller gave them, for messages. Read straight from
/// raw arguments so failures stay actionable even when validation rejected
/// the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestLabel {
    pub name: String,
    pub mobile: String,
}

impl GuestLabel {
    pub fn from_args(args: &Value) -> Self {
        let read = |key: &str, fallback: &str| {
            args.get(key)
                .and_then(|v| v.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(fallback)
                .to_string()
        };
        Self {
            name: read("name", UNKNOWN_GUEST),
            mobile: read("mobile", UNKNOWN_MOBILE),
        }
    }
}

impl std::fmt::Display for GuestLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.mobile)
    }
}
