pub mod backend {
    pub const REST_PREFIX: &str = "rest/v1";
    pub const RESERVATIONS_RESOURCE: &str = "reservations";
    pub const PREFER_REPRESENTATION: &str = "return=representation";
    pub const API_KEY_HEADER: &str = "apikey";
    pub const JSON_CONTENT_TYPE: &str = "application/json";
    pub const URL_ENV: &str = "SUPABASE_URL";
    pub const API_KEY_ENV: &str = "SUPABASE_ANON_KEY";
}

pub mod limits {
    pub const NOTES_MAX_CHARS: usize = 2000;
    pub const MIN_PARTY_SIZE: i64 = 1;
    pub const SUGGESTION_LIMIT: usize = 3;
    pub const LOG_VALUE_MAX_BYTES: usize = 2048;
}

pub mod protocol {
    pub const PROTOCOL_VERSION: &str = "2025-06-18";
    pub const SERVER_NAME: &str = "reservation-mcp";
    pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");
}

pub mod fallback {
    pub const UNKNOWN_GUEST: &str = "unknown guest";
    pub const UNKNOWN_MOBILE: &str = "unknown mobile";
}
