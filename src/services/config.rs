use crate::constants::backend::{API_KEY_ENV, REST_PREFIX, RESERVATIONS_RESOURCE, URL_ENV};
use crate::errors::ToolError;
use crate::services::access::AccessMode;
use crate::services::context::Instrumentation;
use std::time::Duration;
use url::Url;

/// Where the reservations live and how to authenticate against them.
#[derive(Clone)]
pub struct BackendSettings {
    base_url: Url,
    api_key: String,
}

impl std::fmt::Debug for BackendSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendSettings")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl BackendSettings {
    pub fn new(base_url: Option<&str>, api_key: Option<&str>) -> Result<Self, ToolError> {
        let base = base_url.map(str::trim).filter(|s| !s.is_empty());
        let key = api_key.map(str::trim).filter(|s| !s.is_empty());

        let mut missing = Vec::new();
        if base.is_none() {
            missing.push(URL_ENV);
        }
        if key.is_none() {
            missing.push(API_KEY_ENV);
        }
        let (Some(base), Some(key)) = (base, key) else {
            return Err(ToolError::configuration(format!(
                "Backend connection is not configured: missing {}",
                missing.join(", ")
            ))
            .with_hint(format!(
                "Set {} and {} (or pass --backend-url / --api-key).",
                URL_ENV, API_KEY_ENV
            )));
        };

        let base_url = Url::parse(base).map_err(|err| {
            ToolError::configuration(format!("Invalid backend URL '{}': {}", base, err))
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ToolError::configuration(
                "Backend URL must use http or https",
            ));
        }
        Ok(Self {
            base_url,
            api_key: key.to_string(),
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// `{base}/rest/v1/reservations`, tolerant of a trailing slash on base.
    pub fn reservations_url(&self) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            REST_PREFIX,
            RESERVATIONS_RESOURCE
        )
    }
}

/// Everything the server needs at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub backend: BackendSettings,
    pub access_mode: AccessMode,
    pub instrumentation: Instrumentation,
    pub timeout: Option<Duration>,
}

impl ServerConfig {
    pub fn new(backend: BackendSettings) -> Self {
        Self {
            backend,
            access_mode: AccessMode::Open,
            instrumentation: Instrumentation::Plain,
            timeout: None,
        }
    }

    pub fn with_access_mode(mut self, mode: AccessMode) -> Self {
        self.access_mode = mode;
        self
    }

    pub fn with_instrumentation(mut self, instrumentation: Instrumentation) -> Self {
        self.instrumentation = instrumentation;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: Option<u64>) -> Self {
        self.timeout = timeout_ms.filter(|ms| *ms > 0).map(Duration::from_millis);
        self
    }
}
