use crate::constants::backend::{API_KEY_ENV, URL_ENV};
use crate::errors::ToolError;
use crate::services::access::AccessMode;
use crate::services::config::{BackendSettings, ServerConfig};
use crate::services::context::Instrumentation;
use clap::Parser;

/// MCP server exposing reservation create/get/update/delete tools over stdio.
#[derive(Debug, Parser)]
#[command(name = "reservation-mcp", version, about)]
pub struct Cli {
    /// Base URL of the REST backend, e.g. https://<project>.supabase.co
    #[arg(long, env = URL_ENV)]
    pub backend_url: Option<String>,

    /// API key sent as both `apikey` and bearer token
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    pub api_key: Option<String>,

    /// `open` for trusted/local use, `identity` to require forwarded user claims
    #[arg(long, env = "RESERVATIONS_ACCESS_MODE", default_value = "open")]
    pub access_mode: AccessMode,

    /// Open a tracing span per tool call
    #[arg(long, env = "RESERVATIONS_TRACE")]
    pub trace: bool,

    /// Per-request timeout; unset keeps the HTTP client default
    #[arg(long, env = "RESERVATIONS_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,
}

impl Cli {
    pub fn into_config(self) -> Result<ServerConfig, ToolError> {
        let backend =
            BackendSettings::new(self.backend_url.as_deref(), self.api_key.as_deref())?;
        let instrumentation = if self.trace {
            Instrumentation::Traced
        } else {
            Instrumentation::Plain
        };
        Ok(ServerConfig::new(backend)
            .with_access_mode(self.access_mode)
            .with_instrumentation(instrumentation)
            .with_timeout_ms(self.timeout_ms))
    }
}
