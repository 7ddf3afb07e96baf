use crate::constants::limits::LOG_VALUE_MAX_BYTES;
use crate::utils::redact::redact_value;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()))
    }

    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "error" => LogLevel::Error,
            "warn" | "warning" => LogLevel::Warn,
            "debug" | "trace" => LogLevel::Debug,
            _ => LogLevel::Info,
        }
    }

    fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

/// Installs the global subscriber. Output goes to stderr because stdout
/// carries the JSON-RPC stream. `RUST_LOG` wins over `LOG_LEVEL`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(LogLevel::from_env().as_directive()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Scoped logger. Every event carries the dotted context so log lines can be
/// traced back to the component that emitted them.
#[derive(Debug, Clone)]
pub struct Logger {
    context: String,
}

impl Logger {
    pub fn new(context: &str) -> Self {
        Self {
            context: context.to_string(),
        }
    }

    pub fn child(&self, suffix: &str) -> Self {
        let context = if suffix.is_empty() {
            self.context.clone()
        } else {
            format!("{}:{}", self.context, suffix)
        };
        Self { context }
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    fn render_meta(meta: Option<&Value>) -> String {
        meta.filter(|m| !m.is_null())
            .map(|m| redact_value(m, LOG_VALUE_MAX_BYTES).to_string())
            .unwrap_or_default()
    }

    pub fn error(&self, message: &str, meta: Option<&Value>) {
        tracing::error!(context = %self.context, meta = %Self::render_meta(meta), "{}", message);
    }

    pub fn warn(&self, message: &str, meta: Option<&Value>) {
        tracing::warn!(context = %self.context, meta = %Self::render_meta(meta), "{}", message);
    }

    pub fn info(&self, message: &str, meta: Option<&Value>) {
        tracing::info!(context = %self.context, meta = %Self::render_meta(meta), "{}", message);
    }

    pub fn debug(&self, message: &str, meta: Option<&Value>) {
        tracing::debug!(context = %self.context, meta = %Self::render_meta(meta), "{}", message);
    }
}
