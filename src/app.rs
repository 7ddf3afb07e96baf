use crate::errors::ToolError;
use crate::managers::reservation::{ReservationManager, ReservationToolHandler};
use crate::mcp::catalog::{check_catalog, tool_catalog};
use crate::models::ReservationTool;
use crate::services::access::AccessGate;
use crate::services::backend::BackendClient;
use crate::services::config::ServerConfig;
use crate::services::context::Instrumentation;
use crate::services::logger::Logger;
use crate::services::tool_executor::{ToolExecutor, ToolHandler};
use crate::services::translator::RequestTranslator;
use crate::services::transport::{HttpTransport, ReqwestTransport};
use crate::services::validation::Validation;
use std::collections::HashMap;
use std::sync::Arc;

pub struct App {
    pub logger: Logger,
    pub tool_executor: Arc<ToolExecutor>,
    pub access_gate: AccessGate,
    pub instrumentation: Instrumentation,
}

impl App {
    fn validate_tool_wiring(
        handlers: &HashMap<String, Arc<dyn ToolHandler>>,
    ) -> Result<(), ToolError> {
        check_catalog()?;
        let mut missing: Vec<String> = tool_catalog()
            .iter()
            .filter(|tool| !handlers.contains_key(&tool.name))
            .map(|tool| tool.name.clone())
            .collect();
        let mut undeclared: Vec<String> = handlers
            .keys()
            .filter(|name| !tool_catalog().iter().any(|tool| &tool.name == *name))
            .cloned()
            .collect();
        if missing.is_empty() && undeclared.is_empty() {
            return Ok(());
        }
        missing.sort();
        undeclared.sort();
        Err(ToolError::internal("Tool wiring is incomplete")
            .with_hint("Every tool in tool_catalog.json needs a handler, and every handler a catalog entry.")
            .with_details(serde_json::json!({
                "missing_handlers": missing,
                "undeclared_handlers": undeclared,
            })))
    }

    pub fn initialize(config: ServerConfig) -> Result<Self, ToolError> {
        let transport = ReqwestTransport::new(config.timeout)
            .map_err(|err| ToolError::configuration(err.to_string()))?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Same wiring as `initialize`, over a caller-supplied transport.
    pub fn with_transport(
        config: ServerConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, ToolError> {
        let logger = Logger::new("reservation-mcp");
        let settings = Arc::new(config.backend);

        let manager = Arc::new(ReservationManager::new(
            logger.clone(),
            Validation::new(),
            RequestTranslator::new(settings),
            BackendClient::new(logger.clone(), transport),
        ));

        let mut handlers: HashMap<String, Arc<dyn ToolHandler>> = HashMap::new();
        for tool in ReservationTool::ALL {
            handlers.insert(
                tool.name().to_string(),
                Arc::new(ReservationToolHandler::new(manager.clone(), tool)),
            );
        }
        Self::validate_tool_wiring(&handlers)?;

        logger.info(
            "server initialized",
            Some(&serde_json::json!({
                "tools": handlers.len(),
                "access_mode": format!("{:?}", config.access_mode).to_lowercase(),
                "instrumentation": format!("{:?}", config.instrumentation).to_lowercase(),
            })),
        );

        Ok(Self {
            tool_executor: Arc::new(ToolExecutor::new(logger.clone(), handlers)),
            access_gate: AccessGate::new(config.access_mode),
            instrumentation: config.instrumentation,
            logger,
        })
    }
}
