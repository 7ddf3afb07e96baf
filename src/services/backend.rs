use crate::services::logger::Logger;
use crate::services::normalizer::{normalize_failure, normalize_response, BackendResult};
use crate::services::translator::RestRequest;
use crate::services::transport::HttpTransport;
use std::sync::Arc;
use std::time::Instant;

/// Dispatches translated requests and normalizes whatever comes back.
#[derive(Clone)]
pub struct BackendClient {
    logger: Logger,
    transport: Arc<dyn HttpTransport>,
}

impl BackendClient {
    pub fn new(logger: Logger, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            logger: logger.child("backend"),
            transport,
        }
    }

    pub async fn execute(&self, request: &RestRequest) -> BackendResult {
        let started = Instant::now();
        let outcome = self.transport.send(request).await;
        match outcome {
            Ok(raw) => {
                let result = normalize_response(&raw, started.elapsed());
                let meta = serde_json::json!({
                    "method": request.method.as_str(),
                    "path": request.path(),
                    "status": raw.status,
                    "duration_ms": result.duration_ms,
                });
                if result.success {
                    self.logger.debug("backend call completed", Some(&meta));
                } else {
                    self.logger.warn(
                        &format!(
                            "backend rejected request: {}",
                            result.error.as_deref().unwrap_or("unknown error")
                        ),
                        Some(&meta),
                    );
                }
                result
            }
            Err(failure) => {
                self.logger.error(
                    &format!("backend unreachable: {}", failure),
                    Some(&serde_json::json!({
                        "method": request.method.as_str(),
                        "path": request.path(),
                    })),
                );
                normalize_failure(&failure)
            }
        }
    }
}
