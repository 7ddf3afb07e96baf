#![allow(dead_code)]

use async_trait::async_trait;
use once_cell::sync::Lazy;
use reservation_mcp::app::App;
use reservation_mcp::services::access::AccessMode;
use reservation_mcp::services::config::{BackendSettings, ServerConfig};
use reservation_mcp::services::context::Instrumentation;
use reservation_mcp::services::translator::RestRequest;
use reservation_mcp::services::transport::{HttpTransport, RawResponse, TransportFailure};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Mutex as AsyncMutex;

pub static ENV_LOCK: Lazy<AsyncMutex<()>> = Lazy::new(|| AsyncMutex::new(()));

pub const BASE_URL: &str = "https://db.example.com";
pub const API_KEY: &str = "anon-test-key";

/// Replays queued responses in order and records every request it sees.
#[derive(Default)]
pub struct MockTransport {
    replies: Mutex<VecDeque<Result<RawResponse, TransportFailure>>>,
    requests: Mutex<Vec<RestRequest>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, status: u16, body: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(RawResponse::new(status, body)));
    }

    pub fn reply_json(&self, status: u16, body: Value) {
        self.reply(status, &body.to_string());
    }

    pub fn fail(&self, failure: TransportFailure) {
        self.replies.lock().unwrap().push_back(Err(failure));
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<RestRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> RestRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: &RestRequest) -> Result<RawResponse, TransportFailure> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(RawResponse::new(500, r#"{"message":"no reply queued"}"#)))
    }
}

pub fn test_config() -> ServerConfig {
    let settings = BackendSettings::new(Some(BASE_URL), Some(API_KEY)).expect("settings");
    ServerConfig::new(settings)
}

pub fn app_with(transport: Arc<MockTransport>, mode: AccessMode, instrumentation: Instrumentation) -> App {
    let config = test_config()
        .with_access_mode(mode)
        .with_instrumentation(instrumentation);
    App::with_transport(config, transport).expect("app wiring")
}

pub fn ada_record() -> Value {
    serde_json::json!({
        "id": 17,
        "created_at": "2025-04-20T10:00:00+00:00",
        "name": "Ada Lovelace",
        "mobile": "+1234567890",
        "nb_people": 4,
        "date": "2025-05-01",
        "time": "19:00",
        "email": null,
        "notes": null
    })
}

pub fn ada_pair() -> Value {
    serde_json::json!({"name": "Ada Lovelace", "mobile": "+1234567890"})
}
