#![allow(dead_code)]

use async_trait::async_trait;
use quip_common::observability::{LogConfig, LogFormat, init_logging};
use quip_fetch::RandomIndex;
use quip_http::{HttpError, JsonResponse, JsonTransport, StatusCode};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};
use tokio::time::Instant;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

static INIT_PATH: OnceLock<PathBuf> = OnceLock::new();

pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let config = LogConfig {
            app_name: "quip-tests",
            log_dir: Some(std::env::temp_dir().join("quip-tests")),
            emit_stderr: true,
            format: if std::env::var("QUIP_LOG_FORMAT")
                .map(|raw| raw.trim().eq_ignore_ascii_case("json"))
                .unwrap_or(false)
            {
                LogFormat::Json
            } else {
                LogFormat::Text
            },
            default_filter: "debug".to_string(),
        };

        init_logging(config).unwrap_or_default()
    });
}

/// What a [`Scripted`] transport answers with.
pub enum Reply {
    Json(StatusCode, Value),
    Network,
    Garbage,
}

/// Transport double that records every call and replays one answer.
pub struct Scripted {
    reply: Reply,
    calls: Mutex<Vec<(String, Instant)>>,
}

impl Scripted {
    pub fn new(reply: Reply) -> Self {
        Self {
            reply,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn json(body: Value) -> Self {
        Self::new(Reply::Json(StatusCode::OK, body))
    }

    pub fn calls(&self) -> Vec<(String, Instant)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl JsonTransport for Scripted {
    async fn get_json(&self, url: &str) -> Result<JsonResponse, HttpError> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), Instant::now()));
        tracing::trace!(%url, "scripted.get_json");
        match &self.reply {
            Reply::Json(status, body) => Ok(JsonResponse {
                status: *status,
                body: body.clone(),
            }),
            Reply::Network => Err(HttpError::Network("connection refused".into())),
            Reply::Garbage => Err(HttpError::Decode(
                "expected value at line 1 column 1".into(),
                "<html>".into(),
            )),
        }
    }
}

/// Always answers with the same index.
pub struct Fixed(pub usize);

impl RandomIndex for Fixed {
    fn random_int(&self, _min: usize, _max: usize) -> usize {
        self.0
    }
}

/// One event seen by [`Captured`].
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub message: String,
    pub fields: BTreeMap<String, String>,
    pub at: Instant,
}

/// Layer that keeps every event in order, for asserting on log output.
#[derive(Clone, Default)]
pub struct Captured(Arc<Mutex<Vec<CapturedEvent>>>);

impl Captured {
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.0.lock().unwrap().clone()
    }

    pub fn position(&self, message: &str) -> Option<usize> {
        self.events().iter().position(|e| e.message == message)
    }
}

#[derive(Default)]
struct Fields(BTreeMap<String, String>);

impl Visit for Fields {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{value:?}"));
    }
}

impl<S: Subscriber> Layer<S> for Captured {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = Fields::default();
        event.record(&mut fields);
        let message = fields.0.remove("message").unwrap_or_default();
        self.0.lock().unwrap().push(CapturedEvent {
            message,
            fields: fields.0,
            at: Instant::now(),
        });
    }
}
