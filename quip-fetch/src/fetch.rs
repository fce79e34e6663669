use crate::connectivity::{Connectivity, OnlineFlag};
use crate::error::{ClassifiedError, FetchFailure, Outcome};
use crate::random::{RandomIndex, ThreadRandom};
use crate::source::UrlSource;
use quip_http::JsonTransport;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

/// The server's identifier for a rejected search query.
const BAD_REQUEST: &str = "Bad Request";

/// Runs single-shot fetches and classifies what comes back.
///
/// The transport, the random generator and the connectivity signal are all
/// injected; [`Fetcher::new`] defaults the last two to [`ThreadRandom`] and
/// an always-online [`OnlineFlag`].
#[derive(Clone)]
pub struct Fetcher {
    transport: Arc<dyn JsonTransport>,
    random: Arc<dyn RandomIndex>,
    connectivity: Arc<dyn Connectivity>,
}

impl Fetcher {
    pub fn new(transport: Arc<dyn JsonTransport>) -> Self {
        Self {
            transport,
            random: Arc::new(ThreadRandom),
            connectivity: Arc::new(OnlineFlag::default()),
        }
    }

    pub fn with_random(mut self, random: Arc<dyn RandomIndex>) -> Self {
        self.random = random;
        self
    }

    pub fn with_connectivity(mut self, connectivity: Arc<dyn Connectivity>) -> Self {
        self.connectivity = connectivity;
        self
    }

    /// Resolve `url`, wait out `delay` (a zero delay means none), GET once
    /// and classify the decoded body.
    ///
    /// Every failure ends up in the returned [`Outcome`]; when the host is
    /// offline it is reported as a `ConnectionError` whatever the cause.
    pub async fn fetch_and_classify<S>(&self, url: &S, delay: Option<Duration>) -> Outcome
    where
        S: UrlSource + ?Sized,
    {
        let url = url.resolve();

        match delay.filter(|d| !d.is_zero()) {
            Some(delay) => {
                let delay_ms = delay.as_millis() as u64;
                tracing::info!(%url, delay_ms, "fetching {url} after a {delay_ms} ms delay");
                sleep(delay).await;
            }
            None => tracing::info!(%url, "fetching {url} without delay"),
        }

        match self.attempt(&url).await {
            Ok(data) => Ok(data),
            Err(err) => Err(self.on_failure(&url, err).await),
        }
    }

    async fn attempt(&self, url: &str) -> Result<Value, FetchFailure> {
        let resp = self.transport.get_json(url).await?;
        tracing::debug!(%url, status=%resp.status, "fetch.response");
        Ok(classify(resp.body, self.random.as_ref())?)
    }

    async fn on_failure(&self, url: &str, err: FetchFailure) -> FetchFailure {
        if self.connectivity.is_online().await {
            tracing::warn!(%url, error=%err, "fetch.failed");
            err
        } else {
            tracing::warn!(%url, error=%err, "fetch.failed.offline");
            ClassifiedError::connection().into()
        }
    }
}

/// Map a decoded response body to data or a classified error.
///
/// `result` is only sampled within `min(total, result.len())`; a `total`
/// that disagrees with the array length is logged and the smaller bound
/// wins. A `result` without a numeric `total` is returned verbatim. A
/// `null` body, or a `null` picked from `result`, is a `FetchError`: the
/// data side of an outcome is never `null`.
///
/// ```
/// use quip_fetch::{classify, ErrorKind, ThreadRandom};
/// use serde_json::json;
///
/// let err = classify(json!({"error": "Bad Request"}), &ThreadRandom).unwrap_err();
/// assert_eq!(err.kind, ErrorKind::QueryLengthError);
///
/// let joke = classify(json!({"result": ["only"], "total": 1}), &ThreadRandom).unwrap();
/// assert_eq!(joke, json!("only"));
/// ```
pub fn classify(body: Value, random: &dyn RandomIndex) -> Result<Value, ClassifiedError> {
    if body.is_null() {
        tracing::warn!("fetch.null_body");
        return Err(ClassifiedError::fetch());
    }
    if let Some(error) = body.get("error").filter(|v| is_truthy(v)) {
        tracing::debug!(%error, "fetch.server_error");
        return Err(if error.as_str() == Some(BAD_REQUEST) {
            ClassifiedError::query_length()
        } else {
            ClassifiedError::fetch()
        });
    }

    let Some(result) = body.get("result").filter(|v| is_truthy(v)) else {
        return Ok(body);
    };
    let Some(total) = body.get("total").and_then(integer_of) else {
        return Ok(body);
    };
    let Some(items) = result.as_array() else {
        tracing::warn!(kind = json_kind(result), "fetch.result_not_array");
        return Err(ClassifiedError::fetch());
    };

    if total <= 0 {
        return Err(ClassifiedError::search());
    }
    let total = usize::try_from(total).unwrap_or(usize::MAX);
    if total != items.len() {
        tracing::warn!(total, len = items.len(), "fetch.total_mismatch");
    }
    let range = items.len().min(total);
    if range == 0 {
        return Err(ClassifiedError::search());
    }

    let index = random.random_int(0, range - 1);
    match items.get(index) {
        Some(Value::Null) => {
            tracing::warn!(index, "fetch.null_item");
            Err(ClassifiedError::fetch())
        }
        Some(item) => Ok(item.clone()),
        None => {
            tracing::warn!(index, range, "fetch.random_index_out_of_range");
            Err(ClassifiedError::fetch())
        }
    }
}

/// Whole numbers only; `3.0` counts, `2.5` does not.
fn integer_of(v: &Value) -> Option<i64> {
    v.as_i64()
        .or_else(|| v.as_u64().map(|_| i64::MAX))
        .or_else(|| v.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
}

/// Falsy values: `null`, `false`, `0`, `""`. Everything else, empty
/// containers included, is truthy.
fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
