//! Minimal single-shot JSON-over-HTTP client with safe logging.
//!
//! - One GET per call: no retries, no backoff, no caching
//! - The body is decoded as JSON whatever the HTTP status, so callers can
//!   classify server-side error envelopes themselves
//! - Redacts sensitive query params before they reach the logs
//! - Optional *raw* request/response logging via `QUIP_HTTP_RAW=1`
//!
//! Example (no_run):
//! ```rust,no_run
//! # async fn demo() -> Result<(), quip_http::HttpError> {
//! let client = quip_http::HttpClient::new("https://api.chucknorris.io/")?;
//! let got = client
//!     .get_json_value("jokes/random", quip_http::RequestOpts::default())
//!     .await?;
//! assert!(got.status.is_success());
//! # Ok(()) }
//! ```
//!
//! Observability: structured `tracing` events are emitted for request start,
//! response headers, body snippets (truncated), decode failures, network
//! failures and (optionally) raw request/response lines (target `http.raw`).

use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Client, Method, Url};
use serde_json::Value;
use std::borrow::Cow;
use std::env;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;

pub use reqwest::StatusCode;

// ==============================
// Raw logging toggles
// ==============================

const RAW_ENV: &str = "QUIP_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024; // cap raw body logs (64 KiB)
const SNIPPET_MAX: usize = 500;

const SECRET_PARAMS: &[&str] = &[
    "access_token",
    "authorization",
    "auth",
    "key",
    "api_key",
    "token",
    "secret",
    "client_secret",
    "bearer",
];

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

fn make_curl(method: &Method, url: &Url, headers: &HeaderMap) -> String {
    let mut parts = vec!["curl".to_string(), format!("-X{}", method)];
    for (name, val) in headers.iter() {
        let mut v = val.to_str().unwrap_or("").to_string();
        if name.as_str().eq_ignore_ascii_case("authorization") {
            v = "<redacted>".into();
        }
        parts.push(format!(
            "-H '{}: {}'",
            name.as_str(),
            v.replace('\'', r"'\''")
        ));
    }
    let (host_path, query) = redact_query(url);
    let mut shown = format!("{}://{}", url.scheme(), host_path);
    if !query.is_empty() {
        let q: Vec<String> = query.iter().map(|(k, v)| format!("{k}={v}")).collect();
        shown.push('?');
        shown.push_str(&q.join("&"));
    }
    parts.push(format!("'{}'", shown.replace('\'', r"'\''")));
    parts.join(" ")
}

/// Redact sensitive headers for logging
fn redact_headers(h: &HeaderMap) -> Vec<(String, String)> {
    h.iter()
        .map(|(k, v)| {
            let key = k.as_str().to_string();
            let mut val = v.to_str().unwrap_or("").to_string();
            if key.eq_ignore_ascii_case("authorization") || key.eq_ignore_ascii_case("set-cookie")
            {
                val = "<redacted>".into();
            }
            (key, val)
        })
        .collect()
}

// ==============================
// Errors
// ==============================

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
}

// ==============================
// Request options & response
// ==============================

/// Per-request tuning knobs for the HTTP client.
///
/// ```
/// use quip_http::RequestOpts;
/// use std::borrow::Cow;
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(30)),
///     query: Some(vec![("query", Cow::Borrowed("kick"))]),
///     ..Default::default()
/// };
///
/// assert_eq!(opts.timeout.unwrap().as_secs(), 30);
/// assert!(opts.allow_absolute == false);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    pub timeout: Option<Duration>,
    pub query: Option<Vec<(&'a str, Cow<'a, str>)>>, // e.g. [("query", "term".into())]
    /// If true and `path` is an absolute URL, use it as-is (ignore base).
    pub allow_absolute: bool,
}

/// A decoded response: the status line plus the JSON body.
#[derive(Clone, Debug)]
pub struct JsonResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Anything that can turn a URL into a decoded JSON document.
///
/// [`HttpClient`] is the production implementation; tests substitute
/// scripted transports.
#[async_trait]
pub trait JsonTransport: Send + Sync {
    /// Issue one GET against `url` and decode the body.
    async fn get_json(&self, url: &str) -> Result<JsonResponse, HttpError>;
}

// ==============================
// Client
// ==============================

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

fn next_request_id() -> String {
    format!("r{:x}", NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed))
}

#[derive(Clone)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    pub default_timeout: Duration,
}

impl HttpClient {
    /// Construct a client anchored to a base URL.
    ///
    /// ```no_run
    /// use quip_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://api.chucknorris.io/")?;
    /// assert_eq!(client.default_timeout, Duration::from_secs(15));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            default_timeout: Duration::from_secs(15),
        })
    }

    /// Override the default timeout returned by [`HttpClient::new`].
    ///
    /// ```no_run
    /// use quip_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://api.chucknorris.io/")?
    ///     .with_timeout(Duration::from_secs(2));
    /// assert_eq!(client.default_timeout, Duration::from_secs(2));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn resolve(&self, path: &str, allow_absolute: bool) -> Result<Url, HttpError> {
        if allow_absolute {
            if let Ok(abs) = Url::parse(path) {
                return Ok(abs);
            }
        }
        self.base
            .join(path)
            .map_err(|e| HttpError::Url(e.to_string()))
    }

    /// GET `path` (joined on the base) and decode the body as JSON.
    ///
    /// Non-2xx statuses are not errors here; only URL, transport and decode
    /// failures are.
    pub async fn get_json_value(
        &self,
        path: &str,
        opts: RequestOpts<'_>,
    ) -> Result<JsonResponse, HttpError> {
        let url = self.resolve(path, opts.allow_absolute)?;
        let timeout = opts.timeout.unwrap_or(self.default_timeout);

        let mut rb = self
            .inner
            .request(Method::GET, url)
            .timeout(timeout)
            .header(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(q) = &opts.query {
            let pairs: Vec<(&str, &str)> = q.iter().map(|(k, v)| (*k, v.as_ref())).collect();
            rb = rb.query(&pairs);
        }
        let request = rb.build().map_err(|e| HttpError::Build(e.to_string()))?;

        let req_id = next_request_id();
        let (host_path, redacted_q) = redact_query(request.url());
        tracing::debug!(
            req_id=%req_id,
            method=%request.method(),
            host_path=%host_path,
            query=?redacted_q,
            timeout_ms=timeout.as_millis() as u64,
            "http.request.start"
        );
        if raw_enabled() {
            let curl = make_curl(request.method(), request.url(), request.headers());
            tracing::debug!(target: "http.raw", %req_id, %curl, "request");
        }

        // ----- Send -----
        let t0 = std::time::Instant::now();
        let resp = self.inner.execute(request).await.map_err(|err| {
            let message = err.to_string();
            tracing::warn!(req_id=%req_id, message=%message, "http.network_error.send");
            HttpError::Network(message)
        })?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = resp.bytes().await.map_err(|err| {
            let message = err.to_string();
            tracing::warn!(req_id=%req_id, message=%message, "http.network_error.body");
            HttpError::Network(message)
        })?;
        let dur_ms = t0.elapsed().as_millis() as u64;

        tracing::debug!(
            req_id=%req_id,
            %status,
            duration_ms=dur_ms,
            body_len=content_len(&headers, bytes.len()),
            "http.response.headers"
        );

        if raw_enabled() {
            let hdrs = redact_headers(&headers);
            let truncated = bytes.len() > RAW_MAX_BODY;
            let text = String::from_utf8_lossy(&bytes[..bytes.len().min(RAW_MAX_BODY)]);
            tracing::info!(
                target: "http.raw",
                %req_id,
                status=%status,
                duration_ms=dur_ms,
                headers=?hdrs,
                body=%text,
                truncated
            );
        }

        let snippet = snip_body(&bytes);
        tracing::trace!(
            req_id=%req_id,
            body_snippet=%snippet,
            "http.response.body_snippet"
        );

        let body = serde_json::from_slice::<Value>(&bytes).map_err(|e| {
            tracing::warn!(
                req_id=%req_id,
                %status,
                serde_line=%e.line(),
                serde_col=%e.column(),
                serde_err=%e.to_string(),
                body_snippet=%snippet,
                "http.response.decode_error"
            );
            HttpError::Decode(e.to_string(), snippet.clone())
        })?;

        Ok(JsonResponse { status, body })
    }
}

#[async_trait]
impl JsonTransport for HttpClient {
    async fn get_json(&self, url: &str) -> Result<JsonResponse, HttpError> {
        let opts = RequestOpts {
            allow_absolute: true,
            ..Default::default()
        };
        self.get_json_value(url, opts).await
    }
}

// ==============================
// Helpers
// ==============================

fn snip_body(body: &[u8]) -> String {
    let snip = String::from_utf8_lossy(body);
    if snip.len() <= SNIPPET_MAX {
        return snip.into_owned();
    }
    let mut cut = SNIPPET_MAX;
    while !snip.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &snip[..cut])
}

fn redact_query(url: &Url) -> (String, Vec<(String, String)>) {
    // "host + path" plus the redacted query list
    let host_path = format!("{}{}", url.host_str().unwrap_or("-"), url.path());
    let redacted = url
        .query_pairs()
        .map(|(k, v)| {
            let is_secret = SECRET_PARAMS.contains(&k.to_ascii_lowercase().as_str());
            let v = if is_secret {
                "<redacted>".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect::<Vec<_>>();
    (host_path, redacted)
}

fn content_len(headers: &HeaderMap, body_len: usize) -> usize {
    headers
        .get(reqwest::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(body_len)
}
