//! Fetch-and-classify routine for the joke API.
//!
//! One call to [`Fetcher::fetch_and_classify`] resolves a URL, optionally
//! waits, issues a single GET through a [`quip_http::JsonTransport`] and
//! turns the decoded body into an [`Outcome`]:
//!
//! - `{"error": "Bad Request"}` becomes a `QueryLengthError`
//! - any other `error` becomes a `FetchError`
//! - `{"result": [...], "total": n}` yields one random element, or a
//!   `SearchError` when there is nothing to pick from
//! - anything else is handed back verbatim
//!
//! Failures pass through a single handler that substitutes a
//! `ConnectionError` when the injected [`Connectivity`] signal says the host
//! is offline.
//!
//! ```no_run
//! use std::sync::Arc;
//! use quip_fetch::{Fetcher, JokeApi};
//! use quip_http::HttpClient;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let api = JokeApi::default();
//! let fetcher = Fetcher::new(Arc::new(HttpClient::new(api.base().as_str())?));
//! match fetcher.fetch_and_classify(&api.random(), None).await {
//!     Ok(joke) => println!("{}", joke["value"]),
//!     Err(err) => eprintln!("{err}"),
//! }
//! # Ok(()) }
//! ```

pub mod connectivity;
pub mod endpoints;
pub mod error;
pub mod fetch;
pub mod random;
pub mod source;

pub use connectivity::{Connectivity, OnlineFlag, TcpProbe};
pub use endpoints::JokeApi;
pub use error::{ClassifiedError, ErrorKind, ErrorReport, FetchFailure, Outcome, OutcomePair};
pub use fetch::{Fetcher, classify};
pub use random::{RandomIndex, ThreadRandom};
pub use source::UrlSource;
