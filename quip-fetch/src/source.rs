//! Where the routine gets its URL from.
//!
//! Callers either pass a plain value (`&str`, `String`, [`url::Url`]) or a
//! live reference whose current value is read at call time. A
//! [`tokio::sync::watch::Receiver`] plays the live role: whoever holds the
//! sender can retarget the fetch between calls.
//!
//! ```
//! use quip_fetch::UrlSource;
//! use tokio::sync::watch;
//!
//! let (tx, rx) = watch::channel(String::from("https://a.test/jokes/random"));
//! assert_eq!(rx.resolve(), "https://a.test/jokes/random");
//! tx.send_replace(String::from("https://b.test/jokes/random"));
//! assert_eq!(rx.resolve(), "https://b.test/jokes/random");
//! ```

use tokio::sync::watch;
use url::Url;

/// Produces the effective URL for one fetch.
pub trait UrlSource {
    fn resolve(&self) -> String;
}

impl UrlSource for str {
    fn resolve(&self) -> String {
        self.to_string()
    }
}

impl UrlSource for String {
    fn resolve(&self) -> String {
        self.clone()
    }
}

impl UrlSource for Url {
    fn resolve(&self) -> String {
        self.as_str().to_string()
    }
}

impl<T: UrlSource + ?Sized> UrlSource for &T {
    fn resolve(&self) -> String {
        (**self).resolve()
    }
}

impl<T: UrlSource> UrlSource for watch::Receiver<T> {
    fn resolve(&self) -> String {
        self.borrow().resolve()
    }
}
