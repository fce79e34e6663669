//! Host connectivity signals consulted when a fetch fails.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Reports whether the host currently has network connectivity.
#[async_trait]
pub trait Connectivity: Send + Sync {
    async fn is_online(&self) -> bool;
}

/// A shared on/off flag the host flips as its network state changes.
///
/// Clones share the same flag.
///
/// ```
/// use quip_fetch::OnlineFlag;
///
/// let flag = OnlineFlag::default();
/// let watcher = flag.clone();
/// flag.set(false);
/// assert!(!watcher.get());
/// ```
#[derive(Debug, Clone)]
pub struct OnlineFlag(Arc<AtomicBool>);

impl OnlineFlag {
    pub fn new(online: bool) -> Self {
        Self(Arc::new(AtomicBool::new(online)))
    }

    pub fn offline() -> Self {
        Self::new(false)
    }

    pub fn set(&self, online: bool) {
        self.0.store(online, Ordering::SeqCst);
    }

    pub fn get(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

impl Default for OnlineFlag {
    fn default() -> Self {
        Self::new(true)
    }
}

#[async_trait]
impl Connectivity for OnlineFlag {
    async fn is_online(&self) -> bool {
        self.get()
    }
}

/// Considers the host online when a TCP connection to `addr` opens within
/// `timeout`.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    addr: String,
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            timeout,
        }
    }
}

#[async_trait]
impl Connectivity for TcpProbe {
    async fn is_online(&self) -> bool {
        let online = matches!(
            timeout(self.timeout, TcpStream::connect(self.addr.as_str())).await,
            Ok(Ok(_))
        );
        tracing::debug!(addr=%self.addr, online, "connectivity.probe");
        online
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn flag_reflects_latest_state() {
        let flag = OnlineFlag::default();
        assert!(flag.is_online().await);
        flag.set(false);
        assert!(!flag.is_online().await);
        assert!(!OnlineFlag::offline().is_online().await);
    }

    #[tokio::test]
    async fn probe_succeeds_against_a_listening_socket() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let probe = TcpProbe::new(addr, Duration::from_secs(2));
        assert!(probe.is_online().await);
    }

    #[tokio::test]
    async fn probe_fails_when_nothing_listens() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);
        let probe = TcpProbe::new(addr, Duration::from_secs(2));
        assert!(!probe.is_online().await);
    }
}
