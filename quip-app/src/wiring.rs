use anyhow::{Context, Result};
use quip_config::{ConnectivityMode, QuipConfig};
use quip_fetch::{Connectivity, Fetcher, OnlineFlag, TcpProbe};
use quip_http::HttpClient;
use std::sync::Arc;

fn connectivity_from(cfg: &QuipConfig) -> Arc<dyn Connectivity> {
    match cfg.connectivity.mode {
        ConnectivityMode::Flag => Arc::new(OnlineFlag::default()),
        ConnectivityMode::Probe => Arc::new(TcpProbe::new(
            cfg.connectivity.probe_addr.clone(),
            cfg.connectivity.probe_timeout(),
        )),
    }
}

/// Assemble the transport and capabilities described by `cfg`.
pub fn build_fetcher(cfg: &QuipConfig) -> Result<Fetcher> {
    let client = HttpClient::new(&cfg.api.base_url)
        .with_context(|| format!("cannot build HTTP client for {}", cfg.api.base_url))?
        .with_timeout(cfg.api.timeout());
    tracing::debug!(
        base_url=%client.base(),
        timeout_ms=cfg.api.timeout_ms,
        connectivity=?cfg.connectivity.mode,
        "quip.wiring"
    );
    Ok(Fetcher::new(Arc::new(client)).with_connectivity(connectivity_from(cfg)))
}
