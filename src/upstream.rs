//! Shared error type and traits for the two upstream services.
//!
//! The web layer only talks to [`PrinterApi`] and [`InventoryApi`], so the
//! router can be exercised against in-memory implementations.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::octoprint::PrinterStatus;
use crate::spoolman::Spool;

/// Tool index used for every spool lookup and assignment.
pub const DEFAULT_TOOL: u32 = 0;

/// Per-call timeout applied when the configuration does not say otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ClientError {
    /// Network failure or timeout.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),
    /// The response body did not have the expected shape.
    #[error("unexpected upstream response: {0}")]
    UpstreamProtocolError(String),
    /// The upstream explicitly reported a failure.
    #[error("upstream rejected request: {0}")]
    UpstreamRejected(String),
    #[error("record not found")]
    NotFound,
}

impl ClientError {
    /// Classify a transport-level reqwest error.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::UpstreamProtocolError(err.to_string())
        } else {
            ClientError::UpstreamUnavailable(err.to_string())
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Printer-control service (OctoPrint plus its spool plugin).
#[async_trait]
pub trait PrinterApi: Send + Sync + 'static {
    async fn get_state(&self) -> ClientResult<PrinterStatus>;
    /// Spool currently loaded on `tool`, or `None` when nothing is set.
    async fn get_current_spool(&self, tool: u32) -> ClientResult<Option<String>>;
    async fn set_active_spool(&self, spool_id: &str, tool: u32) -> ClientResult<()>;
}

/// Spool-inventory service (Spoolman).
#[async_trait]
pub trait InventoryApi: Send + Sync + 'static {
    async fn get_spool(&self, spool_id: &str) -> ClientResult<Spool>;
    async fn list_spools(&self) -> ClientResult<Vec<Spool>>;
}

/// Build a reqwest client with the bounded per-call timeout.
pub fn http_client(timeout: Duration) -> ClientResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ClientError::UpstreamUnavailable(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ClientError::UpstreamRejected("no such spool".to_string()).to_string(),
            "upstream rejected request: no such spool"
        );
        assert_eq!(ClientError::NotFound.to_string(), "record not found");
    }

    #[tokio::test]
    async fn test_http_client_builds() {
        assert!(http_client(DEFAULT_TIMEOUT).is_ok());
    }
}
