use std::future::Future;

use thiserror::Error;

use crate::event::LogEvent;

mod http;

pub use http::HttpTransport;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("collector rejected payload: {status}")]
    Rejected { status: reqwest::StatusCode },

    #[error("gzip compression failed: {0}")]
    Compression(#[from] std::io::Error),

    /// Escape hatch for custom transports.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Delivery of one batch to the collector.
///
/// The dispatcher awaits the call to completion and treats any error as one
/// failed attempt; it applies no timeout of its own, so implementations own
/// theirs. Batches arrive in enqueue order and are never delivered
/// concurrently with each other.
pub trait Transport: Send + Sync + 'static {
    fn dispatch(
        &self,
        batch: &[LogEvent],
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}
