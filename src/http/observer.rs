//! Request observers

use super::types::HttpRequest;
use crate::error::RequestInfo;
use tracing::debug;

/// Notified immediately before a request attempt is sent
pub trait RequestObserver: Send + Sync {
    /// `attempt` starts at 1 and increases with every retry
    fn will_send(&self, request: &HttpRequest, info: &RequestInfo, attempt: u32);
}

/// Logs every outgoing request at debug level
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingObserver;

impl RequestObserver for LoggingObserver {
    fn will_send(&self, request: &HttpRequest, info: &RequestInfo, attempt: u32) {
        debug!(
            method = %info.method,
            url = %info.url,
            attempt,
            retry_budget = request.retry_count,
            "Sending request"
        );
    }
}
