//! Error taxonomy for the dashboard feed layer

use thiserror::Error;

/// All errors generated while reading the dashboard feeds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    /// The request never completed (connect, DNS, timeout, ...)
    #[error("feed request failed: {0}")]
    Request(String),

    /// The feed answered with a non-success status
    #[error("feed responded with status {status}: {endpoint}")]
    Status { status: u16, endpoint: String },

    /// The response body could not be decoded into the expected payload
    #[error("malformed feed body from {endpoint}: {detail}")]
    Decode { endpoint: String, detail: String },
}

impl FeedError {
    /// Determine if an error aborts the whole fetch cycle.
    ///
    /// A non-success status only leaves that feed's half of the dataset
    /// stale; transport and decode failures abort the cycle so the previous
    /// dataset and last-sync marker survive untouched.
    pub fn aborts_cycle(&self) -> bool {
        !matches!(self, FeedError::Status { .. })
    }
}
