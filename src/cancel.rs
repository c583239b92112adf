//! Cancellation utilities
//!
//! Provides a first-class cancellation handle for in-flight exchanges. The
//! handle is cheap to clone; one side hands it to a request config, the other
//! side calls [`CancelHandle::cancel`] with a reason when it wants out.

use std::sync::{Arc, OnceLock};
use tokio_util::sync::CancellationToken;

/// A handle that can be used to request cancellation with a reason.
#[derive(Clone, Debug, Default)]
pub struct CancelHandle {
    token: CancellationToken,
    reason: Arc<OnceLock<String>>,
}

impl CancelHandle {
    /// Create a new cancel handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. The exchange observing this handle aborts its
    /// transport as soon as possible and rejects with `reason`. The first
    /// reason wins; later calls are no-ops.
    pub fn cancel<S: Into<String>>(&self, reason: S) {
        let _ = self.reason.set(reason.into());
        self.token.cancel();
    }

    /// Check if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// The reason handed to the first [`CancelHandle::cancel`] call, if any.
    pub fn reason(&self) -> Option<&str> {
        self.reason.get().map(String::as_str)
    }

    /// A future that resolves with the cancellation reason once cancellation
    /// is requested, and never resolves otherwise.
    pub async fn cancelled(&self) -> String {
        self.token.cancelled().await;
        self.reason.get().cloned().unwrap_or_default()
    }
}
