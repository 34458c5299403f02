//! Shutdown coordination for both frontends.

use tokio_util::sync::CancellationToken;

/// Coordinator for graceful shutdown.
///
/// One `trigger` stops accepting on every frontend and lets in-flight
/// requests finish. The triggered state is sticky: a frontend that starts
/// waiting after the trigger still sees it.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    token: CancellationToken,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token handed to a frontend's serve loop.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Trigger the shutdown signal. Safe to call more than once.
    pub fn trigger(&self) {
        self.token.cancel();
    }

    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolve once shutdown has been triggered.
    pub async fn wait(&self) {
        self.token.cancelled().await;
    }
}
