use std::time::Duration;

use async_trait::async_trait;

/// The simulated processing pause. Injected so tests can skip it or run it on
/// tokio's paused clock.
#[async_trait]
pub trait AnalysisDelay: Send + Sync {
    async fn wait(&self);
}

/// Non-blocking fixed-duration wait.
pub struct FixedDelay(pub Duration);

#[async_trait]
impl AnalysisDelay for FixedDelay {
    async fn wait(&self) {
        tokio::time::sleep(self.0).await;
    }
}

pub struct NoDelay;

#[async_trait]
impl AnalysisDelay for NoDelay {
    async fn wait(&self) {}
}
