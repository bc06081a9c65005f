//! Time source for the poll loop
//!
//! The engine never calls `tokio::time::sleep` directly, so tests can drive
//! every transition without real delays.

use async_trait::async_trait;
use std::time::Duration;

/// Something that can wait
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Suspend the caller for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_tokio_sleeper_advances_paused_clock() {
        let start = tokio::time::Instant::now();
        TokioSleeper.sleep(Duration::from_secs(600)).await;
        assert!(start.elapsed() >= Duration::from_secs(600));
    }
}
