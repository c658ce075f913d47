use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Cosmetic pause between synthesized phases
#[async_trait]
pub trait PhaseDelay: Send + Sync {
    async fn pause(&self, duration: Duration);
}

/// Sleeps on the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

#[async_trait]
impl PhaseDelay for TokioDelay {
    async fn pause(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// Returns immediately
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait]
impl PhaseDelay for NoDelay {
    async fn pause(&self, _duration: Duration) {}
}

/// Records requested pauses without sleeping
///
/// ```
/// use bpa_extraction::{PhaseDelay, RecordingDelay};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let delay = RecordingDelay::new();
/// delay.pause(Duration::from_millis(300)).await;
/// assert_eq!(delay.pauses(), vec![Duration::from_millis(300)]);
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordingDelay {
    pauses: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PhaseDelay for RecordingDelay {
    async fn pause(&self, duration: Duration) {
        if let Ok(mut pauses) = self.pauses.lock() {
            pauses.push(duration);
        }
        tokio::task::yield_now().await;
    }
}
