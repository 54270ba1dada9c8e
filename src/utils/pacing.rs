//! Request pacing between paginated calls.

use async_trait::async_trait;
use std::time::Duration;

/// Capability to wait before the next request is issued.
///
/// The search workflow calls [`Pacer::wait`] once between consecutive pages,
/// never before the first page or after the last.
#[async_trait]
pub trait Pacer: Send + Sync + std::fmt::Debug {
    async fn wait(&self);
}

/// Sleep for a fixed interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Negative or non-finite values are treated as zero
    pub fn from_secs_f64(secs: f64) -> Self {
        let secs = if secs.is_finite() && secs > 0.0 { secs } else { 0.0 };
        Self::new(Duration::from_secs_f64(secs))
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[async_trait]
impl Pacer for FixedDelay {
    async fn wait(&self) {
        if !self.delay.is_zero() {
            tracing::debug!("Waiting {:?} before next request", self.delay);
            tokio::time::sleep(self.delay).await;
        }
    }
}

/// Do not wait at all
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoDelay;

#[async_trait]
impl Pacer for NoDelay {
    async fn wait(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_secs_f64() {
        assert_eq!(FixedDelay::from_secs_f64(5.0).delay(), Duration::from_secs(5));
        assert_eq!(FixedDelay::from_secs_f64(0.25).delay(), Duration::from_millis(250));
        assert_eq!(FixedDelay::from_secs_f64(-1.0).delay(), Duration::ZERO);
        assert_eq!(FixedDelay::from_secs_f64(f64::NAN).delay(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_delay_sleeps() {
        let pacer = FixedDelay::new(Duration::from_secs(5));
        let started = tokio::time::Instant::now();
        pacer.wait().await;
        assert!(started.elapsed() >= Duration::from_secs(5));
    }

    #[test]
    fn test_no_delay_returns_immediately() {
        let started = std::time::Instant::now();
        tokio_test::block_on(NoDelay.wait());
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
