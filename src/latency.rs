//! Artificial response delay.

use std::time::Duration;

use rand::Rng;

use crate::error::Error;

/// A half-open delay window `[min, max)` in milliseconds.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Latency {
    min_ms: u64,
    max_ms: u64,
}

impl Latency {
    pub fn new(min_ms: u64, max_ms: u64) -> Result<Self, Error> {
        if min_ms >= max_ms {
            return Err(Error::InvalidLatency { min_ms, max_ms });
        }
        Ok(Self { min_ms, max_ms })
    }

    pub fn min(&self) -> Duration { Duration::from_millis(self.min_ms) }
    pub fn max(&self) -> Duration { Duration::from_millis(self.max_ms) }

    /// A uniformly drawn delay inside the window.
    pub fn sample(&self) -> Duration {
        Duration::from_millis(rand::thread_rng().gen_range(self.min_ms..self.max_ms))
    }

    /// Sleeps for one [`sample`](Self::sample).
    pub async fn wait(&self) -> Duration {
        let delay = self.sample();
        tokio::time::sleep(delay).await;
        delay
    }
}

/// 100 ms inclusive to 1000 ms exclusive.
impl Default for Latency {
    fn default() -> Self {
        Self { min_ms: 100, max_ms: 1000 }
    }
}
