//! Progress drivers.
//!
//! A driver decides, once per tick, what happens next to a processing job. The
//! shipped [`SimulatedDriver`] fakes progress; a poller for a real transcoding
//! backend would implement the same trait.

use super::{ConversionJob, COMPLETE};
use crate::config::ConversionSettings;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use std::time::Duration;

/// Outcome of one advancement tick.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// New progress percentage. Values at or above 100 complete the job.
    Progress(f64),
    Completed,
    Failed(String),
}

/// Trait for progress advancement strategies.
#[async_trait]
pub trait ProgressDriver: Send + Sync {
    /// Time between two ticks for one job.
    fn cadence(&self) -> Duration;

    /// Next step for a processing job, given its current state.
    async fn advance(&self, job: &ConversionJob) -> Step;
}

/// Random-increment driver standing in for a real transcoder.
pub struct SimulatedDriver {
    cadence: Duration,
    max_increment: f64,
    rng: Mutex<StdRng>,
}

impl SimulatedDriver {
    /// Create a driver ticking every `cadence` with increments in `[0, max_increment)`.
    pub fn new(cadence: Duration, max_increment: f64) -> Self {
        Self {
            cadence,
            max_increment,
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Create a driver from conversion settings.
    pub fn from_settings(settings: &ConversionSettings) -> Self {
        Self::new(
            Duration::from_millis(settings.tick_interval_ms),
            settings.max_increment,
        )
    }

    /// Use a seeded generator for reproducible progress sequences.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    fn increment(&self) -> f64 {
        if self.max_increment <= 0.0 {
            return 0.0;
        }
        match self.rng.lock() {
            Ok(mut rng) => rng.random_range(0.0..self.max_increment),
            Err(poisoned) => poisoned.into_inner().random_range(0.0..self.max_increment),
        }
    }
}

impl Default for SimulatedDriver {
    fn default() -> Self {
        Self::from_settings(&ConversionSettings::default())
    }
}

#[async_trait]
impl ProgressDriver for SimulatedDriver {
    fn cadence(&self) -> Duration {
        self.cadence
    }

    async fn advance(&self, job: &ConversionJob) -> Step {
        let next = job.progress + self.increment();
        if next >= COMPLETE {
            Step::Completed
        } else {
            Step::Progress(next)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::JobStatus;
    use chrono::Utc;

    fn new_job() -> ConversionJob {
        ConversionJob::new(crate::conversion::tests::sample_record("abc"), Utc::now())
    }

    #[tokio::test]
    async fn test_simulated_progress_reaches_completion() {
        let driver = SimulatedDriver::new(Duration::from_millis(1), 15.0).with_seed(7);
        let mut job = new_job();
        let mut ticks = 0;

        while !job.is_terminal() {
            let next = job.advanced(&driver.advance(&job).await);
            assert!(next.progress >= job.progress);
            assert!(next.progress <= 100.0);
            job = next;
            ticks += 1;
            assert!(ticks < 10_000, "driver never completed");
        }

        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.progress, 100.0);
    }

    #[tokio::test]
    async fn test_increments_stay_below_bound() {
        let driver = SimulatedDriver::new(Duration::from_millis(1), 15.0).with_seed(42);
        let job = new_job();

        for _ in 0..200 {
            match driver.advance(&job).await {
                Step::Progress(value) => assert!((0.0..15.0).contains(&value)),
                other => panic!("unexpected step {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_same_seed_same_sequence() {
        let a = SimulatedDriver::new(Duration::from_millis(1), 15.0).with_seed(3);
        let b = SimulatedDriver::new(Duration::from_millis(1), 15.0).with_seed(3);
        let job = new_job();

        for _ in 0..10 {
            assert_eq!(a.advance(&job).await, b.advance(&job).await);
        }
    }

    #[test]
    fn test_from_settings() {
        let driver = SimulatedDriver::default();
        assert_eq!(driver.cadence(), Duration::from_millis(400));
    }
}
