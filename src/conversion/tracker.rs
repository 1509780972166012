//! Conversion job tracker.
//!
//! Owns the job collection, publishes whole snapshots through a
//! [`tokio::sync::watch`] channel and persists the collection to the session
//! store after every mutation. Each job is advanced by its own detached task.

use super::{ConversionJob, JobId, ProgressDriver, Step};
use crate::error::{Result, TunegrabError};
use crate::session_store::SessionStore;
use crate::video::VideoRecord;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Session store key holding the serialized job history.
pub const HISTORY_KEY: &str = "conversions";

/// Shortest tick period a driver task will use.
const MIN_CADENCE: Duration = Duration::from_millis(1);

/// Tracks conversion jobs, most recent first.
///
/// Cheap to clone; clones share the same collection.
#[derive(Clone)]
pub struct JobTracker {
    inner: Arc<TrackerInner>,
}

struct TrackerInner {
    jobs: watch::Sender<Vec<ConversionJob>>,
    /// Serializes mutations and their persistence. Holds the last creation time.
    writer: Mutex<DateTime<Utc>>,
    store: Arc<dyn SessionStore>,
    driver: Arc<dyn ProgressDriver>,
    /// Jobs that currently have a driver task.
    driven: std::sync::Mutex<HashSet<JobId>>,
}

impl JobTracker {
    /// Rehydrate the tracker from the session store.
    ///
    /// A missing, unreadable or incompatible document yields an empty history.
    pub async fn restore(store: Arc<dyn SessionStore>, driver: Arc<dyn ProgressDriver>) -> Self {
        let jobs = match store.load(HISTORY_KEY).await {
            Ok(Some(document)) => match serde_json::from_str::<Vec<ConversionJob>>(&document) {
                Ok(jobs) => jobs,
                Err(e) => {
                    warn!("Ignoring incompatible conversion history: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Could not load conversion history: {}", e);
                Vec::new()
            }
        };

        info!("Restored {} conversion jobs", jobs.len());
        Self::with_jobs(jobs, store, driver)
    }

    /// Create a tracker with an empty history, ignoring anything stored.
    pub fn new(store: Arc<dyn SessionStore>, driver: Arc<dyn ProgressDriver>) -> Self {
        Self::with_jobs(Vec::new(), store, driver)
    }

    fn with_jobs(
        jobs: Vec<ConversionJob>,
        store: Arc<dyn SessionStore>,
        driver: Arc<dyn ProgressDriver>,
    ) -> Self {
        let last_created = jobs
            .iter()
            .map(|j| j.created_at)
            .max()
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let (jobs, _) = watch::channel(jobs);

        Self {
            inner: Arc::new(TrackerInner {
                jobs,
                writer: Mutex::new(last_created),
                store,
                driver,
                driven: std::sync::Mutex::new(HashSet::new()),
            }),
        }
    }

    /// Start converting a record and return the new job's id.
    ///
    /// The job is inserted at the head of the history and advanced in the
    /// background until it reaches a terminal state. There is no way to stop it.
    pub async fn start_conversion(&self, record: impl Into<Arc<VideoRecord>>) -> JobId {
        let record = record.into();

        let job = {
            let mut last_created = self.inner.writer.lock().await;
            let created_at = next_timestamp(*last_created, Utc::now());
            *last_created = created_at;

            let job = ConversionJob::new(record, created_at);
            self.inner.jobs.send_modify(|jobs| jobs.insert(0, job.clone()));
            self.inner.persist().await;
            job
        };

        info!("Started conversion {} ({})", job.id, job.record.title);
        self.spawn_driver(job.id.clone());
        job.id
    }

    /// Snapshot of all jobs, most recent first.
    pub fn list_jobs(&self) -> Vec<ConversionJob> {
        self.inner.jobs.borrow().clone()
    }

    /// Look up one job.
    pub fn get_job(&self, id: &JobId) -> Option<ConversionJob> {
        self.inner.jobs.borrow().iter().find(|j| j.id == *id).cloned()
    }

    /// Look up one job, failing with [`TunegrabError::JobNotFound`].
    pub fn require_job(&self, id: &JobId) -> Result<ConversionJob> {
        self.get_job(id)
            .ok_or_else(|| TunegrabError::JobNotFound(id.to_string()))
    }

    /// The most recently started job that is still processing.
    pub fn active_job(&self) -> Option<ConversionJob> {
        self.inner
            .jobs
            .borrow()
            .iter()
            .find(|j| !j.is_terminal())
            .cloned()
    }

    /// Whether any job for the given record is still processing.
    pub fn is_processing(&self, record_id: &str) -> bool {
        self.inner
            .jobs
            .borrow()
            .iter()
            .any(|j| j.record.id == record_id && !j.is_terminal())
    }

    /// Subscribe to collection snapshots. A new value is published per mutation.
    pub fn subscribe(&self) -> watch::Receiver<Vec<ConversionJob>> {
        self.inner.jobs.subscribe()
    }

    /// Wait until the job reaches a terminal state.
    ///
    /// Returns `None` if the job does not exist or is removed while waiting.
    pub async fn wait_for_terminal(&self, id: &JobId) -> Option<ConversionJob> {
        let mut rx = self.subscribe();
        let snapshot = rx
            .wait_for(|jobs| match jobs.iter().find(|j| j.id == *id) {
                Some(job) => job.is_terminal(),
                None => true,
            })
            .await
            .ok()?;
        snapshot.iter().find(|j| j.id == *id).cloned()
    }

    /// Remove finished jobs from the history. Processing jobs are kept.
    ///
    /// Returns the number of jobs removed.
    pub async fn clear_history(&self) -> usize {
        let _writer = self.inner.writer.lock().await;

        let mut removed = 0;
        self.inner.jobs.send_if_modified(|jobs| {
            let before = jobs.len();
            jobs.retain(|j| !j.is_terminal());
            removed = before - jobs.len();
            removed > 0
        });

        if removed > 0 {
            self.inner.persist().await;
            info!("Cleared {} finished conversions", removed);
        }
        removed
    }

    /// Restart advancement for processing jobs that have no driver task,
    /// such as jobs restored from the session store.
    ///
    /// Returns the number of jobs resumed. Calling it again is a no-op while
    /// those jobs are still being driven.
    pub fn resume_pending(&self) -> usize {
        let pending: Vec<JobId> = self
            .inner
            .jobs
            .borrow()
            .iter()
            .filter(|j| !j.is_terminal())
            .map(|j| j.id.clone())
            .collect();

        pending
            .into_iter()
            .filter(|id| {
                let spawned = self.spawn_driver(id.clone());
                if spawned {
                    debug!("Resuming conversion {}", id);
                }
                spawned
            })
            .count()
    }

    /// Spawn the driver task for a job unless one is already running.
    fn spawn_driver(&self, id: JobId) -> bool {
        if !self.inner.driven().insert(id.clone()) {
            return false;
        }

        let tracker = self.clone();
        tokio::spawn(async move {
            tracker.drive(&id).await;
            tracker.inner.driven().remove(&id);
        });
        true
    }

    /// Advance one job on the driver's cadence until it is terminal or gone.
    async fn drive(&self, id: &JobId) {
        let cadence = self.inner.driver.cadence().max(MIN_CADENCE);
        let mut ticker = tokio::time::interval(cadence);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let Some(current) = self.get_job(id) else {
                return;
            };
            if current.is_terminal() {
                return;
            }

            let step = self.inner.driver.advance(&current).await;
            match self.apply(id, &step).await {
                Some(job) if job.is_terminal() => {
                    info!("Conversion {} finished: {}", job.id, job.status);
                    return;
                }
                Some(job) => debug!("Conversion {} at {:.1}%", job.id, job.progress),
                None => return,
            }
        }
    }

    /// Replace the job with its advanced version and persist.
    async fn apply(&self, id: &JobId, step: &Step) -> Option<ConversionJob> {
        let _writer = self.inner.writer.lock().await;

        let mut result = None;
        let changed = self.inner.jobs.send_if_modified(|jobs| {
            let Some(slot) = jobs.iter_mut().find(|j| j.id == *id) else {
                return false;
            };
            let next = slot.advanced(step);
            let changed = next != *slot;
            if changed {
                *slot = next.clone();
            }
            result = Some(next);
            changed
        });

        if changed {
            self.inner.persist().await;
        }
        result
    }
}

impl TrackerInner {
    fn driven(&self) -> std::sync::MutexGuard<'_, HashSet<JobId>> {
        self.driven.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Write the current snapshot to the session store. Callers hold `writer`.
    ///
    /// An empty history removes the stored document.
    async fn persist(&self) {
        let document = {
            let jobs = self.jobs.borrow();
            if jobs.is_empty() {
                None
            } else {
                Some(serde_json::to_string(&*jobs))
            }
        };

        let result = match document {
            Some(Ok(document)) => self.store.save(HISTORY_KEY, &document).await,
            Some(Err(e)) => Err(e.into()),
            None => self.store.remove(HISTORY_KEY).await,
        };

        if let Err(e) = result {
            warn!("Failed to persist conversion history: {}", e);
        }
    }
}

/// Creation time for a new job: now, or 1 ms after the previous job if the
/// clock has not moved on. Keeps job ids unique.
fn next_timestamp(last: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    if now.timestamp_millis() > last.timestamp_millis() {
        now
    } else {
        last + ChronoDuration::milliseconds(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::tests::sample_record;
    use crate::conversion::{JobStatus, SimulatedDriver};
    use crate::session_store::MemorySessionStore;
    use async_trait::async_trait;

    /// Adds a fixed amount per tick, so completion takes a known number of ticks.
    struct FixedDriver(f64);

    #[async_trait]
    impl ProgressDriver for FixedDriver {
        fn cadence(&self) -> Duration {
            Duration::from_millis(1)
        }

        async fn advance(&self, job: &ConversionJob) -> Step {
            Step::Progress(job.progress + self.0)
        }
    }

    /// Never moves a job forward.
    struct StalledDriver;

    #[async_trait]
    impl ProgressDriver for StalledDriver {
        fn cadence(&self) -> Duration {
            Duration::from_secs(3600)
        }

        async fn advance(&self, job: &ConversionJob) -> Step {
            Step::Progress(job.progress)
        }
    }

    /// Reports a zero cadence.
    struct ZeroCadenceDriver;

    #[async_trait]
    impl ProgressDriver for ZeroCadenceDriver {
        fn cadence(&self) -> Duration {
            Duration::ZERO
        }

        async fn advance(&self, job: &ConversionJob) -> Step {
            Step::Progress(job.progress + 25.0)
        }
    }

    fn fast_driver() -> Arc<dyn ProgressDriver> {
        Arc::new(SimulatedDriver::new(Duration::from_millis(1), 15.0).with_seed(11))
    }

    async fn wait(tracker: &JobTracker, id: &JobId) -> ConversionJob {
        tokio::time::timeout(Duration::from_secs(10), tracker.wait_for_terminal(id))
            .await
            .expect("job did not finish in time")
            .expect("job disappeared")
    }

    #[tokio::test]
    async fn test_job_completes_at_100() {
        let tracker = JobTracker::new(Arc::new(MemorySessionStore::new()), fast_driver());

        let id = tracker.start_conversion(sample_record("abc").as_ref().clone()).await;
        let started = tracker.get_job(&id).unwrap();
        assert_eq!(started.status, JobStatus::Processing);
        assert_eq!(started.progress, 0.0);

        let done = wait(&tracker, &id).await;
        assert_eq!(done.status, JobStatus::Completed);
        assert_eq!(done.progress, 100.0);
        assert!(tracker.active_job().is_none());
    }

    #[tokio::test]
    async fn test_progress_sequence_is_monotonic_and_bounded() {
        let tracker = JobTracker::new(Arc::new(MemorySessionStore::new()), Arc::new(FixedDriver(7.5)));
        let mut rx = tracker.subscribe();

        let id = tracker.start_conversion(sample_record("abc")).await;

        let mut seen = Vec::new();
        loop {
            tokio::time::timeout(Duration::from_secs(10), rx.changed())
                .await
                .expect("no update in time")
                .unwrap();
            let job = rx.borrow_and_update().iter().find(|j| j.id == id).cloned().unwrap();
            seen.push(job.progress);
            if job.is_terminal() {
                assert_eq!(job.status, JobStatus::Completed);
                break;
            }
        }

        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(seen.last(), Some(&100.0));
        // 7.5% per tick needs 14 ticks to reach 100 (plus the insertion snapshot).
        assert!(seen.len() <= 20, "took {} updates", seen.len());
    }

    #[tokio::test]
    async fn test_list_jobs_most_recent_first() {
        let tracker = JobTracker::new(Arc::new(MemorySessionStore::new()), Arc::new(StalledDriver));

        let a = tracker.start_conversion(sample_record("a")).await;
        let b = tracker.start_conversion(sample_record("b")).await;

        let ids: Vec<JobId> = tracker.list_jobs().into_iter().map(|j| j.id).collect();
        assert_eq!(ids, vec![b.clone(), a]);
        assert_eq!(tracker.active_job().map(|j| j.id), Some(b));
    }

    #[tokio::test]
    async fn test_same_record_twice_gives_independent_jobs() {
        let tracker = JobTracker::new(Arc::new(MemorySessionStore::new()), fast_driver());
        let record = sample_record("same");

        let first = tracker.start_conversion(record.clone()).await;
        let second = tracker.start_conversion(record.clone()).await;
        assert_ne!(first, second);
        assert!(tracker.is_processing("same"));

        let (a, b) = tokio::join!(wait(&tracker, &first), wait(&tracker, &second));
        assert_eq!(a.status, JobStatus::Completed);
        assert_eq!(b.status, JobStatus::Completed);
        assert_eq!(tracker.list_jobs().len(), 2);
        assert!(!tracker.is_processing("same"));
    }

    #[tokio::test]
    async fn test_reload_reproduces_completed_jobs() {
        let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
        let tracker = JobTracker::restore(store.clone(), fast_driver()).await;

        let first = tracker.start_conversion(sample_record("one")).await;
        let second = tracker.start_conversion(sample_record("two")).await;
        wait(&tracker, &first).await;
        wait(&tracker, &second).await;
        let before = tracker.list_jobs();

        let reloaded = JobTracker::restore(store, fast_driver()).await;
        assert_eq!(reloaded.list_jobs(), before);
    }

    #[tokio::test]
    async fn test_incompatible_history_is_treated_as_empty() {
        let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
        store.save(HISTORY_KEY, r#"{"version": 99}"#).await.unwrap();

        let tracker = JobTracker::restore(store, fast_driver()).await;
        assert!(tracker.list_jobs().is_empty());
    }

    #[tokio::test]
    async fn test_every_mutation_is_persisted() {
        let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
        let tracker = JobTracker::new(store.clone(), Arc::new(StalledDriver));

        let id = tracker.start_conversion(sample_record("abc")).await;

        let document = store.load(HISTORY_KEY).await.unwrap().unwrap();
        let stored: Vec<ConversionJob> = serde_json::from_str(&document).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, id);
        assert_eq!(stored[0].status, JobStatus::Processing);
    }

    #[tokio::test]
    async fn test_resume_pending_finishes_restored_jobs() {
        let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
        let stalled = JobTracker::new(store.clone(), Arc::new(StalledDriver));
        let id = stalled.start_conversion(sample_record("abc")).await;

        let reloaded = JobTracker::restore(store, fast_driver()).await;
        assert_eq!(reloaded.resume_pending(), 1);

        let done = wait(&reloaded, &id).await;
        assert_eq!(done.status, JobStatus::Completed);
    }

    #[tokio::test]
    async fn test_resume_pending_is_idempotent() {
        let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
        let stalled = JobTracker::new(store.clone(), Arc::new(StalledDriver));
        stalled.start_conversion(sample_record("abc")).await;

        let reloaded = JobTracker::restore(store, Arc::new(StalledDriver)).await;
        assert_eq!(reloaded.resume_pending(), 1);
        assert_eq!(reloaded.resume_pending(), 0);

        // Jobs started in this process already have a driver.
        reloaded.start_conversion(sample_record("new")).await;
        assert_eq!(reloaded.resume_pending(), 0);
    }

    #[tokio::test]
    async fn test_zero_cadence_driver_still_completes() {
        let tracker = JobTracker::new(Arc::new(MemorySessionStore::new()), Arc::new(ZeroCadenceDriver));

        let id = tracker.start_conversion(sample_record("abc")).await;

        let done = wait(&tracker, &id).await;
        assert_eq!(done.status, JobStatus::Completed);
        assert_eq!(done.progress, 100.0);
    }

    #[tokio::test]
    async fn test_clear_history_keeps_processing_jobs() {
        let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
        let tracker = JobTracker::new(store.clone(), fast_driver());

        let finished = tracker.start_conversion(sample_record("done")).await;
        wait(&tracker, &finished).await;

        let stalled = JobTracker::restore(store.clone(), Arc::new(StalledDriver)).await;
        let running = stalled.start_conversion(sample_record("running")).await;

        assert_eq!(stalled.clear_history().await, 1);
        let remaining: Vec<JobId> = stalled.list_jobs().into_iter().map(|j| j.id).collect();
        assert_eq!(remaining, vec![running]);

        let reloaded = JobTracker::restore(store, Arc::new(StalledDriver)).await;
        assert_eq!(reloaded.list_jobs().len(), 1);
        assert_eq!(stalled.clear_history().await, 0);
    }

    #[tokio::test]
    async fn test_clearing_everything_removes_stored_history() {
        let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
        let tracker = JobTracker::new(store.clone(), fast_driver());

        let id = tracker.start_conversion(sample_record("abc")).await;
        wait(&tracker, &id).await;
        assert!(store.load(HISTORY_KEY).await.unwrap().is_some());

        assert_eq!(tracker.clear_history().await, 1);
        assert!(store.load(HISTORY_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_require_job() {
        let tracker = JobTracker::new(Arc::new(MemorySessionStore::new()), Arc::new(StalledDriver));
        let id = tracker.start_conversion(sample_record("abc")).await;

        assert_eq!(tracker.require_job(&id).unwrap().id, id);
        assert!(matches!(
            tracker.require_job(&JobId::from("missing-1")),
            Err(TunegrabError::JobNotFound(missing)) if missing == "missing-1"
        ));
    }

    #[tokio::test]
    async fn test_wait_for_unknown_job() {
        let tracker = JobTracker::new(Arc::new(MemorySessionStore::new()), fast_driver());
        assert!(tracker.wait_for_terminal(&JobId::from("missing")).await.is_none());
    }

    #[test]
    fn test_next_timestamp_is_strictly_increasing() {
        let now = Utc::now();
        assert_eq!(next_timestamp(now - ChronoDuration::seconds(1), now), now);

        let bumped = next_timestamp(now, now);
        assert_eq!(bumped.timestamp_millis(), now.timestamp_millis() + 1);

        let behind = next_timestamp(now, now - ChronoDuration::seconds(5));
        assert!(behind > now);
    }
}
