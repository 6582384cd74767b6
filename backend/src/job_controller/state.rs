//! Tracks the state of background jobs.
//!
//! Jobs run outside the request/response cycle (see
//! `job_controller::enrich`). The components are:
//! - `JobsState`: a clonable, thread-safe handle on the status of every job,
//!   shared with the Actix application through `AppState`.
//! - `JobUpdate`: a status change sent by a running job.
//! - `start_job_updater`: a long-running task that applies `JobUpdate`s from
//!   the MPSC channel to the shared map.
//!
//! A finished job stays readable for [`FINISHED_JOB_TTL`], then it is dropped
//! the next time the map is written.

use common::jobs::JobStatus;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, RwLock};

const CHANNEL_CAPACITY: usize = 100;
pub const FINISHED_JOB_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone)]
pub struct JobEntry {
    pub status: JobStatus,
    /// Set when the job reaches `Completed` or `Failed`.
    finished_at: Option<Instant>,
}

impl JobEntry {
    fn new(status: JobStatus) -> Self {
        let finished_at = status.is_finished().then(Instant::now);
        JobEntry { status, finished_at }
    }

    fn expired(&self, now: Instant, ttl: Duration) -> bool {
        self.finished_at
            .is_some_and(|at| now.saturating_duration_since(at) >= ttl)
    }
}

#[derive(Clone)]
pub struct JobsState {
    /// Job id to current status. Readers are the status endpoint; the only
    /// writers are `register` and `start_job_updater`.
    pub jobs: Arc<RwLock<HashMap<String, JobEntry>>>,

    /// Running jobs report progress through this sender instead of writing
    /// the map, so updates from one job are applied in the order sent.
    pub tx: mpsc::Sender<JobUpdate>,

    ttl: Duration,
}

#[derive(Debug)]
pub struct JobUpdate {
    pub(crate) job_id: String,
    pub(crate) status: JobStatus,
}

impl JobsState {
    /// Creates the state and spawns its updater on the current runtime.
    pub fn start() -> Self {
        Self::start_with_ttl(FINISHED_JOB_TTL)
    }

    pub fn start_with_ttl(ttl: Duration) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let state = JobsState {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            tx,
            ttl,
        };

        let updater_state = state.clone();
        tokio::spawn(async move {
            start_job_updater(updater_state, rx).await;
        });

        state
    }

    /// Records a new job as `Pending`.
    pub async fn register(&self, job_id: &str) {
        let mut jobs = self.jobs.write().await;
        prune_finished(&mut jobs, self.ttl);
        jobs.insert(job_id.to_string(), JobEntry::new(JobStatus::Pending));
    }

    pub async fn status(&self, job_id: &str) -> Option<JobStatus> {
        self.jobs
            .read()
            .await
            .get(job_id)
            .map(|entry| entry.status.clone())
    }

    /// Sends a status change for `job_id` to the updater.
    pub async fn report(&self, job_id: &str, status: JobStatus) {
        let update = JobUpdate {
            job_id: job_id.to_string(),
            status,
        };
        if self.tx.send(update).await.is_err() {
            log::error!("Job updater stopped; dropping update for job {}", job_id);
        }
    }
}

fn prune_finished(jobs: &mut HashMap<String, JobEntry>, ttl: Duration) {
    let now = Instant::now();
    let before = jobs.len();
    jobs.retain(|_, entry| !entry.expired(now, ttl));
    let dropped = before - jobs.len();
    if dropped > 0 {
        log::debug!("Dropped {} finished job(s)", dropped);
    }
}

/// Applies every `JobUpdate` received on `rx` to the shared map until all
/// senders are dropped.
pub async fn start_job_updater(state: JobsState, mut rx: mpsc::Receiver<JobUpdate>) {
    while let Some(update) = rx.recv().await {
        let mut jobs = state.jobs.write().await;
        prune_finished(&mut jobs, state.ttl);
        jobs.insert(update.job_id, JobEntry::new(update.status));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn wait_for(state: &JobsState, job_id: &str, expected: &JobStatus) -> bool {
        for _ in 0..100 {
            if state.status(job_id).await.as_ref() == Some(expected) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        false
    }

    #[actix_web::test]
    async fn registered_jobs_start_pending() {
        let state = JobsState::start();
        state.register("job-1").await;
        assert_eq!(state.status("job-1").await, Some(JobStatus::Pending));
        assert_eq!(state.status("unknown").await, None);
    }

    #[actix_web::test]
    async fn reports_are_applied_in_order() {
        let state = JobsState::start();
        state.register("job-2").await;
        state.report("job-2", JobStatus::InProgress(1)).await;
        state
            .report("job-2", JobStatus::Completed("done".into()))
            .await;

        assert!(wait_for(&state, "job-2", &JobStatus::Completed("done".into())).await);
    }

    #[actix_web::test]
    async fn finished_jobs_expire_after_the_ttl() {
        let state = JobsState::start_with_ttl(Duration::ZERO);
        state.register("done").await;
        state.register("running").await;
        state.report("running", JobStatus::InProgress(1)).await;
        state.report("done", JobStatus::Failed("boom".into())).await;
        assert!(wait_for(&state, "running", &JobStatus::InProgress(1)).await);

        // Wait until the failure landed, whether or not it was pruned yet.
        for _ in 0..100 {
            if state.status("done").await != Some(JobStatus::Pending) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        state.register("next").await;
        assert_eq!(state.status("done").await, None);
        assert_eq!(state.status("running").await, Some(JobStatus::InProgress(1)));
        assert_eq!(state.status("next").await, Some(JobStatus::Pending));
    }

    #[actix_web::test]
    async fn finished_jobs_stay_readable_within_the_ttl() {
        let state = JobsState::start();
        state.register("job-3").await;
        state.report("job-3", JobStatus::Completed("ok".into())).await;
        assert!(wait_for(&state, "job-3", &JobStatus::Completed("ok".into())).await);

        state.register("job-4").await;
        assert_eq!(state.status("job-3").await, Some(JobStatus::Completed("ok".into())));
    }
}
