use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use uuid::Uuid;

use crate::pipeline::Pipeline;

/// Finished jobs retained for polling.
pub const MAX_FINISHED_JOBS: usize = 100;

/// State of one pipeline run.
#[derive(Clone, Serialize, Debug, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Done {
        record_id: String,
        failed_fields: Vec<String>,
    },
    Failed {
        error: String,
    },
}

#[derive(Clone, Copy, Serialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    Manual,
    Scheduled,
    Startup,
}

#[derive(Clone, Serialize, Debug)]
pub struct RunSummary {
    pub job_id: Uuid,
    pub trigger: Trigger,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcome: JobStatus,
}

/// At most one run in flight. Cloning shares the flag.
#[derive(Clone, Debug, Default)]
pub struct RunGuard {
    running: Arc<AtomicBool>,
}

/// Held for the duration of a run; clears the flag when dropped.
#[derive(Debug)]
pub struct RunPermit {
    running: Arc<AtomicBool>,
}

impl RunGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self) -> Option<RunPermit> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunPermit {
                running: Arc::clone(&self.running),
            })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

impl Drop for RunPermit {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

#[derive(Clone)]
pub struct AppState {
    pub jobs: Arc<DashMap<Uuid, JobStatus>>,
    pub guard: RunGuard,
    pub pipeline: Arc<Pipeline>,
    pub schedule: Option<String>,
    pub last_run: Arc<Mutex<Option<RunSummary>>>,
    finished: Arc<Mutex<VecDeque<Uuid>>>,
}

impl AppState {
    pub fn new(pipeline: Pipeline, guard: RunGuard, schedule: Option<String>) -> Self {
        AppState {
            jobs: Arc::new(DashMap::new()),
            guard,
            pipeline: Arc::new(pipeline),
            schedule,
            last_run: Arc::new(Mutex::new(None)),
            finished: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Starts a run in the background unless one is already in flight.
    pub fn try_start_run(&self, trigger: Trigger) -> Option<Uuid> {
        let permit = self.guard.try_acquire()?;
        let job_id = Uuid::new_v4();
        self.jobs.insert(job_id, JobStatus::Pending);

        tracing::info!(%job_id, ?trigger, "run started");

        let state = self.clone();
        tokio::spawn(async move {
            let started_at = Utc::now();
            let pipeline = Arc::clone(&state.pipeline);
            let result = tokio::spawn(async move { pipeline.run().await }).await;
            drop(permit);

            let outcome = match result {
                Ok(Ok(report)) => JobStatus::Done {
                    record_id: report.record_id,
                    failed_fields: report.failed_fields,
                },
                Ok(Err(e)) => {
                    tracing::error!(%job_id, error = %e, "run failed");
                    JobStatus::Failed { error: e.to_string() }
                }
                Err(join_err) => {
                    tracing::error!(%job_id, error = %join_err, "run aborted");
                    JobStatus::Failed {
                        error: format!("run aborted: {join_err}"),
                    }
                }
            };

            state.finish_job(job_id, trigger, started_at, outcome);
        });

        Some(job_id)
    }

    fn finish_job(&self, job_id: Uuid, trigger: Trigger, started_at: DateTime<Utc>, outcome: JobStatus) {
        if let Ok(mut last) = self.last_run.lock() {
            *last = Some(RunSummary {
                job_id,
                trigger,
                started_at,
                finished_at: Utc::now(),
                outcome: outcome.clone(),
            });
        }
        self.jobs.insert(job_id, outcome);

        // Finished jobs are kept for polling, oldest evicted first.
        if let Ok(mut finished) = self.finished.lock() {
            finished.push_back(job_id);
            while finished.len() > MAX_FINISHED_JOBS {
                if let Some(old) = finished.pop_front() {
                    self.jobs.remove(&old);
                }
            }
        }
    }

    pub fn last_run(&self) -> Option<RunSummary> {
        self.last_run.lock().ok().and_then(|l| l.clone())
    }
}
