//! Cron-driven runs.
//!
//! Each tick asks the shared [`AppState`] to start a run; a tick landing
//! while a manual or earlier scheduled run is still in flight is skipped.

use anyhow::Result;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::state::{AppState, Trigger};

/// Starts the scheduler. The returned handle must be kept alive.
pub async fn start_scheduler(state: AppState, schedule: &str) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let tick_state = state.clone();
    let job = Job::new_async(schedule, move |_uuid, _lock| {
        let state = tick_state.clone();
        Box::pin(async move {
            scheduled_tick(&state);
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;

    tracing::info!(%schedule, "scheduler started");
    Ok(scheduler)
}

fn scheduled_tick(state: &AppState) -> bool {
    match state.try_start_run(Trigger::Scheduled) {
        Some(job_id) => {
            tracing::info!(%job_id, "scheduled run started");
            true
        }
        None => {
            tracing::warn!("previous run still in progress, skipping scheduled run");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::tests::{gated_pipeline, wait_for_finish};
    use crate::state::RunGuard;

    #[tokio::test]
    async fn tick_skips_while_busy() {
        let (pipeline, gate, _renders) = gated_pipeline();
        let state = AppState::new(pipeline, RunGuard::new(), None);

        let job_id = state.try_start_run(Trigger::Manual).unwrap();
        assert!(!scheduled_tick(&state));
        assert_eq!(state.jobs.len(), 1);

        gate.notify_one();
        wait_for_finish(&state, job_id).await;
        assert!(scheduled_tick(&state));
        assert_eq!(state.jobs.len(), 2);
    }

    #[tokio::test]
    async fn rejects_invalid_schedule() {
        let (pipeline, _gate, _renders) = gated_pipeline();
        let state = AppState::new(pipeline, RunGuard::new(), None);
        assert!(start_scheduler(state, "not a cron line").await.is_err());
    }
}
