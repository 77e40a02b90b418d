//! Background catalog sync.
//!
//! One cycle runs immediately at startup, then every
//! `sync_interval_hours` through a [`JobScheduler`].

use std::sync::Arc;
use std::time::Duration;

use storefeed_sync::CatalogSync;
use tokio::task::JoinHandle;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive for
/// the lifetime of the process. Dropping it shuts down all scheduled jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    sync: Arc<CatalogSync>,
    interval_hours: u64,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;
    register_sync_job(&scheduler, sync, interval_hours).await?;
    scheduler.start().await?;
    Ok(scheduler)
}

/// Kicks off the startup cycle without delaying the listener.
pub fn spawn_startup_sync(sync: Arc<CatalogSync>) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!("scheduler: running startup catalog sync");
        run_sync_job(&sync).await;
    })
}

async fn register_sync_job(
    scheduler: &JobScheduler,
    sync: Arc<CatalogSync>,
    interval_hours: u64,
) -> Result<(), JobSchedulerError> {
    let interval = Duration::from_secs(interval_hours.max(1).saturating_mul(3600));

    let job = Job::new_repeated_async(interval, move |_uuid, _lock| {
        let sync = Arc::clone(&sync);

        Box::pin(async move {
            tracing::info!("scheduler: starting periodic catalog sync");
            run_sync_job(&sync).await;
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(interval_hours, "scheduler: catalog sync registered");
    Ok(())
}

async fn run_sync_job(sync: &CatalogSync) {
    match sync.run_once().await {
        Ok(report) => tracing::info!(
            pages = report.pages_requested,
            records = report.records_accumulated,
            outcome = ?report.outcome,
            "scheduler: catalog sync complete"
        ),
        Err(e) => tracing::error!(error = %e, "scheduler: catalog sync failed"),
    }
}
