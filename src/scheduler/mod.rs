pub mod jobs;
pub mod recurrence;

use std::future::Future;
use std::pin::Pin;

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::info;
use uuid::Uuid;

pub use recurrence::{weekly_cron_expr, JobZone, Recurrence};

type JobFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Wrapper around tokio-cron-scheduler running recurring jobs in one zone
pub struct Scheduler {
    inner: JobScheduler,
    zone: JobZone,
}

impl Scheduler {
    /// Create a new scheduler whose weekly jobs follow `zone`
    pub async fn new(zone: JobZone) -> Result<Self> {
        let inner = JobScheduler::new()
            .await
            .context("Failed to create job scheduler")?;
        Ok(Self { inner, zone })
    }

    /// Register a recurring job. The task is re-armed after every run.
    pub async fn add_job<F>(&self, name: &str, recurrence: &Recurrence, task: F) -> Result<()>
    where
        F: Fn() -> JobFuture + Send + Sync + 'static,
    {
        let job_name = name.to_string();
        let run = move |_uuid: Uuid, _lock: JobScheduler| -> JobFuture {
            let name = job_name.clone();
            let fut = task();
            Box::pin(async move {
                info!("Running scheduled job: {}", name);
                fut.await;
            })
        };

        let job = match recurrence {
            Recurrence::Every { interval } => Job::new_repeated_async(*interval, run),
            Recurrence::Weekly { weekday, time } => {
                let expr = weekly_cron_expr(*weekday, *time);
                match self.zone {
                    JobZone::Named(tz) => Job::new_async_tz(expr.as_str(), tz, run),
                    JobZone::Local => Job::new_async_tz(expr.as_str(), Local, run),
                }
            }
        }
        .with_context(|| format!("Failed to create job: {}", name))?;

        self.inner
            .add(job)
            .await
            .with_context(|| format!("Failed to add job: {}", name))?;

        match recurrence.next_fire_after(&self.zone, Utc::now()) {
            Some(next) => info!(
                "Scheduled job '{}' {} ({}), next run at {}",
                name, recurrence, self.zone, next
            ),
            None => info!("Scheduled job '{}' {} ({})", name, recurrence, self.zone),
        }
        Ok(())
    }

    /// Start all registered jobs and keep them running until `shutdown`
    /// resolves. Run this on its own task.
    pub async fn run<F>(mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        self.inner
            .start()
            .await
            .context("Failed to start scheduler")?;
        info!("Scheduler started");

        shutdown.await;

        self.inner
            .shutdown()
            .await
            .context("Failed to shutdown scheduler")?;
        info!("Scheduler stopped");
        Ok(())
    }
}
