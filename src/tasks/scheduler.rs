use std::sync::Arc;

use anyhow::Result;
use tokio::sync::watch;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::{config::env::SchedulerConfig, domain::PassReport, tasks::poller::Poller};

/// IDLE/PROCESSING switch. At most one pass holds it at a time.
#[derive(Debug)]
pub struct PassGate {
    busy: watch::Sender<bool>,
}

pub struct PassGuard<'a> {
    gate: &'a PassGate,
}

impl Default for PassGate {
    fn default() -> Self {
        Self {
            busy: watch::channel(false).0,
        }
    }
}

impl PassGate {
    pub fn try_begin(&self) -> Option<PassGuard<'_>> {
        let acquired = self.busy.send_if_modified(|busy| {
            if *busy {
                return false;
            }
            *busy = true;
            true
        });
        acquired.then_some(PassGuard { gate: self })
    }

    pub fn is_busy(&self) -> bool {
        *self.busy.borrow()
    }

    /// Resolves once no pass holds the gate.
    pub async fn wait_idle(&self) {
        let mut idle = self.busy.subscribe();
        // the sender lives in `self`, so the channel cannot close here
        let _ = idle.wait_for(|busy| !*busy).await;
    }
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.gate.busy.send_replace(false);
    }
}

pub struct PollLoop {
    poller: Poller,
    gate: PassGate,
}

impl PollLoop {
    pub fn new(poller: Poller) -> Self {
        Self {
            poller,
            gate: PassGate::default(),
        }
    }

    /// Runs a pass unless one is already in flight. `None` means the tick
    /// was dropped.
    pub async fn tick(&self) -> Option<Result<PassReport>> {
        let Some(_guard) = self.gate.try_begin() else {
            tracing::warn!(target: "scheduler", "previous pass still running; tick dropped");
            return None;
        };
        Some(self.poller.run_pass().await)
    }

    pub async fn tick_logged(&self) {
        if let Some(Err(err)) = self.tick().await {
            tracing::error!(
                target: "scheduler",
                error = %format!("{err:#}"),
                "pass aborted; watermark unchanged, retrying next tick"
            );
        }
    }

    pub async fn wait_idle(&self) {
        self.gate.wait_idle().await;
    }
}

pub async fn configure_poll_job(config: &SchedulerConfig, poll: Arc<PollLoop>) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let job = match &config.poll_cron {
        Some(cron) => {
            let poll = poll.clone();
            let job = Job::new_async(cron.as_str(), move |_id, _l| {
                let poll = poll.clone();
                Box::pin(async move { poll.tick_logged().await })
            })?;
            tracing::info!(target: "scheduler", cron = %cron, "poll job registered");
            job
        }
        None => {
            let poll = poll.clone();
            let job = Job::new_repeated_async(config.poll_interval, move |_id, _l| {
                let poll = poll.clone();
                Box::pin(async move { poll.tick_logged().await })
            })?;
            tracing::info!(
                target: "scheduler",
                interval_secs = config.poll_interval.as_secs(),
                "poll job registered"
            );
            job
        }
    };

    scheduler.add(job).await?;
    scheduler.start().await?;
    Ok(scheduler)
}
