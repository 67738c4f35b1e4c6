//! The run loop: cycles, persistent-error cooldowns and cron waits.

mod schedule;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, TimeDelta};

pub use schedule::{CronError, CronSchedule};

use crate::core::{Credentials, PersistentErrorBackoff, RetryConfig};
use crate::extract::{Cycle, ExtractionRun};

/// Where the run loop currently is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunState {
    RunningCycle,
    /// Cooling down after a failed cycle.
    BackoffWait(Duration),
    /// Waiting for the next scheduled fire time.
    ScheduleWait(DateTime<Local>),
    Terminated,
}

/// Cycle counts of a finished run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: u64,
    pub failed: u64,
}

/// Drives a [`Cycle`] until it runs out of schedule or is shut down.
pub struct Runner {
    cycle: Arc<dyn Cycle>,
    credentials: Credentials,
    retry: RetryConfig,
    backoff: PersistentErrorBackoff,
    schedule: Option<CronSchedule>,
}

impl Runner {
    pub fn new(cycle: Arc<dyn Cycle>, credentials: Credentials) -> Self {
        Self {
            cycle,
            credentials,
            retry: RetryConfig::default(),
            backoff: PersistentErrorBackoff::default(),
            schedule: None,
        }
    }

    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn backoff(mut self, backoff: PersistentErrorBackoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Repeat successful cycles on `schedule`. Without one the loop ends
    /// after the first success.
    pub fn schedule(mut self, schedule: Option<CronSchedule>) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.backoff.consecutive_failures()
    }

    /// Run until there is nothing scheduled.
    pub async fn run(&mut self) -> RunSummary {
        self.run_until(std::future::pending::<()>()).await
    }

    /// Run until there is nothing scheduled or `shutdown` resolves.
    ///
    /// `shutdown` is only observed between cycles; a running cycle always
    /// completes first.
    pub async fn run_until<S>(&mut self, shutdown: S) -> RunSummary
    where
        S: Future<Output = ()>,
    {
        let mut shutdown = std::pin::pin!(shutdown);
        let mut summary = RunSummary::default();
        let mut state = RunState::RunningCycle;

        loop {
            state = match state {
                RunState::RunningCycle => self.run_cycle(&mut summary).await,
                RunState::BackoffWait(cooldown) => {
                    tokio::select! {
                        biased;
                        _ = &mut shutdown => RunState::Terminated,
                        _ = tokio::time::sleep(cooldown) => RunState::RunningCycle,
                    }
                }
                RunState::ScheduleWait(at) => {
                    let wait = (at - Local::now()).to_std().unwrap_or(Duration::ZERO);
                    tokio::select! {
                        biased;
                        _ = &mut shutdown => RunState::Terminated,
                        _ = tokio::time::sleep(wait) => RunState::RunningCycle,
                    }
                }
                RunState::Terminated => break,
            };
        }

        tracing::info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "extraction loop stopped"
        );
        summary
    }

    async fn run_cycle(&mut self, summary: &mut RunSummary) -> RunState {
        let run = ExtractionRun::new(self.credentials.clone(), self.retry.clone());
        tracing::info!("starting extraction");

        match self.cycle.run_cycle(&run).await {
            Ok(report) => {
                summary.succeeded += 1;
                self.backoff.record_success();
                tracing::info!(
                    rows = report.rows,
                    columns = report.columns,
                    bytes = report.bytes,
                    "extraction finished"
                );
                self.next_scheduled()
            }
            Err(err) => {
                summary.failed += 1;
                let cooldown = self.backoff.record_failure();
                let retry_at = local_after(cooldown);
                tracing::error!(
                    error = %err,
                    transient = err.is_transient(),
                    consecutive_failures = self.backoff.consecutive_failures(),
                    "extraction failed"
                );
                tracing::warn!(
                    cooldown_ms = cooldown.as_millis() as u64,
                    retry_at = %retry_at,
                    "persistent error, will retry at {} (in {})",
                    retry_at.format("%a %d %b %Y %H:%M:%S"),
                    human(cooldown)
                );
                RunState::BackoffWait(cooldown)
            }
        }
    }

    fn next_scheduled(&self) -> RunState {
        let Some(schedule) = &self.schedule else {
            return RunState::Terminated;
        };

        let now = Local::now();
        match schedule.next_after(&now) {
            Some(next) => {
                let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
                tracing::info!(
                    schedule = %schedule,
                    "next extraction at {} (in {})",
                    next.format("%a %d %b %Y %H:%M"),
                    human(wait)
                );
                RunState::ScheduleWait(next)
            }
            None => {
                tracing::warn!(schedule = %schedule, "schedule has no upcoming fire time");
                RunState::Terminated
            }
        }
    }
}

fn local_after(wait: Duration) -> DateTime<Local> {
    let now = Local::now();
    TimeDelta::from_std(wait)
        .ok()
        .and_then(|d| now.checked_add_signed(d))
        .unwrap_or(now)
}

/// `1h 2m 3s` style rendering, dropping zero leading units.
fn human(d: Duration) -> String {
    let secs = d.as_secs();
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    match (h, m) {
        (0, 0) => format!("{s}s"),
        (0, _) => format!("{m}m {s}s"),
        _ => format!("{h}h {m}m {s}s"),
    }
}

