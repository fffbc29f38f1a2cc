use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::AppError;
use crate::filters::FilterSet;
use crate::platform::Platform;
use crate::resolver::{diff_new, fetch_details, newer_than};
use crate::schedule::PollerConfig;
use crate::traits::{FilterStore, Notifier, SourceAdapter, WatermarkStore};

/// Events emitted by the polling driver for monitoring/logging.
#[derive(Debug, Clone)]
pub enum PollEvent<'a> {
    Started {
        platform: Platform,
        interval: Duration,
    },
    CycleStarted {
        platform: Platform,
        cycle_id: Uuid,
    },
    NoSelection {
        platform: Platform,
    },
    Listed {
        platform: Platform,
        visible: usize,
        watermark: Option<&'a str>,
    },
    NewJobs {
        platform: Platform,
        count: usize,
    },
    JobDelivered {
        platform: Platform,
        job_id: &'a str,
    },
    JobSuppressed {
        platform: Platform,
        job_id: &'a str,
    },
    WatermarkAdvanced {
        platform: Platform,
        job_id: &'a str,
    },
    CycleCompleted {
        platform: Platform,
        report: &'a CycleReport,
    },
    CycleFailed {
        platform: Platform,
        error: &'a AppError,
        attempt: u32,
        retry_in: Duration,
    },
    ShuttingDown {
        platform: Platform,
    },
    Stopped {
        platform: Platform,
    },
}

/// Trait for receiving poll events (decoupled logging).
pub trait PollReporter: Send + Sync {
    fn report(&self, event: PollEvent<'_>) {
        let _ = event;
    }
}

/// Reporter that uses the `tracing` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingPollReporter;

impl PollReporter for TracingPollReporter {
    fn report(&self, event: PollEvent<'_>) {
        match event {
            PollEvent::Started { platform, interval } => {
                tracing::info!(%platform, interval_secs = interval.as_secs(), "Poller started");
            }
            PollEvent::CycleStarted { platform, cycle_id } => {
                tracing::debug!(%platform, %cycle_id, "Cycle started");
            }
            PollEvent::NoSelection { platform } => {
                tracing::info!(%platform, "No categories selected, skipping cycle");
            }
            PollEvent::Listed {
                platform,
                visible,
                watermark,
            } => {
                tracing::debug!(%platform, %visible, ?watermark, "Listing fetched");
            }
            PollEvent::NewJobs { platform, count } => {
                if count > 0 {
                    tracing::info!(%platform, %count, "New jobs found");
                }
            }
            PollEvent::JobDelivered { platform, job_id } => {
                tracing::info!(%platform, %job_id, "Job delivered");
            }
            PollEvent::JobSuppressed { platform, job_id } => {
                tracing::debug!(%platform, %job_id, "Job suppressed by keyword filter");
            }
            PollEvent::WatermarkAdvanced { platform, job_id } => {
                tracing::debug!(%platform, %job_id, "Watermark advanced");
            }
            PollEvent::CycleCompleted { platform, report } => {
                tracing::info!(
                    %platform,
                    cycle_id = %report.cycle_id,
                    new = report.new,
                    delivered = report.delivered,
                    suppressed = report.suppressed,
                    "Cycle completed"
                );
            }
            PollEvent::CycleFailed {
                platform,
                error,
                attempt,
                retry_in,
            } => {
                tracing::warn!(
                    %platform,
                    %error,
                    kind = error.kind(),
                    %attempt,
                    retry_in_secs = retry_in.as_secs(),
                    "Cycle failed"
                );
            }
            PollEvent::ShuttingDown { platform } => {
                tracing::info!(%platform, "Poller shutting down");
            }
            PollEvent::Stopped { platform } => {
                tracing::info!(%platform, "Poller stopped");
            }
        }
    }
}

/// Outcome of one successful cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub cycle_id: Uuid,
    /// False when the cycle was skipped for lack of a category selection.
    pub ran: bool,
    pub visible: usize,
    pub new: usize,
    pub delivered: usize,
    pub suppressed: usize,
    /// The id the watermark was advanced to, if any.
    pub watermark: Option<String>,
}

/// Drives the poll → diff → fetch → deliver → advance loop for one platform.
pub struct PollingDriver<A, W, F, N>
where
    A: SourceAdapter,
    W: WatermarkStore,
    F: FilterStore,
    N: Notifier,
{
    adapter: A,
    watermarks: W,
    filters: F,
    notifier: N,
    config: PollerConfig,
}

impl<A, W, F, N> PollingDriver<A, W, F, N>
where
    A: SourceAdapter,
    W: WatermarkStore,
    F: FilterStore,
    N: Notifier,
{
    pub fn new(adapter: A, watermarks: W, filters: F, notifier: N, config: PollerConfig) -> Self {
        Self {
            adapter,
            watermarks,
            filters,
            notifier,
            config,
        }
    }

    pub fn platform(&self) -> Platform {
        self.adapter.platform()
    }

    /// Run cycles on the configured interval until cancellation.
    ///
    /// A failed cycle is retried from scratch after a backoff delay, forever.
    /// Cancellation is observed between cycles and during backoff sleeps; a
    /// cycle in progress always runs to completion.
    pub async fn run<R: PollReporter>(
        &self,
        cancel_token: CancellationToken,
        reporter: &R,
    ) -> Result<(), AppError> {
        let platform = self.platform();
        reporter.report(PollEvent::Started {
            platform,
            interval: self.config.poll_interval,
        });

        let mut ticker = tokio::time::interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        'ticks: loop {
            tokio::select! {
                _ = ticker.tick() => {}
                () = cancel_token.cancelled() => break,
            }

            let mut attempt = 0u32;
            loop {
                match self.run_cycle(reporter).await {
                    Ok(_) => break,
                    Err(error) => {
                        attempt += 1;
                        let retry_in = self.config.retry_config.delay_after(attempt, &error);
                        reporter.report(PollEvent::CycleFailed {
                            platform,
                            error: &error,
                            attempt,
                            retry_in,
                        });
                        tokio::select! {
                            () = tokio::time::sleep(retry_in) => {}
                            () = cancel_token.cancelled() => break 'ticks,
                        }
                    }
                }
            }
        }

        reporter.report(PollEvent::ShuttingDown { platform });
        reporter.report(PollEvent::Stopped { platform });
        Ok(())
    }

    /// Run exactly one cycle.
    ///
    /// Nothing is opened when the platform has no selected category. Once a
    /// session is open it is closed on every path; a close failure is only
    /// logged so it never masks the cycle's own result.
    pub async fn run_cycle<R: PollReporter>(&self, reporter: &R) -> Result<CycleReport, AppError> {
        let platform = self.platform();
        let cycle_id = Uuid::new_v4();
        reporter.report(PollEvent::CycleStarted { platform, cycle_id });

        let filter = self.filters.filter_set(platform).await?;
        if !filter.has_selection() {
            reporter.report(PollEvent::NoSelection { platform });
            return Ok(CycleReport {
                cycle_id,
                ..CycleReport::default()
            });
        }

        let watermark = self
            .watermarks
            .get(platform)
            .await?
            .map(|w| w.last_job_id);

        let mut session = self.adapter.open_session().await?;
        let result = self
            .deliver_new(&mut session, &filter, watermark.as_deref(), cycle_id, reporter)
            .await;
        if let Err(e) = self.adapter.close_session(session).await {
            tracing::warn!(%platform, error = %e, "Failed to close source session");
        }

        let report = result?;
        reporter.report(PollEvent::CycleCompleted {
            platform,
            report: &report,
        });
        Ok(report)
    }

    async fn deliver_new<R: PollReporter>(
        &self,
        session: &mut A::Session,
        filter: &FilterSet,
        watermark: Option<&str>,
        cycle_id: Uuid,
        reporter: &R,
    ) -> Result<CycleReport, AppError> {
        let platform = self.platform();

        let visible = self.adapter.list_visible_jobs(session, filter).await?;
        reporter.report(PollEvent::Listed {
            platform,
            visible: visible.len(),
            watermark,
        });

        let new = newer_than(diff_new(&visible, watermark), watermark, |a, b| {
            self.adapter.compare_ids(a, b)
        });
        reporter.report(PollEvent::NewJobs {
            platform,
            count: new.len(),
        });

        let mut report = CycleReport {
            cycle_id,
            ran: true,
            visible: visible.len(),
            new: new.len(),
            ..CycleReport::default()
        };
        if new.is_empty() {
            return Ok(report);
        }

        let details = fetch_details(&self.adapter, session, &new).await?;

        // Oldest first, so the channel reads chronologically.
        for job in details.iter().rev() {
            if filter.matches(job) {
                self.notifier.notify(platform, job).await?;
                report.delivered += 1;
                reporter.report(PollEvent::JobDelivered {
                    platform,
                    job_id: &job.id,
                });
            } else {
                report.suppressed += 1;
                reporter.report(PollEvent::JobSuppressed {
                    platform,
                    job_id: &job.id,
                });
            }
        }

        if let Some(newest) = details.first() {
            self.watermarks.advance(platform, &newest.id).await?;
            reporter.report(PollEvent::WatermarkAdvanced {
                platform,
                job_id: &newest.id,
            });
            report.watermark = Some(newest.id.clone());
        }

        Ok(report)
    }
}

/// Fetch the source's category list and reconcile it into the filter store.
///
/// Returns the number of categories stored.
pub async fn refresh_categories<A, F>(adapter: &A, filters: &F) -> Result<usize, AppError>
where
    A: SourceAdapter,
    F: FilterStore,
{
    let platform = adapter.platform();
    let mut session = adapter.open_session().await?;
    let fetched = adapter.fetch_categories(&mut session).await;
    if let Err(e) = adapter.close_session(session).await {
        tracing::warn!(%platform, error = %e, "Failed to close source session");
    }

    let categories = fetched?;
    let count = categories.len();
    filters.replace_all(platform, categories).await?;
    tracing::info!(%platform, %count, "Categories refreshed");
    Ok(count)
}
