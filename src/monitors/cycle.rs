//! One pass of the watchdog
//!
//! ```text
//! prune logs → day/night mode → check every configured channel → alert on failures
//!            → remove artifacts → summary (inside a trigger band)
//! ```
//!
//! A cycle never fails: every problem ends up in the event log or in an
//! alert, and the process exits normally afterwards.

use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use crate::alerts::{AlertDispatcher, DispatchReport};
use crate::clock::Clock;
use crate::config::Config;
use crate::event_log::{Entry, EventLog};
use crate::probe::ffmpeg::FfmpegProbe;
use crate::summary::{SummaryAggregator, SummaryWindow};
use crate::{Channel, ChannelRole};

use super::health::{ChannelHealthEvaluator, DailyMode, HealthStatus};

pub const ALERT_SUBJECT: &str = "🚨 ALERT: problems detected on streams";

/// Behaviour knobs for a cycle.
#[derive(Debug, Clone, Copy)]
pub struct CycleOptions {
    pub retention_days: u32,
    pub summary_once_per_band: bool,
}

/// What a cycle did, mostly for tests and tracing.
#[derive(Debug)]
pub struct CycleReport {
    pub mode: DailyMode,
    pub statuses: Vec<(ChannelRole, HealthStatus)>,
    pub alert: Option<DispatchReport>,
    pub summary: Option<SummaryOutcome>,
}

#[derive(Debug)]
pub enum SummaryOutcome {
    Sent(DispatchReport),
    /// Generation failed; a degraded notice went out instead
    Degraded(DispatchReport),
    /// A summary for this band is already on record
    Skipped,
}

pub struct MonitorCycle {
    channels: Vec<Channel>,
    evaluator: ChannelHealthEvaluator,
    dispatcher: AlertDispatcher,
    aggregator: SummaryAggregator,
    log: EventLog,
    clock: Arc<dyn Clock>,
    options: CycleOptions,
}

impl MonitorCycle {
    pub fn new(
        channels: Vec<Channel>,
        evaluator: ChannelHealthEvaluator,
        dispatcher: AlertDispatcher,
        log: EventLog,
        options: CycleOptions,
    ) -> Self {
        let aggregator = SummaryAggregator::new(log.clone(), channels.clone());
        let clock = log.clock().clone();
        Self {
            channels,
            evaluator,
            dispatcher,
            aggregator,
            log,
            clock,
            options,
        }
    }

    /// Wire up the production collaborators for `config`.
    pub fn from_config(config: &Config, clock: Arc<dyn Clock>) -> Self {
        let log = EventLog::new(config.log_dir.clone(), clock);
        let evaluator = ChannelHealthEvaluator::new(Arc::new(FfmpegProbe::new(config)));
        let dispatcher = AlertDispatcher::from_config(config, log.clone());
        let options = CycleOptions {
            retention_days: config.retention_days,
            summary_once_per_band: config.summary_once_per_band,
        };
        Self::new(config.channels(), evaluator, dispatcher, log, options)
    }

    #[instrument(skip(self))]
    pub async fn run(&self) -> CycleReport {
        match self.log.prune(self.options.retention_days) {
            Ok(removed) if !removed.is_empty() => info!("pruned {} log files", removed.len()),
            Ok(_) => {}
            Err(e) => error!("failed to prune logs: {e}"),
        }

        self.log.record(&Entry::CycleStarted);

        let mode = DailyMode::at(self.clock.now());
        debug!("running in {mode:?}");

        let mut statuses = vec![];
        for channel in self.channels.iter().filter(|channel| channel.is_configured()) {
            let status = self.evaluator.evaluate(channel, mode).await;
            self.record_check(channel.role, &status, mode);
            statuses.push((channel.role, status));
        }

        let failures: Vec<String> = statuses
            .iter()
            .filter_map(|(role, status)| status.alert_line(*role))
            .collect();

        let alert = if failures.is_empty() {
            None
        } else {
            let body = format!(
                "The following problems were detected:\n\n{}",
                failures.join("\n")
            );
            Some(self.dispatcher.dispatch(ALERT_SUBJECT, &body).await)
        };

        self.evaluator.probe().cleanup();

        let summary = self.maybe_summarize().await;

        CycleReport {
            mode,
            statuses,
            alert,
            summary,
        }
    }

    fn record_check(&self, role: ChannelRole, status: &HealthStatus, mode: DailyMode) {
        let night = mode == DailyMode::Nighttime;
        if night && status.is_ok() {
            self.log.record(&Entry::NightMode(role));
        }
        self.log.record(&Entry::Check {
            channel: role,
            status: status.event_status(),
            night,
        });
    }

    async fn maybe_summarize(&self) -> Option<SummaryOutcome> {
        let now = self.clock.now();
        let window = SummaryWindow::triggered_at(now)?;

        if self.options.summary_once_per_band {
            match self.aggregator.already_sent(window.band, now) {
                Ok(true) => {
                    debug!("summary for {:?} band already sent", window.band);
                    return Some(SummaryOutcome::Skipped);
                }
                Ok(false) => {}
                Err(e) => warn!("could not check for an earlier summary, sending anyway: {e}"),
            }
        }

        self.log.record(&Entry::SummaryStarted {
            from: window.start,
            to: window.end,
        });

        match self.aggregator.summarize(&window) {
            Ok(report) => {
                let sent = self.dispatcher.dispatch_chat(&report.to_string()).await;
                // only a delivered summary counts for the once-per-band guard
                if sent.chat.is_ok() {
                    self.log.record(&Entry::SummarySent {
                        primary: report.tally(ChannelRole::Primary),
                        secondary: report.tally(ChannelRole::Secondary),
                    });
                }
                Some(SummaryOutcome::Sent(sent))
            }
            Err(e) => {
                error!("failed to build summary: {e}");
                self.log.record(&Entry::SummaryFailed {
                    error: e.to_string(),
                });
                let notice = format!(
                    "⚠️ Error generating the summary of the last {}h: {e}",
                    crate::summary::WINDOW_HOURS
                );
                Some(SummaryOutcome::Degraded(
                    self.dispatcher.dispatch_chat(&notice).await,
                ))
            }
        }
    }
}
