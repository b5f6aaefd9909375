//! Rolling six-hour status summary
//!
//! Twice a day, during the first minutes of 06:00 and 18:00, the watchdog
//! re-reads the event log for the preceding six hours and reports per
//! channel how many checks passed and when outages happened.
//!
//! ```text
//! 🌆 Evening - summary of the last 6h:
//!
//! 📡 Primary stream: ✅ 3 OK | ❌ 2 errors
//!    🕐 First error: 14:05
//! 📻 Secondary stream: not configured
//! ```

use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use tracing::{debug, instrument};

use crate::error::EventLogResult;
use crate::event_log::{EventLog, Tally};
use crate::{Channel, ChannelRole};

/// Length of the trailing window a summary covers.
pub const WINDOW_HOURS: i64 = 6;

/// A band covers minutes `0..=BAND_LAST_MINUTE` of its hour.
pub const BAND_LAST_MINUTE: u32 = 15;

/// One of the two daily trigger bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryBand {
    Morning,
    Evening,
}

impl SummaryBand {
    /// The band `time` falls into, if any.
    pub fn at(time: NaiveDateTime) -> Option<SummaryBand> {
        if time.minute() > BAND_LAST_MINUTE {
            return None;
        }
        match time.hour() {
            6 => Some(SummaryBand::Morning),
            18 => Some(SummaryBand::Evening),
            _ => None,
        }
    }

    pub fn hour(self) -> u32 {
        match self {
            SummaryBand::Morning => 6,
            SummaryBand::Evening => 18,
        }
    }

    /// First instant of the band on `date`.
    pub fn start_on(self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(NaiveTime::from_hms_opt(self.hour(), 0, 0).unwrap_or_default())
    }

    pub fn banner(self) -> &'static str {
        match self {
            SummaryBand::Morning => "🌅 Morning",
            SummaryBand::Evening => "🌆 Evening",
        }
    }
}

/// Trailing interval a summary is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub band: SummaryBand,
}

impl SummaryWindow {
    /// The window ending at `now`, when `now` is inside a trigger band.
    pub fn triggered_at(now: NaiveDateTime) -> Option<SummaryWindow> {
        SummaryBand::at(now).map(|band| SummaryWindow::ending_at(now, band))
    }

    pub fn ending_at(now: NaiveDateTime, band: SummaryBand) -> SummaryWindow {
        SummaryWindow {
            start: now - Duration::hours(WINDOW_HOURS),
            end: now,
            band,
        }
    }
}

/// Counts for one channel over a window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSummary {
    pub role: ChannelRole,
    pub configured: bool,
    pub ok_count: usize,
    /// `HH:MM` of every outage, in scan order
    pub outage_times: Vec<String>,
}

impl ChannelSummary {
    fn new(channel: &Channel) -> Self {
        Self {
            role: channel.role,
            configured: channel.is_configured(),
            ok_count: 0,
            outage_times: vec![],
        }
    }

    /// Smallest `HH:MM` among the outages; the first seen wins a tie.
    pub fn first_outage(&self) -> Option<&str> {
        self.outage_times
            .iter()
            .fold(None::<&String>, |first, time| match first {
                Some(first) if first <= time => Some(first),
                _ => Some(time),
            })
            .map(String::as_str)
    }

    pub fn tally(&self) -> Tally {
        Tally {
            ok: self.ok_count,
            errors: self.outage_times.len(),
        }
    }

    fn icon(&self) -> &'static str {
        match self.role {
            ChannelRole::Primary => "📡",
            ChannelRole::Secondary => "📻",
        }
    }
}

impl fmt::Display for ChannelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let icon = self.icon();
        if !self.configured {
            return writeln!(f, "{icon} {}: not configured", self.role);
        }

        match self.first_outage() {
            None => writeln!(f, "{icon} {}: ✅ all OK ({} checks)", self.role, self.ok_count),
            Some(first) => {
                writeln!(
                    f,
                    "{icon} {}: ✅ {} OK | ❌ {} errors",
                    self.role,
                    self.ok_count,
                    self.outage_times.len()
                )?;
                writeln!(f, "   🕐 First error: {first}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryReport {
    pub band: SummaryBand,
    pub channels: Vec<ChannelSummary>,
}

impl SummaryReport {
    pub fn channel(&self, role: ChannelRole) -> Option<&ChannelSummary> {
        self.channels.iter().find(|summary| summary.role == role)
    }

    pub fn tally(&self, role: ChannelRole) -> Tally {
        self.channel(role).map(ChannelSummary::tally).unwrap_or_default()
    }
}

impl fmt::Display for SummaryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} - summary of the last {WINDOW_HOURS}h:", self.band.banner())?;
        writeln!(f)?;
        for channel in &self.channels {
            write!(f, "{channel}")?;
        }
        Ok(())
    }
}

/// Builds [`SummaryReport`]s from the event log.
#[derive(Debug, Clone)]
pub struct SummaryAggregator {
    log: EventLog,
    channels: Vec<Channel>,
}

impl SummaryAggregator {
    pub fn new(log: EventLog, channels: Vec<Channel>) -> Self {
        Self { log, channels }
    }

    #[instrument(skip(self))]
    pub fn summarize(&self, window: &SummaryWindow) -> EventLogResult<SummaryReport> {
        let mut channels: Vec<ChannelSummary> =
            self.channels.iter().map(ChannelSummary::new).collect();

        for event in self.log.read_window(window.start, window.end)? {
            let (Some(role), Some(status)) = (event.channel, event.status) else {
                continue;
            };
            let Some(summary) = channels.iter_mut().find(|summary| summary.role == role) else {
                continue;
            };

            if status.is_outage() {
                summary
                    .outage_times
                    .push(event.timestamp.format("%H:%M").to_string());
            } else {
                summary.ok_count += 1;
            }
        }

        debug!("summarized {} channels", channels.len());
        Ok(SummaryReport {
            band: window.band,
            channels,
        })
    }

    /// Whether a summary was already recorded inside the band `now` is in.
    pub fn already_sent(&self, band: SummaryBand, now: NaiveDateTime) -> EventLogResult<bool> {
        let band_start = band.start_on(now.date());
        let events = self.log.read_window(band_start, now)?;
        Ok(events.iter().any(|event| event.is_summary_sent()))
    }
}
