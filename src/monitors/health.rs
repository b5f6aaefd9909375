use std::sync::Arc;

use chrono::{NaiveDateTime, Timelike};
use tracing::{debug, instrument, warn};

use crate::event_log::EventStatus;
use crate::probe::{AudioProbe, ProbeResult};
use crate::{Channel, ChannelRole};

/// Last hour (exclusive) of the night window that starts at midnight.
const NIGHT_END_HOUR: u32 = 5;

/// Behaviour switch derived from the local time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DailyMode {
    Daytime,
    /// 00:00-04:59, when programming may legitimately go quiet
    Nighttime,
}

impl DailyMode {
    pub fn at(time: NaiveDateTime) -> DailyMode {
        if time.hour() < NIGHT_END_HOUR {
            DailyMode::Nighttime
        } else {
            DailyMode::Daytime
        }
    }
}

/// Per-channel verdict of one check, with a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Ok(String),
    Silent(String),
    Unreachable(String),
}

impl HealthStatus {
    /// Decide a channel's health from its probe result:
    ///
    /// ```text
    /// probe failed             → Unreachable
    /// night                    → Ok (reachability is enough)
    /// no sound                 → Silent
    /// otherwise                → Ok
    /// ```
    pub fn evaluate(role: ChannelRole, probe: &ProbeResult, mode: DailyMode) -> HealthStatus {
        let Some(has_sound) = probe.has_sound() else {
            return HealthStatus::Unreachable(format!("could not reach {role}"));
        };

        if mode == DailyMode::Nighttime {
            return HealthStatus::Ok("functioning (night mode)".to_string());
        }

        if !has_sound {
            return HealthStatus::Silent(format!("prolonged silence detected on {role}"));
        }

        HealthStatus::Ok("functioning correctly".to_string())
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, HealthStatus::Ok(_))
    }

    pub fn reason(&self) -> &str {
        match self {
            HealthStatus::Ok(reason)
            | HealthStatus::Silent(reason)
            | HealthStatus::Unreachable(reason) => reason,
        }
    }

    pub fn event_status(&self) -> EventStatus {
        match self {
            HealthStatus::Ok(_) => EventStatus::Ok,
            HealthStatus::Silent(_) => EventStatus::Silent,
            HealthStatus::Unreachable(_) => EventStatus::Unreachable,
        }
    }

    /// Line describing this status in an alert body, `None` when healthy.
    pub fn alert_line(&self, role: ChannelRole) -> Option<String> {
        match self {
            HealthStatus::Ok(_) => None,
            HealthStatus::Unreachable(reason) => Some(format!("🛑 {role} down: {reason}")),
            HealthStatus::Silent(reason) => Some(format!("⚠️ {role} silent: {reason}")),
        }
    }
}

/// Samples a channel and applies the day/night policy to the result.
#[derive(Clone)]
pub struct ChannelHealthEvaluator {
    probe: Arc<dyn AudioProbe>,
}

impl ChannelHealthEvaluator {
    pub fn new(probe: Arc<dyn AudioProbe>) -> Self {
        Self { probe }
    }

    pub fn probe(&self) -> &Arc<dyn AudioProbe> {
        &self.probe
    }

    #[instrument(skip(self, channel), fields(role = channel.role.id()))]
    pub async fn evaluate(&self, channel: &Channel, mode: DailyMode) -> HealthStatus {
        let result = self.probe.probe(channel).await;
        if let ProbeResult::Failed { reason } = &result {
            warn!("{}: probe failed: {reason}", channel.role);
        }

        let status = HealthStatus::evaluate(channel.role, &result, mode);
        debug!("{}: {status:?} ({mode:?})", channel.role);
        status
    }
}
