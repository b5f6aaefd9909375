pub mod alerts;
pub mod clock;
pub mod config;
pub mod email;
pub mod error;
pub mod event_log;
pub mod manual;
pub mod monitors;
pub mod probe;
pub mod summary;
pub mod telegram;
pub mod util;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which of the monitored streams a channel is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelRole {
    Primary,
    Secondary,
}

impl ChannelRole {
    pub const ALL: [ChannelRole; 2] = [ChannelRole::Primary, ChannelRole::Secondary];

    /// Short identifier, used for artifact names and tracing fields.
    pub fn id(self) -> &'static str {
        match self {
            ChannelRole::Primary => "primary",
            ChannelRole::Secondary => "secondary",
        }
    }
}

impl fmt::Display for ChannelRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelRole::Primary => write!(f, "Primary stream"),
            ChannelRole::Secondary => write!(f, "Secondary stream"),
        }
    }
}

/// A monitored audio stream. A channel without an address is not configured
/// and takes no part in a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub role: ChannelRole,
    pub url: Option<String>,
}

impl Channel {
    pub fn new(role: ChannelRole, url: Option<String>) -> Self {
        // an empty address is the same as no address
        let url = url.filter(|url| !url.trim().is_empty());
        Self { role, url }
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }
}
