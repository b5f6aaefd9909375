//! Error types for notification delivery, stream probing and the event log

use std::fmt;

/// Errors raised by a notification backend
#[derive(Debug)]
pub enum DeliveryError {
    /// Connection, TLS or authentication failure
    Transport(String),

    /// The remote end answered but refused the message
    Rejected { status: u16, body: String },

    /// The message could not be built (bad address, encoding)
    InvalidMessage(String),

    /// The backend is misconfigured
    Config(String),
}

impl fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryError::Transport(msg) => write!(f, "transport failure: {}", msg),
            DeliveryError::Rejected { status, body } => {
                write!(f, "rejected with status {}: {}", status, body)
            }
            DeliveryError::InvalidMessage(msg) => write!(f, "invalid message: {}", msg),
            DeliveryError::Config(msg) => write!(f, "invalid backend configuration: {}", msg),
        }
    }
}

impl std::error::Error for DeliveryError {}

impl From<reqwest::Error> for DeliveryError {
    fn from(err: reqwest::Error) -> Self {
        DeliveryError::Transport(err.to_string())
    }
}

impl From<lettre::transport::smtp::Error> for DeliveryError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        DeliveryError::Transport(err.to_string())
    }
}

impl From<lettre::error::Error> for DeliveryError {
    fn from(err: lettre::error::Error) -> Self {
        DeliveryError::InvalidMessage(err.to_string())
    }
}

impl From<lettre::address::AddressError> for DeliveryError {
    fn from(err: lettre::address::AddressError) -> Self {
        DeliveryError::InvalidMessage(err.to_string())
    }
}

/// Reasons a stream sample could not be obtained or decoded
#[derive(Debug)]
pub enum ProbeError {
    /// The decoder process could not be started
    Spawn(std::io::Error),

    /// The decoder exited unsuccessfully
    ExitStatus(Option<i32>),

    /// The decoder exited cleanly but left no artifact behind
    MissingArtifact,

    /// The artifact exists but could not be turned into samples
    Decode(String),
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeError::Spawn(err) => write!(f, "failed to start decoder: {}", err),
            ProbeError::ExitStatus(Some(code)) => write!(f, "decoder exited with code {}", code),
            ProbeError::ExitStatus(None) => write!(f, "decoder terminated by signal"),
            ProbeError::MissingArtifact => write!(f, "decoder produced no sample"),
            ProbeError::Decode(msg) => write!(f, "failed to decode sample: {}", msg),
        }
    }
}

impl std::error::Error for ProbeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProbeError::Spawn(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type alias for event log operations
pub type EventLogResult<T> = Result<T, EventLogError>;

/// Errors from reading or writing the daily log files
#[derive(Debug)]
pub enum EventLogError {
    /// I/O error (file access, directory listing)
    Io(std::io::Error),
}

impl fmt::Display for EventLogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventLogError::Io(err) => write!(f, "event log I/O error: {}", err),
        }
    }
}

impl std::error::Error for EventLogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EventLogError::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for EventLogError {
    fn from(err: std::io::Error) -> Self {
        EventLogError::Io(err)
    }
}
