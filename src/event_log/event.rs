//! Typed view of the daily log lines
//!
//! The text format is the persisted history and has to stay readable for
//! files written by earlier releases, so the vocabulary below is fixed:
//!
//! ```text
//! [2024-01-01 06:00:00] 🎵 Stream Principal funcionando correctamente
//! [2024-01-01 06:05:00] ❌ No se pudo acceder al Stream Secundario.
//! [2024-01-01 06:10:00] 🔇 Silencio prolongado detectado en el Stream Principal.
//! [2023-06-01 06:00:00] 🎵 Stream funcionando correctamente      (single-stream era)
//! ```
//!
//! Rendering and parsing both live here; nothing else touches raw lines.

use std::fmt;

use chrono::NaiveDateTime;

use crate::ChannelRole;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const UNREACHABLE_GLYPH: &str = "❌";
const SILENT_GLYPH: &str = "🔇";
const SUMMARY_SENT_MARKER: &str = "📋 Resumen enviado";
const LEGACY_OK_MARKER: &str = "🎵 Stream funcionando correctamente";
const PRIMARY_WORD: &str = "Principal";
const SECONDARY_WORD: &str = "Secundario";

/// Outcome of one channel check as recorded in the log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventStatus {
    Ok,
    Silent,
    Unreachable,
}

impl EventStatus {
    pub fn is_outage(self) -> bool {
        !matches!(self, EventStatus::Ok)
    }
}

/// Name of a channel inside log lines.
pub fn log_name(role: ChannelRole) -> &'static str {
    match role {
        ChannelRole::Primary => "Stream Principal",
        ChannelRole::Secondary => "Stream Secundario",
    }
}

/// Per-channel counters reported in the summary bookkeeping line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub ok: usize,
    pub errors: usize,
}

/// Every kind of line this crate writes.
#[derive(Debug, Clone)]
pub enum Entry {
    CycleStarted,
    NightMode(ChannelRole),
    Check {
        channel: ChannelRole,
        status: EventStatus,
        night: bool,
    },
    EmailSent {
        subject: String,
    },
    EmailFailed {
        error: String,
    },
    ChatSent,
    ChatFailed {
        error: String,
    },
    LogPruned {
        file: String,
    },
    SummaryStarted {
        from: NaiveDateTime,
        to: NaiveDateTime,
    },
    SummarySent {
        primary: Tally,
        secondary: Tally,
    },
    SummaryFailed {
        error: String,
    },
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::CycleStarted => write!(f, "⏱ Iniciando monitoreo..."),
            Entry::NightMode(role) => write!(
                f,
                "🌙 Horario nocturno (00:00-05:00): omitiendo detección de silencio en {}",
                log_name(*role)
            ),
            Entry::Check {
                channel,
                status,
                night,
            } => {
                let name = log_name(*channel);
                match status {
                    EventStatus::Ok if *night => {
                        write!(f, "🎵 {name} funcionando correctamente (modo nocturno)")
                    }
                    EventStatus::Ok => write!(f, "🎵 {name} funcionando correctamente"),
                    EventStatus::Unreachable => {
                        write!(f, "{UNREACHABLE_GLYPH} No se pudo acceder al {name}.")
                    }
                    EventStatus::Silent => {
                        write!(f, "{SILENT_GLYPH} Silencio prolongado detectado en el {name}.")
                    }
                }
            }
            Entry::EmailSent { subject } => write!(f, "📧 Alerta enviada: {subject}"),
            Entry::EmailFailed { error } => write!(f, "🚫 Error al enviar email: {error}"),
            Entry::ChatSent => write!(f, "📲 Alerta enviada a Telegram"),
            // no outage glyph here: legacy parsing would count it against the primary stream
            Entry::ChatFailed { error } => write!(f, "🚫 Error al enviar Telegram: {error}"),
            Entry::LogPruned { file } => write!(f, "🧹 Log eliminado: {file}"),
            Entry::SummaryStarted { from, to } => write!(
                f,
                "📊 Generando resumen desde {} hasta {}",
                from.format("%H:%M"),
                to.format("%H:%M")
            ),
            Entry::SummarySent { primary, secondary } => write!(
                f,
                "{SUMMARY_SENT_MARKER}: Principal({} OK, {} errores), Secundario({} OK, {} errores)",
                primary.ok, primary.errors, secondary.ok, secondary.errors
            ),
            Entry::SummaryFailed { error } => write!(f, "🚫 Error generando resumen: {error}"),
        }
    }
}

/// Prefix a message with its bracketed timestamp.
pub fn render_line(timestamp: NaiveDateTime, message: &str) -> String {
    format!("[{}] {}", timestamp.format(TIMESTAMP_FORMAT), message)
}

/// One parsed log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub timestamp: NaiveDateTime,
    /// Channel the line is attributed to, if it is a check outcome
    pub channel: Option<ChannelRole>,
    pub status: Option<EventStatus>,
    pub raw_line: String,
}

impl LogEvent {
    /// Parse a raw line. Returns `None` when the first bracketed token is
    /// missing or is not a timestamp. Anything before the opening bracket
    /// (such as a `INFO:root:` logger prefix) is ignored.
    pub fn parse(line: &str) -> Option<LogEvent> {
        let line = line.trim_end_matches(['\r', '\n']);
        let open = line.find('[')?;
        let close = open + line[open..].find(']')?;

        let stamp = &line[open + 1..close];
        let timestamp = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok()?;

        let (channel, status) = match classify(line) {
            Some((channel, status)) => (Some(channel), Some(status)),
            None => (None, None),
        };

        Some(LogEvent {
            timestamp,
            channel,
            status,
            raw_line: line.to_string(),
        })
    }

    /// Whether this line records a sent summary.
    pub fn is_summary_sent(&self) -> bool {
        self.raw_line.contains(SUMMARY_SENT_MARKER)
    }
}

fn outage_glyph(line: &str) -> Option<EventStatus> {
    if line.contains(UNREACHABLE_GLYPH) {
        Some(EventStatus::Unreachable)
    } else if line.contains(SILENT_GLYPH) {
        Some(EventStatus::Silent)
    } else {
        None
    }
}

fn ok_marker(line: &str, role: ChannelRole) -> bool {
    let name = log_name(role);
    line.contains(&format!("🎵 {name} funcionando correctamente"))
        || line.contains(&format!("{name} funcionando correctamente (modo nocturno)"))
}

/// Attribute a line to a channel, first match wins:
/// named ok, named outage (primary before secondary), then unnamed lines
/// which predate the secondary stream and belong to the primary.
fn classify(line: &str) -> Option<(ChannelRole, EventStatus)> {
    let glyph = outage_glyph(line);

    for role in ChannelRole::ALL {
        if ok_marker(line, role) {
            return Some((role, EventStatus::Ok));
        }
        if let Some(status) = glyph
            && line.contains(log_name(role))
        {
            return Some((role, status));
        }
    }

    if line.contains(PRIMARY_WORD) || line.contains(SECONDARY_WORD) {
        return None;
    }

    if line.contains(LEGACY_OK_MARKER) {
        return Some((ChannelRole::Primary, EventStatus::Ok));
    }

    glyph.map(|status| (ChannelRole::Primary, status))
}
