//! Manual, interactive checks for operators
//!
//! Unlike a scheduled cycle these checks ignore night mode, print their
//! progress, and always notify through both backends so delivery can be
//! verified end to end.

use std::io::{self, Write};
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::alerts::AlertDispatcher;
use crate::clock::Clock;
use crate::config::Config;
use crate::event_log::EventLog;
use crate::event_log::event::TIMESTAMP_FORMAT;
use crate::monitors::{ChannelHealthEvaluator, DailyMode, HealthStatus};
use crate::probe::ffmpeg::FfmpegProbe;
use crate::{Channel, ChannelRole};

pub const STREAM_TEST_SUBJECT: &str = "[MANUAL TEST] Stream test result";
pub const ENCODING_TEST_SUBJECT: &str = "[UTF-8 TEST] Encoding check";

/// Result of manually checking one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManualCheck {
    Passed(String),
    Failed(String),
    NotConfigured,
}

impl ManualCheck {
    pub fn detail(&self) -> &str {
        match self {
            ManualCheck::Passed(detail) | ManualCheck::Failed(detail) => detail,
            ManualCheck::NotConfigured => "not configured",
        }
    }
}

#[derive(Debug, Clone)]
pub struct StreamTestReport {
    pub timestamp: String,
    pub results: Vec<(ChannelRole, ManualCheck)>,
}

impl StreamTestReport {
    /// True when every configured channel passed.
    pub fn passed(&self) -> bool {
        self.results
            .iter()
            .all(|(_, check)| !matches!(check, ManualCheck::Failed(_)))
    }

    pub fn message(&self) -> String {
        let mut message = format!(
            "Manual stream test\n\nDate: {}\n\nResults:\n",
            self.timestamp
        );
        for (role, check) in &self.results {
            let line = match check {
                ManualCheck::Passed(detail) => format!("✅ {role}: {detail}"),
                ManualCheck::Failed(detail) => format!("❌ {role}: {detail}"),
                ManualCheck::NotConfigured => format!("📋 {role}: not configured"),
            };
            message.push_str(&line);
            message.push('\n');
        }
        message.push_str("\nThis is a manual test of the monitoring system.");
        message
    }
}

pub struct ManualTester {
    channels: Vec<Channel>,
    evaluator: ChannelHealthEvaluator,
    dispatcher: AlertDispatcher,
    clock: Arc<dyn Clock>,
}

impl ManualTester {
    pub fn new(
        channels: Vec<Channel>,
        evaluator: ChannelHealthEvaluator,
        dispatcher: AlertDispatcher,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            channels,
            evaluator,
            dispatcher,
            clock,
        }
    }

    pub fn from_config(config: &Config, clock: Arc<dyn Clock>) -> Self {
        let log = EventLog::new(config.log_dir.clone(), clock.clone());
        Self::new(
            config.channels(),
            ChannelHealthEvaluator::new(Arc::new(FfmpegProbe::new(config))),
            AlertDispatcher::from_config(config, log),
            clock,
        )
    }

    /// Check every channel without the night-mode policy and notify the result.
    pub async fn stream_test(&self, out: &mut impl Write) -> io::Result<StreamTestReport> {
        writeln!(out, "\n=== Manual stream test ===\n")?;

        let mut results = vec![];
        for channel in &self.channels {
            if !channel.is_configured() {
                writeln!(out, "{}: not configured", channel.role)?;
                results.push((channel.role, ManualCheck::NotConfigured));
                continue;
            }

            writeln!(out, "Sampling {}...", channel.role)?;
            let check = match self.evaluator.evaluate(channel, DailyMode::Daytime).await {
                HealthStatus::Ok(_) => {
                    ManualCheck::Passed(format!("CORRECT: {} working correctly", channel.role))
                }
                HealthStatus::Silent(_) => ManualCheck::Failed(format!(
                    "ALERT: silence detected on the {}",
                    channel.role
                )),
                HealthStatus::Unreachable(_) => ManualCheck::Failed(format!(
                    "ERROR: could not download the {}",
                    channel.role
                )),
            };
            writeln!(out, "   {}", check.detail())?;
            results.push((channel.role, check));
        }

        let report = StreamTestReport {
            timestamp: self.clock.now().format(TIMESTAMP_FORMAT).to_string(),
            results,
        };

        writeln!(out, "\nSending notifications...")?;
        self.dispatcher
            .dispatch(STREAM_TEST_SUBJECT, &report.message())
            .await;
        self.evaluator.probe().cleanup();

        writeln!(out, "\nTest summary:")?;
        for (role, check) in &report.results {
            let verdict = match check {
                ManualCheck::Passed(_) => "✅ OK",
                ManualCheck::Failed(_) => "❌ FAILED",
                ManualCheck::NotConfigured => "⚪ not configured",
            };
            writeln!(out, "   {role}: {verdict}")?;
        }
        writeln!(out, "\nTest finished.")?;

        Ok(report)
    }

    /// Send a message full of accents, symbols and pictographs through both
    /// backends. Returns whether both accepted it.
    pub async fn encoding_test(&self, out: &mut impl Write) -> io::Result<bool> {
        writeln!(out, "\n=== UTF-8 encoding test ===\n")?;

        let body = encoding_test_message(&self.clock.now().format(TIMESTAMP_FORMAT).to_string());
        writeln!(out, "Sending test message with special characters...")?;
        let report = self.dispatcher.dispatch(ENCODING_TEST_SUBJECT, &body).await;

        let delivered = report.all_delivered();
        if delivered {
            writeln!(out, "✅ Encoding test sent - check email and Telegram")?;
        } else {
            writeln!(out, "❌ Encoding test could not be delivered everywhere: {report:?}")?;
        }
        Ok(delivered)
    }
}

pub fn encoding_test_message(timestamp: &str) -> String {
    format!(
        "UTF-8 encoding test\n\n\
         Date: {timestamp}\n\
         Special characters: ñ á é í ó ú ü Ñ\n\
         Symbols: © ® ™ € £ ¥\n\
         Emojis: 🎵 📧 📲 ❌ ✅ ⚠️\n\n\
         This message checks that special characters arrive intact by email and Telegram."
    )
}

fn write_menu(out: &mut impl Write) -> io::Result<()> {
    let rule = "=".repeat(50);
    writeln!(out, "\n{rule}")?;
    writeln!(out, "🔧 RADIO WATCHDOG - TEST MENU")?;
    writeln!(out, "{rule}")?;
    writeln!(out, "1. 📻 Full test of all streams")?;
    writeln!(out, "2. 🔤 UTF-8 encoding test")?;
    writeln!(out, "3. 🚀 Run both tests")?;
    writeln!(out, "0. ❌ Exit")?;
    writeln!(out, "{}", "-".repeat(50))?;
    write!(out, "Choose an option (0-3): ")?;
    out.flush()
}

/// Interactive loop; returns when the operator picks 0 or input ends.
pub async fn run_menu<R, W>(tester: &ManualTester, mut input: R, out: &mut W) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    loop {
        write_menu(out)?;

        let mut line = String::new();
        if input.read_line(&mut line).await? == 0 {
            writeln!(out)?;
            return Ok(());
        }

        match line.trim() {
            "1" => {
                tester.stream_test(out).await?;
            }
            "2" => {
                tester.encoding_test(out).await?;
            }
            "3" => {
                writeln!(out, "\n🚀 Running all tests...\n")?;
                let streams = tester.stream_test(out).await?.passed();
                let encoding = tester.encoding_test(out).await?;
                let verdict = |ok: bool| if ok { "✅ OK" } else { "❌ FAILED" };
                writeln!(out, "\n📊 TEST SUMMARY:")?;
                writeln!(out, "   Streams: {}", verdict(streams))?;
                writeln!(out, "   UTF-8:   {}", verdict(encoding))?;
            }
            "0" => {
                writeln!(out, "\n👋 Bye!")?;
                return Ok(());
            }
            _ => writeln!(out, "\n❌ Invalid option. Please choose 0-3.")?,
        }
    }
}
