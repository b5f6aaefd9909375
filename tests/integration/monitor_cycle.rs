//! Full watchdog cycles against fake probes and recording notifiers

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use radio_watchdog::{
    ChannelRole,
    monitors::{CycleOptions, DailyMode, HealthStatus, SummaryOutcome},
};

use crate::helpers::*;

#[tokio::test]
async fn test_primary_failure_with_secondary_unconfigured() {
    let dir = tempfile::tempdir().unwrap();
    let harness = Harness::new(
        dir.path(),
        at(3, 13, 0),
        FakeProbe::new([(ChannelRole::Primary, unreachable())]),
    );

    let report = harness.cycle(channels(false), options()).run().await;

    assert_eq!(report.mode, DailyMode::Daytime);
    assert_eq!(harness.probe.probed(), vec![ChannelRole::Primary]);
    assert_matches!(report.statuses.as_slice(), [(ChannelRole::Primary, HealthStatus::Unreachable(_))]);
    assert!(report.summary.is_none());

    let emails = harness.email.messages();
    assert_eq!(emails.len(), 1);
    assert_eq!(
        emails[0].body,
        "The following problems were detected:\n\n\
         🛑 Primary stream down: could not reach Primary stream"
    );
    assert!(!emails[0].body.contains("Secondary"));

    let chats = harness.chat_messages();
    assert_eq!(chats.len(), 1);
    assert!(chats[0].body.starts_with("🚨 ALERT: problems detected on streams\n"));

    let text = harness.log_text();
    assert!(text.contains("[2024-06-03 13:00:00] ⏱ Iniciando monitoreo..."));
    assert!(text.contains("❌ No se pudo acceder al Stream Principal."));
    assert!(!text.contains("Stream Secundario"));

    // the evening summary then lists the secondary as not configured
    let evening = Harness::new(
        dir.path(),
        at(3, 18, 5),
        FakeProbe::new([(ChannelRole::Primary, sampled(80.0))]),
    );
    let report = evening.cycle(channels(false), options()).run().await;

    assert!(report.alert.is_none());
    assert_matches!(report.summary, Some(SummaryOutcome::Sent(ref sent)) if sent.all_delivered());
    assert!(evening.email.messages().is_empty());

    let chats = evening.chat_messages();
    assert_eq!(chats.len(), 1);
    assert_eq!(
        chats[0].body,
        "🌆 Evening - summary of the last 6h:\n\n\
         📡 Primary stream: ✅ 1 OK | ❌ 1 errors\n\
         \u{20}  🕐 First error: 13:00\n\
         📻 Secondary stream: not configured\n"
    );
    assert!(
        evening
            .log_text()
            .contains("📋 Resumen enviado: Principal(1 OK, 1 errores), Secundario(0 OK, 0 errores)")
    );
}

#[tokio::test]
async fn test_every_channel_is_checked_after_a_failure() {
    let dir = tempfile::tempdir().unwrap();
    let harness = Harness::new(
        dir.path(),
        at(3, 10, 30),
        FakeProbe::new([
            (ChannelRole::Primary, unreachable()),
            (ChannelRole::Secondary, sampled(2.5)),
        ]),
    );

    let report = harness.cycle(channels(true), options()).run().await;

    assert_eq!(
        harness.probe.probed(),
        vec![ChannelRole::Primary, ChannelRole::Secondary]
    );
    assert_matches!(
        report.statuses.as_slice(),
        [
            (ChannelRole::Primary, HealthStatus::Unreachable(_)),
            (ChannelRole::Secondary, HealthStatus::Silent(_)),
        ]
    );

    // one alert carrying both problems
    let emails = harness.email.messages();
    assert_eq!(emails.len(), 1);
    assert_eq!(
        emails[0].body,
        "The following problems were detected:\n\n\
         🛑 Primary stream down: could not reach Primary stream\n\
         ⚠️ Secondary stream silent: prolonged silence detected on Secondary stream"
    );
    assert!(harness.log_text().contains("🔇 Silencio prolongado detectado en el Stream Secundario."));
}

#[tokio::test]
async fn test_night_mode_never_reports_silence() {
    let dir = tempfile::tempdir().unwrap();
    let harness = Harness::new(
        dir.path(),
        at(4, 2, 30),
        FakeProbe::new([
            (ChannelRole::Primary, sampled(0.0)),
            (ChannelRole::Secondary, sampled(0.0)),
        ]),
    );

    let report = harness.cycle(channels(true), options()).run().await;

    assert_eq!(report.mode, DailyMode::Nighttime);
    assert!(report.statuses.iter().all(|(_, status)| status.is_ok()));
    assert!(report.alert.is_none());
    assert!(harness.email.messages().is_empty());
    assert!(harness.chat_messages().is_empty());

    let text = harness.log_text();
    assert!(text.contains("🌙 Horario nocturno (00:00-05:00): omitiendo detección de silencio en Stream Principal"));
    assert!(text.contains("🎵 Stream Secundario funcionando correctamente (modo nocturno)"));
}

#[tokio::test]
async fn test_night_mode_still_alerts_unreachable_streams() {
    let dir = tempfile::tempdir().unwrap();
    let harness = Harness::new(dir.path(), at(4, 1, 0), FakeProbe::default());

    let report = harness.cycle(channels(false), options()).run().await;

    assert_matches!(report.statuses.as_slice(), [(_, HealthStatus::Unreachable(_))]);
    assert_eq!(harness.email.messages().len(), 1);
    assert!(!harness.log_text().contains("🌙"));
}

#[tokio::test]
async fn test_email_failure_still_reaches_chat() {
    let dir = tempfile::tempdir().unwrap();
    let harness = Harness::with_email(
        dir.path(),
        at(3, 9, 0),
        FakeProbe::default(),
        RecordingNotifier::failing(),
    );

    let report = harness.cycle(channels(false), options()).run().await;

    let alert = report.alert.unwrap();
    assert!(alert.chat.is_ok());
    assert_matches!(alert.email, Some(Err(_)));
    assert_eq!(harness.chat_messages().len(), 1);

    let text = harness.log_text();
    assert!(text.contains("🚫 Error al enviar email: transport failure: injected failure"));
    assert!(text.contains("📲 Alerta enviada a Telegram"));
}

#[tokio::test]
async fn test_artifacts_are_cleaned_every_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let harness = Harness::new(
        dir.path(),
        at(3, 11, 0),
        FakeProbe::new([
            (ChannelRole::Primary, sampled(95.0)),
            (ChannelRole::Secondary, sampled(95.0)),
        ]),
    );

    let cycle = harness.cycle(channels(true), options());
    cycle.run().await;
    cycle.run().await;

    assert_eq!(harness.probe.cleanup_count(), 2);
    assert!(harness.email.messages().is_empty());
}

#[tokio::test]
async fn test_one_summary_per_band() {
    let dir = tempfile::tempdir().unwrap();
    let healthy = || FakeProbe::new([(ChannelRole::Primary, sampled(50.0))]);

    let first = Harness::new(dir.path(), at(5, 6, 5), healthy());
    let report = first.cycle(channels(false), options()).run().await;
    assert_matches!(report.summary, Some(SummaryOutcome::Sent(_)));
    assert!(first.chat_messages()[0].body.starts_with("🌅 Morning - summary of the last 6h:"));

    let second = Harness::new(dir.path(), at(5, 6, 10), healthy());
    let report = second.cycle(channels(false), options()).run().await;
    assert_matches!(report.summary, Some(SummaryOutcome::Skipped));
    assert!(second.chat_messages().is_empty());

    // with the guard off every run inside the band summarizes again
    let unguarded = CycleOptions {
        summary_once_per_band: false,
        ..options()
    };
    let third = Harness::new(dir.path(), at(5, 6, 15), healthy());
    let report = third.cycle(channels(false), unguarded).run().await;
    assert_matches!(report.summary, Some(SummaryOutcome::Sent(_)));
    assert!(third.chat_messages()[0].body.contains("✅ all OK (3 checks)"));
}

#[tokio::test]
async fn test_undelivered_summary_is_retried() {
    let dir = tempfile::tempdir().unwrap();
    let healthy = || FakeProbe::new([(ChannelRole::Primary, sampled(50.0))]);

    let failing = Harness::new(dir.path(), at(5, 18, 0), healthy())
        .with_chat(std::sync::Arc::new(RecordingNotifier::failing()));
    let report = failing.cycle(channels(false), options()).run().await;
    assert_matches!(report.summary, Some(SummaryOutcome::Sent(ref sent)) if sent.chat.is_err());
    assert!(!failing.log_text().contains("📋 Resumen enviado"));

    let retry = Harness::new(dir.path(), at(5, 18, 5), healthy());
    let report = retry.cycle(channels(false), options()).run().await;
    assert_matches!(report.summary, Some(SummaryOutcome::Sent(ref sent)) if sent.all_delivered());
}

#[tokio::test]
async fn test_unreadable_log_degrades_summary() {
    let dir = tempfile::tempdir().unwrap();
    // a plain file where the log directory should be
    let blocked = dir.path().join("logs");
    std::fs::write(&blocked, "not a directory").unwrap();

    let harness = Harness::new(
        &blocked,
        at(5, 18, 5),
        FakeProbe::new([(ChannelRole::Primary, sampled(50.0))]),
    );

    let report = harness.cycle(channels(false), options()).run().await;

    assert_matches!(report.statuses.as_slice(), [(_, HealthStatus::Ok(_))]);
    assert_matches!(report.summary, Some(SummaryOutcome::Degraded(ref sent)) if sent.chat.is_ok());

    let chats = harness.chat_messages();
    assert_eq!(chats.len(), 1);
    assert!(
        chats[0]
            .body
            .starts_with("⚠️ Error generating the summary of the last 6h: "),
        "{}",
        chats[0].body
    );
}
