//! Summaries computed over hand-written log histories

use std::sync::Arc;

use pretty_assertions::assert_eq;
use radio_watchdog::{
    ChannelRole,
    clock::FixedClock,
    event_log::{EventLog, EventStatus},
    summary::{SummaryAggregator, SummaryBand, SummaryWindow},
};

use crate::helpers::*;

#[test]
fn test_evening_summary_counts() {
    let dir = tempfile::tempdir().unwrap();
    let log = EventLog::new(dir.path(), Arc::new(FixedClock(at(7, 18, 7))));

    write_check(&log, at(7, 12, 30), ChannelRole::Primary, EventStatus::Ok);
    write_check(&log, at(7, 14, 5), ChannelRole::Primary, EventStatus::Unreachable);
    write_check(&log, at(7, 15, 0), ChannelRole::Primary, EventStatus::Ok);
    write_check(&log, at(7, 16, 20), ChannelRole::Primary, EventStatus::Silent);
    write_check(&log, at(7, 17, 55), ChannelRole::Primary, EventStatus::Ok);

    let report = SummaryAggregator::new(log, channels(false))
        .summarize(&SummaryWindow::triggered_at(at(7, 18, 7)).unwrap())
        .unwrap();

    assert_eq!(
        report.to_string(),
        "🌆 Evening - summary of the last 6h:\n\n\
         📡 Primary stream: ✅ 3 OK | ❌ 2 errors\n\
         \u{20}  🕐 First error: 14:05\n\
         📻 Secondary stream: not configured\n"
    );
}

#[test]
fn test_window_spans_two_daily_files() {
    let dir = tempfile::tempdir().unwrap();
    let log = EventLog::new(dir.path(), Arc::new(FixedClock(at(9, 5, 0))));

    write_check(&log, at(8, 23, 30), ChannelRole::Primary, EventStatus::Silent);
    write_check(&log, at(8, 23, 30), ChannelRole::Secondary, EventStatus::Ok);
    write_check(&log, at(9, 0, 0), ChannelRole::Primary, EventStatus::Ok);
    write_check(&log, at(9, 4, 45), ChannelRole::Primary, EventStatus::Unreachable);
    write_check(&log, at(8, 23, 59), ChannelRole::Secondary, EventStatus::Ok);
    // older file, before the window
    write_check(&log, at(8, 20, 0), ChannelRole::Secondary, EventStatus::Unreachable);

    assert_eq!(log.files().unwrap().len(), 2);

    let window = SummaryWindow::ending_at(at(9, 5, 0), SummaryBand::Morning);
    let report = SummaryAggregator::new(log, channels(true))
        .summarize(&window)
        .unwrap();

    let primary = report.channel(ChannelRole::Primary).unwrap();
    assert_eq!(primary.ok_count, 1);
    assert_eq!(primary.outage_times, vec!["23:30", "04:45"]);
    // times compare as text, so the post-midnight outage sorts first
    assert_eq!(primary.first_outage(), Some("04:45"));

    let secondary = report.channel(ChannelRole::Secondary).unwrap();
    assert_eq!(secondary.ok_count, 2);
    assert!(secondary.outage_times.is_empty());
}

#[test]
fn test_legacy_history_is_counted_for_primary() {
    let dir = tempfile::tempdir().unwrap();
    let log = EventLog::new(dir.path(), Arc::new(FixedClock(at(10, 6, 10))));
    std::fs::write(
        log.file_for(at(10, 0, 0).date()),
        "INFO:root:[2024-06-10 01:00:00] 🎵 Stream funcionando correctamente\n\
         [2024-06-10 02:00:00] ❌ No se pudo acceder al stream.\n\
         garbage that is not a log line\n\
         [2024-06-10 03:00:00] 🎵 Stream Principal funcionando correctamente (modo nocturno)\n\
         [2024-06-10 03:00:00] 🌙 Horario nocturno (00:00-05:00): omitiendo detección de silencio en Stream Principal\n\
         [2024-06-10 04:00:00] ⏱ Iniciando monitoreo...\n",
    )
    .unwrap();

    let report = SummaryAggregator::new(log, channels(false))
        .summarize(&SummaryWindow::triggered_at(at(10, 6, 10)).unwrap())
        .unwrap();

    let primary = report.channel(ChannelRole::Primary).unwrap();
    assert_eq!(primary.ok_count, 2);
    assert_eq!(primary.outage_times, vec!["02:00"]);
}

#[test]
fn test_empty_history_reports_zero_checks() {
    let dir = tempfile::tempdir().unwrap();
    let log = EventLog::new(dir.path().join("missing"), Arc::new(FixedClock(at(11, 6, 0))));

    let report = SummaryAggregator::new(log, channels(true))
        .summarize(&SummaryWindow::triggered_at(at(11, 6, 0)).unwrap())
        .unwrap();

    assert_eq!(
        report.to_string(),
        "🌅 Morning - summary of the last 6h:\n\n\
         📡 Primary stream: ✅ all OK (0 checks)\n\
         📻 Secondary stream: ✅ all OK (0 checks)\n"
    );
}
