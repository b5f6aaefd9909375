pub mod cycle;
pub mod health;

pub use cycle::{CycleOptions, CycleReport, MonitorCycle, SummaryOutcome};
pub use health::{ChannelHealthEvaluator, DailyMode, HealthStatus};
