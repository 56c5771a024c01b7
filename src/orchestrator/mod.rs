//! Orchestrator module sequencing the daily review pipeline:
//! data aggregation → prompt → generation → delivery.

pub mod daily;

// Re-export main orchestrator
pub use daily::DailyOrchestrator;
