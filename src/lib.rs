// daybrief - unattended daily market review pipeline
// Gathers a fixed set of macro/market data series, assembles them into one
// analysis prompt, sends it to a generative engine, and emails the report.

#![deny(clippy::unwrap_used)]

pub mod config;
pub mod data;
pub mod llm;
pub mod notify;
pub mod orchestrator;
pub mod review;

// Re-export commonly used items
pub use config::Config;
pub use data::{
    aggregate, DataError, DataResult, Fragment, FragmentBundle, RawResult, RunWindow, SeriesSource,
    SERIES,
};
pub use llm::{run_analysis, AnalysisEngine, LLMClient, ANALYSIS_FALLBACK_MARKER};
pub use notify::{DeliveryChannel, Notification, SmtpMailer};
pub use orchestrator::DailyOrchestrator;
