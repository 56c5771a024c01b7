//! Review prompt construction for the daily market report.

pub mod prompts;

pub use prompts::ReviewPrompts;
