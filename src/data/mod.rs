//! Data pipeline module: series declarations, provider fetches, and the
//! degradation rules that turn raw results into prompt-ready fragments.

pub mod aggregator;
pub mod errors;
pub mod fragment;
pub mod provider;
pub mod series;
pub mod window;

// Re-export commonly used types
pub use aggregator::{aggregate, lookup_failed, Fragment, FragmentBundle, NO_DATA_PLACEHOLDER};
pub use errors::{DataError, DataResult};
pub use fragment::{format_fragment, MAX_FRAGMENT_CHARS};
pub use provider::ProviderClient;
pub use series::{DateParams, FragmentShape, RawResult, Record, SeriesSource, SeriesSpec, SERIES};
pub use window::RunWindow;
