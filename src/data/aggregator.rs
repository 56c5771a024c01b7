//! Per-series fetch loop with failure isolation.
//!
//! One failing source degrades its own fragment and nothing else: the bundle
//! always holds exactly one fragment per declared series.

use tracing::{error, warn};

use super::fragment::format_fragment;
use super::series::{SeriesSource, SERIES};
use super::window::RunWindow;

/// Placeholder for a series that came back empty (a valid outcome on
/// non-trading days).
pub const NO_DATA_PLACEHOLDER: &str = "no data available";

/// Placeholder for a series whose fetch failed outright.
pub fn lookup_failed(reason: &impl std::fmt::Display) -> String {
    format!("lookup failed: {reason}")
}

#[derive(Debug, Clone)]
pub struct Fragment {
    pub series: &'static str,
    pub label: &'static str,
    pub text: String,
}

/// Complete set of fragments for one run, in series declaration order.
#[derive(Debug, Clone, Default)]
pub struct FragmentBundle {
    fragments: Vec<Fragment>,
}

impl FragmentBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, fragment: Fragment) {
        self.fragments.push(fragment);
    }

    pub fn get(&self, series: &str) -> Option<&str> {
        self.fragments
            .iter()
            .find(|f| f.series == series)
            .map(|f| f.text.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Fragment> {
        self.fragments.iter()
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// Fetch every declared series and reduce each result to one fragment.
///
/// Empty results and fetch errors both degrade to placeholders; they are
/// logged differently but neither aborts the remaining series.
pub async fn aggregate<S: SeriesSource>(source: &S, window: &RunWindow) -> FragmentBundle {
    let mut bundle = FragmentBundle::new();

    for spec in SERIES {
        let text = match source.fetch(spec, window).await {
            Ok(raw) => match format_fragment(&spec.shape, &raw) {
                Some(text) => text,
                None => {
                    warn!(series = spec.id, rows = raw.len(), "series produced no usable rows");
                    NO_DATA_PLACEHOLDER.to_string()
                }
            },
            Err(e) if e.is_empty_result() => {
                warn!(series = spec.id, "series empty for the window: {e}");
                NO_DATA_PLACEHOLDER.to_string()
            }
            Err(e) => {
                if spec.required {
                    error!(series = spec.id, "series fetch failed: {e}");
                } else {
                    warn!(series = spec.id, "optional series fetch failed: {e}");
                }
                lookup_failed(&e)
            }
        };

        bundle.push(Fragment {
            series: spec.id,
            label: spec.label,
            text,
        });
    }

    bundle
}
