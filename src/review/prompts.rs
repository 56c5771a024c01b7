//! Prompt template for the daily market review.
//! One fixed analyst persona, one labelled data section per series.

use crate::data::{FragmentBundle, RunWindow};

/// Prompt template builder for the review pipeline
pub struct ReviewPrompts;

impl ReviewPrompts {
    /// Render the full analysis prompt from a fragment bundle.
    ///
    /// Pure and deterministic: the same bundle and window always produce the
    /// same prompt. Sections appear in bundle order, which is series
    /// declaration order.
    pub fn daily_review_prompt(bundle: &FragmentBundle, window: &RunWindow) -> String {
        let data_sections = bundle
            .iter()
            .map(|fragment| format!("[{}]\n{}", fragment.label, fragment.text))
            .collect::<Vec<_>>()
            .join("\n\n");

        format!(
            r#"You are a senior institutional-flow analyst producing a daily review of the A-share market.

PROFILE:
- Rigorous, detail-oriented, and strictly data-driven.
- Background in financial data analysis and smart-money flow tracking.
- Audience: individual investors, financial analysts, and investment institutions.

REVIEW DATE: {date}

REVIEW WORKFLOW:
1. Is the market currently in a bull phase, a range-bound phase, or a bear phase?
2. Is capital flowing in steadily, or is it retreating?
3. How is market sentiment, and is there short-term pullback risk?
4. Which industries or concept boards deserve the most attention?
5. Short-, medium-, and long-term stance: buy, watch, or reduce?

DATA SECTIONS (one per series; a section may report a failed lookup or an
absence of data - treat those as gaps, not as market signals):

{data_sections}

TASK:
Correlate the data sections above and produce a multi-dimensional review of the
overall market, following the workflow steps in order. Be explicit about which
conclusions are weakened by missing or failed data sections."#,
            date = window.end_compact(),
            data_sections = data_sections,
        )
    }
}
