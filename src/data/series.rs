//! Static declaration of the data series that make up one report.
//!
//! Every series is described by one [`SeriesSpec`] so the fetch loop, failure
//! isolation and formatting policy live in a single code path instead of one
//! bespoke path per series.

use serde_json::{Map, Value};

use super::{DataResult, RunWindow};

/// One row of a provider result, column name -> value.
pub type Record = Map<String, Value>;

/// Whatever shape a series fetch returns: zero or more ordered records.
/// Single-record and scalar series are just tables the formatter reduces.
#[derive(Debug, Clone, Default)]
pub struct RawResult {
    pub rows: Vec<Record>,
}

impl RawResult {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// How a raw result is reduced to one prompt fragment.
#[derive(Debug, Clone, Copy)]
pub enum FragmentShape {
    /// Compact textual table, capped at `max_rows` rows.
    Table { max_rows: usize },
    /// `field: value` lines for the first record.
    FirstRecord,
    /// `field: value` lines for the most recent record.
    LastRecord,
    /// A single field of the most recent record.
    LastField(&'static str),
    /// Comma-joined sample of one column, capped at `max` names.
    NameList { field: &'static str, max: usize },
}

/// Which window-derived query params a series fetch takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateParams {
    None,
    /// The full lookback window, `start_date` .. `end_date`.
    StartEnd,
    /// The report day only: both bounds set to the window end.
    EndOnly,
}

/// Uniform descriptor for one data series.
#[derive(Debug)]
pub struct SeriesSpec {
    pub id: &'static str,
    pub label: &'static str,
    /// Provider endpoint name (aktools-style, mirrors the akshare function).
    pub endpoint: &'static str,
    /// Fixed query params the endpoint always takes.
    pub params: &'static [(&'static str, &'static str)],
    pub dated: DateParams,
    pub shape: FragmentShape,
    /// Required series log fetch failures at error level; optional ones
    /// (series with trading-day availability windows) only warn.
    pub required: bool,
}

/// The full series set of one report, in prompt order.
pub static SERIES: &[SeriesSpec] = &[
    SeriesSpec {
        id: "gdp",
        label: "annual GDP (prior reading)",
        endpoint: "macro_china_gdp_yearly",
        params: &[],
        dated: DateParams::None,
        shape: FragmentShape::LastField("前值"),
        required: true,
    },
    SeriesSpec {
        id: "pmi",
        label: "composite PMI (latest)",
        endpoint: "index_pmi_com_cx",
        params: &[],
        dated: DateParams::None,
        shape: FragmentShape::LastRecord,
        required: true,
    },
    SeriesSpec {
        id: "cpi",
        label: "monthly CPI (prior reading)",
        endpoint: "macro_china_cpi_monthly",
        params: &[],
        dated: DateParams::None,
        shape: FragmentShape::LastField("前值"),
        required: true,
    },
    SeriesSpec {
        id: "fx",
        label: "CNY/USD spot quote (latest)",
        endpoint: "fx_spot_quote",
        params: &[],
        dated: DateParams::None,
        shape: FragmentShape::FirstRecord,
        required: true,
    },
    SeriesSpec {
        id: "fed_rate",
        label: "US Fed policy rate (latest decision)",
        endpoint: "macro_bank_usa_interest_rate",
        params: &[],
        dated: DateParams::None,
        shape: FragmentShape::LastRecord,
        required: true,
    },
    SeriesSpec {
        id: "lhb",
        label: "dragon-tiger list for the day",
        endpoint: "stock_lhb_detail_em",
        params: &[],
        dated: DateParams::EndOnly,
        shape: FragmentShape::Table { max_rows: 30 },
        // Only published on trading days
        required: false,
    },
    SeriesSpec {
        id: "board",
        label: "concept board names",
        endpoint: "stock_board_concept_name_em",
        params: &[],
        dated: DateParams::None,
        shape: FragmentShape::NameList {
            field: "板块名称",
            max: 50,
        },
        required: false,
    },
    SeriesSpec {
        id: "market_activity",
        label: "market breadth / money-making effect",
        endpoint: "stock_market_activity_legu",
        params: &[],
        dated: DateParams::None,
        shape: FragmentShape::Table { max_rows: 15 },
        required: true,
    },
    SeriesSpec {
        id: "index_daily",
        label: "SSE Composite daily bars over the run window",
        endpoint: "index_zh_a_hist",
        params: &[("symbol", "000001"), ("period", "daily")],
        dated: DateParams::StartEnd,
        shape: FragmentShape::Table { max_rows: 10 },
        required: true,
    },
    SeriesSpec {
        id: "fund_flow",
        label: "concept fund flow (instant)",
        endpoint: "stock_fund_flow_concept",
        params: &[("symbol", "即时")],
        dated: DateParams::None,
        shape: FragmentShape::Table { max_rows: 20 },
        required: false,
    },
];

/// Fetch collaborator boundary for one series.
#[allow(async_fn_in_trait)]
pub trait SeriesSource {
    async fn fetch(&self, spec: &SeriesSpec, window: &RunWindow) -> DataResult<RawResult>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_ids_are_unique() {
        let mut ids: Vec<&str> = SERIES.iter().map(|s| s.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), SERIES.len());
    }

    #[test]
    fn test_dated_series_cover_the_window() {
        // The index history spans the lookback window; the daily list is
        // fetched for the report day only.
        let windowed: Vec<&str> = SERIES
            .iter()
            .filter(|s| s.dated == DateParams::StartEnd)
            .map(|s| s.id)
            .collect();
        assert_eq!(windowed, vec!["index_daily"]);

        let single_day: Vec<&str> = SERIES
            .iter()
            .filter(|s| s.dated == DateParams::EndOnly)
            .map(|s| s.id)
            .collect();
        assert_eq!(single_day, vec!["lhb"]);
    }
}
