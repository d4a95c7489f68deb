use crate::models::SummaryCollection;
use crate::series::{MismatchSeries, NamedSeries, build_series, error_type_series};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Fill colors for the Resolved, New/Regression and Existing areas.
pub const STATUS_COLORS: [&str; 3] = ["#6BFFF5", "#FF6B75", "#FFB44A"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ChartView {
    #[default]
    #[serde(rename = "openClosed")]
    OpenClosed,
    #[serde(rename = "errorType")]
    ErrorType,
    #[serde(rename = "hidden")]
    Hidden,
}

impl ChartView {
    pub fn as_str(self) -> &'static str {
        match self {
            ChartView::OpenClosed => "openClosed",
            ChartView::ErrorType => "errorType",
            ChartView::Hidden => "hidden",
        }
    }
}

impl fmt::Display for ChartView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid chart view option: {0}")]
pub struct UnknownChartView(pub String);

impl FromStr for ChartView {
    type Err = UnknownChartView;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "openClosed" => Ok(ChartView::OpenClosed),
            "errorType" => Ok(ChartView::ErrorType),
            "hidden" => Ok(ChartView::Hidden),
            other => Err(UnknownChartView(other.to_string())),
        }
    }
}

/// Everything the page needs to draw (or hide) the stacked area chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPayload {
    pub view: ChartView,
    pub visible: bool,
    pub categories: Vec<String>,
    pub series: Vec<NamedSeries>,
    pub colors: Vec<&'static str>,
}

impl ChartPayload {
    pub fn mismatch_status(series: MismatchSeries) -> Self {
        let MismatchSeries {
            existing,
            new_or_regression,
            resolved,
            date_labels,
        } = series;

        Self {
            view: ChartView::OpenClosed,
            visible: true,
            categories: date_labels,
            series: vec![
                NamedSeries { name: "Resolved".to_string(), data: resolved },
                NamedSeries { name: "New/Regression".to_string(), data: new_or_regression },
                NamedSeries { name: "Existing".to_string(), data: existing },
            ],
            colors: STATUS_COLORS.to_vec(),
        }
    }

    pub fn for_view(view: ChartView, summaries: Option<&SummaryCollection>) -> Self {
        match view {
            ChartView::OpenClosed => Self::mismatch_status(build_series(summaries)),
            ChartView::ErrorType => Self {
                view,
                visible: true,
                categories: build_series(summaries).date_labels,
                series: error_type_series(summaries),
                colors: Vec::new(),
            },
            ChartView::Hidden => Self {
                view,
                visible: false,
                categories: Vec::new(),
                series: Vec::new(),
                colors: Vec::new(),
            },
        }
    }
}
