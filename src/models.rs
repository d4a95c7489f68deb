use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MismatchStatus {
    New,
    Existing,
    Regression,
    Resolved,
}

pub type StatusCounts = BTreeMap<MismatchStatus, u64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthOption {
    pub value: u32,
    pub name: &'static str,
}

impl MonthOption {
    /// Month for a 0-based index, `None` past December.
    pub fn from_index(value: u32) -> Option<Self> {
        crate::dates::MONTH_NAMES
            .get(value as usize)
            .map(|name| Self { value, name: *name })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct YearOption {
    pub value: i32,
}

/// One daybreak report as summarized by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummaryItem {
    #[serde(default)]
    pub reference_type: Option<String>,
    pub report_date_time: NaiveDateTime,
    #[serde(default, deserialize_with = "null_as_default")]
    pub mismatch_statuses: StatusCounts,
    #[serde(default, deserialize_with = "null_as_default")]
    pub mismatch_types: BTreeMap<String, StatusCounts>,
}

impl ReportSummaryItem {
    pub fn status_count(&self, status: MismatchStatus) -> u64 {
        self.mismatch_statuses.get(&status).copied().unwrap_or(0)
    }

    pub fn type_count(&self, mismatch_type: &str, status: MismatchStatus) -> u64 {
        self.mismatch_types
            .get(mismatch_type)
            .and_then(|counts| counts.get(&status))
            .copied()
            .unwrap_or(0)
    }

    pub fn total_mismatches(&self) -> u64 {
        self.mismatch_statuses
            .values()
            .fold(0u64, |acc, count| acc.saturating_add(*count))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryCollection {
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<ReportSummaryItem>,
    #[serde(default)]
    pub size: usize,
}

impl SummaryCollection {
    pub fn is_empty(&self) -> bool {
        self.size == 0 || self.items.is_empty()
    }
}

/// Envelope returned by `GET /spotcheck/daybreaks/{start}/{end}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryResponse {
    #[serde(default)]
    pub reports: SummaryCollection,
}

/// Picker values sent by the page; omitted fields keep their current value.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeRequest {
    pub start_month: Option<u32>,
    pub start_year: Option<i32>,
    pub end_month: Option<u32>,
    pub end_year: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct ChartViewRequest {
    pub mode: String,
}

#[derive(Debug, Serialize)]
pub struct TypeCell {
    pub mismatch_type: String,
    pub total: u64,
    pub delta: i64,
    pub delta_abs: i64,
    pub delta_class: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ReportRow {
    pub report_date_time: NaiveDateTime,
    pub label: String,
    pub total_mismatches: u64,
    pub total_diff: String,
    pub total_diff_class: &'static str,
    pub types: Vec<TypeCell>,
}

#[derive(Debug, Serialize)]
pub struct RangeView {
    pub start_month: MonthOption,
    pub start_year: YearOption,
    pub end_month: MonthOption,
    pub end_year: YearOption,
    pub start_date: String,
    pub end_date: String,
}

/// Identifies the dashboard page an API call belongs to.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub title: &'static str,
    pub page: Uuid,
    pub range: RangeView,
    pub months: Vec<MonthOption>,
    pub years: Vec<YearOption>,
    pub chart: crate::chart::ChartPayload,
    pub report_count: usize,
    pub reports: Vec<ReportRow>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
