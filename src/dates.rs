use crate::models::{MonthOption, YearOption};
use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;

/// Daybreak reports were first produced in 2014.
pub const FIRST_REPORT_YEAR: i32 = 2014;

pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const DEFAULT_LOOKBACK_MONTHS: u32 = 6;

pub fn valid_years(current_year: i32) -> BTreeMap<i32, YearOption> {
    (FIRST_REPORT_YEAR..=current_year)
        .map(|value| (value, YearOption { value }))
        .collect()
}

pub fn months() -> Vec<MonthOption> {
    MONTH_NAMES
        .iter()
        .zip(0u32..)
        .map(|(name, value)| MonthOption { value, name: *name })
        .collect()
}

/// First day of a 0-based month.
pub fn month_start(year: i32, month0: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month0 + 1, 1)
}

/// Last day of a 0-based month.
pub fn month_end(year: i32, month0: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month0 >= 11 {
        (year + 1, 1)
    } else {
        (year, month0 + 2)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

pub fn default_start_date(today: NaiveDate) -> NaiveDate {
    let offset = today
        .checked_sub_months(Months::new(DEFAULT_LOOKBACK_MONTHS))
        .unwrap_or(today);
    month_start(offset.year(), offset.month0()).unwrap_or(offset)
}

pub fn default_end_date(today: NaiveDate) -> NaiveDate {
    month_end(today.year(), today.month0()).unwrap_or(today)
}

/// Label used on the chart's x-axis, e.g. `Jan 12, 2015 10:30 AM`.
pub fn format_report_label(timestamp: NaiveDateTime) -> String {
    timestamp.format("%b %-d, %Y %-I:%M %p").to_string()
}

pub fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
