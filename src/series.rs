use crate::dates::format_report_label;
use crate::models::{MismatchStatus, ReportSummaryItem, SummaryCollection};
use serde::Serialize;

/// Chart-ready mismatch status series, oldest report first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MismatchSeries {
    pub existing: Vec<u64>,
    pub new_or_regression: Vec<u64>,
    pub resolved: Vec<u64>,
    pub date_labels: Vec<String>,
}

impl MismatchSeries {
    pub fn is_empty(&self) -> bool {
        self.date_labels.is_empty()
    }
}

/// Builds the status series from a newest-first collection.
pub fn build_series(summaries: Option<&SummaryCollection>) -> MismatchSeries {
    let Some(summaries) = summaries.filter(|s| !s.is_empty()) else {
        return MismatchSeries::default();
    };

    let mut series = MismatchSeries::default();
    for item in summaries.items.iter().rev() {
        series.existing.push(item.status_count(MismatchStatus::Existing));
        series.new_or_regression.push(
            item.status_count(MismatchStatus::New)
                .saturating_add(item.status_count(MismatchStatus::Regression)),
        );
        series.resolved.push(item.status_count(MismatchStatus::Resolved));
        series.date_labels.push(format_report_label(item.report_date_time));
    }
    series
}

pub fn total_mismatch_count(item: &ReportSummaryItem, mismatch_type: &str) -> u64 {
    item.type_count(mismatch_type, MismatchStatus::New)
        .saturating_add(item.type_count(mismatch_type, MismatchStatus::Existing))
        .saturating_add(item.type_count(mismatch_type, MismatchStatus::Regression))
}

/// `NEW + REGRESSION - RESOLVED` for one mismatch type.
pub fn mismatch_delta(item: &ReportSummaryItem, mismatch_type: &str, absolute: bool) -> i64 {
    let opened = signed(item.type_count(mismatch_type, MismatchStatus::New))
        .saturating_add(signed(item.type_count(mismatch_type, MismatchStatus::Regression)));
    let diff = opened.saturating_sub(signed(item.type_count(mismatch_type, MismatchStatus::Resolved)));
    if absolute { diff.saturating_abs() } else { diff }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeltaClass {
    Increase,
    Decrease,
    Neutral,
}

impl DeltaClass {
    pub fn css_class(self) -> &'static str {
        match self {
            DeltaClass::Increase => "postfix-icon icon-arrow-up2 new-error",
            DeltaClass::Decrease => "postfix-icon icon-arrow-down2 closed-error",
            DeltaClass::Neutral => "postfix-icon icon-minus3 existing-error",
        }
    }
}

pub fn delta_presentation_class(item: &ReportSummaryItem, mismatch_type: &str) -> DeltaClass {
    match mismatch_delta(item, mismatch_type, false) {
        d if d > 0 => DeltaClass::Increase,
        d if d < 0 => DeltaClass::Decrease,
        _ => DeltaClass::Neutral,
    }
}

/// Signed change between two report totals, empty when there is none.
pub fn entry_diff(current: Option<u64>, previous: Option<u64>) -> String {
    match signed_diff(current, previous) {
        Some(d) if d > 0 => format!("+{d}"),
        Some(d) if d < 0 => d.to_string(),
        _ => String::new(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryDiffClass {
    Hidden,
    Positive,
    Negative,
}

impl EntryDiffClass {
    pub fn css_class(self) -> &'static str {
        match self {
            EntryDiffClass::Hidden => "reportEntryDiffHidden",
            EntryDiffClass::Positive => "reportEntryDiffPositive",
            EntryDiffClass::Negative => "reportEntryDiffNegative",
        }
    }
}

pub fn entry_diff_class(current: Option<u64>, previous: Option<u64>) -> EntryDiffClass {
    match signed_diff(current, previous) {
        Some(d) if d > 0 => EntryDiffClass::Positive,
        Some(d) if d < 0 => EntryDiffClass::Negative,
        _ => EntryDiffClass::Hidden,
    }
}

fn signed_diff(current: Option<u64>, previous: Option<u64>) -> Option<i64> {
    Some(signed(current?).saturating_sub(signed(previous?)))
}

/// Counts past `i64::MAX` are clamped.
fn signed(count: u64) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}

/// Display categories of the error-type chart and the mismatch types each one sums.
pub const ERROR_TYPE_CATEGORIES: [(&str, &[&str]); 7] = [
    ("Sponsor", &["BILL_SPONSOR"]),
    ("Co/Multi Sponsor", &["BILL_COSPONSOR", "BILL_MULTISPONSOR"]),
    ("Title", &["BILL_TITLE"]),
    ("Law / Summary", &["BILL_LAW_CODE_SUMMARY", "BILL_LAW_CODE", "BILL_SUMMARY"]),
    ("Action", &["BILL_ACTION"]),
    ("Page", &["BILL_FULLTEXT_PAGE_COUNT"]),
    ("Versions", &["BILL_AMENDMENT_PUBLISH", "BILL_ACTIVE_AMENDMENT"]),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedSeries {
    pub name: String,
    pub data: Vec<u64>,
}

/// Per-category open mismatch counts, oldest report first.
pub fn error_type_series(summaries: Option<&SummaryCollection>) -> Vec<NamedSeries> {
    let items: &[ReportSummaryItem] = summaries
        .filter(|s| !s.is_empty())
        .map(|s| s.items.as_slice())
        .unwrap_or_default();

    ERROR_TYPE_CATEGORIES
        .iter()
        .map(|(name, types)| NamedSeries {
            name: (*name).to_string(),
            data: items
                .iter()
                .rev()
                .map(|item| {
                    types
                        .iter()
                        .map(|t| total_mismatch_count(item, t))
                        .fold(0u64, u64::saturating_add)
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn item(day: u32, statuses: &[(MismatchStatus, u64)]) -> ReportSummaryItem {
        ReportSummaryItem {
            reference_type: None,
            report_date_time: NaiveDate::from_ymd_opt(2015, 1, day)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            mismatch_statuses: statuses.iter().copied().collect(),
            mismatch_types: BTreeMap::new(),
        }
    }

    fn with_type(mut item: ReportSummaryItem, name: &str, counts: &[(MismatchStatus, u64)]) -> ReportSummaryItem {
        item.mismatch_types
            .insert(name.to_string(), counts.iter().copied().collect());
        item
    }

    fn collection(items: Vec<ReportSummaryItem>) -> SummaryCollection {
        SummaryCollection {
            size: items.len(),
            items,
        }
    }

    #[test]
    fn empty_or_absent_collection_yields_empty_series() {
        assert_eq!(build_series(None), MismatchSeries::default());
        let empty = collection(Vec::new());
        let series = build_series(Some(&empty));
        assert!(series.existing.is_empty());
        assert!(series.new_or_regression.is_empty());
        assert!(series.resolved.is_empty());
        assert!(series.date_labels.is_empty());
    }

    #[test]
    fn newest_first_collection_is_charted_oldest_first() {
        use MismatchStatus::*;
        let newer = item(20, &[(Existing, 7), (New, 2), (Regression, 1), (Resolved, 4)]);
        let older = item(5, &[(Existing, 3), (New, 5), (Regression, 0), (Resolved, 1)]);
        let series = build_series(Some(&collection(vec![newer, older])));

        assert_eq!(series.existing, vec![3, 7]);
        assert_eq!(series.new_or_regression, vec![5, 3]);
        assert_eq!(series.resolved, vec![1, 4]);
        assert_eq!(series.date_labels, vec!["Jan 5, 2015 9:00 AM", "Jan 20, 2015 9:00 AM"]);
    }

    #[test]
    fn missing_status_counts_are_zero() {
        let series = build_series(Some(&collection(vec![item(1, &[(MismatchStatus::New, 2)])])));
        assert_eq!(series.existing, vec![0]);
        assert_eq!(series.new_or_regression, vec![2]);
        assert_eq!(series.resolved, vec![0]);
    }

    #[test]
    fn total_count_ignores_resolved_and_absent_entries() {
        use MismatchStatus::*;
        let report = with_type(item(1, &[]), "SPONSOR", &[(New, 2), (Regression, 1), (Resolved, 9)]);
        assert_eq!(total_mismatch_count(&report, "SPONSOR"), 3);
        assert_eq!(total_mismatch_count(&report, "TITLE"), 0);
    }

    #[test]
    fn delta_can_be_signed_or_absolute() {
        use MismatchStatus::*;
        let report = with_type(item(1, &[]), "TITLE", &[(New, 1), (Regression, 0), (Resolved, 3)]);
        assert_eq!(mismatch_delta(&report, "TITLE", false), -2);
        assert_eq!(mismatch_delta(&report, "TITLE", true), 2);
        assert_eq!(mismatch_delta(&report, "ACTION", false), 0);
    }

    #[test]
    fn delta_class_follows_sign() {
        use MismatchStatus::*;
        let report = with_type(
            with_type(item(1, &[]), "UP", &[(New, 2), (Resolved, 1)]),
            "DOWN",
            &[(Regression, 1), (Resolved, 4)],
        );
        assert_eq!(delta_presentation_class(&report, "UP"), DeltaClass::Increase);
        assert_eq!(delta_presentation_class(&report, "DOWN"), DeltaClass::Decrease);
        assert_eq!(delta_presentation_class(&report, "MISSING"), DeltaClass::Neutral);
        assert_eq!(DeltaClass::Neutral.css_class(), "postfix-icon icon-minus3 existing-error");
    }

    #[test]
    fn entry_diff_marks_sign_and_hides_unknowns() {
        assert_eq!(entry_diff(Some(10), Some(7)), "+3");
        assert_eq!(entry_diff(Some(4), Some(6)), "-2");
        assert_eq!(entry_diff(Some(4), Some(4)), "");
        assert_eq!(entry_diff(Some(4), None), "");
        assert_eq!(entry_diff_class(Some(10), Some(7)), EntryDiffClass::Positive);
        assert_eq!(entry_diff_class(Some(1), Some(7)), EntryDiffClass::Negative);
        assert_eq!(entry_diff_class(None, Some(7)).css_class(), "reportEntryDiffHidden");
    }

    #[test]
    fn huge_counts_saturate_instead_of_overflowing() {
        use MismatchStatus::*;
        let report = with_type(
            with_type(item(1, &[]), "OPENED", &[(New, u64::MAX), (Regression, u64::MAX)]),
            "CLOSED",
            &[(New, 0), (Resolved, u64::MAX)],
        );
        assert_eq!(mismatch_delta(&report, "OPENED", false), i64::MAX);
        assert_eq!(mismatch_delta(&report, "CLOSED", false), -i64::MAX);
        assert_eq!(mismatch_delta(&report, "CLOSED", true), i64::MAX);

        assert_eq!(entry_diff(Some(u64::MAX), Some(0)), format!("+{}", i64::MAX));
        assert_eq!(entry_diff(Some(0), Some(u64::MAX)), (-i64::MAX).to_string());
        assert_eq!(entry_diff_class(Some(u64::MAX), Some(1)), EntryDiffClass::Positive);
    }

    #[test]
    fn error_type_series_sums_category_members_chronologically() {
        use MismatchStatus::*;
        let newer = with_type(
            with_type(item(9, &[]), "BILL_COSPONSOR", &[(New, 1), (Existing, 1)]),
            "BILL_MULTISPONSOR",
            &[(Regression, 2)],
        );
        let older = with_type(item(2, &[]), "BILL_SPONSOR", &[(Existing, 5)]);
        let series = error_type_series(Some(&collection(vec![newer, older])));

        assert_eq!(series.len(), ERROR_TYPE_CATEGORIES.len());
        assert_eq!(series[0].name, "Sponsor");
        assert_eq!(series[0].data, vec![5, 0]);
        assert_eq!(series[1].name, "Co/Multi Sponsor");
        assert_eq!(series[1].data, vec![0, 4]);
        assert!(error_type_series(None).iter().all(|s| s.data.is_empty()));
    }
}
