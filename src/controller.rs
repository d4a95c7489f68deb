use crate::chart::{ChartPayload, ChartView};
use crate::client::DaybreakApi;
use crate::dates::{format_report_label, months, valid_years};
use crate::errors::RangeError;
use crate::models::{
    DashboardView, MonthOption, RangeRequest, ReportRow, ReportSummaryItem, SummaryCollection,
    TypeCell, YearOption,
};
use crate::range::DateRangeSelection;
use crate::series::{delta_presentation_class, entry_diff, entry_diff_class, mismatch_delta, total_mismatch_count};
use chrono::{Datelike, Local, NaiveDate};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const TITLE: &str = "LBDC Daybreak Reports";

/// Source of "today" for defaults and the year table.
pub type Today = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied,
    /// A newer fetch was started while this one was in flight.
    Superseded,
    Failed,
}

struct ControllerState {
    selection: DateRangeSelection,
    summaries: Option<SummaryCollection>,
    chart_view: ChartView,
    generation: u64,
}

/// State of one open daybreak summary page.
pub struct SummaryController {
    id: Uuid,
    api: Arc<dyn DaybreakApi>,
    refetch_on_change: bool,
    today: Today,
    state: Mutex<ControllerState>,
}

impl SummaryController {
    /// A page on today's default range. Nothing is fetched until
    /// [`SummaryController::initialize`].
    pub fn new(api: Arc<dyn DaybreakApi>, refetch_on_change: bool, today: Today) -> Self {
        let state = ControllerState {
            selection: DateRangeSelection::default_at(today()),
            summaries: None,
            chart_view: ChartView::default(),
            generation: 0,
        };
        Self {
            id: Uuid::new_v4(),
            api,
            refetch_on_change,
            today,
            state: Mutex::new(state),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Loads the default range.
    pub async fn initialize(&self) -> RefreshOutcome {
        self.refresh().await
    }

    /// Fetches summaries for the current selection.
    ///
    /// The state lock is released while the request is in flight. A response
    /// is only stored if no other refresh started in the meantime, and a
    /// failed fetch keeps the previous summaries.
    pub async fn refresh(&self) -> RefreshOutcome {
        let (generation, start, end) = {
            let mut state = self.state.lock().await;
            state.generation += 1;
            (
                state.generation,
                state.selection.start_date(),
                state.selection.end_date(),
            )
        };

        let result = self.api.summaries(start, end).await;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            debug!("dropping summaries for {start}..{end}: superseded by fetch #{}", state.generation);
            return RefreshOutcome::Superseded;
        }
        match result {
            Ok(summaries) => {
                info!("loaded {} daybreak reports for {start}..{end}", summaries.items.len());
                state.summaries = Some(summaries);
                RefreshOutcome::Applied
            }
            Err(err) => {
                warn!("failed to load daybreak summaries: {err}");
                RefreshOutcome::Failed
            }
        }
    }

    /// Applies picker changes, reconciles the range and, when enabled,
    /// re-fetches. Returns `None` when no fetch was made.
    pub async fn set_range(&self, request: &RangeRequest) -> Result<Option<RefreshOutcome>, RangeError> {
        let years = self.years();
        {
            let mut state = self.state.lock().await;
            let current = state.selection;
            let start_month = pick_month(request.start_month, current.start_month())?;
            let end_month = pick_month(request.end_month, current.end_month())?;
            let start_year = pick_year(&years, request.start_year, current.start_year())?;
            let end_year = pick_year(&years, request.end_year, current.end_year())?;

            let selection = DateRangeSelection::new(start_month, start_year, end_month, end_year);
            debug!(
                "page {} covers {} to {}",
                self.id,
                selection.start_bound(),
                selection.end_bound()
            );
            state.selection = selection;
        }

        if self.refetch_on_change {
            Ok(Some(self.refresh().await))
        } else {
            Ok(None)
        }
    }

    /// Switches the chart mode. Unknown modes are logged and ignored.
    pub async fn set_chart_view(&self, mode: &str) -> ChartView {
        let mut state = self.state.lock().await;
        match mode.parse::<ChartView>() {
            Ok(view) => state.chart_view = view,
            Err(err) => warn!("{err}"),
        }
        state.chart_view
    }

    pub async fn selection(&self) -> DateRangeSelection {
        self.state.lock().await.selection
    }

    pub async fn chart_view(&self) -> ChartView {
        self.state.lock().await.chart_view
    }

    pub async fn summaries(&self) -> Option<SummaryCollection> {
        self.state.lock().await.summaries.clone()
    }

    pub async fn view(&self) -> DashboardView {
        let years = self.years();
        let state = self.state.lock().await;
        let summaries = state.summaries.as_ref();
        let items: &[ReportSummaryItem] = summaries.map(|s| s.items.as_slice()).unwrap_or_default();

        DashboardView {
            title: TITLE,
            page: self.id,
            range: state.selection.view(),
            months: months(),
            years: years.into_values().collect(),
            chart: ChartPayload::for_view(state.chart_view, summaries),
            report_count: summaries.map(|s| s.size).unwrap_or(0),
            reports: report_rows(items),
        }
    }

    /// Years on offer as of today, so the table rolls over at New Year.
    fn years(&self) -> BTreeMap<i32, YearOption> {
        valid_years((self.today)().year())
    }
}

fn pick_month(requested: Option<u32>, current: MonthOption) -> Result<MonthOption, RangeError> {
    match requested {
        Some(value) => MonthOption::from_index(value).ok_or(RangeError::InvalidMonth(value)),
        None => Ok(current),
    }
}

fn pick_year(
    years: &BTreeMap<i32, YearOption>,
    requested: Option<i32>,
    current: YearOption,
) -> Result<YearOption, RangeError> {
    match requested {
        Some(value) => years.get(&value).copied().ok_or(RangeError::InvalidYear(value)),
        None => Ok(current),
    }
}

/// Table rows, newest first; each total is compared with the report before it.
fn report_rows(items: &[ReportSummaryItem]) -> Vec<ReportRow> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let total = item.total_mismatches();
            let previous = items.get(index + 1).map(ReportSummaryItem::total_mismatches);
            ReportRow {
                report_date_time: item.report_date_time,
                label: format_report_label(item.report_date_time),
                total_mismatches: total,
                total_diff: entry_diff(Some(total), previous),
                total_diff_class: entry_diff_class(Some(total), previous).css_class(),
                types: item
                    .mismatch_types
                    .keys()
                    .map(|mismatch_type| TypeCell {
                        mismatch_type: mismatch_type.clone(),
                        total: total_mismatch_count(item, mismatch_type),
                        delta: mismatch_delta(item, mismatch_type, false),
                        delta_abs: mismatch_delta(item, mismatch_type, true),
                        delta_class: delta_presentation_class(item, mismatch_type).css_class(),
                    })
                    .collect(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MismatchStatus;
    use crate::errors::ClientError;
    use async_trait::async_trait;
    use chrono::NaiveDateTime;
    use std::collections::VecDeque;
    use std::time::Duration;

    type Scripted = (Duration, Result<SummaryCollection, ()>);

    /// Answers summary calls from a script, one entry per call.
    #[derive(Default)]
    struct ScriptedApi {
        script: std::sync::Mutex<VecDeque<Scripted>>,
        calls: std::sync::Mutex<Vec<(NaiveDate, NaiveDate)>>,
    }

    impl ScriptedApi {
        fn with(script: Vec<Scripted>) -> Arc<Self> {
            Arc::new(Self {
                script: std::sync::Mutex::new(script.into()),
                calls: Default::default(),
            })
        }

        fn calls(&self) -> Vec<(NaiveDate, NaiveDate)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DaybreakApi for ScriptedApi {
        async fn summaries(&self, start: NaiveDate, end: NaiveDate) -> Result<SummaryCollection, ClientError> {
            self.calls.lock().unwrap().push((start, end));
            let next = self.script.lock().unwrap().pop_front();
            let (delay, result) = next.unwrap_or((Duration::ZERO, Ok(SummaryCollection::default())));
            tokio::time::sleep(delay).await;
            result.map_err(|_| ClientError::Status {
                url: "scripted".to_string(),
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            })
        }

        async fn detail(&self, report_date_time: NaiveDateTime) -> Result<serde_json::Value, ClientError> {
            Ok(serde_json::json!({ "reportDateTime": report_date_time }))
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2015, 3, 18).unwrap()
    }

    fn fixed(date: NaiveDate) -> Today {
        Arc::new(move || date)
    }

    fn controller_at(api: Arc<ScriptedApi>, refetch_on_change: bool, date: NaiveDate) -> SummaryController {
        SummaryController::new(api, refetch_on_change, fixed(date))
    }

    fn report(day: u32, existing: u64) -> ReportSummaryItem {
        ReportSummaryItem {
            reference_type: None,
            report_date_time: NaiveDate::from_ymd_opt(2015, 3, day)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
            mismatch_statuses: [(MismatchStatus::Existing, existing)].into_iter().collect(),
            mismatch_types: BTreeMap::new(),
        }
    }

    fn collection(items: Vec<ReportSummaryItem>) -> SummaryCollection {
        SummaryCollection {
            size: items.len(),
            items,
        }
    }

    #[tokio::test]
    async fn initialize_fetches_default_range() {
        let api = ScriptedApi::with(vec![(Duration::ZERO, Ok(collection(vec![report(2, 4), report(1, 3)])))]);
        let controller = controller_at(api.clone(), true, today());

        assert_eq!(controller.initialize().await, RefreshOutcome::Applied);
        assert_eq!(
            api.calls(),
            vec![(
                NaiveDate::from_ymd_opt(2014, 9, 1).unwrap(),
                NaiveDate::from_ymd_opt(2015, 3, 31).unwrap()
            )]
        );

        let view = controller.view().await;
        assert_eq!(view.report_count, 2);
        assert_eq!(view.years.len(), 2);
        assert_eq!(view.months.len(), 12);
        assert_eq!(view.chart.series[2].data, vec![3, 4]);
        assert_eq!(view.reports[0].total_diff, "+1");
        assert_eq!(view.reports[1].total_diff, "");
    }

    #[tokio::test]
    async fn failed_fetch_keeps_previous_summaries() {
        let first = collection(vec![report(1, 5)]);
        let api = ScriptedApi::with(vec![
            (Duration::ZERO, Ok(first.clone())),
            (Duration::ZERO, Err(())),
        ]);
        let controller = controller_at(api, true, today());

        assert_eq!(controller.refresh().await, RefreshOutcome::Applied);
        assert_eq!(controller.refresh().await, RefreshOutcome::Failed);
        assert_eq!(controller.summaries().await, Some(first));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_superseded_fetch_does_not_overwrite_newer_data() {
        let stale = collection(vec![report(1, 100)]);
        let fresh = collection(vec![report(2, 7)]);
        let api = ScriptedApi::with(vec![
            (Duration::from_millis(200), Ok(stale)),
            (Duration::ZERO, Ok(fresh.clone())),
        ]);
        let controller = controller_at(api, true, today());

        let slow = controller.refresh();
        let fast = async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            controller.refresh().await
        };
        let (slow, fast) = tokio::join!(slow, fast);

        assert_eq!(slow, RefreshOutcome::Superseded);
        assert_eq!(fast, RefreshOutcome::Applied);
        assert_eq!(controller.summaries().await, Some(fresh));
    }

    #[tokio::test]
    async fn range_change_reconciles_then_refetches() {
        let api = ScriptedApi::with(Vec::new());
        let controller = controller_at(api.clone(), true, today());

        let request = RangeRequest {
            start_month: Some(10),
            start_year: Some(2015),
            end_month: Some(1),
            end_year: Some(2014),
        };
        let outcome = controller.set_range(&request).await.unwrap();
        assert_eq!(outcome, Some(RefreshOutcome::Applied));

        let selection = controller.selection().await;
        assert!(selection.is_ordered());
        assert_eq!(selection.start_month().value, 1);
        assert_eq!(selection.start_year().value, 2014);
        assert_eq!(
            api.calls(),
            vec![(
                NaiveDate::from_ymd_opt(2014, 2, 1).unwrap(),
                NaiveDate::from_ymd_opt(2014, 2, 28).unwrap()
            )]
        );
    }

    #[tokio::test]
    async fn partial_range_update_keeps_other_fields() {
        let api = ScriptedApi::with(Vec::new());
        let controller = controller_at(api.clone(), false, today());

        let request = RangeRequest {
            end_month: Some(11),
            ..RangeRequest::default()
        };
        assert_eq!(controller.set_range(&request).await.unwrap(), None);
        assert!(api.calls().is_empty());

        let selection = controller.selection().await;
        assert_eq!(selection.start_month().value, 8);
        assert_eq!(selection.start_year().value, 2014);
        assert_eq!(selection.end_month().value, 11);
        assert_eq!(selection.end_year().value, 2015);
    }

    #[tokio::test]
    async fn out_of_range_picks_are_rejected_without_change() {
        let api = ScriptedApi::with(Vec::new());
        let controller = controller_at(api, true, today());
        let before = controller.selection().await;

        let bad_month = RangeRequest {
            start_month: Some(12),
            ..RangeRequest::default()
        };
        assert_eq!(controller.set_range(&bad_month).await, Err(RangeError::InvalidMonth(12)));

        let bad_year = RangeRequest {
            end_year: Some(2013),
            ..RangeRequest::default()
        };
        assert_eq!(controller.set_range(&bad_year).await, Err(RangeError::InvalidYear(2013)));
        assert_eq!(controller.selection().await, before);
    }

    #[tokio::test]
    async fn year_table_rolls_over_at_new_year() {
        let clock = Arc::new(std::sync::Mutex::new(NaiveDate::from_ymd_opt(2015, 12, 31).unwrap()));
        let reading = Arc::clone(&clock);
        let today: Today = Arc::new(move || *reading.lock().unwrap());
        let api = ScriptedApi::with(Vec::new());
        let controller = SummaryController::new(api.clone(), true, today);

        let next_year = RangeRequest {
            end_month: Some(0),
            end_year: Some(2016),
            ..RangeRequest::default()
        };
        assert_eq!(controller.set_range(&next_year).await, Err(RangeError::InvalidYear(2016)));
        assert_eq!(controller.view().await.years.last(), Some(&YearOption { value: 2015 }));

        *clock.lock().unwrap() = NaiveDate::from_ymd_opt(2016, 1, 2).unwrap();

        assert_eq!(controller.set_range(&next_year).await, Ok(Some(RefreshOutcome::Applied)));
        let view = controller.view().await;
        assert_eq!(view.years.last(), Some(&YearOption { value: 2016 }));
        assert_eq!(view.range.end_date, "2016-01-31");
        assert_eq!(
            api.calls(),
            vec![(
                NaiveDate::from_ymd_opt(2015, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2016, 1, 31).unwrap()
            )]
        );
    }

    #[tokio::test]
    async fn unknown_chart_view_is_ignored() {
        let controller = controller_at(ScriptedApi::with(Vec::new()), true, today());

        assert_eq!(controller.set_chart_view("errorType").await, ChartView::ErrorType);
        assert_eq!(controller.set_chart_view("radar").await, ChartView::ErrorType);
        assert_eq!(controller.chart_view().await, ChartView::ErrorType);

        controller.set_chart_view("hidden").await;
        assert!(!controller.view().await.chart.visible);
    }

    #[test]
    fn report_rows_carry_type_cells() {
        let mut item = report(3, 2);
        item.mismatch_types.insert(
            "BILL_TITLE".to_string(),
            [(MismatchStatus::New, 1), (MismatchStatus::Resolved, 3)].into_iter().collect(),
        );
        let rows = report_rows(&[item]);

        assert_eq!(rows.len(), 1);
        let cell = &rows[0].types[0];
        assert_eq!(cell.mismatch_type, "BILL_TITLE");
        assert_eq!(cell.total, 1);
        assert_eq!(cell.delta, -2);
        assert_eq!(cell.delta_abs, 2);
        assert_eq!(cell.delta_class, "postfix-icon icon-arrow-down2 closed-error");
        assert_eq!(rows[0].total_diff_class, "reportEntryDiffHidden");
    }
}
