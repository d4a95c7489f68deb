use crate::dates::{default_end_date, default_start_date, month_end, month_start};
use crate::models::{MonthOption, RangeView, YearOption};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};

/// Month/year range picked on the dashboard.
///
/// Every setter re-runs [`DateRangeSelection::reconcile`], so a selection
/// observed from outside always has its start at or before its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRangeSelection {
    start_month: MonthOption,
    start_year: YearOption,
    end_month: MonthOption,
    end_year: YearOption,
}

impl DateRangeSelection {
    pub fn new(
        start_month: MonthOption,
        start_year: YearOption,
        end_month: MonthOption,
        end_year: YearOption,
    ) -> Self {
        let mut selection = Self {
            start_month,
            start_year,
            end_month,
            end_year,
        };
        selection.reconcile();
        selection
    }

    /// Selection covering two concrete dates. Already ordered dates are kept
    /// as they are; the month/year passes only run when `start` is after `end`.
    pub fn from_dates(start: NaiveDate, end: NaiveDate) -> Self {
        let mut selection = Self {
            start_month: month_of(start),
            start_year: YearOption { value: start.year() },
            end_month: month_of(end),
            end_year: YearOption { value: end.year() },
        };
        if !selection.is_ordered() {
            selection.reconcile();
        }
        selection
    }

    pub fn default_at(today: NaiveDate) -> Self {
        Self::from_dates(default_start_date(today), default_end_date(today))
    }

    pub fn start_month(&self) -> MonthOption {
        self.start_month
    }

    pub fn start_year(&self) -> YearOption {
        self.start_year
    }

    pub fn end_month(&self) -> MonthOption {
        self.end_month
    }

    pub fn end_year(&self) -> YearOption {
        self.end_year
    }

    pub fn set_start_month(&mut self, month: MonthOption) {
        self.start_month = month;
        self.reconcile();
    }

    pub fn set_start_year(&mut self, year: YearOption) {
        self.start_year = year;
        self.reconcile();
    }

    pub fn set_end_month(&mut self, month: MonthOption) {
        self.end_month = month;
        self.reconcile();
    }

    pub fn set_end_year(&mut self, year: YearOption) {
        self.end_year = year;
        self.reconcile();
    }

    /// Pulls the start endpoint back onto the end endpoint wherever it has
    /// overtaken it. Months and years are corrected independently.
    pub fn reconcile(&mut self) {
        if self.start_month.value > self.end_month.value {
            self.start_month = self.end_month;
        }
        if self.start_year.value > self.end_year.value {
            self.start_year = self.end_year;
        }
    }

    pub fn is_ordered(&self) -> bool {
        (self.start_year.value, self.start_month.value) <= (self.end_year.value, self.end_month.value)
    }

    pub fn start_date(&self) -> NaiveDate {
        month_start(self.start_year.value, self.start_month.value.min(11)).unwrap_or(NaiveDate::MIN)
    }

    pub fn end_date(&self) -> NaiveDate {
        month_end(self.end_year.value, self.end_month.value.min(11)).unwrap_or(NaiveDate::MAX)
    }

    /// First instant of the start month.
    pub fn start_bound(&self) -> NaiveDateTime {
        self.start_date().and_time(NaiveTime::MIN)
    }

    /// Last instant of the end month, to the millisecond.
    pub fn end_bound(&self) -> NaiveDateTime {
        let last = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
        self.end_date().and_time(last)
    }

    pub fn view(&self) -> RangeView {
        RangeView {
            start_month: self.start_month,
            start_year: self.start_year,
            end_month: self.end_month,
            end_year: self.end_year,
            start_date: crate::dates::iso_date(self.start_date()),
            end_date: crate::dates::iso_date(self.end_date()),
        }
    }
}

fn month_of(date: NaiveDate) -> MonthOption {
    let value = date.month0();
    MonthOption {
        value,
        name: crate::dates::MONTH_NAMES[value as usize],
    }
}
