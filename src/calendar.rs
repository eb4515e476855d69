use crate::error::ValidationError;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Working-time policy shared by every date-bearing computation.
///
/// The default is a Monday–Friday week with no holidays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkCalendar {
    holidays: HashSet<NaiveDate>,
    non_working_days: HashSet<Weekday>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkCalendarConfig {
    working_days: Vec<Weekday>,
    #[serde(default)]
    holidays: Vec<NaiveDate>,
}

/// Breakdown of the span between two dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateDifference {
    /// `end - start` in calendar days.
    pub total_days: i64,
    /// Working days in `start..=end`.
    pub working_days: i64,
    pub weeks: i64,
    pub remaining_days: i64,
    /// Non-working days in `start..=end`.
    pub non_working_days: i64,
}

impl Default for WorkCalendar {
    fn default() -> Self {
        Self {
            holidays: HashSet::new(),
            non_working_days: HashSet::from([Weekday::Sat, Weekday::Sun]),
        }
    }
}

impl WorkCalendar {
    const ALL_WEEKDAYS: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    pub fn custom<I, J>(working_days: I, holidays: J) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = Weekday>,
        J: IntoIterator<Item = NaiveDate>,
    {
        let config = WorkCalendarConfig::new(working_days, holidays)?;
        Self::from_config(&config)
    }

    pub fn from_config(config: &WorkCalendarConfig) -> Result<Self, ValidationError> {
        let working_set: HashSet<Weekday> = config.working_days.iter().copied().collect();
        if working_set.is_empty() {
            return Err(ValidationError::new(
                "work calendar requires at least one working day",
            ));
        }
        let non_working_days = Self::ALL_WEEKDAYS
            .into_iter()
            .filter(|day| !working_set.contains(day))
            .collect();

        Ok(Self {
            holidays: config.holidays.iter().copied().collect(),
            non_working_days,
        })
    }

    pub fn to_config(&self) -> WorkCalendarConfig {
        WorkCalendarConfig::from(self)
    }

    pub fn add_holiday(&mut self, date: NaiveDate) {
        self.holidays.insert(date);
    }

    /// Add the same month/day holiday for every year in `start_year..=end_year`.
    /// Dates that do not exist in a given year (Feb 29) are skipped.
    pub fn add_recurring_holiday(&mut self, month: u32, day: u32, start_year: i32, end_year: i32) {
        for year in start_year..=end_year {
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                self.holidays.insert(date);
            }
        }
    }

    pub fn set_working_days(&mut self, days: &[Weekday]) -> Result<(), ValidationError> {
        if days.is_empty() {
            return Err(ValidationError::new(
                "work calendar requires at least one working day",
            ));
        }
        self.non_working_days = Self::ALL_WEEKDAYS
            .into_iter()
            .filter(|day| !days.contains(day))
            .collect();
        Ok(())
    }

    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        !self.holidays.contains(&date) && !self.non_working_days.contains(&date.weekday())
    }

    /// First working day strictly after `from`.
    pub fn next_working_day(&self, from: NaiveDate) -> NaiveDate {
        let mut current = from + Duration::days(1);
        while !self.is_working_day(current) {
            current += Duration::days(1);
        }
        current
    }

    /// Last working day strictly before `from`.
    pub fn prev_working_day(&self, from: NaiveDate) -> NaiveDate {
        let mut current = from - Duration::days(1);
        while !self.is_working_day(current) {
            current -= Duration::days(1);
        }
        current
    }

    /// Walk forward from `from` until `days` working days have been passed.
    /// `days <= 0` returns `from` unchanged.
    pub fn add_working_days(&self, from: NaiveDate, days: i64) -> NaiveDate {
        let mut current = from;
        let mut remaining = days;
        while remaining > 0 {
            current += Duration::days(1);
            if self.is_working_day(current) {
                remaining -= 1;
            }
        }
        current
    }

    pub fn working_days_in_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        date_range(start, end)
            .filter(|date| self.is_working_day(*date))
            .collect()
    }

    /// Working days in `start..=end`; zero when `end < start`.
    pub fn count_working_days(&self, start: NaiveDate, end: NaiveDate) -> i64 {
        date_range(start, end)
            .filter(|date| self.is_working_day(*date))
            .count() as i64
    }

    /// Signed working-day distance from `baseline` to `actual`, zero when equal.
    pub fn working_days_between(&self, baseline: NaiveDate, actual: NaiveDate) -> i64 {
        if baseline == actual {
            0
        } else if actual > baseline {
            self.count_working_days(baseline + Duration::days(1), actual)
        } else {
            -self.count_working_days(actual + Duration::days(1), baseline)
        }
    }

    pub fn date_difference(&self, start: NaiveDate, end: NaiveDate) -> DateDifference {
        let total_days = (end - start).num_days();
        let working_days = self.count_working_days(start, end);
        let span = if total_days >= 0 { total_days + 1 } else { 0 };
        DateDifference {
            total_days,
            working_days,
            weeks: total_days.div_euclid(7),
            remaining_days: total_days.rem_euclid(7),
            non_working_days: span - working_days,
        }
    }
}

impl WorkCalendarConfig {
    pub fn new<I, J>(working_days: I, holidays: J) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = Weekday>,
        J: IntoIterator<Item = NaiveDate>,
    {
        let mut working: Vec<Weekday> = working_days.into_iter().collect();
        if working.is_empty() {
            return Err(ValidationError::new(
                "work calendar requires at least one working day",
            ));
        }
        working.sort_by_key(|wd| wd.num_days_from_monday());
        working.dedup();

        let mut holidays: Vec<NaiveDate> = holidays.into_iter().collect();
        holidays.sort();
        holidays.dedup();

        Ok(Self {
            working_days: working,
            holidays,
        })
    }

    pub fn working_days(&self) -> &[Weekday] {
        &self.working_days
    }

    pub fn holidays(&self) -> &[NaiveDate] {
        &self.holidays
    }
}

impl Default for WorkCalendarConfig {
    fn default() -> Self {
        WorkCalendarConfig::from(&WorkCalendar::default())
    }
}

impl From<&WorkCalendar> for WorkCalendarConfig {
    fn from(calendar: &WorkCalendar) -> Self {
        let working = WorkCalendar::ALL_WEEKDAYS
            .into_iter()
            .filter(|day| !calendar.non_working_days.contains(day))
            .collect();

        let mut holidays: Vec<NaiveDate> = calendar.holidays.iter().copied().collect();
        holidays.sort();

        Self {
            working_days: working,
            holidays,
        }
    }
}

/// Every calendar date in `start..=end`.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |date| *date <= end)
}

/// First and last day of the month containing `date`.
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let last = first_of_following_month(date.year(), date.month()) - Duration::days(1);
    (first, last)
}

/// First and last day of the calendar quarter containing `date`.
pub fn quarter_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start_month = (date.month0() / 3) * 3 + 1;
    let first = NaiveDate::from_ymd_opt(date.year(), start_month, 1).unwrap_or(date);
    let last = first_of_following_month(date.year(), start_month + 2) - Duration::days(1);
    (first, last)
}

/// Fiscal year containing `date` for a fiscal year starting on the first of
/// `fiscal_start_month`. `None` when the month is not in `1..=12`.
pub fn fiscal_year_bounds(
    date: NaiveDate,
    fiscal_start_month: u32,
) -> Option<(NaiveDate, NaiveDate)> {
    if !(1..=12).contains(&fiscal_start_month) {
        return None;
    }
    let start_year = if date.month() >= fiscal_start_month {
        date.year()
    } else {
        date.year() - 1
    };
    let start = NaiveDate::from_ymd_opt(start_year, fiscal_start_month, 1)?;
    let next = NaiveDate::from_ymd_opt(start_year + 1, fiscal_start_month, 1)?;
    Some((start, next - Duration::days(1)))
}

fn first_of_following_month(year: i32, month: u32) -> NaiveDate {
    let (year, month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_bounds_handle_december_and_leap_february() {
        assert_eq!(month_bounds(d(2025, 12, 14)), (d(2025, 12, 1), d(2025, 12, 31)));
        assert_eq!(month_bounds(d(2024, 2, 10)), (d(2024, 2, 1), d(2024, 2, 29)));
    }

    #[test]
    fn quarter_bounds_cover_three_months() {
        assert_eq!(quarter_bounds(d(2025, 5, 20)), (d(2025, 4, 1), d(2025, 6, 30)));
        assert_eq!(quarter_bounds(d(2025, 11, 2)), (d(2025, 10, 1), d(2025, 12, 31)));
    }

    #[test]
    fn fiscal_year_wraps_calendar_year() {
        assert_eq!(
            fiscal_year_bounds(d(2025, 3, 15), 7),
            Some((d(2024, 7, 1), d(2025, 6, 30)))
        );
        assert_eq!(
            fiscal_year_bounds(d(2025, 7, 1), 7),
            Some((d(2025, 7, 1), d(2026, 6, 30)))
        );
        assert_eq!(fiscal_year_bounds(d(2025, 7, 1), 13), None);
    }

    #[test]
    fn date_difference_splits_weeks_and_non_working_days() {
        let cal = WorkCalendar::default();
        // Monday 2025-01-06 to Monday 2025-01-20
        let diff = cal.date_difference(d(2025, 1, 6), d(2025, 1, 20));
        assert_eq!(diff.total_days, 14);
        assert_eq!(diff.working_days, 11);
        assert_eq!(diff.weeks, 2);
        assert_eq!(diff.remaining_days, 0);
        assert_eq!(diff.non_working_days, 4);
    }

    #[test]
    fn working_days_between_is_signed() {
        let cal = WorkCalendar::default();
        assert_eq!(cal.working_days_between(d(2025, 1, 10), d(2025, 1, 13)), 1);
        assert_eq!(cal.working_days_between(d(2025, 1, 13), d(2025, 1, 10)), -1);
        assert_eq!(cal.working_days_between(d(2025, 1, 13), d(2025, 1, 13)), 0);
    }
}
