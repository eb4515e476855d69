use chrono::{NaiveDate, Weekday};
use project_scheduler::calendar::{date_range, fiscal_year_bounds, month_bounds};
use project_scheduler::{WorkCalendar, WorkCalendarConfig};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn default_calendar_skips_weekends() {
    let cal = WorkCalendar::default();
    // Fri -> Mon
    assert_eq!(cal.next_working_day(d(2025, 1, 10)), d(2025, 1, 13));
    assert_eq!(cal.prev_working_day(d(2025, 1, 13)), d(2025, 1, 10));
    assert!(!cal.is_working_day(d(2025, 1, 11)));
    assert!(cal.is_working_day(d(2025, 1, 13)));
}

#[test]
fn add_working_days_steps_over_holidays_and_weekends() {
    let mut cal = WorkCalendar::default();
    cal.add_holiday(d(2025, 1, 13));
    // Thu + 2 working days: Fri, (weekend, holiday Mon) Tue
    assert_eq!(cal.add_working_days(d(2025, 1, 9), 2), d(2025, 1, 14));
    assert_eq!(cal.add_working_days(d(2025, 1, 9), 0), d(2025, 1, 9));
}

#[test]
fn count_working_days_is_inclusive() {
    let cal = WorkCalendar::default();
    assert_eq!(cal.count_working_days(d(2025, 1, 6), d(2025, 1, 10)), 5);
    assert_eq!(cal.count_working_days(d(2025, 1, 6), d(2025, 1, 12)), 5);
    assert_eq!(cal.count_working_days(d(2025, 1, 10), d(2025, 1, 6)), 0);
    assert_eq!(
        cal.working_days_in_range(d(2025, 1, 10), d(2025, 1, 13)),
        vec![d(2025, 1, 10), d(2025, 1, 13)]
    );
}

#[test]
fn custom_work_week_changes_policy() {
    let cal = WorkCalendar::custom(
        [Weekday::Sun, Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu],
        [d(2025, 1, 7)],
    )
    .unwrap();
    assert!(cal.is_working_day(d(2025, 1, 12))); // Sunday
    assert!(!cal.is_working_day(d(2025, 1, 10))); // Friday
    assert!(!cal.is_working_day(d(2025, 1, 7))); // holiday

    let config = cal.to_config();
    assert_eq!(config.working_days()[0], Weekday::Mon);
    assert_eq!(config.holidays(), &[d(2025, 1, 7)]);
    assert_eq!(WorkCalendar::from_config(&config).unwrap(), cal);
}

#[test]
fn empty_work_week_is_an_error() {
    assert!(WorkCalendarConfig::new(Vec::<Weekday>::new(), Vec::new()).is_err());
    let mut cal = WorkCalendar::default();
    assert!(cal.set_working_days(&[]).is_err());
    assert!(cal.is_working_day(d(2025, 1, 6)));
}

#[test]
fn recurring_holiday_skips_missing_dates() {
    let mut cal = WorkCalendar::default();
    cal.add_recurring_holiday(2, 29, 2024, 2028);
    let holidays = cal.to_config().holidays().to_vec();
    assert_eq!(holidays, vec![d(2024, 2, 29), d(2028, 2, 29)]);
}

#[test]
fn period_helpers() {
    assert_eq!(date_range(d(2025, 1, 30), d(2025, 2, 2)).count(), 4);
    assert_eq!(date_range(d(2025, 2, 2), d(2025, 1, 30)).count(), 0);
    assert_eq!(month_bounds(d(2025, 2, 14)), (d(2025, 2, 1), d(2025, 2, 28)));
    assert_eq!(
        fiscal_year_bounds(d(2025, 1, 15), 1),
        Some((d(2025, 1, 1), d(2025, 12, 31)))
    );
}

#[test]
fn date_difference_counts_holidays_as_non_working() {
    let mut cal = WorkCalendar::default();
    cal.add_holiday(d(2025, 1, 8));
    // Monday to Friday of the same week
    let diff = cal.date_difference(d(2025, 1, 6), d(2025, 1, 10));
    assert_eq!(diff.total_days, 4);
    assert_eq!(diff.working_days, 4);
    assert_eq!(diff.weeks, 0);
    assert_eq!(diff.remaining_days, 4);
    assert_eq!(diff.non_working_days, 1);
}
