use crate::calendar::WorkCalendar;
use crate::ids::{AssignmentId, ResourceId, TaskId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One resource booked onto one task for a date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    id: AssignmentId,
    task: TaskId,
    resource: ResourceId,
    units: f64,
    start_date: NaiveDate,
    end_date: NaiveDate,
    hours: f64,
}

impl Assignment {
    pub(crate) fn new(
        id: AssignmentId,
        task: TaskId,
        resource: ResourceId,
        units: f64,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            id,
            task,
            resource,
            units,
            start_date,
            end_date,
            hours: 0.0,
        }
    }

    pub fn id(&self) -> AssignmentId {
        self.id
    }

    pub fn task(&self) -> TaskId {
        self.task
    }

    pub fn resource(&self) -> ResourceId {
        self.resource
    }

    pub fn units(&self) -> f64 {
        self.units
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    /// Working days in range × hours per day × units.
    pub fn hours(&self) -> f64 {
        self.hours
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    pub(crate) fn set_units(&mut self, units: f64) {
        self.units = units;
    }

    pub(crate) fn recompute_hours(&mut self, calendar: &WorkCalendar, hours_per_day: f64) {
        let days = calendar.count_working_days(self.start_date, self.end_date);
        self.hours = days as f64 * hours_per_day * self.units;
    }
}
