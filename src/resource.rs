use crate::calendar::{WorkCalendar, date_range};
use crate::ids::{AssignmentId, ResourceId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

const EPSILON: f64 = 1e-9;

/// A person or piece of equipment that can be booked onto tasks.
///
/// Availability is tracked per date. Capacity on a date is the custom
/// override when one exists, the base availability on working days, and zero
/// otherwise. Every assignment books its units into a ledger for each date in
/// its range; what remains available is capacity minus booked units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    id: ResourceId,
    pub name: String,
    /// Cost per hour.
    pub cost_rate: f64,
    availability: f64,
    #[serde(default)]
    assignments: Vec<AssignmentId>,
    #[serde(default)]
    custom_availability: BTreeMap<NaiveDate, f64>,
    #[serde(default)]
    skills: BTreeSet<String>,
    #[serde(skip)]
    booked: BTreeMap<NaiveDate, f64>,
}

/// A date where booked units exceed capacity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverAllocation {
    pub date: NaiveDate,
    pub booked_units: f64,
    pub capacity: f64,
}

impl OverAllocation {
    pub fn excess(&self) -> f64 {
        self.booked_units - self.capacity
    }
}

impl Resource {
    pub(crate) fn new(
        id: ResourceId,
        name: impl Into<String>,
        cost_rate: f64,
        availability: f64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            cost_rate,
            availability: clamp_fraction(availability),
            assignments: Vec::new(),
            custom_availability: BTreeMap::new(),
            skills: BTreeSet::new(),
            booked: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    /// Base fraction of a working day this resource can work.
    pub fn availability(&self) -> f64 {
        self.availability
    }

    pub fn set_availability(&mut self, value: f64) {
        self.availability = clamp_fraction(value);
    }

    pub fn assignments(&self) -> &[AssignmentId] {
        &self.assignments
    }

    pub fn custom_availability(&self) -> &BTreeMap<NaiveDate, f64> {
        &self.custom_availability
    }

    pub fn set_custom_availability(&mut self, date: NaiveDate, value: f64) {
        self.custom_availability.insert(date, clamp_fraction(value));
    }

    pub fn clear_custom_availability(&mut self, date: NaiveDate) -> Option<f64> {
        self.custom_availability.remove(&date)
    }

    /// Capacity on `date` before any bookings are taken off.
    pub fn capacity(&self, date: NaiveDate, calendar: &WorkCalendar) -> f64 {
        if let Some(value) = self.custom_availability.get(&date) {
            return *value;
        }
        if calendar.is_working_day(date) {
            self.availability
        } else {
            0.0
        }
    }

    pub fn booked_units(&self, date: NaiveDate) -> f64 {
        self.booked.get(&date).copied().unwrap_or(0.0)
    }

    /// Capacity left on `date` after bookings, within `[0, 1]`.
    pub fn get_availability(&self, date: NaiveDate, calendar: &WorkCalendar) -> f64 {
        clamp_fraction(self.capacity(date, calendar) - self.booked_units(date))
    }

    /// Dates that count towards capacity: working days plus any date
    /// carrying an explicit override.
    fn counts(&self, date: NaiveDate, calendar: &WorkCalendar) -> bool {
        calendar.is_working_day(date) || self.custom_availability.contains_key(&date)
    }

    /// Booked hours over available hours for `start..=end`; zero when nothing
    /// is available in the window.
    ///
    /// Every booked date counts, including weekends and holidays without an
    /// override, so work booked on days off pushes utilization past 1.
    pub fn get_utilization(&self, start: NaiveDate, end: NaiveDate, calendar: &WorkCalendar) -> f64 {
        let mut booked = 0.0;
        let mut available = 0.0;
        for date in date_range(start, end) {
            booked += self.booked_units(date);
            if self.counts(date, calendar) {
                available += self.capacity(date, calendar);
            }
        }
        if available <= EPSILON {
            0.0
        } else {
            booked / available
        }
    }

    pub fn over_allocations(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        calendar: &WorkCalendar,
    ) -> Vec<OverAllocation> {
        self.booked
            .range(start..=end)
            .filter(|(date, _)| self.counts(**date, calendar))
            .filter_map(|(date, booked)| {
                let capacity = self.capacity(*date, calendar);
                (*booked > capacity + EPSILON).then_some(OverAllocation {
                    date: *date,
                    booked_units: *booked,
                    capacity,
                })
            })
            .collect()
    }

    pub fn skills(&self) -> &BTreeSet<String> {
        &self.skills
    }

    pub fn add_skill(&mut self, skill: impl Into<String>) -> bool {
        self.skills.insert(skill.into())
    }

    pub fn remove_skill(&mut self, skill: &str) -> bool {
        self.skills.remove(skill)
    }

    pub fn has_skill(&self, skill: &str) -> bool {
        self.skills.contains(skill)
    }

    pub(crate) fn push_assignment(&mut self, id: AssignmentId) {
        self.assignments.push(id);
    }

    pub(crate) fn drop_assignment(&mut self, id: AssignmentId) {
        self.assignments.retain(|existing| *existing != id);
    }

    pub(crate) fn book(&mut self, start: NaiveDate, end: NaiveDate, units: f64) {
        for date in date_range(start, end) {
            *self.booked.entry(date).or_insert(0.0) += units;
        }
    }

    pub(crate) fn release(&mut self, start: NaiveDate, end: NaiveDate, units: f64) {
        for date in date_range(start, end) {
            if let Some(value) = self.booked.get_mut(&date) {
                *value -= units;
                if value.abs() <= EPSILON {
                    self.booked.remove(&date);
                }
            }
        }
    }

    pub(crate) fn clear_bookings(&mut self) {
        self.booked.clear();
    }
}

fn clamp_fraction(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
