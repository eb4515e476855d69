use crate::ids::{ResourceId, TaskId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineTask {
    pub id: TaskId,
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub duration_days: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineResource {
    pub id: ResourceId,
    pub name: String,
    pub cost_rate: f64,
    pub availability: f64,
}

/// Point-in-time copy of the schedule used for variance reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub taken_at: DateTime<Utc>,
    pub tasks: Vec<BaselineTask>,
    pub resources: Vec<BaselineResource>,
}

impl Baseline {
    pub fn task(&self, id: TaskId) -> Option<&BaselineTask> {
        self.tasks.iter().find(|task| task.id == id)
    }
}

/// Current task against its baseline entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskVariance {
    pub task: TaskId,
    pub name: String,
    pub baseline_start: Option<NaiveDate>,
    pub current_start: Option<NaiveDate>,
    /// Working days the start moved; positive means later. `None` when either
    /// side is unscheduled.
    pub start_slip_days: Option<i64>,
    /// Current duration minus baseline duration.
    pub duration_delta: i64,
}

impl TaskVariance {
    pub fn is_on_baseline(&self) -> bool {
        self.start_slip_days.unwrap_or(0) == 0
            && self.duration_delta == 0
            && self.baseline_start.is_some() == self.current_start.is_some()
    }
}
