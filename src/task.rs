use crate::ids::{AssignmentId, TaskId};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// A unit of work in the project graph.
///
/// Edges and assignments are owned by the [`crate::Project`] arena; the task
/// only records the ids so that both ends of every link stay in sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    pub name: String,
    /// Calendar days, at least one.
    pub duration_days: i64,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    completion: f64,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    predecessors: Vec<TaskId>,
    #[serde(default)]
    successors: Vec<TaskId>,
    #[serde(default)]
    assignments: Vec<AssignmentId>,
}

impl Task {
    pub(crate) fn new(
        id: TaskId,
        name: impl Into<String>,
        duration_days: i64,
        start_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            duration_days,
            start_date,
            completion: 0.0,
            priority: 0,
            notes: String::new(),
            predecessors: Vec::new(),
            successors: Vec::new(),
            assignments: Vec::new(),
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Percentage complete in `0.0..=100.0`.
    pub fn completion(&self) -> f64 {
        self.completion
    }

    pub fn update_progress(&mut self, percentage: f64) {
        self.completion = if percentage.is_nan() {
            0.0
        } else {
            percentage.clamp(0.0, 100.0)
        };
    }

    pub fn is_complete(&self) -> bool {
        self.completion >= 100.0
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.start_date
            .map(|start| start + Duration::days(self.duration_days))
    }

    pub fn predecessors(&self) -> &[TaskId] {
        &self.predecessors
    }

    pub fn successors(&self) -> &[TaskId] {
        &self.successors
    }

    pub fn assignments(&self) -> &[AssignmentId] {
        &self.assignments
    }

    pub(crate) fn push_predecessor(&mut self, id: TaskId) {
        self.predecessors.push(id);
    }

    pub(crate) fn push_successor(&mut self, id: TaskId) {
        self.successors.push(id);
    }

    pub(crate) fn drop_predecessor(&mut self, id: TaskId) -> bool {
        let before = self.predecessors.len();
        self.predecessors.retain(|pred| *pred != id);
        before != self.predecessors.len()
    }

    pub(crate) fn drop_successor(&mut self, id: TaskId) -> bool {
        let before = self.successors.len();
        self.successors.retain(|succ| *succ != id);
        before != self.successors.len()
    }

    pub(crate) fn push_assignment(&mut self, id: AssignmentId) {
        self.assignments.push(id);
    }

    pub(crate) fn drop_assignment(&mut self, id: AssignmentId) {
        self.assignments.retain(|existing| *existing != id);
    }
}
