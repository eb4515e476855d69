use crate::error::ScheduleResult;
use crate::ids::{ResourceId, TaskId};
use crate::project::Project;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceLoad {
    pub resource: ResourceId,
    pub utilization: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskShift {
    pub task: TaskId,
    pub resource: ResourceId,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub days: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelingOutcome {
    pub over_allocated: Vec<ResourceLoad>,
    pub shifts: Vec<TaskShift>,
}

impl LevelingOutcome {
    pub fn total_shift_days(&self) -> i64 {
        self.shifts.iter().map(|shift| shift.days).sum()
    }

    pub fn to_cli_summary(&self) -> String {
        let parts = [
            format!("over_allocated_resources={}", self.over_allocated.len()),
            format!("shifted_tasks={}", self.shifts.len()),
            format!("total_shift_days={}", self.total_shift_days()),
        ];
        parts.join(", ")
    }
}

/// Single greedy pass that pushes start dates of over-allocated resources'
/// tasks later, never past their float.
///
/// Residual over-allocation is possible; assignment windows are not moved.
pub struct ResourceLeveler<'a> {
    project: &'a mut Project,
}

impl<'a> ResourceLeveler<'a> {
    pub fn new(project: &'a mut Project) -> Self {
        Self { project }
    }

    pub fn run(self) -> ScheduleResult<LevelingOutcome> {
        let analysis = self.project.calculate_critical_path()?;
        let mut outcome = LevelingOutcome::default();
        let Some((window_start, window_end)) = self.project.schedule_window() else {
            return Ok(outcome);
        };

        let loads: Vec<ResourceLoad> = self
            .project
            .resources()
            .map(|resource| ResourceLoad {
                resource: resource.id(),
                utilization: resource.get_utilization(
                    window_start,
                    window_end,
                    self.project.calendar(),
                ),
            })
            .filter(|load| load.utilization > 1.0)
            .collect();

        let mut shifted: HashMap<TaskId, i64> = HashMap::new();
        for load in &loads {
            // (task, priority, float, duration)
            let mut candidates: Vec<(TaskId, i32, i64, i64)> = self
                .project
                .resource_tasks(load.resource)
                .into_iter()
                .filter_map(|id| {
                    let task = self.project.find_task_by_id(id)?;
                    let float = analysis.float(id)?;
                    Some((id, task.priority, float, task.duration_days))
                })
                .collect();
            candidates.sort_by_key(|(id, priority, float, _)| (Reverse(*priority), *float, *id));

            for (task_id, _, float, duration) in candidates {
                if float <= 0 {
                    continue;
                }
                let used = shifted.get(&task_id).copied().unwrap_or(0);
                let wanted = ((load.utilization - 1.0) * duration as f64).floor() as i64;
                let delay = (float - used).min(wanted);
                if delay <= 0 {
                    continue;
                }
                let Some(task) = self.project.task_mut(task_id) else {
                    continue;
                };
                let Some(from) = task.start_date else {
                    continue;
                };
                let to = from + Duration::days(delay);
                task.start_date = Some(to);
                *shifted.entry(task_id).or_insert(0) += delay;
                outcome.shifts.push(TaskShift {
                    task: task_id,
                    resource: load.resource,
                    from,
                    to,
                    days: delay,
                });
            }
        }

        outcome.over_allocated = loads;
        Ok(outcome)
    }
}
