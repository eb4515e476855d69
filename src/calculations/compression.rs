use super::{LevelingOutcome, ResourceLeveler};
use crate::error::ScheduleResult;
use crate::ids::{AssignmentId, TaskId};
use crate::project::Project;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressionChange {
    pub task: TaskId,
    pub assignment: AssignmentId,
    pub old_units: f64,
    pub new_units: f64,
    pub old_duration: i64,
    pub new_duration: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompressionOutcome {
    pub leveling: LevelingOutcome,
    pub changes: Vec<CompressionChange>,
}

impl CompressionOutcome {
    pub fn days_saved(&self) -> i64 {
        self.changes
            .iter()
            .map(|change| change.old_duration - change.new_duration)
            .sum()
    }

    pub fn to_cli_summary(&self) -> String {
        let parts = [
            self.leveling.to_cli_summary(),
            format!("compressed_assignments={}", self.changes.len()),
            format!("days_saved={}", self.days_saved()),
        ];
        parts.join(", ")
    }
}

/// Levels resources, then shortens non-critical tasks by raising
/// under-allocated assignments toward the resource's spare capacity on the
/// task's start date.
///
/// Each raise divides the task's current duration by the units factor and
/// truncates. Durations never drop below one day, so a raise whose plain
/// truncation would reach zero keeps the task at one day instead.
pub struct ScheduleCompressor<'a> {
    project: &'a mut Project,
}

impl<'a> ScheduleCompressor<'a> {
    pub fn new(project: &'a mut Project) -> Self {
        Self { project }
    }

    pub fn run(self) -> ScheduleResult<CompressionOutcome> {
        let leveling = ResourceLeveler::new(&mut *self.project).run()?;
        let analysis = self.project.calculate_critical_path()?;

        // (task, float, duration)
        let mut candidates: Vec<(TaskId, i64, i64)> = self
            .project
            .tasks()
            .filter(|task| task.start_date.is_some() && !analysis.is_critical(task.id()))
            .filter_map(|task| {
                analysis
                    .float(task.id())
                    .map(|float| (task.id(), float, task.duration_days))
            })
            .collect();
        candidates.sort_by_key(|(id, float, duration)| (*float, Reverse(*duration), *id));

        let mut changes = Vec::new();
        for (task_id, _, _) in candidates {
            let Some(start) = self
                .project
                .find_task_by_id(task_id)
                .and_then(|task| task.start_date)
            else {
                continue;
            };
            let assignment_ids: Vec<AssignmentId> = self
                .project
                .task_assignments(task_id)
                .into_iter()
                .map(|assignment| assignment.id())
                .collect();

            let can_compress = assignment_ids.iter().any(|id| {
                self.spare_capacity(*id, start)
                    .is_some_and(|(units, spare)| units < 1.0 && spare > units)
            });
            if !can_compress {
                continue;
            }

            for assignment_id in assignment_ids {
                let Some((old_units, available)) = self.spare_capacity(assignment_id, start) else {
                    continue;
                };
                if available <= old_units {
                    continue;
                }
                let Some(old_duration) = self
                    .project
                    .find_task_by_id(task_id)
                    .map(|task| task.duration_days)
                else {
                    continue;
                };

                let new_units = available.min(1.0);
                let factor = new_units / old_units;
                let new_duration = ((old_duration as f64 / factor) as i64).max(1);

                if let Some(task) = self.project.task_mut(task_id) {
                    task.duration_days = new_duration;
                }
                self.project.set_assignment_units(assignment_id, new_units);
                changes.push(CompressionChange {
                    task: task_id,
                    assignment: assignment_id,
                    old_units,
                    new_units,
                    old_duration,
                    new_duration,
                });
            }
        }

        Ok(CompressionOutcome { leveling, changes })
    }

    /// Current units of an assignment and its resource's remaining
    /// availability on `date`.
    fn spare_capacity(&self, id: AssignmentId, date: NaiveDate) -> Option<(f64, f64)> {
        let assignment = self.project.assignment(id)?;
        let available = self
            .project
            .resource_availability(assignment.resource(), date)
            .ok()?;
        Some((assignment.units(), available))
    }
}
