use crate::ids::TaskId;
use crate::project::Project;
use std::collections::HashMap;

/// Early start / early finish relaxation, in day offsets from project start.
pub struct ForwardPass<'a> {
    project: &'a Project,
    order: &'a [TaskId],
}

impl<'a> ForwardPass<'a> {
    /// `order` must list every predecessor before its successors for the
    /// result to be exact.
    pub fn new(project: &'a Project, order: &'a [TaskId]) -> Self {
        Self { project, order }
    }

    pub fn execute(&self) -> HashMap<TaskId, (i64, i64)> {
        let mut early: HashMap<TaskId, (i64, i64)> = self
            .project
            .tasks()
            .map(|task| (task.id(), (0, task.duration_days)))
            .collect();

        for task_id in self.order {
            let Some(task) = self.project.find_task_by_id(*task_id) else {
                continue;
            };
            let finish = early.get(task_id).map(|(_, ef)| *ef).unwrap_or(0);

            for succ_id in task.successors() {
                let Some(succ) = self.project.find_task_by_id(*succ_id) else {
                    continue;
                };
                if let Some(entry) = early.get_mut(succ_id) {
                    if entry.0 < finish {
                        *entry = (finish, finish + succ.duration_days);
                    }
                }
            }
        }

        early
    }
}
