use crate::ids::TaskId;
use crate::project::Project;
use std::collections::HashMap;

/// Late start / late finish relaxation, walking `order` in reverse.
pub struct BackwardPass<'a> {
    project: &'a Project,
    order: &'a [TaskId],
}

impl<'a> BackwardPass<'a> {
    pub fn new(project: &'a Project, order: &'a [TaskId]) -> Self {
        Self { project, order }
    }

    pub fn execute(&self, project_duration: i64) -> HashMap<TaskId, (i64, i64)> {
        // LS/LF keyed by task id
        let mut late: HashMap<TaskId, (i64, i64)> = self
            .project
            .tasks()
            .map(|task| {
                (
                    task.id(),
                    (project_duration - task.duration_days, project_duration),
                )
            })
            .collect();

        for task_id in self.order.iter().rev() {
            let Some(task) = self.project.find_task_by_id(*task_id) else {
                continue;
            };
            let start = late.get(task_id).map(|(ls, _)| *ls).unwrap_or(0);

            for pred_id in task.predecessors() {
                let Some(pred) = self.project.find_task_by_id(*pred_id) else {
                    continue;
                };
                if let Some(entry) = late.get_mut(pred_id) {
                    if entry.1 > start {
                        *entry = (start - pred.duration_days, start);
                    }
                }
            }
        }

        late
    }
}
