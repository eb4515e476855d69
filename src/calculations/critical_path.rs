use super::{BackwardPass, ForwardPass};
use crate::config::PassOrder;
use crate::error::ScheduleResult;
use crate::graph::ScheduleDag;
use crate::ids::TaskId;
use crate::project::Project;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Early/late window of one task, in day offsets from project start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskTiming {
    pub early_start: i64,
    pub early_finish: i64,
    pub late_start: i64,
    pub late_finish: i64,
}

impl TaskTiming {
    pub fn total_float(&self) -> i64 {
        self.late_start - self.early_start
    }

    pub fn is_critical(&self) -> bool {
        self.total_float() == 0
    }
}

/// Result of one critical-path run. Nothing is written back to the tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalPathAnalysis {
    pub project_start: NaiveDate,
    pub pass_order: PassOrder,
    pub project_duration: i64,
    pub timings: BTreeMap<TaskId, TaskTiming>,
    /// Zero-float tasks in pass order.
    pub critical_path: Vec<TaskId>,
}

impl CriticalPathAnalysis {
    pub fn timing(&self, id: TaskId) -> Option<&TaskTiming> {
        self.timings.get(&id)
    }

    pub fn float(&self, id: TaskId) -> Option<i64> {
        self.timing(id).map(TaskTiming::total_float)
    }

    pub fn is_critical(&self, id: TaskId) -> bool {
        self.timing(id).is_some_and(TaskTiming::is_critical)
    }

    pub fn early_start_date(&self, id: TaskId) -> Option<NaiveDate> {
        self.timing(id)
            .map(|t| self.project_start + Duration::days(t.early_start))
    }

    pub fn late_finish_date(&self, id: TaskId) -> Option<NaiveDate> {
        self.timing(id)
            .map(|t| self.project_start + Duration::days(t.late_finish))
    }

    pub fn to_cli_summary(&self) -> String {
        let path = self
            .critical_path
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join("->");
        let parts = [
            format!("tasks={}", self.timings.len()),
            format!("project_duration={}", self.project_duration),
            format!("critical_tasks={}", self.critical_path.len()),
            format!("pass_order={}", self.pass_order.as_str()),
            format!("critical_path={}", if path.is_empty() { "-" } else { &path }),
        ];
        parts.join(", ")
    }
}

pub struct CriticalPathAnalyzer<'a> {
    project: &'a Project,
}

impl<'a> CriticalPathAnalyzer<'a> {
    pub fn new(project: &'a Project) -> Self {
        Self { project }
    }

    pub fn run(&self) -> ScheduleResult<CriticalPathAnalysis> {
        let pass_order = self.project.config().pass_order;
        let order = match pass_order {
            PassOrder::Topological => ScheduleDag::build(self.project).topological_order()?,
            PassOrder::Insertion => self.project.task_ids(),
        };

        let early = ForwardPass::new(self.project, &order).execute();
        let project_duration = early.values().map(|(_, ef)| *ef).max().unwrap_or(0);
        let late = BackwardPass::new(self.project, &order).execute(project_duration);

        let mut timings = BTreeMap::new();
        for (task_id, (early_start, early_finish)) in early {
            if let Some(&(late_start, late_finish)) = late.get(&task_id) {
                timings.insert(
                    task_id,
                    TaskTiming {
                        early_start,
                        early_finish,
                        late_start,
                        late_finish,
                    },
                );
            }
        }

        let critical_path = order
            .iter()
            .copied()
            .filter(|id| timings.get(id).is_some_and(TaskTiming::is_critical))
            .collect();

        Ok(CriticalPathAnalysis {
            project_start: self.project.start_date(),
            pass_order,
            project_duration,
            timings,
            critical_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 6).unwrap()
    }

    #[test]
    fn empty_project_has_zero_duration() {
        let project = Project::new("Empty", start());
        let analysis = project.calculate_critical_path().unwrap();
        assert_eq!(analysis.project_duration, 0);
        assert!(analysis.critical_path.is_empty());
        assert!(analysis.to_cli_summary().contains("critical_path=-"));
    }

    #[test]
    fn insertion_order_misses_edges_to_earlier_tasks() {
        let mut config = EngineConfig::default();
        config.pass_order = PassOrder::Insertion;
        let mut project = Project::with_config("Heuristic", start(), config).unwrap();
        let b = project.create_task("B", 3, None);
        let a = project.create_task("A", 5, None);
        let c = project.create_task("C", 2, None);
        project.add_predecessor(a, b).unwrap();
        project.add_predecessor(b, c).unwrap();

        // B is visited before A pushes it back, so C never sees B's real finish.
        let heuristic = project.calculate_critical_path().unwrap();
        assert_eq!(heuristic.timing(c).unwrap().early_start, 3);
        assert_eq!(heuristic.project_duration, 8);

        project
            .set_config(EngineConfig::default())
            .unwrap();
        let exact = project.calculate_critical_path().unwrap();
        assert_eq!(exact.timing(c).unwrap().early_start, 8);
        assert_eq!(exact.project_duration, 10);
        assert_eq!(exact.critical_path, vec![a, b, c]);
    }

    #[test]
    fn dates_are_offsets_from_project_start() {
        let mut project = Project::new("Dates", start());
        let a = project.create_task("A", 4, None);
        let b = project.create_task("B", 1, None);
        project.add_predecessor(a, b).unwrap();
        let analysis = project.calculate_critical_path().unwrap();
        assert_eq!(
            analysis.early_start_date(b),
            NaiveDate::from_ymd_opt(2025, 1, 10)
        );
        assert_eq!(
            analysis.late_finish_date(b),
            NaiveDate::from_ymd_opt(2025, 1, 11)
        );
    }
}
