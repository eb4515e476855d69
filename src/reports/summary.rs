use crate::calculations::CriticalPathAnalysis;
use crate::error::ScheduleResult;
use crate::ids::{ResourceId, TaskId};
use crate::project::Project;
use crate::resource::Resource;
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub duration_days: i64,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub total_resources: usize,
    pub total_cost: f64,
    pub completion_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskReportRow {
    pub id: TaskId,
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub duration_days: i64,
    pub completion: f64,
    pub resources: Vec<String>,
    pub predecessors: Vec<String>,
    pub cost: f64,
    pub is_critical: bool,
    pub total_float: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceReportRow {
    pub id: ResourceId,
    pub name: String,
    pub cost_rate: f64,
    pub availability: f64,
    pub assignments: usize,
    pub utilization: f64,
    pub total_cost: f64,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineKind {
    Milestone,
    TaskStart,
    TaskEnd,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub date: NaiveDate,
    pub event: String,
    pub kind: TimelineKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<TaskId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectReports {
    pub summary: ProjectSummary,
    pub tasks: Vec<TaskReportRow>,
    pub resources: Vec<ResourceReportRow>,
    pub timeline: Vec<TimelineEvent>,
}

pub fn generate_reports(project: &Project) -> ScheduleResult<ProjectReports> {
    let analysis = project.calculate_critical_path()?;
    Ok(ProjectReports {
        summary: generate_summary_report(project),
        tasks: generate_task_report(project, &analysis),
        resources: generate_resource_report(project),
        timeline: generate_timeline_report(project),
    })
}

pub fn generate_summary_report(project: &Project) -> ProjectSummary {
    ProjectSummary {
        name: project.name.clone(),
        start_date: project.start_date(),
        end_date: project.end_date(),
        duration_days: project.duration_days(),
        total_tasks: project.task_count(),
        completed_tasks: project.tasks().filter(|task| task.is_complete()).count(),
        total_resources: project.resource_count(),
        total_cost: project.total_cost(),
        completion_percentage: project.completion_percentage(),
    }
}

pub fn generate_task_report(
    project: &Project,
    analysis: &CriticalPathAnalysis,
) -> Vec<TaskReportRow> {
    project
        .tasks()
        .map(|task| {
            let resources = project
                .task_assignments(task.id())
                .into_iter()
                .filter_map(|assignment| project.find_resource_by_id(assignment.resource()))
                .map(|resource| resource.name.clone())
                .collect();
            let predecessors = task
                .predecessors()
                .iter()
                .filter_map(|id| project.find_task_by_id(*id))
                .map(|pred| pred.name.clone())
                .collect();
            TaskReportRow {
                id: task.id(),
                name: task.name.clone(),
                start_date: task.start_date,
                end_date: task.end_date(),
                duration_days: task.duration_days,
                completion: task.completion(),
                resources,
                predecessors,
                cost: project.task_cost(task.id()),
                is_critical: analysis.is_critical(task.id()),
                total_float: analysis.float(task.id()).unwrap_or(0),
            }
        })
        .collect()
}

pub fn generate_resource_report(project: &Project) -> Vec<ResourceReportRow> {
    let utilization = project.resource_utilization();
    let resources: Vec<&Resource> = project.resources().collect();

    resources
        .par_iter()
        .map(|resource| ResourceReportRow {
            id: resource.id(),
            name: resource.name.clone(),
            cost_rate: resource.cost_rate,
            availability: resource.availability(),
            assignments: resource.assignments().len(),
            utilization: utilization.get(&resource.id()).copied().unwrap_or(0.0),
            total_cost: project.resource_cost(resource.id()),
            skills: resource.skills().iter().cloned().collect(),
        })
        .collect()
}

/// Project start, task start/end events and project end, sorted by date.
/// Unscheduled tasks do not appear.
pub fn generate_timeline_report(project: &Project) -> Vec<TimelineEvent> {
    let mut timeline = vec![TimelineEvent {
        date: project.start_date(),
        event: "Project Start".to_string(),
        kind: TimelineKind::Milestone,
        task: None,
    }];

    for task in project.tasks() {
        let (Some(start), Some(end)) = (task.start_date, task.end_date()) else {
            continue;
        };
        timeline.push(TimelineEvent {
            date: start,
            event: format!("Task '{}' Start", task.name),
            kind: TimelineKind::TaskStart,
            task: Some(task.id()),
        });
        timeline.push(TimelineEvent {
            date: end,
            event: format!("Task '{}' End", task.name),
            kind: TimelineKind::TaskEnd,
            task: Some(task.id()),
        });
    }

    if let Some(end) = project.end_date() {
        timeline.push(TimelineEvent {
            date: end,
            event: "Project End".to_string(),
            kind: TimelineKind::Milestone,
            task: None,
        });
    }

    timeline.sort_by_key(|event| event.date);
    timeline
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn timeline_is_sorted_and_bracketed_by_milestones() {
        let mut project = Project::new("Line", d(2025, 1, 6));
        project.create_task("Late", 2, Some(d(2025, 1, 10)));
        project.create_task("Early", 1, Some(d(2025, 1, 6)));
        project.create_task("Floating", 1, None);

        let timeline = generate_timeline_report(&project);
        assert_eq!(timeline.len(), 6);
        assert_eq!(timeline.first().unwrap().event, "Project Start");
        assert_eq!(timeline.last().unwrap().event, "Project End");
        assert_eq!(timeline.last().unwrap().date, d(2025, 1, 12));
        assert!(timeline.windows(2).all(|pair| pair[0].date <= pair[1].date));
    }

    #[test]
    fn summary_of_empty_project_has_no_end() {
        let project = Project::new("Blank", d(2025, 1, 6));
        let summary = generate_summary_report(&project);
        assert_eq!(summary.end_date, None);
        assert_eq!(summary.duration_days, 0);
        assert_eq!(summary.total_cost, 0.0);
    }
}
