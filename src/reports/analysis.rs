use crate::calculations::CriticalPathAnalysis;
use crate::error::ScheduleResult;
use crate::ids::{AssignmentId, ResourceId, TaskId};
use crate::project::Project;
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// One over-booked day for one resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceConflict {
    pub resource: ResourceId,
    pub resource_name: String,
    pub date: NaiveDate,
    pub booked_units: f64,
    pub capacity: f64,
    pub over_allocation: f64,
    pub assignments: Vec<AssignmentId>,
    pub tasks: Vec<TaskId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskKind {
    CriticalPath,
    ResourceDependency,
    LongDuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskImpact {
    Medium,
    High,
}

impl RiskImpact {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskImpact::Medium => "medium",
            RiskImpact::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRisk {
    pub kind: RiskKind,
    pub impact: RiskImpact,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<TaskId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<ResourceId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tasks: Vec<TaskId>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectAnalysis {
    pub critical_path: CriticalPathAnalysis,
    pub resource_conflicts: Vec<ResourceConflict>,
    pub risks: Vec<ScheduleRisk>,
}

impl ProjectAnalysis {
    pub fn to_cli_summary(&self) -> String {
        let high = self
            .risks
            .iter()
            .filter(|risk| risk.impact == RiskImpact::High)
            .count();
        let parts = [
            self.critical_path.to_cli_summary(),
            format!("conflict_days={}", self.resource_conflicts.len()),
            format!("risks={}", self.risks.len()),
            format!("high_impact_risks={high}"),
        ];
        parts.join(", ")
    }
}

pub fn analyze_project(project: &Project) -> ScheduleResult<ProjectAnalysis> {
    let critical_path = project.calculate_critical_path()?;
    let resource_conflicts = find_resource_conflicts(project);
    let risks = analyze_schedule_risks(project, &critical_path);
    Ok(ProjectAnalysis {
        critical_path,
        resource_conflicts,
        risks,
    })
}

/// Day-by-day scan of every resource over the schedule window.
pub fn find_resource_conflicts(project: &Project) -> Vec<ResourceConflict> {
    let Some((start, end)) = project.schedule_window() else {
        return Vec::new();
    };
    let resources: Vec<_> = project.resources().collect();

    resources
        .par_iter()
        .map(|resource| {
            let assignments = project.resource_assignments(resource.id());
            resource
                .over_allocations(start, end, project.calendar())
                .into_iter()
                .map(|over| {
                    let covering: Vec<_> = assignments
                        .iter()
                        .filter(|assignment| assignment.covers(over.date))
                        .collect();
                    ResourceConflict {
                        resource: resource.id(),
                        resource_name: resource.name.clone(),
                        date: over.date,
                        booked_units: over.booked_units,
                        capacity: over.capacity,
                        over_allocation: over.excess(),
                        assignments: covering.iter().map(|a| a.id()).collect(),
                        tasks: covering.iter().map(|a| a.task()).collect(),
                    }
                })
                .collect::<Vec<_>>()
        })
        .flatten()
        .collect()
}

pub fn analyze_schedule_risks(
    project: &Project,
    analysis: &CriticalPathAnalysis,
) -> Vec<ScheduleRisk> {
    let thresholds = &project.config().risk;
    let mut risks = Vec::new();

    for task_id in &analysis.critical_path {
        let Some(task) = project.find_task_by_id(*task_id) else {
            continue;
        };
        risks.push(ScheduleRisk {
            kind: RiskKind::CriticalPath,
            impact: RiskImpact::High,
            task: Some(*task_id),
            resource: None,
            tasks: Vec::new(),
            description: format!("task '{}' is on the critical path with no slack", task.name),
        });
    }

    for resource in project.resources() {
        let tasks = project.resource_tasks(resource.id());
        if tasks.len() > thresholds.max_tasks_per_resource {
            risks.push(ScheduleRisk {
                kind: RiskKind::ResourceDependency,
                impact: RiskImpact::Medium,
                task: None,
                resource: Some(resource.id()),
                description: format!(
                    "resource '{}' is assigned to {} tasks",
                    resource.name,
                    tasks.len()
                ),
                tasks,
            });
        }
    }

    let count = project.task_count();
    if count > 0 {
        let total: i64 = project.tasks().map(|task| task.duration_days).sum();
        let average = total as f64 / count as f64;
        for task in project.tasks() {
            if task.duration_days as f64 > thresholds.long_duration_factor * average {
                risks.push(ScheduleRisk {
                    kind: RiskKind::LongDuration,
                    impact: RiskImpact::Medium,
                    task: Some(task.id()),
                    resource: None,
                    tasks: Vec::new(),
                    description: format!(
                        "task '{}' runs {} days against an average of {:.1}",
                        task.name, task.duration_days, average
                    ),
                });
            }
        }
    }

    risks
}
