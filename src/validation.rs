//! Input checks for host boundaries (CLI, HTTP, snapshot import).
//!
//! [`crate::Project`] trusts its callers; anything arriving from outside the
//! process goes through these first.

use crate::error::ValidationError;
use crate::graph::ScheduleDag;
use crate::project::Project;
use chrono::NaiveDate;
use std::collections::HashSet;

const EPSILON: f64 = 1e-6;

pub fn validate_name(kind: &str, name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::new(format!("{kind} name must not be empty")));
    }
    Ok(())
}

pub fn validate_duration(duration_days: i64) -> Result<(), ValidationError> {
    if duration_days <= 0 {
        return Err(ValidationError::new(format!(
            "duration must be positive (got {duration_days})"
        )));
    }
    Ok(())
}

pub fn validate_cost_rate(cost_rate: f64) -> Result<(), ValidationError> {
    if !cost_rate.is_finite() || cost_rate < 0.0 {
        return Err(ValidationError::new(format!(
            "cost rate must be non-negative (got {cost_rate})"
        )));
    }
    Ok(())
}

pub fn validate_fraction(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < -EPSILON || value > 1.0 + EPSILON {
        return Err(ValidationError::new(format!(
            "{field} must be between 0 and 1 (got {value})"
        )));
    }
    Ok(())
}

pub fn validate_units(units: f64) -> Result<(), ValidationError> {
    if !units.is_finite() || units <= 0.0 {
        return Err(ValidationError::new(format!(
            "assignment units must be positive (got {units})"
        )));
    }
    Ok(())
}

pub fn validate_completion(percentage: f64) -> Result<(), ValidationError> {
    if !percentage.is_finite() || percentage < -EPSILON || percentage > 100.0 + EPSILON {
        return Err(ValidationError::new(format!(
            "completion must be between 0 and 100 (got {percentage})"
        )));
    }
    Ok(())
}

pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> Result<(), ValidationError> {
    if end < start {
        return Err(ValidationError::new(format!(
            "end date {end} is before start date {start}"
        )));
    }
    Ok(())
}

pub fn validate_task_input(name: &str, duration_days: i64) -> Result<(), ValidationError> {
    validate_name("task", name)?;
    validate_duration(duration_days)
}

pub fn validate_resource_input(
    name: &str,
    cost_rate: f64,
    availability: f64,
) -> Result<(), ValidationError> {
    validate_name("resource", name)?;
    validate_cost_rate(cost_rate)?;
    validate_fraction("availability", availability)
}

pub fn validate_assignment_input(
    units: f64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<(), ValidationError> {
    validate_units(units)?;
    validate_date_range(start, end)
}

/// Structural checks over a whole project: every edge is mirrored, every
/// referenced id exists, assignments are listed on both sides, and the
/// dependency graph is acyclic.
pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    for task in project.tasks() {
        validate_duration(task.duration_days)
            .map_err(|err| ValidationError::new(format!("task {}: {err}", task.id())))?;

        let mut seen = HashSet::new();
        for pred in task.predecessors() {
            if !seen.insert(*pred) {
                return Err(ValidationError::new(format!(
                    "task {} lists predecessor {pred} twice",
                    task.id()
                )));
            }
            let Some(other) = project.find_task_by_id(*pred) else {
                return Err(ValidationError::new(format!(
                    "task {} references missing predecessor {pred}",
                    task.id()
                )));
            };
            if !other.successors().contains(&task.id()) {
                return Err(ValidationError::new(format!(
                    "edge {pred} -> {} is not mirrored in successors",
                    task.id()
                )));
            }
        }
        for succ in task.successors() {
            let Some(other) = project.find_task_by_id(*succ) else {
                return Err(ValidationError::new(format!(
                    "task {} references missing successor {succ}",
                    task.id()
                )));
            };
            if !other.predecessors().contains(&task.id()) {
                return Err(ValidationError::new(format!(
                    "edge {} -> {succ} is not mirrored in predecessors",
                    task.id()
                )));
            }
        }
        for assignment_id in task.assignments() {
            match project.assignment(*assignment_id) {
                Some(assignment) if assignment.task() == task.id() => {}
                _ => {
                    return Err(ValidationError::new(format!(
                        "task {} lists unknown assignment {assignment_id}",
                        task.id()
                    )));
                }
            }
        }
    }

    for resource in project.resources() {
        for assignment_id in resource.assignments() {
            match project.assignment(*assignment_id) {
                Some(assignment) if assignment.resource() == resource.id() => {}
                _ => {
                    return Err(ValidationError::new(format!(
                        "resource {} lists unknown assignment {assignment_id}",
                        resource.id()
                    )));
                }
            }
        }
    }

    for assignment in project.assignments() {
        let on_task = project
            .find_task_by_id(assignment.task())
            .is_some_and(|task| task.assignments().contains(&assignment.id()));
        let on_resource = project
            .find_resource_by_id(assignment.resource())
            .is_some_and(|res| res.assignments().contains(&assignment.id()));
        if !on_task || !on_resource {
            return Err(ValidationError::new(format!(
                "assignment {} is not listed on both its task and resource",
                assignment.id()
            )));
        }
        validate_assignment_input(assignment.units(), assignment.start_date(), assignment.end_date())
            .map_err(|err| ValidationError::new(format!("assignment {}: {err}", assignment.id())))?;
    }

    if ScheduleDag::build(project).is_cyclic() {
        return Err(ValidationError::new("dependency graph contains a cycle"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_domain_inputs() {
        assert!(validate_task_input("Design", 0).is_err());
        assert!(validate_task_input("  ", 3).is_err());
        assert!(validate_task_input("Design", 3).is_ok());
        assert!(validate_resource_input("Ana", -1.0, 0.5).is_err());
        assert!(validate_resource_input("Ana", 10.0, 1.5).is_err());
        assert!(validate_resource_input("Ana", 10.0, 1.0).is_ok());
        assert!(validate_units(0.0).is_err());
        assert!(validate_completion(100.5).is_err());
    }

    #[test]
    fn reversed_date_range_is_rejected() {
        let start = NaiveDate::from_ymd_opt(2025, 2, 10).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 2, 7).unwrap();
        let err = validate_assignment_input(1.0, start, end).unwrap_err();
        assert!(err.message().contains("before start date"));
    }

    #[test]
    fn consistent_project_passes() {
        let start = NaiveDate::from_ymd_opt(2025, 2, 3).unwrap();
        let mut project = Project::new("Plant", start);
        let a = project.create_task("A", 2, Some(start));
        let b = project.create_task("B", 2, None);
        project.add_predecessor(a, b).unwrap();
        let r = project.create_resource("Ana", 40.0, 1.0);
        project.assign_resource(a, r, 1.0, start, start).unwrap();
        assert!(validate_project(&project).is_ok());
    }
}
