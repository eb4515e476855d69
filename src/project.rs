use crate::assignment::Assignment;
use crate::baseline::{Baseline, BaselineResource, BaselineTask, TaskVariance};
use crate::calculations::{
    CompressionOutcome, CriticalPathAnalysis, CriticalPathAnalyzer, LevelingOutcome,
    ResourceLeveler, ScheduleCompressor,
};
use crate::calendar::WorkCalendar;
use crate::config::EngineConfig;
use crate::error::{ScheduleError, ScheduleResult, ValidationError};
use crate::ids::{AssignmentId, IdGenerator, ResourceId, TaskId};
use crate::reports::{self, ProjectAnalysis, ProjectReports};
use crate::resource::Resource;
use crate::task::Task;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{BTreeMap, HashSet};

/// The scheduling aggregate: task graph, resources, and the assignments
/// linking them.
///
/// Tasks, resources and assignments live in id-keyed arenas. Ids are handed
/// out in increasing order and never reused, so iterating an arena yields
/// entities in creation order.
#[derive(Debug, Clone)]
pub struct Project {
    pub name: String,
    start_date: NaiveDate,
    config: EngineConfig,
    calendar: WorkCalendar,
    ids: IdGenerator,
    tasks: BTreeMap<TaskId, Task>,
    resources: BTreeMap<ResourceId, Resource>,
    assignments: BTreeMap<AssignmentId, Assignment>,
    baseline: Option<Baseline>,
    modified: bool,
}

impl Project {
    pub fn new(name: impl Into<String>, start_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            start_date,
            config: EngineConfig::default(),
            calendar: WorkCalendar::default(),
            ids: IdGenerator::default(),
            tasks: BTreeMap::new(),
            resources: BTreeMap::new(),
            assignments: BTreeMap::new(),
            baseline: None,
            modified: false,
        }
    }

    pub fn with_config(
        name: impl Into<String>,
        start_date: NaiveDate,
        config: EngineConfig,
    ) -> Result<Self, ValidationError> {
        config.validate()?;
        let mut project = Self::new(name, start_date);
        project.calendar = config.work_calendar()?;
        project.config = config;
        Ok(project)
    }

    /// Reassemble a project from exported parts. Bookings and hours are
    /// derived again from the assignments.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        name: String,
        start_date: NaiveDate,
        config: EngineConfig,
        ids: IdGenerator,
        tasks: Vec<Task>,
        resources: Vec<Resource>,
        assignments: Vec<Assignment>,
        baseline: Option<Baseline>,
    ) -> Result<Self, ValidationError> {
        if ids.is_exhausted() {
            return Err(ValidationError::new("id counters are exhausted"));
        }
        let mut project = Self::with_config(name, start_date, config)?;
        project.ids = ids;
        for task in tasks {
            let id = task.id();
            if project.tasks.insert(id, task).is_some() {
                return Err(ValidationError::new(format!("duplicate task id {id}")));
            }
        }
        for resource in resources {
            let id = resource.id();
            if project.resources.insert(id, resource).is_some() {
                return Err(ValidationError::new(format!("duplicate resource id {id}")));
            }
        }
        for assignment in assignments {
            let id = assignment.id();
            if project.assignments.insert(id, assignment).is_some() {
                return Err(ValidationError::new(format!("duplicate assignment id {id}")));
            }
        }
        project.ids.reserve_past(
            project.tasks.keys().next_back().copied(),
            project.resources.keys().next_back().copied(),
            project.assignments.keys().next_back().copied(),
        )?;
        project.rebuild_bookings();
        project.baseline = baseline;
        Ok(project)
    }

    pub(crate) fn id_generator(&self) -> &IdGenerator {
        &self.ids
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn set_start_date(&mut self, start_date: NaiveDate) {
        self.start_date = start_date;
        self.modified = true;
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn calendar(&self) -> &WorkCalendar {
        &self.calendar
    }

    /// Swap the engine configuration; assignment hours are recomputed under
    /// the new calendar.
    pub fn set_config(&mut self, config: EngineConfig) -> Result<(), ValidationError> {
        config.validate()?;
        self.calendar = config.work_calendar()?;
        self.config = config;
        for assignment in self.assignments.values_mut() {
            assignment.recompute_hours(&self.calendar, self.config.hours_per_day);
        }
        self.modified = true;
        Ok(())
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn mark_saved(&mut self) {
        self.modified = false;
    }

    pub(crate) fn mark_modified(&mut self) {
        self.modified = true;
    }

    // ---- tasks ----

    pub fn create_task(
        &mut self,
        name: impl Into<String>,
        duration_days: i64,
        start_date: Option<NaiveDate>,
    ) -> TaskId {
        let id = self.ids.next_task();
        self.tasks
            .insert(id, Task::new(id, name, duration_days, start_date));
        self.modified = true;
        id
    }

    /// Remove a task together with its edges and assignments.
    pub fn delete_task(&mut self, id: TaskId) -> ScheduleResult<Task> {
        let task = self.tasks.get(&id).ok_or(ScheduleError::TaskNotFound(id))?;
        let assignment_ids = task.assignments().to_vec();
        let predecessors = task.predecessors().to_vec();
        let successors = task.successors().to_vec();

        for assignment_id in assignment_ids {
            self.remove_assignment(assignment_id);
        }
        for pred in predecessors {
            if let Some(other) = self.tasks.get_mut(&pred) {
                other.drop_successor(id);
            }
        }
        for succ in successors {
            if let Some(other) = self.tasks.get_mut(&succ) {
                other.drop_predecessor(id);
            }
        }
        self.modified = true;
        self.tasks.remove(&id).ok_or(ScheduleError::TaskNotFound(id))
    }

    pub fn find_task_by_id(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id)
    }

    /// Mutable handle for direct field edits. Marks the project modified.
    pub fn task_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        let task = self.tasks.get_mut(&id)?;
        self.modified = true;
        Some(task)
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    pub fn task_ids(&self) -> Vec<TaskId> {
        self.tasks.keys().copied().collect()
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn update_progress(&mut self, id: TaskId, percentage: f64) -> ScheduleResult<()> {
        let task = self.task_mut(id).ok_or(ScheduleError::TaskNotFound(id))?;
        task.update_progress(percentage);
        Ok(())
    }

    // ---- dependencies ----

    /// Make `predecessor` finish before `successor` starts.
    ///
    /// Fails without touching the graph when the edge already exists or would
    /// close a cycle.
    pub fn add_predecessor(&mut self, predecessor: TaskId, successor: TaskId) -> ScheduleResult<()> {
        if !self.tasks.contains_key(&predecessor) {
            return Err(ScheduleError::TaskNotFound(predecessor));
        }
        let succ_task = self
            .tasks
            .get(&successor)
            .ok_or(ScheduleError::TaskNotFound(successor))?;

        if predecessor == successor {
            return Err(ScheduleError::Cycle {
                predecessor,
                successor,
            });
        }
        if succ_task.predecessors().contains(&predecessor) {
            return Err(ScheduleError::DuplicateEdge {
                predecessor,
                successor,
            });
        }
        if self.depends_on(predecessor, successor) {
            return Err(ScheduleError::Cycle {
                predecessor,
                successor,
            });
        }

        if let Some(task) = self.tasks.get_mut(&successor) {
            task.push_predecessor(predecessor);
        }
        if let Some(task) = self.tasks.get_mut(&predecessor) {
            task.push_successor(successor);
        }
        self.modified = true;
        Ok(())
    }

    /// Drop the edge from both sides. Returns whether an edge was removed.
    pub fn remove_predecessor(&mut self, predecessor: TaskId, successor: TaskId) -> bool {
        let removed = self
            .tasks
            .get_mut(&successor)
            .is_some_and(|task| task.drop_predecessor(predecessor));
        if let Some(task) = self.tasks.get_mut(&predecessor) {
            task.drop_successor(successor);
        }
        if removed {
            self.modified = true;
        }
        removed
    }

    /// True when `ancestor` is reachable from `task` by walking predecessor
    /// edges.
    pub fn depends_on(&self, task: TaskId, ancestor: TaskId) -> bool {
        let mut visited = HashSet::new();
        let mut stack = vec![task];
        while let Some(current) = stack.pop() {
            if current == ancestor {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(node) = self.tasks.get(&current) {
                stack.extend(
                    node.predecessors()
                        .iter()
                        .filter(|pred| !visited.contains(*pred)),
                );
            }
        }
        false
    }

    // ---- resources ----

    pub fn create_resource(
        &mut self,
        name: impl Into<String>,
        cost_rate: f64,
        availability: f64,
    ) -> ResourceId {
        let id = self.ids.next_resource();
        self.resources
            .insert(id, Resource::new(id, name, cost_rate, availability));
        self.modified = true;
        id
    }

    /// Remove a resource and every assignment that books it.
    pub fn delete_resource(&mut self, id: ResourceId) -> ScheduleResult<Resource> {
        let resource = self
            .resources
            .get(&id)
            .ok_or(ScheduleError::ResourceNotFound(id))?;
        for assignment_id in resource.assignments().to_vec() {
            self.remove_assignment(assignment_id);
        }
        self.modified = true;
        self.resources
            .remove(&id)
            .ok_or(ScheduleError::ResourceNotFound(id))
    }

    pub fn find_resource_by_id(&self, id: ResourceId) -> Option<&Resource> {
        self.resources.get(&id)
    }

    pub fn resource_mut(&mut self, id: ResourceId) -> Option<&mut Resource> {
        let resource = self.resources.get_mut(&id)?;
        self.modified = true;
        Some(resource)
    }

    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    /// Remaining availability of a resource on `date` under the project calendar.
    pub fn resource_availability(&self, id: ResourceId, date: NaiveDate) -> ScheduleResult<f64> {
        let resource = self
            .resources
            .get(&id)
            .ok_or(ScheduleError::ResourceNotFound(id))?;
        Ok(resource.get_availability(date, &self.calendar))
    }

    pub fn add_skill(&mut self, id: ResourceId, skill: impl Into<String>) -> ScheduleResult<bool> {
        let resource = self
            .resource_mut(id)
            .ok_or(ScheduleError::ResourceNotFound(id))?;
        Ok(resource.add_skill(skill))
    }

    pub fn remove_skill(&mut self, id: ResourceId, skill: &str) -> ScheduleResult<bool> {
        let resource = self
            .resource_mut(id)
            .ok_or(ScheduleError::ResourceNotFound(id))?;
        Ok(resource.remove_skill(skill))
    }

    /// Override a resource's capacity on one date. The value is clamped into `[0, 1]`.
    pub fn set_custom_availability(
        &mut self,
        id: ResourceId,
        date: NaiveDate,
        value: f64,
    ) -> ScheduleResult<()> {
        let resource = self
            .resource_mut(id)
            .ok_or(ScheduleError::ResourceNotFound(id))?;
        resource.set_custom_availability(date, value);
        Ok(())
    }

    /// Drop an override, returning the value it held.
    pub fn clear_custom_availability(
        &mut self,
        id: ResourceId,
        date: NaiveDate,
    ) -> ScheduleResult<Option<f64>> {
        let resource = self
            .resource_mut(id)
            .ok_or(ScheduleError::ResourceNotFound(id))?;
        Ok(resource.clear_custom_availability(date))
    }

    // ---- assignments ----

    /// Book `resource` onto `task` for `start..=end` at `units` of a day.
    pub fn assign_resource(
        &mut self,
        task: TaskId,
        resource: ResourceId,
        units: f64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ScheduleResult<AssignmentId> {
        if !self.tasks.contains_key(&task) {
            return Err(ScheduleError::TaskNotFound(task));
        }
        if !self.resources.contains_key(&resource) {
            return Err(ScheduleError::ResourceNotFound(resource));
        }

        let id = self.ids.next_assignment();
        let mut assignment = Assignment::new(id, task, resource, units, start, end);
        assignment.recompute_hours(&self.calendar, self.config.hours_per_day);

        if let Some(res) = self.resources.get_mut(&resource) {
            res.book(start, end, units);
            res.push_assignment(id);
        }
        if let Some(owner) = self.tasks.get_mut(&task) {
            owner.push_assignment(id);
        }
        self.assignments.insert(id, assignment);
        self.modified = true;
        Ok(id)
    }

    /// Remove every assignment between `task` and `resource`. Returns how
    /// many were removed.
    pub fn remove_resource(&mut self, task: TaskId, resource: ResourceId) -> ScheduleResult<usize> {
        let owner = self.tasks.get(&task).ok_or(ScheduleError::TaskNotFound(task))?;
        if !self.resources.contains_key(&resource) {
            return Err(ScheduleError::ResourceNotFound(resource));
        }
        let matching: Vec<AssignmentId> = owner
            .assignments()
            .iter()
            .copied()
            .filter(|id| {
                self.assignments
                    .get(id)
                    .is_some_and(|assignment| assignment.resource() == resource)
            })
            .collect();
        for id in &matching {
            self.remove_assignment(*id);
        }
        Ok(matching.len())
    }

    /// Remove one assignment from the arena, its task, and its resource, and
    /// release its bookings.
    pub fn remove_assignment(&mut self, id: AssignmentId) -> Option<Assignment> {
        let assignment = self.assignments.remove(&id)?;
        if let Some(task) = self.tasks.get_mut(&assignment.task()) {
            task.drop_assignment(id);
        }
        if let Some(resource) = self.resources.get_mut(&assignment.resource()) {
            resource.drop_assignment(id);
            resource.release(
                assignment.start_date(),
                assignment.end_date(),
                assignment.units(),
            );
        }
        self.modified = true;
        Some(assignment)
    }

    pub fn assignment(&self, id: AssignmentId) -> Option<&Assignment> {
        self.assignments.get(&id)
    }

    pub fn assignments(&self) -> impl Iterator<Item = &Assignment> {
        self.assignments.values()
    }

    pub fn task_assignments(&self, task: TaskId) -> Vec<&Assignment> {
        self.tasks
            .get(&task)
            .map(|owner| {
                owner
                    .assignments()
                    .iter()
                    .filter_map(|id| self.assignments.get(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn resource_assignments(&self, resource: ResourceId) -> Vec<&Assignment> {
        self.resources
            .get(&resource)
            .map(|owner| {
                owner
                    .assignments()
                    .iter()
                    .filter_map(|id| self.assignments.get(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Distinct tasks a resource is booked on, in booking order.
    pub fn resource_tasks(&self, resource: ResourceId) -> Vec<TaskId> {
        let mut seen = HashSet::new();
        self.resource_assignments(resource)
            .into_iter()
            .map(|assignment| assignment.task())
            .filter(|task| seen.insert(*task))
            .collect()
    }

    /// Change the units of an assignment, re-booking the resource ledger.
    pub(crate) fn set_assignment_units(&mut self, id: AssignmentId, units: f64) -> bool {
        let Some(assignment) = self.assignments.get_mut(&id) else {
            return false;
        };
        if let Some(resource) = self.resources.get_mut(&assignment.resource()) {
            resource.release(
                assignment.start_date(),
                assignment.end_date(),
                assignment.units(),
            );
            resource.book(assignment.start_date(), assignment.end_date(), units);
        }
        assignment.set_units(units);
        assignment.recompute_hours(&self.calendar, self.config.hours_per_day);
        self.modified = true;
        true
    }

    fn rebuild_bookings(&mut self) {
        for resource in self.resources.values_mut() {
            resource.clear_bookings();
        }
        for assignment in self.assignments.values_mut() {
            assignment.recompute_hours(&self.calendar, self.config.hours_per_day);
            if let Some(resource) = self.resources.get_mut(&assignment.resource()) {
                resource.book(
                    assignment.start_date(),
                    assignment.end_date(),
                    assignment.units(),
                );
            }
        }
    }

    // ---- aggregates ----

    /// Latest end date among scheduled tasks.
    pub fn end_date(&self) -> Option<NaiveDate> {
        self.tasks.values().filter_map(Task::end_date).max()
    }

    /// Project start through latest task end, when any task is scheduled.
    pub fn schedule_window(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.end_date().map(|end| (self.start_date, end))
    }

    /// Days from project start to the latest task end; zero with no
    /// scheduled tasks.
    pub fn duration_days(&self) -> i64 {
        self.end_date()
            .map(|end| (end - self.start_date).num_days().max(0))
            .unwrap_or(0)
    }

    pub fn task_cost(&self, task: TaskId) -> f64 {
        self.task_assignments(task)
            .into_iter()
            .map(|assignment| self.assignment_cost(assignment))
            .sum()
    }

    pub fn resource_cost(&self, resource: ResourceId) -> f64 {
        self.resource_assignments(resource)
            .into_iter()
            .map(|assignment| self.assignment_cost(assignment))
            .sum()
    }

    pub fn total_cost(&self) -> f64 {
        self.assignments
            .values()
            .map(|assignment| self.assignment_cost(assignment))
            .sum()
    }

    fn assignment_cost(&self, assignment: &Assignment) -> f64 {
        self.resources
            .get(&assignment.resource())
            .map(|resource| assignment.hours() * resource.cost_rate)
            .unwrap_or(0.0)
    }

    /// Utilization of every resource over the schedule window.
    pub fn resource_utilization(&self) -> BTreeMap<ResourceId, f64> {
        let window = self.schedule_window();
        self.resources
            .values()
            .map(|resource| {
                let utilization = window
                    .map(|(start, end)| resource.get_utilization(start, end, &self.calendar))
                    .unwrap_or(0.0);
                (resource.id(), utilization)
            })
            .collect()
    }

    /// Duration-weighted completion percentage.
    pub fn completion_percentage(&self) -> f64 {
        let total: i64 = self.tasks.values().map(|task| task.duration_days).sum();
        if total <= 0 {
            return 0.0;
        }
        let weighted: f64 = self
            .tasks
            .values()
            .map(|task| task.completion() * task.duration_days as f64)
            .sum();
        weighted / total as f64
    }

    // ---- baseline ----

    pub fn save_baseline(&mut self) -> &Baseline {
        self.save_baseline_at(Utc::now())
    }

    pub fn save_baseline_at(&mut self, taken_at: DateTime<Utc>) -> &Baseline {
        let baseline = Baseline {
            taken_at,
            tasks: self
                .tasks
                .values()
                .map(|task| BaselineTask {
                    id: task.id(),
                    name: task.name.clone(),
                    start_date: task.start_date,
                    duration_days: task.duration_days,
                })
                .collect(),
            resources: self
                .resources
                .values()
                .map(|resource| BaselineResource {
                    id: resource.id(),
                    name: resource.name.clone(),
                    cost_rate: resource.cost_rate,
                    availability: resource.availability(),
                })
                .collect(),
        };
        self.modified = true;
        self.baseline.insert(baseline)
    }

    pub fn baseline(&self) -> Option<&Baseline> {
        self.baseline.as_ref()
    }

    /// Start slip and duration change for every task present in the baseline.
    pub fn baseline_variance(&self) -> Option<Vec<TaskVariance>> {
        let baseline = self.baseline.as_ref()?;
        let variances = self
            .tasks
            .values()
            .filter_map(|task| {
                let planned = baseline.task(task.id())?;
                let start_slip_days = match (planned.start_date, task.start_date) {
                    (Some(planned_start), Some(current)) => {
                        Some(self.calendar.working_days_between(planned_start, current))
                    }
                    _ => None,
                };
                Some(TaskVariance {
                    task: task.id(),
                    name: task.name.clone(),
                    baseline_start: planned.start_date,
                    current_start: task.start_date,
                    start_slip_days,
                    duration_delta: task.duration_days - planned.duration_days,
                })
            })
            .collect();
        Some(variances)
    }

    // ---- analysis ----

    pub fn calculate_critical_path(&self) -> ScheduleResult<CriticalPathAnalysis> {
        CriticalPathAnalyzer::new(self).run()
    }

    pub fn level_resources(&mut self) -> ScheduleResult<LevelingOutcome> {
        ResourceLeveler::new(self).run()
    }

    pub fn optimize_schedule(&mut self) -> ScheduleResult<CompressionOutcome> {
        ScheduleCompressor::new(self).run()
    }

    pub fn analyze_project(&self) -> ScheduleResult<ProjectAnalysis> {
        reports::analyze_project(self)
    }

    pub fn generate_reports(&self) -> ScheduleResult<ProjectReports> {
        reports::generate_reports(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let mut project = Project::new("Site", d(2025, 1, 6));
        let a = project.create_task("A", 1, None);
        project.delete_task(a).unwrap();
        let b = project.create_task("B", 1, None);
        assert_ne!(a, b);
        assert!(project.find_task_by_id(a).is_none());
    }

    #[test]
    fn self_edge_and_duplicate_edge_are_rejected() {
        let mut project = Project::new("Site", d(2025, 1, 6));
        let a = project.create_task("A", 1, None);
        let b = project.create_task("B", 1, None);
        assert!(matches!(
            project.add_predecessor(a, a),
            Err(ScheduleError::Cycle { .. })
        ));
        project.add_predecessor(a, b).unwrap();
        assert_eq!(
            project.add_predecessor(a, b),
            Err(ScheduleError::DuplicateEdge {
                predecessor: a,
                successor: b
            })
        );
        assert_eq!(project.find_task_by_id(b).unwrap().predecessors(), &[a]);
    }

    #[test]
    fn remove_predecessor_is_a_no_op_when_absent() {
        let mut project = Project::new("Site", d(2025, 1, 6));
        let a = project.create_task("A", 1, None);
        let b = project.create_task("B", 1, None);
        project.mark_saved();
        assert!(!project.remove_predecessor(a, b));
        assert!(!project.is_modified());
        project.add_predecessor(a, b).unwrap();
        assert!(project.remove_predecessor(a, b));
        assert!(project.find_task_by_id(a).unwrap().successors().is_empty());
    }

    #[test]
    fn unknown_ids_are_reported() {
        let mut project = Project::new("Site", d(2025, 1, 6));
        let a = project.create_task("A", 1, None);
        assert_eq!(
            project.assign_resource(a, ResourceId(9), 1.0, d(2025, 1, 6), d(2025, 1, 6)),
            Err(ScheduleError::ResourceNotFound(ResourceId(9)))
        );
        assert_eq!(
            project.delete_task(TaskId(42)).unwrap_err(),
            ScheduleError::TaskNotFound(TaskId(42))
        );
    }

    #[test]
    fn completion_is_weighted_by_duration() {
        let mut project = Project::new("Site", d(2025, 1, 6));
        let a = project.create_task("A", 1, None);
        let b = project.create_task("B", 3, None);
        project.update_progress(a, 100.0).unwrap();
        project.update_progress(b, 50.0).unwrap();
        assert!((project.completion_percentage() - 62.5).abs() < 1e-9);
        assert_eq!(Project::new("Empty", d(2025, 1, 6)).completion_percentage(), 0.0);
    }

    #[test]
    fn mutations_set_the_modified_flag() {
        let mut project = Project::new("Site", d(2025, 1, 6));
        assert!(!project.is_modified());
        let a = project.create_task("A", 1, None);
        project.mark_saved();
        project.task_mut(a).unwrap().priority = 2;
        assert!(project.is_modified());
    }
}
