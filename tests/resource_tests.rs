use chrono::NaiveDate;
use project_scheduler::calendar::date_range;
use project_scheduler::{Project, ScheduleError};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn full_week_booking_is_full_utilization() {
    let mut project = Project::new("Busy", d(2025, 1, 6));
    let task = project.create_task("Build", 5, Some(d(2025, 1, 6)));
    let ana = project.create_resource("Ana", 40.0, 1.0);
    project
        .assign_resource(task, ana, 1.0, d(2025, 1, 6), d(2025, 1, 10))
        .unwrap();

    let resource = project.find_resource_by_id(ana).unwrap();
    let utilization = resource.get_utilization(d(2025, 1, 6), d(2025, 1, 10), project.calendar());
    assert!((utilization - 1.0).abs() < 1e-9);
    assert_eq!(project.resource_utilization()[&ana], utilization);
    assert_eq!(project.resource_availability(ana, d(2025, 1, 8)).unwrap(), 0.0);
}

#[test]
fn assign_then_remove_restores_availability() {
    let mut project = Project::new("Restore", d(2025, 1, 6));
    let task = project.create_task("Build", 5, Some(d(2025, 1, 6)));
    let ana = project.create_resource("Ana", 40.0, 0.8);
    project
        .resource_mut(ana)
        .unwrap()
        .set_custom_availability(d(2025, 1, 11), 0.5);

    let window = || date_range(d(2025, 1, 4), d(2025, 1, 14));
    let before: Vec<f64> = window()
        .map(|date| project.resource_availability(ana, date).unwrap())
        .collect();

    project
        .assign_resource(task, ana, 0.3, d(2025, 1, 6), d(2025, 1, 12))
        .unwrap();
    assert!((project.resource_availability(ana, d(2025, 1, 7)).unwrap() - 0.5).abs() < 1e-9);
    assert!((project.resource_availability(ana, d(2025, 1, 11)).unwrap() - 0.2).abs() < 1e-9);

    assert_eq!(project.remove_resource(task, ana).unwrap(), 1);
    let after: Vec<f64> = window()
        .map(|date| project.resource_availability(ana, date).unwrap())
        .collect();
    assert_eq!(before, after);
}

#[test]
fn remove_resource_clears_both_sides() {
    let mut project = Project::new("Unassign", d(2025, 1, 6));
    let task = project.create_task("Build", 3, Some(d(2025, 1, 6)));
    let other = project.create_task("Test", 3, Some(d(2025, 1, 6)));
    let ana = project.create_resource("Ana", 40.0, 1.0);
    project
        .assign_resource(task, ana, 0.25, d(2025, 1, 6), d(2025, 1, 6))
        .unwrap();
    project
        .assign_resource(task, ana, 0.25, d(2025, 1, 7), d(2025, 1, 7))
        .unwrap();
    let kept = project
        .assign_resource(other, ana, 0.5, d(2025, 1, 6), d(2025, 1, 8))
        .unwrap();

    assert_eq!(project.remove_resource(task, ana).unwrap(), 2);
    assert!(project.find_task_by_id(task).unwrap().assignments().is_empty());
    assert_eq!(project.find_resource_by_id(ana).unwrap().assignments(), &[kept]);
    assert_eq!(project.resource_tasks(ana), vec![other]);
    assert_eq!(project.remove_resource(task, ana).unwrap(), 0);
}

#[test]
fn unknown_ids_are_reported() {
    let mut project = Project::new("Missing", d(2025, 1, 6));
    let task = project.create_task("Build", 3, None);
    let ana = project.create_resource("Ana", 40.0, 1.0);
    project.delete_resource(ana).unwrap();

    assert_eq!(
        project.assign_resource(task, ana, 1.0, d(2025, 1, 6), d(2025, 1, 6)),
        Err(ScheduleError::ResourceNotFound(ana))
    );
    assert_eq!(
        project.resource_availability(ana, d(2025, 1, 6)),
        Err(ScheduleError::ResourceNotFound(ana))
    );
}

#[test]
fn weekend_override_counts_towards_utilization() {
    let mut project = Project::new("Saturday", d(2025, 1, 6));
    let task = project.create_task("Deploy", 1, Some(d(2025, 1, 11)));
    let ana = project.create_resource("Ana", 40.0, 1.0);
    project
        .resource_mut(ana)
        .unwrap()
        .set_custom_availability(d(2025, 1, 11), 1.0);
    project
        .assign_resource(task, ana, 1.0, d(2025, 1, 11), d(2025, 1, 11))
        .unwrap();

    let resource = project.find_resource_by_id(ana).unwrap();
    let calendar = project.calendar();
    assert_eq!(resource.capacity(d(2025, 1, 12), calendar), 0.0);
    // five weekdays of capacity plus the Saturday override, one day booked
    let utilization = resource.get_utilization(d(2025, 1, 6), d(2025, 1, 12), calendar);
    assert!((utilization - 1.0 / 6.0).abs() < 1e-9);
    assert!(resource.over_allocations(d(2025, 1, 6), d(2025, 1, 12), calendar).is_empty());
}

#[test]
fn work_booked_through_the_weekend_exceeds_full_utilization() {
    let mut project = Project::new("Crunch", d(2025, 1, 6));
    let task = project.create_task("Migrate", 7, Some(d(2025, 1, 6)));
    let ana = project.create_resource("Ana", 40.0, 1.0);
    project
        .assign_resource(task, ana, 1.0, d(2025, 1, 6), d(2025, 1, 12))
        .unwrap();

    let resource = project.find_resource_by_id(ana).unwrap();
    // seven booked days against five weekdays of capacity
    let utilization = resource.get_utilization(d(2025, 1, 6), d(2025, 1, 12), project.calendar());
    assert!((utilization - 1.4).abs() < 1e-9);
}

#[test]
fn skills_are_a_set() {
    let mut project = Project::new("Skills", d(2025, 1, 6));
    let ana = project.create_resource("Ana", 40.0, 1.0);
    assert!(project.add_skill(ana, "rust").unwrap());
    assert!(!project.add_skill(ana, "rust").unwrap());
    assert!(project.find_resource_by_id(ana).unwrap().has_skill("rust"));
    assert!(project.remove_skill(ana, "rust").unwrap());
    assert!(!project.remove_skill(ana, "rust").unwrap());
}
