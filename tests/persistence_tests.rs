use chrono::NaiveDate;
use project_scheduler::persistence::{
    load_project_from_json, load_project_from_str, save_project_to_json, save_project_to_string,
};
use project_scheduler::{EngineConfig, PassOrder, PersistenceError, Project, TaskId};
use tempfile::tempdir;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample() -> Project {
    let mut config = EngineConfig::default();
    config.hours_per_day = 7.5;
    config.pass_order = PassOrder::Insertion;
    let mut project = Project::with_config("Launch", d(2025, 1, 6), config).unwrap();
    let design = project.create_task("Design", 3, Some(d(2025, 1, 6)));
    let build = project.create_task("Build", 5, Some(d(2025, 1, 9)));
    project.add_predecessor(design, build).unwrap();
    project.task_mut(build).unwrap().notes = "needs review".to_string();
    project.update_progress(design, 40.0).unwrap();

    let ana = project.create_resource("Ana", 45.0, 0.8);
    project.add_skill(ana, "rust").unwrap();
    project
        .resource_mut(ana)
        .unwrap()
        .set_custom_availability(d(2025, 1, 10), 0.25);
    project
        .assign_resource(build, ana, 0.5, d(2025, 1, 9), d(2025, 1, 15))
        .unwrap();
    project.save_baseline();
    project
}

#[test]
fn file_round_trip_preserves_state() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("launch.json");
    let project = sample();

    save_project_to_json(&project, &path).unwrap();
    let loaded = load_project_from_json(&path).unwrap();

    assert!(!loaded.is_modified());
    assert_eq!(
        save_project_to_string(&loaded).unwrap(),
        save_project_to_string(&project).unwrap()
    );
    assert_eq!(loaded.config().pass_order, PassOrder::Insertion);
    assert!((loaded.total_cost() - project.total_cost()).abs() < 1e-9);
    for day in 6..=16 {
        let ana = loaded.resources().next().unwrap().id();
        assert_eq!(
            loaded.resource_availability(ana, d(2025, 1, day)).unwrap(),
            project.resource_availability(ana, d(2025, 1, day)).unwrap()
        );
    }
    assert_eq!(
        loaded.calculate_critical_path().unwrap(),
        project.calculate_critical_path().unwrap()
    );
}

#[test]
fn ids_are_not_reused_after_load() {
    let mut project = sample();
    let doomed = project.create_task("Doomed", 1, None);
    project.delete_task(doomed).unwrap();

    let json = save_project_to_string(&project).unwrap();
    let mut loaded = load_project_from_str(&json).unwrap();
    let fresh = loaded.create_task("Fresh", 1, None);
    assert!(fresh > doomed);
    assert_eq!(fresh, TaskId(doomed.get() + 1));
}

#[test]
fn ids_are_reserved_past_stored_entities() {
    let project = sample();
    let mut value: serde_json::Value =
        serde_json::from_str(&save_project_to_string(&project).unwrap()).unwrap();
    // older exports without a counter section still load
    value.as_object_mut().unwrap().remove("ids");

    let mut loaded = load_project_from_str(&value.to_string()).unwrap();
    let fresh = loaded.create_task("Fresh", 1, None);
    assert_eq!(fresh, TaskId(3));
}

#[test]
fn one_sided_edges_are_rejected() {
    let project = sample();
    let mut value: serde_json::Value =
        serde_json::from_str(&save_project_to_string(&project).unwrap()).unwrap();
    value["tasks"][0]["successors"] = serde_json::json!([]);

    let err = load_project_from_str(&value.to_string()).unwrap_err();
    assert!(matches!(err, PersistenceError::InvalidData(_)));
}

#[test]
fn malformed_json_is_a_serialization_error() {
    let err = load_project_from_str("{ not json").unwrap_err();
    assert!(matches!(err, PersistenceError::Serialization(_)));

    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing.json");
    assert!(matches!(
        load_project_from_json(&missing),
        Err(PersistenceError::Io(_))
    ));
}

#[test]
fn ids_at_the_top_of_the_range_are_invalid_data() {
    let project = sample();
    let json = save_project_to_string(&project).unwrap();

    let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
    value["tasks"][0]["id"] = serde_json::json!(u32::MAX);
    value["tasks"][1]["predecessors"] = serde_json::json!([u32::MAX]);
    let err = load_project_from_str(&value.to_string()).unwrap_err();
    assert!(matches!(err, PersistenceError::InvalidData(_)));

    let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
    value["ids"]["next_task"] = serde_json::json!(u32::MAX);
    let err = load_project_from_str(&value.to_string()).unwrap_err();
    assert!(matches!(err, PersistenceError::InvalidData(_)));
}
