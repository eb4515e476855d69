use super::{PersistenceError, PersistenceResult};
use crate::assignment::Assignment;
use crate::baseline::Baseline;
use crate::config::EngineConfig;
use crate::ids::IdGenerator;
use crate::project::Project;
use crate::resource::Resource;
use crate::task::Task;
use crate::validation;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Complete exported state of a [`Project`].
///
/// Resource bookings are not stored. They are rebuilt from the assignments on
/// import, and assignment hours are recomputed against the stored calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    pub name: String,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub config: EngineConfig,
    #[serde(default)]
    pub ids: IdGenerator,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline: Option<Baseline>,
}

impl ProjectSnapshot {
    pub fn from_project(project: &Project) -> Self {
        Self {
            name: project.name.clone(),
            start_date: project.start_date(),
            config: project.config().clone(),
            ids: project.id_generator().clone(),
            tasks: project.tasks().cloned().collect(),
            resources: project.resources().cloned().collect(),
            assignments: project.assignments().cloned().collect(),
            baseline: project.baseline().cloned(),
        }
    }

    /// Rebuild the project and check its structure. The result is not marked
    /// modified.
    pub fn into_project(self) -> PersistenceResult<Project> {
        let mut project = Project::from_parts(
            self.name,
            self.start_date,
            self.config,
            self.ids,
            self.tasks,
            self.resources,
            self.assignments,
            self.baseline,
        )?;
        validation::validate_project(&project)?;
        project.mark_saved();
        Ok(project)
    }
}

impl From<&Project> for ProjectSnapshot {
    fn from(project: &Project) -> Self {
        ProjectSnapshot::from_project(project)
    }
}

impl TryFrom<ProjectSnapshot> for Project {
    type Error = PersistenceError;

    fn try_from(snapshot: ProjectSnapshot) -> Result<Self, Self::Error> {
        snapshot.into_project()
    }
}

pub fn save_project_to_json<P: AsRef<Path>>(project: &Project, path: P) -> PersistenceResult<()> {
    let snapshot = ProjectSnapshot::from_project(project);
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    Ok(())
}

pub fn load_project_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Project> {
    let file = File::open(path)?;
    let snapshot: ProjectSnapshot = serde_json::from_reader(file)?;
    snapshot.into_project()
}

pub fn save_project_to_string(project: &Project) -> PersistenceResult<String> {
    Ok(serde_json::to_string_pretty(&ProjectSnapshot::from_project(
        project,
    ))?)
}

pub fn load_project_from_str(json: &str) -> PersistenceResult<Project> {
    let snapshot: ProjectSnapshot = serde_json::from_str(json)?;
    snapshot.into_project()
}
