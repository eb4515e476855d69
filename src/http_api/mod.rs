use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use chrono::NaiveDate;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::baseline::{Baseline, TaskVariance};
use crate::calculations::{CompressionOutcome, CriticalPathAnalysis, LevelingOutcome};
use crate::reports::{self, ProjectAnalysis, ProjectReports, ProjectSummary};
use crate::{
    Assignment, AssignmentId, Project, Resource, ResourceId, ScheduleError, Task, TaskId,
    validation,
};

/// The whole project behind one coarse lock: handlers that mutate take the
/// write guard for the full call, readers work on a consistent view.
#[derive(Clone)]
pub struct AppState {
    project: Arc<RwLock<Project>>,
}

impl AppState {
    pub fn new(project: Project) -> Self {
        Self {
            project: Arc::new(RwLock::new(project)),
        }
    }

    fn project(&self) -> Arc<RwLock<Project>> {
        self.project.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Conflict(String),
    Invalid(String),
    Internal(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }

    fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

impl From<ScheduleError> for ApiError {
    fn from(value: ScheduleError) -> Self {
        match value {
            ScheduleError::TaskNotFound(_) | ScheduleError::ResourceNotFound(_) => {
                ApiError::NotFound(value.to_string())
            }
            ScheduleError::Cycle { .. } | ScheduleError::DuplicateEdge { .. } => {
                ApiError::Conflict(value.to_string())
            }
            ScheduleError::Validation(err) => ApiError::Invalid(err.to_string()),
        }
    }
}

impl From<crate::ValidationError> for ApiError {
    fn from(value: crate::ValidationError) -> Self {
        ApiError::Invalid(value.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, "conflict", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct CreateTaskPayload {
    name: String,
    duration_days: i64,
    #[serde(default)]
    start_date: Option<NaiveDate>,
    #[serde(default)]
    priority: i32,
    #[serde(default)]
    notes: String,
}

#[derive(Debug, Default, Deserialize)]
struct UpdateTaskPayload {
    name: Option<String>,
    duration_days: Option<i64>,
    start_date: Option<NaiveDate>,
    priority: Option<i32>,
    notes: Option<String>,
    completion: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct PredecessorPayload {
    predecessor: u32,
}

#[derive(Debug, Deserialize)]
struct CreateResourcePayload {
    name: String,
    cost_rate: f64,
    availability: f64,
    #[serde(default)]
    skills: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SkillPayload {
    skill: String,
}

#[derive(Debug, Deserialize)]
struct AvailabilityPayload {
    availability: f64,
}

#[derive(Debug, Deserialize)]
struct AssignPayload {
    task: u32,
    resource: u32,
    units: f64,
    start_date: NaiveDate,
    end_date: NaiveDate,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/project", get(get_summary))
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/:id",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/tasks/:id/predecessors", post(add_predecessor))
        .route(
            "/tasks/:id/predecessors/:pred",
            delete(remove_predecessor),
        )
        .route(
            "/tasks/:id/resources/:resource",
            delete(remove_resource),
        )
        .route("/resources", get(list_resources).post(create_resource))
        .route("/resources/:id", get(get_resource).delete(delete_resource))
        .route("/resources/:id/skills", post(add_skill))
        .route("/resources/:id/skills/:skill", delete(remove_skill))
        .route(
            "/resources/:id/availability/:date",
            put(set_custom_availability).delete(clear_custom_availability),
        )
        .route("/assignments", get(list_assignments).post(assign_resource))
        .route("/critical_path", get(critical_path))
        .route("/level", post(level_resources))
        .route("/optimize", post(optimize_schedule))
        .route("/analysis", get(analyze_project))
        .route("/reports", get(generate_reports))
        .route("/baseline", get(get_baseline).post(save_baseline))
        .route("/baseline/variance", get(baseline_variance))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, project: Project) -> std::io::Result<()> {
    let state = AppState::new(project);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn get_summary(State(state): State<AppState>) -> Json<ProjectSummary> {
    let project = state.project();
    let summary = {
        let guard = project.read();
        reports::generate_summary_report(&guard)
    };
    Json(summary)
}

async fn list_tasks(State(state): State<AppState>) -> Json<Vec<Task>> {
    let project = state.project();
    let tasks = {
        let guard = project.read();
        guard.tasks().cloned().collect()
    };
    Json(tasks)
}

async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<u32>,
) -> Result<Json<Task>, ApiError> {
    let project = state.project();
    let task = {
        let guard = project.read();
        guard.find_task_by_id(TaskId(task_id)).cloned()
    };
    task.map(Json)
        .ok_or_else(|| ApiError::not_found(format!("task {task_id} not found")))
}

async fn create_task(
    State(state): State<AppState>,
    Json(payload): Json<CreateTaskPayload>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    validation::validate_task_input(&payload.name, payload.duration_days)?;
    let project = state.project();
    let created = {
        let mut guard = project.write();
        let id = guard.create_task(payload.name, payload.duration_days, payload.start_date);
        let task = guard
            .task_mut(id)
            .ok_or_else(|| ApiError::internal("task not found after creation"))?;
        task.priority = payload.priority;
        task.notes = payload.notes;
        task.clone()
    };
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_task(
    State(state): State<AppState>,
    Path(task_id): Path<u32>,
    Json(payload): Json<UpdateTaskPayload>,
) -> Result<Json<Task>, ApiError> {
    if let Some(name) = &payload.name {
        validation::validate_name("task", name)?;
    }
    if let Some(duration) = payload.duration_days {
        validation::validate_duration(duration)?;
    }
    if let Some(completion) = payload.completion {
        validation::validate_completion(completion)?;
    }

    let project = state.project();
    let mut guard = project.write();
    let task = guard
        .task_mut(TaskId(task_id))
        .ok_or_else(|| ApiError::not_found(format!("task {task_id} not found")))?;
    if let Some(name) = payload.name {
        task.name = name;
    }
    if let Some(duration) = payload.duration_days {
        task.duration_days = duration;
    }
    if let Some(start) = payload.start_date {
        task.start_date = Some(start);
    }
    if let Some(priority) = payload.priority {
        task.priority = priority;
    }
    if let Some(notes) = payload.notes {
        task.notes = notes;
    }
    if let Some(completion) = payload.completion {
        task.update_progress(completion);
    }
    Ok(Json(task.clone()))
}

async fn delete_task(
    State(state): State<AppState>,
    Path(task_id): Path<u32>,
) -> Result<StatusCode, ApiError> {
    let project = state.project();
    project.write().delete_task(TaskId(task_id))?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_predecessor(
    State(state): State<AppState>,
    Path(task_id): Path<u32>,
    Json(payload): Json<PredecessorPayload>,
) -> Result<Json<Task>, ApiError> {
    let project = state.project();
    let mut guard = project.write();
    guard.add_predecessor(TaskId(payload.predecessor), TaskId(task_id))?;
    guard
        .find_task_by_id(TaskId(task_id))
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::internal("task not found after edge creation"))
}

async fn remove_predecessor(
    State(state): State<AppState>,
    Path((task_id, pred_id)): Path<(u32, u32)>,
) -> StatusCode {
    let project = state.project();
    project
        .write()
        .remove_predecessor(TaskId(pred_id), TaskId(task_id));
    StatusCode::NO_CONTENT
}

async fn list_resources(State(state): State<AppState>) -> Json<Vec<Resource>> {
    let project = state.project();
    let resources = {
        let guard = project.read();
        guard.resources().cloned().collect()
    };
    Json(resources)
}

async fn get_resource(
    State(state): State<AppState>,
    Path(resource_id): Path<u32>,
) -> Result<Json<Resource>, ApiError> {
    let project = state.project();
    let resource = {
        let guard = project.read();
        guard.find_resource_by_id(ResourceId(resource_id)).cloned()
    };
    resource
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("resource {resource_id} not found")))
}

async fn create_resource(
    State(state): State<AppState>,
    Json(payload): Json<CreateResourcePayload>,
) -> Result<(StatusCode, Json<Resource>), ApiError> {
    validation::validate_resource_input(&payload.name, payload.cost_rate, payload.availability)?;
    let project = state.project();
    let created = {
        let mut guard = project.write();
        let id = guard.create_resource(payload.name, payload.cost_rate, payload.availability);
        let resource = guard
            .resource_mut(id)
            .ok_or_else(|| ApiError::internal("resource not found after creation"))?;
        for skill in payload.skills {
            resource.add_skill(skill);
        }
        resource.clone()
    };
    Ok((StatusCode::CREATED, Json(created)))
}

async fn delete_resource(
    State(state): State<AppState>,
    Path(resource_id): Path<u32>,
) -> Result<StatusCode, ApiError> {
    let project = state.project();
    project.write().delete_resource(ResourceId(resource_id))?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_skill(
    State(state): State<AppState>,
    Path(resource_id): Path<u32>,
    Json(payload): Json<SkillPayload>,
) -> Result<Json<Resource>, ApiError> {
    validation::validate_name("skill", &payload.skill)?;
    let project = state.project();
    let mut guard = project.write();
    guard.add_skill(ResourceId(resource_id), payload.skill)?;
    resource_snapshot(&guard, resource_id)
}

async fn remove_skill(
    State(state): State<AppState>,
    Path((resource_id, skill)): Path<(u32, String)>,
) -> Result<Json<Resource>, ApiError> {
    let project = state.project();
    let mut guard = project.write();
    guard.remove_skill(ResourceId(resource_id), &skill)?;
    resource_snapshot(&guard, resource_id)
}

async fn set_custom_availability(
    State(state): State<AppState>,
    Path((resource_id, date)): Path<(u32, NaiveDate)>,
    Json(payload): Json<AvailabilityPayload>,
) -> Result<Json<Resource>, ApiError> {
    validation::validate_fraction("availability", payload.availability)?;
    let project = state.project();
    let mut guard = project.write();
    guard.set_custom_availability(ResourceId(resource_id), date, payload.availability)?;
    resource_snapshot(&guard, resource_id)
}

async fn clear_custom_availability(
    State(state): State<AppState>,
    Path((resource_id, date)): Path<(u32, NaiveDate)>,
) -> Result<Json<Resource>, ApiError> {
    let project = state.project();
    let mut guard = project.write();
    guard.clear_custom_availability(ResourceId(resource_id), date)?;
    resource_snapshot(&guard, resource_id)
}

fn resource_snapshot(project: &Project, resource_id: u32) -> Result<Json<Resource>, ApiError> {
    project
        .find_resource_by_id(ResourceId(resource_id))
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::internal("resource not found after update"))
}

async fn list_assignments(State(state): State<AppState>) -> Json<Vec<Assignment>> {
    let project = state.project();
    let assignments = {
        let guard = project.read();
        guard.assignments().cloned().collect()
    };
    Json(assignments)
}

async fn assign_resource(
    State(state): State<AppState>,
    Json(payload): Json<AssignPayload>,
) -> Result<(StatusCode, Json<Assignment>), ApiError> {
    validation::validate_assignment_input(payload.units, payload.start_date, payload.end_date)?;
    let project = state.project();
    let mut guard = project.write();
    let id: AssignmentId = guard.assign_resource(
        TaskId(payload.task),
        ResourceId(payload.resource),
        payload.units,
        payload.start_date,
        payload.end_date,
    )?;
    let created = guard
        .assignment(id)
        .cloned()
        .ok_or_else(|| ApiError::internal("assignment not found after creation"))?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn remove_resource(
    State(state): State<AppState>,
    Path((task_id, resource_id)): Path<(u32, u32)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let project = state.project();
    let removed = project
        .write()
        .remove_resource(TaskId(task_id), ResourceId(resource_id))?;
    Ok(Json(json!({ "removed": removed })))
}

async fn critical_path(
    State(state): State<AppState>,
) -> Result<Json<CriticalPathAnalysis>, ApiError> {
    let project = state.project();
    let analysis = project.read().calculate_critical_path()?;
    Ok(Json(analysis))
}

async fn level_resources(State(state): State<AppState>) -> Result<Json<LevelingOutcome>, ApiError> {
    let project = state.project();
    let outcome = project.write().level_resources()?;
    Ok(Json(outcome))
}

async fn optimize_schedule(
    State(state): State<AppState>,
) -> Result<Json<CompressionOutcome>, ApiError> {
    let project = state.project();
    let outcome = project.write().optimize_schedule()?;
    Ok(Json(outcome))
}

async fn analyze_project(State(state): State<AppState>) -> Result<Json<ProjectAnalysis>, ApiError> {
    let project = state.project();
    let analysis = project.read().analyze_project()?;
    Ok(Json(analysis))
}

async fn generate_reports(State(state): State<AppState>) -> Result<Json<ProjectReports>, ApiError> {
    let project = state.project();
    let reports = project.read().generate_reports()?;
    Ok(Json(reports))
}

async fn get_baseline(State(state): State<AppState>) -> Result<Json<Baseline>, ApiError> {
    let project = state.project();
    let baseline = project.read().baseline().cloned();
    baseline
        .map(Json)
        .ok_or_else(|| ApiError::not_found("no baseline saved"))
}

async fn save_baseline(State(state): State<AppState>) -> (StatusCode, Json<Baseline>) {
    let project = state.project();
    let baseline = project.write().save_baseline().clone();
    (StatusCode::CREATED, Json(baseline))
}

async fn baseline_variance(
    State(state): State<AppState>,
) -> Result<Json<Vec<TaskVariance>>, ApiError> {
    let project = state.project();
    let variance = project.read().baseline_variance();
    variance
        .map(Json)
        .ok_or_else(|| ApiError::not_found("no baseline saved"))
}
