pub mod assignment;
pub mod baseline;
pub mod calculations;
pub mod calendar;
pub mod config;
pub mod error;
pub mod graph;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod ids;
pub mod persistence;
pub mod project;
pub mod reports;
pub mod resource;
pub mod task;
pub mod validation;

pub use assignment::Assignment;
pub use baseline::{Baseline, TaskVariance};
pub use calculations::{
    CompressionOutcome, CriticalPathAnalysis, LevelingOutcome, TaskTiming,
};
pub use calendar::{DateDifference, WorkCalendar, WorkCalendarConfig};
pub use config::{EngineConfig, PassOrder, RiskThresholds};
pub use error::{ScheduleError, ScheduleResult, ValidationError};
pub use ids::{AssignmentId, ResourceId, TaskId};
pub use persistence::{PersistenceError, PersistenceResult, ProjectSnapshot};
pub use project::Project;
pub use reports::{ProjectAnalysis, ProjectReports};
pub use resource::Resource;
pub use task::Task;
