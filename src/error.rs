use crate::ids::{ResourceId, TaskId};
use std::fmt;

/// A caller-supplied value outside its domain.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleError {
    /// Making `predecessor` finish before `successor` would close a dependency cycle.
    Cycle {
        predecessor: TaskId,
        successor: TaskId,
    },
    DuplicateEdge {
        predecessor: TaskId,
        successor: TaskId,
    },
    TaskNotFound(TaskId),
    ResourceNotFound(ResourceId),
    Validation(ValidationError),
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleError::Cycle {
                predecessor,
                successor,
            } => write!(
                f,
                "task {predecessor} cannot precede task {successor}: dependency cycle"
            ),
            ScheduleError::DuplicateEdge {
                predecessor,
                successor,
            } => write!(
                f,
                "task {predecessor} is already a predecessor of task {successor}"
            ),
            ScheduleError::TaskNotFound(id) => write!(f, "task {id} not found"),
            ScheduleError::ResourceNotFound(id) => write!(f, "resource {id} not found"),
            ScheduleError::Validation(err) => write!(f, "invalid input: {err}"),
        }
    }
}

impl std::error::Error for ScheduleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScheduleError::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for ScheduleError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
