use crate::calendar::{WorkCalendar, WorkCalendarConfig};
use crate::error::ValidationError;
use crate::persistence::{PersistenceError, PersistenceResult};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Order in which the critical-path passes visit tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassOrder {
    /// Dependency order from a topological sort of the task graph.
    #[default]
    Topological,
    /// Stored (id) order. Correct only when every predecessor was created
    /// before its successors.
    Insertion,
}

impl PassOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            PassOrder::Topological => "topological",
            PassOrder::Insertion => "insertion",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    /// A resource carrying more tasks than this is flagged.
    pub max_tasks_per_resource: usize,
    /// A task longer than `factor * average duration` is flagged.
    pub long_duration_factor: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            max_tasks_per_resource: 3,
            long_duration_factor: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub calendar: WorkCalendarConfig,
    #[serde(default = "default_hours_per_day")]
    pub hours_per_day: f64,
    #[serde(default)]
    pub pass_order: PassOrder,
    #[serde(default)]
    pub risk: RiskThresholds,
}

fn default_hours_per_day() -> f64 {
    8.0
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            calendar: WorkCalendarConfig::default(),
            hours_per_day: default_hours_per_day(),
            pass_order: PassOrder::default(),
            risk: RiskThresholds::default(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        WorkCalendar::from_config(&self.calendar)?;
        if !self.hours_per_day.is_finite() || self.hours_per_day <= 0.0 {
            return Err(ValidationError::new(format!(
                "hours_per_day must be positive (got {})",
                self.hours_per_day
            )));
        }
        if !self.risk.long_duration_factor.is_finite() || self.risk.long_duration_factor <= 0.0 {
            return Err(ValidationError::new(format!(
                "long_duration_factor must be positive (got {})",
                self.risk.long_duration_factor
            )));
        }
        Ok(())
    }

    pub fn work_calendar(&self) -> Result<WorkCalendar, ValidationError> {
        WorkCalendar::from_config(&self.calendar)
    }

    pub fn load_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Self> {
        let file = File::open(path)?;
        let config: EngineConfig = serde_json::from_reader(file)?;
        config
            .validate()
            .map_err(|err| PersistenceError::InvalidData(err.to_string()))?;
        Ok(config)
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> PersistenceResult<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}
