pub mod backward_pass;
pub mod compression;
pub mod critical_path;
pub mod forward_pass;
pub mod leveling;

pub use backward_pass::BackwardPass;
pub use compression::{CompressionChange, CompressionOutcome, ScheduleCompressor};
pub use critical_path::{CriticalPathAnalysis, CriticalPathAnalyzer, TaskTiming};
pub use forward_pass::ForwardPass;
pub use leveling::{LevelingOutcome, ResourceLeveler, ResourceLoad, TaskShift};
