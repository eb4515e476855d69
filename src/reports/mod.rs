pub mod analysis;
pub mod summary;
pub mod table;

pub use analysis::{
    ProjectAnalysis, ResourceConflict, RiskImpact, RiskKind, ScheduleRisk, analyze_project,
    analyze_schedule_risks, find_resource_conflicts,
};
pub use summary::{
    ProjectReports, ProjectSummary, ResourceReportRow, TaskReportRow, TimelineEvent, TimelineKind,
    generate_reports, generate_resource_report, generate_summary_report, generate_task_report,
    generate_timeline_report,
};
pub use table::{task_rows_to_dataframe, task_table};
