use super::summary::{TaskReportRow, generate_task_report};
use crate::project::Project;
use chrono::NaiveDate;
use polars::prelude::*;

fn date_to_i32(date: NaiveDate) -> i32 {
    // NaiveDate::default() is 1970-01-01
    (date - NaiveDate::default()).num_days() as i32
}

fn date_column(name: &'static str, values: Vec<Option<NaiveDate>>) -> PolarsResult<Column> {
    let days: Vec<Option<i32>> = values.into_iter().map(|d| d.map(date_to_i32)).collect();
    Ok(Series::new(PlSmallStr::from_static(name), days)
        .cast(&DataType::Date)?
        .into_column())
}

fn string_list_column(name: &'static str, rows: Vec<&[String]>) -> Column {
    let lists: Vec<Series> = rows
        .into_iter()
        .map(|values| {
            let inner: Vec<&str> = values.iter().map(|s| s.as_str()).collect();
            Series::new(PlSmallStr::from_static(""), inner)
        })
        .collect();
    let list_chunked: ListChunked = lists.into_iter().collect();
    list_chunked
        .into_series()
        .with_name(PlSmallStr::from_static(name))
        .into_column()
}

/// Task report rows as a polars frame, one row per task in id order.
pub fn task_rows_to_dataframe(rows: &[TaskReportRow]) -> PolarsResult<DataFrame> {
    let ids: Vec<i64> = rows.iter().map(|r| i64::from(r.id.get())).collect();
    let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
    let durations: Vec<i64> = rows.iter().map(|r| r.duration_days).collect();
    let completion: Vec<f64> = rows.iter().map(|r| r.completion).collect();
    let cost: Vec<f64> = rows.iter().map(|r| r.cost).collect();
    let critical: Vec<bool> = rows.iter().map(|r| r.is_critical).collect();
    let float: Vec<i64> = rows.iter().map(|r| r.total_float).collect();

    let columns = vec![
        Series::new(PlSmallStr::from_static("id"), ids).into_column(),
        Series::new(PlSmallStr::from_static("name"), names).into_column(),
        date_column("start_date", rows.iter().map(|r| r.start_date).collect())?,
        date_column("end_date", rows.iter().map(|r| r.end_date).collect())?,
        Series::new(PlSmallStr::from_static("duration_days"), durations).into_column(),
        Series::new(PlSmallStr::from_static("completion"), completion).into_column(),
        string_list_column(
            "resources",
            rows.iter().map(|r| r.resources.as_slice()).collect(),
        ),
        string_list_column(
            "predecessors",
            rows.iter().map(|r| r.predecessors.as_slice()).collect(),
        ),
        Series::new(PlSmallStr::from_static("cost"), cost).into_column(),
        Series::new(PlSmallStr::from_static("is_critical"), critical).into_column(),
        Series::new(PlSmallStr::from_static("total_float"), float).into_column(),
    ];

    DataFrame::new(columns)
}

/// Runs a critical-path analysis and renders the task report as a frame.
pub fn task_table(project: &Project) -> PolarsResult<DataFrame> {
    let analysis = project
        .calculate_critical_path()
        .map_err(|err| PolarsError::ComputeError(err.to_string().into()))?;
    task_rows_to_dataframe(&generate_task_report(project, &analysis))
}
