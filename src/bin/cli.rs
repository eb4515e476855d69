use chrono::NaiveDate;
use polars::prelude::{AnyValue, DataFrame};
use project_scheduler::persistence::{
    load_project_from_json, save_project_to_json, save_project_to_string,
};
use project_scheduler::reports::{self, task_table};
use project_scheduler::{EngineConfig, Project, ResourceId, TaskId, validation};
use std::io::{self, Write};

fn render_cell(av: &AnyValue) -> String {
    match av {
        AnyValue::Null => String::new(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::Float64(v) => format!("{v:.2}"),
        AnyValue::List(inner) => {
            if let Ok(ca) = inner.str() {
                ca.into_iter().flatten().collect::<Vec<_>>().join(",")
            } else {
                av.to_string()
            }
        }
        _ => av.to_string(),
    }
}

fn render_df_as_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let mut cells: Vec<Vec<String>> = Vec::with_capacity(df.height());
    for row_idx in 0..df.height() {
        let row = columns
            .iter()
            .map(|col| col.get(row_idx).map(|av| render_cell(&av)).unwrap_or_default())
            .collect();
        cells.push(row);
    }

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.len()).collect();
    for row in &cells {
        for (ci, cell) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(cell.len());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let render_row = |values: &[String]| {
        let mut line = String::from("|");
        for (ci, value) in values.iter().enumerate() {
            line.push(' ');
            line.push_str(value);
            line.push_str(&" ".repeat(widths[ci].saturating_sub(value.len())));
            line.push_str(" |");
        }
        line
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(&col_names));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in &cells {
        out.push_str(&render_row(row));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn print_help() {
    println!(
        "Commands:\n  help                                   Show this help\n  show                                   Show task table\n  project <name...>                      Rename the project\n  start <YYYY-MM-DD>                     Set project start date\n  task <name> <duration_days> [start]    Create a task\n  delete <task_id>                       Delete a task with its edges and assignments\n  schedule <task_id> <YYYY-MM-DD>        Set task start date\n  priority <task_id> <int>               Set task priority\n  progress <task_id> <0-100>             Set task completion\n  dep <pred_id> <succ_id>                Add dependency (pred finishes before succ)\n  undep <pred_id> <succ_id>              Remove dependency\n  resource <name> <rate> <availability>  Create a resource\n  rdelete <resource_id>                  Delete a resource and its assignments\n  resources                              List resources\n  skill <resource_id> <skill>            Add a skill tag\n  unskill <resource_id> <skill>          Remove a skill tag\n  assign <task> <res> <units> <start> <end>\n                                         Assign a resource to a task\n  unassign <task_id> <resource_id>       Remove assignments between task and resource\n  avail <resource_id> <YYYY-MM-DD>       Remaining availability on a date\n  override <resource_id> <date> <value>  Set custom availability for a date\n  unoverride <resource_id> <date>        Clear custom availability for a date\n  cp                                     Critical path analysis\n  level                                  Level over-allocated resources\n  optimize                               Level, then compress non-critical tasks\n  analyze                                Critical path, conflicts and risks\n  report                                 Full report as JSON\n  baseline save|variance                 Save baseline or show variance\n  days <start> <end>                     Date difference under the project calendar\n  config <json_path>                     Load engine config from JSON file\n  save <json_path>                       Save project snapshot\n  load <json_path>                       Load project snapshot\n  undo | redo                            Step through snapshot history\n  quit|exit                              Exit"
    );
}

fn parse_date(s: Option<&str>) -> Option<NaiveDate> {
    s.and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

fn parse_task(s: Option<&str>) -> Option<TaskId> {
    s.and_then(|s| s.parse::<u32>().ok()).map(TaskId)
}

fn parse_resource(s: Option<&str>) -> Option<ResourceId> {
    s.and_then(|s| s.parse::<u32>().ok()).map(ResourceId)
}

fn print_tasks(project: &Project) {
    match task_table(project) {
        Ok(df) => println!("{}", render_df_as_text_table(&df)),
        Err(e) => println!("Error rendering tasks: {}", e),
    }
}

fn print_resources(project: &Project) {
    for row in reports::generate_resource_report(project) {
        println!(
            "{:>3}  {:<16} rate={:.2} availability={:.2} assignments={} utilization={:.2} cost={:.2} skills={}",
            row.id,
            row.name,
            row.cost_rate,
            row.availability,
            row.assignments,
            row.utilization,
            row.total_cost,
            row.skills.join(",")
        );
    }
}

/// Snapshot history for undo/redo: a full copy of the project before each
/// mutating command that actually changed something.
struct History {
    undo: Vec<Project>,
    redo: Vec<Project>,
}

impl History {
    const LIMIT: usize = 50;

    /// Keeps `before` only when the command left `after` in a different state,
    /// so rejected or no-op commands leave the undo stack alone.
    fn commit(&mut self, before: Project, after: &Project) {
        let unchanged = matches!(
            (save_project_to_string(&before), save_project_to_string(after)),
            (Ok(old), Ok(new)) if old == new
        );
        if unchanged {
            return;
        }
        self.undo.push(before);
        if self.undo.len() > Self::LIMIT {
            self.undo.remove(0);
        }
        self.redo.clear();
    }

    fn undo(&mut self, project: &mut Project) -> bool {
        match self.undo.pop() {
            Some(previous) => {
                self.redo.push(std::mem::replace(project, previous));
                true
            }
            None => false,
        }
    }

    fn redo(&mut self, project: &mut Project) -> bool {
        match self.redo.pop() {
            Some(next) => {
                self.undo.push(std::mem::replace(project, next));
                true
            }
            None => false,
        }
    }
}

const MUTATING: &[&str] = &[
    "project", "start", "task", "delete", "schedule", "priority", "progress", "dep", "undep",
    "resource", "rdelete", "skill", "unskill", "assign", "unassign", "override", "unoverride",
    "level", "optimize", "config", "load",
];

fn main() {
    let start = chrono::Utc::now().date_naive();
    let mut project = Project::new("New Project", start);
    let mut history = History {
        undo: Vec::new(),
        redo: Vec::new(),
    };

    println!("Project Scheduler (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");
        let before = MUTATING.contains(&cmd).then(|| project.clone());

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => print_tasks(&project),
            "project" => {
                let name = parts.collect::<Vec<_>>().join(" ");
                match validation::validate_name("project", &name) {
                    Ok(()) => {
                        project.name = name;
                        println!("Project renamed.");
                    }
                    Err(e) => println!("Error: {}", e),
                }
            }
            "start" => match parse_date(parts.next()) {
                Some(date) => {
                    project.set_start_date(date);
                    println!("Project start set to {date}.");
                }
                None => println!("Usage: start <YYYY-MM-DD>"),
            },
            "task" => {
                let name = parts.next();
                let duration = parts.next().and_then(|s| s.parse::<i64>().ok());
                let start_s = parts.next();
                let start = parse_date(start_s);
                if start_s.is_some() && start.is_none() {
                    println!("Invalid date (YYYY-MM-DD)");
                    continue;
                }
                match (name, duration) {
                    (Some(name), Some(duration)) => {
                        if let Err(e) = validation::validate_task_input(name, duration) {
                            println!("Error: {}", e);
                            continue;
                        }
                        let id = project.create_task(name, duration, start);
                        println!("Created task id={id}");
                    }
                    _ => println!("Usage: task <name> <duration_days> [YYYY-MM-DD]"),
                }
            }
            "delete" => match parse_task(parts.next()) {
                Some(id) => match project.delete_task(id) {
                    Ok(task) => println!("Deleted task {} ({}).", id, task.name),
                    Err(e) => println!("Error: {}", e),
                },
                None => println!("Usage: delete <task_id>"),
            },
            "schedule" => match (parse_task(parts.next()), parse_date(parts.next())) {
                (Some(id), Some(date)) => match project.task_mut(id) {
                    Some(task) => {
                        task.start_date = Some(date);
                        println!("Task {id} starts {date}.");
                    }
                    None => println!("Task {id} not found."),
                },
                _ => println!("Usage: schedule <task_id> <YYYY-MM-DD>"),
            },
            "priority" => {
                let id = parse_task(parts.next());
                let value = parts.next().and_then(|s| s.parse::<i32>().ok());
                match (id, value) {
                    (Some(id), Some(value)) => match project.task_mut(id) {
                        Some(task) => {
                            task.priority = value;
                            println!("Task {id} priority={value}.");
                        }
                        None => println!("Task {id} not found."),
                    },
                    _ => println!("Usage: priority <task_id> <int>"),
                }
            }
            "progress" => {
                let id = parse_task(parts.next());
                let value = parts.next().and_then(|s| s.parse::<f64>().ok());
                match (id, value) {
                    (Some(id), Some(value)) => {
                        if let Err(e) = validation::validate_completion(value) {
                            println!("Error: {}", e);
                            continue;
                        }
                        match project.update_progress(id, value) {
                            Ok(()) => println!("Task {id} completion={value}."),
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: progress <task_id> <0-100>"),
                }
            }
            "dep" | "undep" => match (parse_task(parts.next()), parse_task(parts.next())) {
                (Some(pred), Some(succ)) => {
                    if cmd == "dep" {
                        match project.add_predecessor(pred, succ) {
                            Ok(()) => println!("Task {pred} now precedes task {succ}."),
                            Err(e) => println!("Error: {}", e),
                        }
                    } else if project.remove_predecessor(pred, succ) {
                        println!("Dependency removed.");
                    } else {
                        println!("No such dependency.");
                    }
                }
                _ => println!("Usage: {} <pred_id> <succ_id>", cmd),
            },
            "resource" => {
                let name = parts.next();
                let rate = parts.next().and_then(|s| s.parse::<f64>().ok());
                let availability = parts.next().and_then(|s| s.parse::<f64>().ok());
                match (name, rate, availability) {
                    (Some(name), Some(rate), Some(availability)) => {
                        if let Err(e) =
                            validation::validate_resource_input(name, rate, availability)
                        {
                            println!("Error: {}", e);
                            continue;
                        }
                        let id = project.create_resource(name, rate, availability);
                        println!("Created resource id={id}");
                    }
                    _ => println!("Usage: resource <name> <rate> <availability>"),
                }
            }
            "rdelete" => match parse_resource(parts.next()) {
                Some(id) => match project.delete_resource(id) {
                    Ok(resource) => println!("Deleted resource {} ({}).", id, resource.name),
                    Err(e) => println!("Error: {}", e),
                },
                None => println!("Usage: rdelete <resource_id>"),
            },
            "resources" => print_resources(&project),
            "skill" => match (parse_resource(parts.next()), parts.next()) {
                (Some(id), Some(skill)) => match project.add_skill(id, skill) {
                    Ok(_) => println!("Resource {id} has skill '{skill}'."),
                    Err(e) => println!("Error: {}", e),
                },
                _ => println!("Usage: skill <resource_id> <skill>"),
            },
            "unskill" => match (parse_resource(parts.next()), parts.next()) {
                (Some(id), Some(skill)) => match project.remove_skill(id, skill) {
                    Ok(true) => println!("Resource {id} no longer has skill '{skill}'."),
                    Ok(false) => println!("Resource {id} has no skill '{skill}'."),
                    Err(e) => println!("Error: {}", e),
                },
                _ => println!("Usage: unskill <resource_id> <skill>"),
            },
            "assign" => {
                let task = parse_task(parts.next());
                let resource = parse_resource(parts.next());
                let units = parts.next().and_then(|s| s.parse::<f64>().ok());
                let start = parse_date(parts.next());
                let end = parse_date(parts.next());
                match (task, resource, units, start, end) {
                    (Some(task), Some(resource), Some(units), Some(start), Some(end)) => {
                        if let Err(e) = validation::validate_assignment_input(units, start, end) {
                            println!("Error: {}", e);
                            continue;
                        }
                        match project.assign_resource(task, resource, units, start, end) {
                            Ok(id) => {
                                let hours = project.assignment(id).map(|a| a.hours()).unwrap_or(0.0);
                                println!("Created assignment id={id} hours={hours:.1}");
                            }
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!(
                        "Usage: assign <task_id> <resource_id> <units> <YYYY-MM-DD> <YYYY-MM-DD>"
                    ),
                }
            }
            "unassign" => match (parse_task(parts.next()), parse_resource(parts.next())) {
                (Some(task), Some(resource)) => match project.remove_resource(task, resource) {
                    Ok(count) => println!("Removed {count} assignment(s)."),
                    Err(e) => println!("Error: {}", e),
                },
                _ => println!("Usage: unassign <task_id> <resource_id>"),
            },
            "avail" => match (parse_resource(parts.next()), parse_date(parts.next())) {
                (Some(id), Some(date)) => match project.resource_availability(id, date) {
                    Ok(value) => println!("availability={value:.2}"),
                    Err(e) => println!("Error: {}", e),
                },
                _ => println!("Usage: avail <resource_id> <YYYY-MM-DD>"),
            },
            "override" => {
                let id = parse_resource(parts.next());
                let date = parse_date(parts.next());
                let value = parts.next().and_then(|s| s.parse::<f64>().ok());
                match (id, date, value) {
                    (Some(id), Some(date), Some(value)) => {
                        if let Err(e) = validation::validate_fraction("availability", value) {
                            println!("Error: {}", e);
                            continue;
                        }
                        match project.set_custom_availability(id, date, value) {
                            Ok(()) => {
                                println!("Resource {id} availability on {date} set to {value}.")
                            }
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: override <resource_id> <YYYY-MM-DD> <0-1>"),
                }
            }
            "unoverride" => match (parse_resource(parts.next()), parse_date(parts.next())) {
                (Some(id), Some(date)) => match project.clear_custom_availability(id, date) {
                    Ok(Some(_)) => println!("Resource {id} availability on {date} cleared."),
                    Ok(None) => println!("Resource {id} has no override on {date}."),
                    Err(e) => println!("Error: {}", e),
                },
                _ => println!("Usage: unoverride <resource_id> <YYYY-MM-DD>"),
            },
            "cp" => match project.calculate_critical_path() {
                Ok(analysis) => println!("Critical path ({})", analysis.to_cli_summary()),
                Err(e) => println!("Error: {}", e),
            },
            "level" => match project.level_resources() {
                Ok(outcome) => {
                    println!("Leveled ({})", outcome.to_cli_summary());
                    for shift in &outcome.shifts {
                        println!(
                            "  task {} moved {} -> {} (+{}d, resource {})",
                            shift.task, shift.from, shift.to, shift.days, shift.resource
                        );
                    }
                }
                Err(e) => println!("Error: {}", e),
            },
            "optimize" => match project.optimize_schedule() {
                Ok(outcome) => println!("Optimized ({})", outcome.to_cli_summary()),
                Err(e) => println!("Error: {}", e),
            },
            "analyze" => match project.analyze_project() {
                Ok(analysis) => {
                    println!("Analysis ({})", analysis.to_cli_summary());
                    for risk in &analysis.risks {
                        println!("  [{}] {}", risk.impact.as_str(), risk.description);
                    }
                }
                Err(e) => println!("Error: {}", e),
            },
            "report" => match project.generate_reports() {
                Ok(report) => match serde_json::to_string_pretty(&report) {
                    Ok(json) => println!("{json}"),
                    Err(e) => println!("Error: {}", e),
                },
                Err(e) => println!("Error: {}", e),
            },
            "baseline" => match parts.next() {
                Some("save") => {
                    let baseline = project.save_baseline();
                    println!(
                        "Baseline saved at {} ({} tasks, {} resources).",
                        baseline.taken_at,
                        baseline.tasks.len(),
                        baseline.resources.len()
                    );
                }
                Some("variance") => match project.baseline_variance() {
                    Some(rows) => {
                        for row in rows {
                            let slip = row
                                .start_slip_days
                                .map(|d| d.to_string())
                                .unwrap_or_else(|| "-".to_string());
                            println!(
                                "  task {} {:<16} start_slip={} duration_delta={}",
                                row.task, row.name, slip, row.duration_delta
                            );
                        }
                    }
                    None => println!("No baseline saved."),
                },
                _ => println!("Usage: baseline save|variance"),
            },
            "days" => match (parse_date(parts.next()), parse_date(parts.next())) {
                (Some(start), Some(end)) => {
                    let diff = project.calendar().date_difference(start, end);
                    println!(
                        "total_days={}, working_days={}, weeks={}, remaining_days={}, non_working_days={}",
                        diff.total_days,
                        diff.working_days,
                        diff.weeks,
                        diff.remaining_days,
                        diff.non_working_days
                    );
                }
                _ => println!("Usage: days <YYYY-MM-DD> <YYYY-MM-DD>"),
            },
            "config" => match parts.next() {
                Some(path) => match EngineConfig::load_json(path) {
                    Ok(config) => match project.set_config(config) {
                        Ok(()) => {
                            let working = project
                                .config()
                                .calendar
                                .working_days()
                                .iter()
                                .map(|wd| wd.to_string())
                                .collect::<Vec<_>>()
                                .join(", ");
                            println!("Config loaded (working days: {working}).");
                        }
                        Err(e) => println!("Error: {}", e),
                    },
                    Err(e) => println!("Error loading config: {}", e),
                },
                None => println!("Usage: config <json_path>"),
            },
            "save" => match parts.next() {
                Some(path) => match save_project_to_json(&project, path) {
                    Ok(()) => {
                        project.mark_saved();
                        println!("Saved to {path}.");
                    }
                    Err(e) => println!("Error saving project: {}", e),
                },
                None => println!("Usage: save <json_path>"),
            },
            "load" => match parts.next() {
                Some(path) => match load_project_from_json(path) {
                    Ok(loaded) => {
                        project = loaded;
                        println!(
                            "Loaded '{}' ({} tasks, {} resources).",
                            project.name,
                            project.task_count(),
                            project.resource_count()
                        );
                    }
                    Err(e) => println!("Error loading project: {}", e),
                },
                None => println!("Usage: load <json_path>"),
            },
            "undo" => {
                if history.undo(&mut project) {
                    println!("Undone.");
                } else {
                    println!("Nothing to undo.");
                }
            }
            "redo" => {
                if history.redo(&mut project) {
                    println!("Redone.");
                } else {
                    println!("Nothing to redo.");
                }
            }
            _ => println!("Unknown command '{}'. Type 'help'.", cmd),
        }

        if let Some(before) = before {
            history.commit(before, &project);
        }
    }
}
