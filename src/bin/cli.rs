use chrono::{DateTime, NaiveDate, Utc};
use std::io::{self, Write};
use training_cadence::{
    Clock, SchedulerConfig, SystemClock, TrainingCadence, TrainingItem, TrainingLibrary,
    load_library_from_csv, load_library_from_json, save_library_to_csv, save_library_to_json,
};

fn format_ts(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|ts| ts.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn render_row(cells: &[&str], widths: &[usize]) -> String {
    let mut line = String::from("|");
    for (ci, cell) in cells.iter().enumerate() {
        line.push(' ');
        line.push_str(cell);
        line.push_str(&" ".repeat(widths[ci].saturating_sub(cell.len())));
        line.push_str(" |");
    }
    line
}

fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (ci, cell) in row.iter().enumerate() {
            if cell.len() > widths[ci] {
                widths[ci] = cell.len();
            }
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(headers, &widths));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        out.push_str(&render_row(&cells, &widths));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn render_items(library: &TrainingLibrary, now: DateTime<Utc>) -> String {
    let rows: Vec<Vec<String>> = library
        .items()
        .iter()
        .map(|item| {
            vec![
                item.id.clone().unwrap_or_default(),
                item.name.clone(),
                item.cadence.to_string(),
                format_ts(item.last_completed_at),
                format_ts(item.scheduled_due_date),
                format_ts(item.next_due_date(now)),
            ]
        })
        .collect();
    render_table(
        &["id", "name", "cadence", "last_completed", "scheduled", "next_due"],
        &rows,
    )
}

fn render_statuses(library: &TrainingLibrary, now: DateTime<Utc>) -> String {
    let rows: Vec<Vec<String>> = library
        .statuses(now)
        .into_iter()
        .map(|status| {
            vec![
                status.id.unwrap_or_default(),
                status.name,
                status.status.as_str().to_string(),
                format_ts(status.next_due_date),
                status
                    .days_until_due
                    .map(|d| d.to_string())
                    .unwrap_or_default(),
            ]
        })
        .collect();
    render_table(&["id", "name", "status", "next_due", "days"], &rows)
}

fn parse_day(input: &str) -> Option<DateTime<Utc>> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  show                               Show training items\n  add <cadence> <name...>            Add an item and schedule its first due date\n  bulk <cadence,cadence,...> <prefix>\n                                     Add several items spread across their cadence\n  complete <id> [YYYY-MM-DD]         Record a completed training session\n  delete <id>                        Remove an item\n  status                             Show items by urgency\n  save <json|csv> <path>             Save the library\n  load <json|csv> <path>             Load a library\n  quit|exit                          Exit\n\nCadences: Once, Monthly, Quarterly, Semi-Annually, Annually"
    );
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let clock = SystemClock;
    let mut library = match SchedulerConfig::from_env().and_then(TrainingLibrary::with_config) {
        Ok(library) => library,
        Err(e) => {
            println!("Ignoring config: {}", e);
            TrainingLibrary::new()
        }
    };

    println!("Training Cadence (CLI) - type 'help' for commands\n");

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
        let now = clock.now();

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => println!("{}", render_items(&library, now)),
            "status" => println!("{}", render_statuses(&library, now)),
            "add" => {
                let cadence_s = parts.next();
                let name = parts.collect::<Vec<_>>().join(" ");
                match cadence_s {
                    Some(cadence_s) if !name.is_empty() => {
                        let cadence = TrainingCadence::parse_lenient(cadence_s);
                        match library.add_item(TrainingItem::new(name, cadence), now) {
                            Ok(item) => println!(
                                "Added item {} due {}.",
                                item.id.clone().unwrap_or_default(),
                                format_ts(item.scheduled_due_date)
                            ),
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: add <cadence> <name...>"),
                }
            }
            "bulk" => {
                let cadences_s = parts.next();
                let prefix = parts.next();
                match (cadences_s, prefix) {
                    (Some(cadences_s), Some(prefix)) => {
                        let items: Vec<TrainingItem> = cadences_s
                            .split(',')
                            .filter(|s| !s.trim().is_empty())
                            .enumerate()
                            .map(|(idx, s)| {
                                TrainingItem::new(
                                    format!("{prefix}-{}", idx + 1),
                                    TrainingCadence::parse_lenient(s),
                                )
                            })
                            .collect();
                        match library.add_items(items, now) {
                            Ok(ids) => {
                                println!("Added {} items.", ids.len());
                                println!("{}", render_items(&library, now));
                            }
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: bulk <cadence,cadence,...> <prefix>"),
                }
            }
            "complete" => {
                let id = parts.next();
                let date_s = parts.next();
                let Some(id) = id else {
                    println!("Usage: complete <id> [YYYY-MM-DD]");
                    continue;
                };
                let completed_at = match date_s {
                    Some(date_s) => match parse_day(date_s) {
                        Some(ts) => ts,
                        None => {
                            println!("Invalid date (YYYY-MM-DD)");
                            continue;
                        }
                    },
                    None => now,
                };
                match library.record_completion(id, completed_at) {
                    Ok(item) => println!(
                        "Completed item {}; next due {}.",
                        id,
                        format_ts(item.next_due_date(now))
                    ),
                    Err(e) => println!("Error: {}", e),
                }
            }
            "delete" => match parts.next() {
                Some(id) => {
                    if library.remove_item(id) {
                        println!("Deleted item {id}.");
                    } else {
                        println!("Item {id} not found.");
                    }
                }
                None => println!("Usage: delete <id>"),
            },
            "save" => {
                let fmt = parts.next();
                let path = parts.next();
                match (fmt, path) {
                    (Some("json"), Some(path)) => match save_library_to_json(&library, path) {
                        Ok(_) => println!("Library saved to {}.", path),
                        Err(e) => println!("Error saving library: {}", e),
                    },
                    (Some("csv"), Some(path)) => match save_library_to_csv(&library, path) {
                        Ok(_) => println!("Library saved to {}.", path),
                        Err(e) => println!("Error saving library: {}", e),
                    },
                    _ => println!("Usage: save <json|csv> <path>"),
                }
            }
            "load" => {
                let fmt = parts.next();
                let path = parts.next();
                let loaded = match (fmt, path) {
                    (Some("json"), Some(path)) => Some((path, load_library_from_json(path))),
                    (Some("csv"), Some(path)) => Some((path, load_library_from_csv(path))),
                    _ => None,
                };
                match loaded {
                    Some((path, Ok(loaded))) => {
                        library = loaded;
                        println!("Library loaded from {}.", path);
                        println!("{}", render_items(&library, now));
                    }
                    Some((_, Err(e))) => println!("Error loading library: {}", e),
                    None => println!("Usage: load <json|csv> <path>"),
                }
            }
            _ => println!("Unknown command. Type 'help'."),
        }
    }
}
