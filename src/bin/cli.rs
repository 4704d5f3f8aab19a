use std::io::{self, BufRead, Write};

use school_calendar::calendar::format_time;
use school_calendar::views::{self, DayGroup};
use school_calendar::{
    CalendarManager, ClassField, EntityKind, HolidayField, ManagerError, Settings, SharedBackend,
    VacationField, export_entries_to_csv, import_entries_from_csv, open_backend,
};

type Manager = CalendarManager<SharedBackend, SharedBackend>;

fn render_row<'a>(widths: &[usize], cells: impl Iterator<Item = &'a str>) -> String {
    let mut line = String::from("|");
    for (ci, cell) in cells.enumerate() {
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
    out.push_str(&render_row(&widths, headers.iter().copied()));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in rows {
        out.push_str(&render_row(&widths, row.iter().map(String::as_str)));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn render_classes(groups: &[DayGroup<'_>]) -> String {
    let rows: Vec<Vec<String>> = groups
        .iter()
        .flat_map(|group| {
            group.sessions.iter().map(move |session| {
                vec![
                    group.day.to_string(),
                    format!(
                        "{}-{}",
                        format_time(session.start_time),
                        format_time(session.end_time)
                    ),
                    session.subject.clone(),
                    session.group.clone(),
                    session.room.clone().unwrap_or_default(),
                    if session.alternating {
                        session.week_type.to_string()
                    } else {
                        String::new()
                    },
                    session.id.clone(),
                ]
            })
        })
        .collect();
    render_table(
        &["day", "time", "subject", "group", "room", "weeks", "id"],
        &rows,
    )
}

fn render_holidays(manager: &Manager) -> String {
    let rows: Vec<Vec<String>> = views::holiday_list(manager.holidays())
        .into_iter()
        .map(|holiday| {
            vec![
                holiday.date.to_string(),
                holiday.name.clone(),
                holiday.holiday_type.to_string(),
                holiday.id.clone(),
            ]
        })
        .collect();
    render_table(&["date", "name", "type", "id"], &rows)
}

fn render_vacations(manager: &Manager) -> String {
    let rows: Vec<Vec<String>> = views::vacation_list(manager.vacations())
        .into_iter()
        .map(|period| {
            vec![
                period.start_date.to_string(),
                period.end_date.to_string(),
                period.duration_days().to_string(),
                period.name.clone(),
                period.vacation_type.to_string(),
                period.id.clone(),
            ]
        })
        .collect();
    render_table(&["start", "end", "days", "name", "type", "id"], &rows)
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  load                               Reload the calendar from the store\n  show                               Show classes, holidays and vacations\n  list <classes|holidays|vacations>  Show one list\n  week <iso_week>                    Classes running in that ISO week\n  add <kind>                         Open an empty editor (class|holiday|vacation)\n  edit <kind> <id>                   Open the editor on an existing entry\n  set <field> <value...>             Set a field of the open editor\n  draft                              Show the open editor's draft\n  submit                             Validate and save the open editor\n  cancel                             Close the open editor\n  delete <kind> <id>                 Delete an entry\n  groups                             List student groups\n  status                             Show the current banner messages\n  export <path>                      Write holidays and vacations as CSV\n  import <path>                      Add holidays and vacations from CSV\n  quit|exit                          Exit"
    );
}

fn print_status(manager: &Manager) {
    if let Some(error) = manager.status().error() {
        println!("Error: {error}");
    }
    if let Some(success) = manager.status().success() {
        println!("{success}");
    }
}

fn print_draft(manager: &Manager) {
    let rendered = match manager.open_editor() {
        Some(EntityKind::Class) => manager.class_editor().draft().map(serde_json::to_string_pretty),
        Some(EntityKind::Holiday) => manager.holiday_editor().draft().map(serde_json::to_string_pretty),
        Some(EntityKind::Vacation) => manager.vacation_editor().draft().map(serde_json::to_string_pretty),
        None => None,
    };
    match rendered {
        Some(Ok(json)) => println!("{json}"),
        Some(Err(e)) => println!("Error: {e}"),
        None => println!("No editor is open."),
    }
}

fn report(manager: &Manager, result: Result<(), ManagerError>) {
    match result {
        Ok(()) => print_status(manager),
        Err(ManagerError::Validation(errors)) => {
            println!("Please fix the following fields:");
            for (field, message) in errors.iter() {
                println!("  {field}: {message}");
            }
        }
        Err(ManagerError::Load(_) | ManagerError::Save { .. }) => print_status(manager),
        Err(e) => println!("Error: {e}"),
    }
}

fn set_field(manager: &mut Manager, field: &str, value: String) -> Result<(), String> {
    let result = match manager.open_editor() {
        Some(EntityKind::Class) => {
            let field: ClassField = field.parse().map_err(|e| format!("{e}"))?;
            manager.class_editor_mut().set_field(field, value)
        }
        Some(EntityKind::Holiday) => {
            let field: HolidayField = field.parse().map_err(|e| format!("{e}"))?;
            manager.holiday_editor_mut().set_field(field, value)
        }
        Some(EntityKind::Vacation) => {
            let field: VacationField = field.parse().map_err(|e| format!("{e}"))?;
            manager.vacation_editor_mut().set_field(field, value)
        }
        None => return Err("No editor is open. Use 'add' or 'edit' first.".into()),
    };
    result.map_err(|e| e.to_string())
}

fn import_entries(manager: &mut Manager, path: &str) -> Result<usize, String> {
    let entries = import_entries_from_csv(path).map_err(|e| e.to_string())?;
    manager.import_entries(entries).map_err(|e| e.to_string())
}

fn init_tracing(settings: &Settings) {
    tracing_subscriber::fmt()
        .with_env_filter(settings.log_filter())
        .with_writer(io::stderr)
        .without_time()
        .init();
}

fn main() {
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            std::process::exit(2);
        }
    };
    init_tracing(&settings);

    let backend = match open_backend(&settings) {
        Ok(backend) => backend,
        Err(e) => {
            eprintln!("Unable to open the calendar store: {e}");
            std::process::exit(1);
        }
    };
    let mut manager = CalendarManager::with_shared_store(backend).with_settings(&settings);

    println!("School Calendar (CLI) - type 'help' for commands\n");
    let loaded = manager.load();
    report(&manager, loaded);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        let line = match lines.next() {
            Some(Ok(line)) => line,
            _ => break,
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        manager.tick();

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "load" => {
                let result = manager.load();
                if result.is_ok() {
                    println!("Calendar loaded.");
                }
                report(&manager, result);
            }
            "show" => {
                println!("Classes\n{}", render_classes(&views::class_list(manager.schedule())));
                println!("Holidays\n{}", render_holidays(&manager));
                println!("Vacations\n{}", render_vacations(&manager));
            }
            "list" => match parts.next().map(str::parse::<EntityKind>) {
                Some(Ok(EntityKind::Class)) => {
                    println!("{}", render_classes(&views::class_list(manager.schedule())))
                }
                Some(Ok(EntityKind::Holiday)) => println!("{}", render_holidays(&manager)),
                Some(Ok(EntityKind::Vacation)) => println!("{}", render_vacations(&manager)),
                Some(Err(e)) => println!("Error: {e}"),
                None => println!("Usage: list <classes|holidays|vacations>"),
            },
            "week" => {
                let week: u32 = match parts.next().map(str::parse) {
                    Some(Ok(week)) => week,
                    _ => {
                        println!("Usage: week <iso_week>");
                        continue;
                    }
                };
                println!(
                    "{}",
                    render_classes(&views::sessions_for_week(manager.schedule(), week))
                );
            }
            "add" | "edit" => {
                let kind: EntityKind = match parts.next().map(str::parse) {
                    Some(Ok(kind)) => kind,
                    Some(Err(e)) => {
                        println!("Error: {e}");
                        continue;
                    }
                    None => {
                        println!("Usage: add <kind> | edit <kind> <id>");
                        continue;
                    }
                };
                let id = parts.next();
                if cmd == "edit" && id.is_none() {
                    println!("Usage: edit <kind> <id>");
                    continue;
                }
                match manager.add_or_edit(kind, if cmd == "edit" { id } else { None }) {
                    Ok(()) => {
                        println!("Editing {kind}.");
                        print_draft(&manager);
                    }
                    Err(e) => println!("Error: {e}"),
                }
            }
            "set" => {
                let Some(field) = parts.next() else {
                    println!("Usage: set <field> <value...>");
                    continue;
                };
                let value = parts.collect::<Vec<_>>().join(" ");
                match set_field(&mut manager, field, value) {
                    Ok(()) => println!("{field} set."),
                    Err(e) => println!("Error: {e}"),
                }
            }
            "draft" => print_draft(&manager),
            "submit" => match manager.open_editor() {
                Some(kind) => {
                    let result = manager.submit_editor(kind).map(|_| ());
                    report(&manager, result);
                }
                None => println!("No editor is open."),
            },
            "cancel" => match manager.open_editor() {
                Some(kind) => {
                    manager.cancel_editor(kind);
                    println!("Editor closed.");
                }
                None => println!("No editor is open."),
            },
            "delete" => {
                let kind = parts.next().map(str::parse::<EntityKind>);
                let id = parts.next();
                match (kind, id) {
                    (Some(Ok(kind)), Some(id)) => match manager.delete_entity(kind, id) {
                        Ok(true) => print_status(&manager),
                        Ok(false) => println!("No {kind} with id '{id}'."),
                        Err(e) => {
                            println!("Error: {e}");
                            print_status(&manager);
                        }
                    },
                    (Some(Err(e)), _) => println!("Error: {e}"),
                    _ => println!("Usage: delete <kind> <id>"),
                }
            }
            "groups" => {
                manager.refresh_group_options();
                if manager.group_options().is_empty() {
                    println!("No student groups.");
                } else {
                    for group in manager.group_options() {
                        println!("  {group}");
                    }
                }
            }
            "status" => {
                let snapshot = manager.status().snapshot();
                println!(
                    "success: {}\nerror: {}",
                    snapshot.success.as_deref().unwrap_or("-"),
                    snapshot.error.as_deref().unwrap_or("-")
                );
            }
            "export" => match parts.next() {
                Some(path) => match export_entries_to_csv(&manager.combined_entries(), path) {
                    Ok(()) => println!("Exported to {path}."),
                    Err(e) => println!("Error: {e}"),
                },
                None => println!("Usage: export <path>"),
            },
            "import" => match parts.next() {
                Some(path) => match import_entries(&mut manager, path) {
                    Ok(count) => println!("Imported {count} entries from {path}."),
                    Err(e) => println!("Error: {e}"),
                },
                None => println!("Usage: import <path>"),
            },
            _ => println!("Unknown command. Type 'help'."),
        }
    }
}
