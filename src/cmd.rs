//! Command implementations for the CLI interface.
//!
//! This module contains the command handlers behind every subcommand: the
//! bucketed listing, item CRUD, the interactive builder, preferences setup,
//! and shell completions.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command as Process;

use chrono::{DateTime, Local};
use clap::{Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use crossterm::style::{Color, Stylize};

use crate::dates::{parse_datetime_input, DATE_FORMAT_HELP};
use crate::fields::{format_length, format_priority, Priority, TaskLength};
use crate::render::{print_agenda, print_done, Palette};
use crate::schedule::{build_agenda, id_width, split_finished};
use crate::settings::Settings;
use crate::store::{Store, StoreResult};
use crate::task::{split_tags, Item};

#[derive(Subcommand)]
pub enum Commands {
    /// List unfinished items grouped by due-date urgency (the default).
    #[command(visible_alias = "ls")]
    List {
        /// Also show finished items at the bottom.
        #[arg(long)]
        done: bool,
    },

    /// Add a new item. With no flags, runs the interactive builder.
    #[command(visible_alias = "a")]
    Add {
        /// Name of the item. Required unless running interactively.
        #[arg(long, short)]
        name: Option<String>,
        /// Priority: high | normal | low.
        #[arg(long, short, value_enum)]
        priority: Option<Priority>,
        /// Effort estimate: short | medium | long.
        #[arg(long, short, value_enum)]
        length: Option<TaskLength>,
        /// Due date. Formats: MMDDYYYY-HHmm, MMDD-HHmm, MMDDYYYY, MMDD, :HHmm; 0 = none.
        #[arg(long, short)]
        due: Option<String>,
        /// Start date, same formats as --due.
        #[arg(long, short)]
        start: Option<String>,
        /// Comma-separated tags. May be repeated.
        #[arg(long = "tag", short)]
        tags: Vec<String>,
    },

    /// Update fields on an existing item.
    #[command(visible_alias = "e")]
    Edit {
        /// Item id to edit.
        id: u64,
        /// New name.
        #[arg(long, short)]
        name: Option<String>,
        /// Open $EDITOR to rewrite the name instead of passing it inline.
        #[arg(long, conflicts_with = "name")]
        rename: bool,
        #[arg(long, short, value_enum)]
        priority: Option<Priority>,
        #[arg(long, short, value_enum)]
        length: Option<TaskLength>,
        /// New due date (0 clears it).
        #[arg(long, short)]
        due: Option<String>,
        /// New start date (0 clears it).
        #[arg(long, short)]
        start: Option<String>,
        /// Replace the tag list. May be repeated and comma-separated.
        #[arg(long = "tag", short)]
        tags: Vec<String>,
    },

    /// Mark an item finished.
    #[command(visible_alias = "f")]
    Finish {
        /// Item id to finish.
        id: u64,
    },

    /// Mark a finished item unfinished again.
    Reopen {
        /// Item id to reopen.
        id: u64,
    },

    /// Delete an item.
    #[command(visible_alias = "d")]
    Delete {
        /// Item id to delete.
        id: u64,
    },

    /// Interactive preferences builder (storage backend selection).
    Setup,

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Unwrap a store result or exit with a message.
pub fn or_exit<T>(res: StoreResult<T>) -> T {
    match res {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Storage error: {e}");
            std::process::exit(1);
        }
    }
}

/// Render the bucketed agenda for the current snapshot.
pub fn cmd_list(store: &mut dyn Store, done: bool) {
    let items = or_exit(store.read_all());
    let next_id = or_exit(store.next_id());
    let (pending, finished) = split_finished(&items);

    let now = Local::now();
    let agenda = build_agenda(&pending, now);
    let palette = Palette::default();
    let width = id_width(next_id);

    print_agenda(&agenda, pending.len(), width, now, &palette);
    if done {
        print_done(&finished, width, &palette);
    }
}

/// Add a new item, either from flags or via the interactive builder.
pub fn cmd_add(
    store: &mut dyn Store,
    name: Option<String>,
    priority: Option<Priority>,
    length: Option<TaskLength>,
    due: Option<String>,
    start: Option<String>,
    tags: Vec<String>,
) {
    let now = Local::now();
    let no_flags = name.is_none()
        && priority.is_none()
        && length.is_none()
        && due.is_none()
        && start.is_none()
        && tags.is_empty();

    let item = if no_flags {
        interactive_add(now)
    } else {
        let Some(name) = name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) else {
            eprintln!("Name field (-n) is required!");
            std::process::exit(1);
        };
        single_line_or_exit("Name", &name);
        let mut item = Item::draft(name);
        if let Some(p) = priority {
            item.priority = p;
        }
        if let Some(l) = length {
            item.length = l;
        }
        if let Some(d) = due.as_deref() {
            item.due = parse_date_or_exit(d, now);
        }
        if let Some(s) = start.as_deref() {
            item.start = parse_date_or_exit(s, now);
        }
        item.tags = split_tags(&tags);
        for tag in &item.tags {
            single_line_or_exit("Tag", tag);
        }
        item
    };

    let id = or_exit(store.insert(item));
    println!("Added item {id}");
}

/// Update fields on an existing item.
#[allow(clippy::too_many_arguments)]
pub fn cmd_edit(
    store: &mut dyn Store,
    id: u64,
    name: Option<String>,
    rename: bool,
    priority: Option<Priority>,
    length: Option<TaskLength>,
    due: Option<String>,
    start: Option<String>,
    tags: Vec<String>,
) {
    let now = Local::now();
    let Some(mut item) = or_exit(store.get(id)) else {
        eprintln!("ID not found: {id}");
        std::process::exit(1);
    };

    if let Some(n) = name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) {
        single_line_or_exit("Name", &n);
        item.name = n;
    }
    if rename {
        match edit_name_in_editor(&item.name) {
            Ok(n) if !n.is_empty() => item.name = n,
            Ok(_) => eprintln!("Empty name from editor, keeping the old one"),
            Err(e) => {
                eprintln!("Editor error: {e}");
                std::process::exit(1);
            }
        }
    }
    if let Some(p) = priority {
        item.priority = p;
    }
    if let Some(l) = length {
        item.length = l;
    }
    if let Some(d) = due.as_deref() {
        item.due = parse_date_or_exit(d, now);
    }
    if let Some(s) = start.as_deref() {
        item.start = parse_date_or_exit(s, now);
    }
    if !tags.is_empty() {
        item.tags = split_tags(&tags);
        for tag in &item.tags {
            single_line_or_exit("Tag", tag);
        }
    }

    or_exit(store.update(&item));
    println!("Updated item {id}");
}

pub fn cmd_finish(store: &mut dyn Store, id: u64) {
    if !or_exit(store.set_finished(id, true)) {
        eprintln!("ID not found: {id}");
        std::process::exit(1);
    }
    println!("Finished item {id}");
}

pub fn cmd_reopen(store: &mut dyn Store, id: u64) {
    if !or_exit(store.set_finished(id, false)) {
        eprintln!("ID not found: {id}");
        std::process::exit(1);
    }
    println!("Reopened item {id}");
}

pub fn cmd_delete(store: &mut dyn Store, id: u64) {
    if !or_exit(store.remove(id)) {
        eprintln!("ID not found: {id}");
        std::process::exit(1);
    }
    println!("Deleted item {id}");
}

/// Interactive preferences builder: pick the storage backend.
pub fn cmd_setup(dir: &Path) {
    let mut settings = Settings::default();

    let answer = prompt(&format!(
        "{} {} ",
        "Use SQLite database?".with(Color::Yellow),
        "(y/n) [Default n - use local data file]:".with(Color::Grey)
    ));
    settings.use_db = answer.trim().eq_ignore_ascii_case("y");

    if settings.use_db {
        let default_path = dir.join("wtodo.db");
        let answer = prompt(&format!(
            "{} {} ",
            "Database path".with(Color::Yellow),
            format!("[Default {}]:", default_path.display()).with(Color::Grey)
        ));
        let trimmed = answer.trim();
        if !trimmed.is_empty() {
            settings.db_path = Some(PathBuf::from(trimmed));
        }
    }

    if let Err(e) = settings.save(dir) {
        eprintln!("Failed to save preferences: {e}");
        std::process::exit(1);
    }
    println!(
        "Setup complete! Backend: {}",
        if settings.use_db { "SQLite database" } else { "local data file" }
    );
}

pub fn cmd_completions(shell: Shell) {
    let mut cmd = <crate::cli::Cli as clap::CommandFactory>::command();
    generate(shell, &mut cmd, "wtodo", &mut io::stdout());
}

/// Names and tags are stored and rendered line-oriented; refuse values that
/// span lines before they reach a backend.
fn single_line_or_exit(what: &str, value: &str) {
    if value.chars().any(|c| c == '\n' || c == '\r') {
        eprintln!("{what} must be a single line");
        std::process::exit(1);
    }
}

fn parse_date_or_exit(input: &str, now: DateTime<Local>) -> Option<DateTime<Local>> {
    match parse_datetime_input(input, now) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

fn prompt(message: &str) -> String {
    print!("{message}");
    let _ = io::stdout().flush();
    let mut line = String::new();
    if io::stdin().read_line(&mut line).is_err() {
        return String::new();
    }
    line
}

/// Stdin prompt loop used by bare `wtodo add`.
fn interactive_add(now: DateTime<Local>) -> Item {
    let mut name = String::new();
    while name.is_empty() {
        name = prompt(&format!(
            "{} {} ",
            "Enter name".with(Color::Yellow),
            "[Required]".with(Color::Grey)
        ))
        .trim()
        .to_string();
    }
    let mut item = Item::draft(name);

    let answer = prompt(&format!(
        "{} {} ",
        "Enter priority".with(Color::Yellow),
        "(1 high, 2 normal, 3 low) [Default: 2]".with(Color::Grey)
    ));
    let trimmed = answer.trim();
    if !trimmed.is_empty() {
        match trimmed.parse::<u8>().ok().and_then(Priority::from_rank) {
            Some(p) => item.priority = p,
            None => println!("Invalid priority {trimmed}, defaulting to {}", format_priority(item.priority)),
        }
    }

    let answer = prompt(&format!(
        "{} {} ",
        "Enter task length".with(Color::Yellow),
        "([s]hort, [m]edium, [l]ong) [Default: short]".with(Color::Grey)
    ));
    let trimmed = answer.trim();
    if !trimmed.is_empty() {
        match TaskLength::from_str(trimmed, true) {
            Ok(l) => item.length = l,
            Err(_) => println!("Invalid length {trimmed}, defaulting to {}", format_length(item.length)),
        }
    }

    let answer = prompt(&format!(
        "{} {} ",
        "Enter due date".with(Color::Yellow),
        format!("({DATE_FORMAT_HELP}) [Default: none]").with(Color::Grey)
    ));
    match parse_datetime_input(answer.trim(), now) {
        Ok(due) => item.due = due,
        Err(e) => println!("{e}; leaving due date unset"),
    }

    let answer = prompt(&format!(
        "{} {} ",
        "Enter start date".with(Color::Yellow),
        "(same formats) [Default: none]".with(Color::Grey)
    ));
    match parse_datetime_input(answer.trim(), now) {
        Ok(start) => item.start = start,
        Err(e) => println!("{e}; leaving start date unset"),
    }

    item
}

/// Open `$EDITOR` (default vim) on a temp file seeded with the old name and
/// return the first line the user left behind.
fn edit_name_in_editor(old_name: &str) -> Result<String, Box<dyn std::error::Error>> {
    let mut tmp = tempfile::NamedTempFile::new()?;
    tmp.write_all(old_name.as_bytes())?;
    tmp.flush()?;

    let editor = std::env::var("EDITOR").unwrap_or_else(|_| {
        println!("No editor set in env $EDITOR, using vim as default");
        "vim".to_string()
    });
    let status = Process::new(&editor).arg(tmp.path()).status()?;
    if !status.success() {
        return Err(format!("{editor} exited with an error").into());
    }

    let content = std::fs::read_to_string(tmp.path())?;
    Ok(content.lines().next().unwrap_or("").trim().to_string())
}
