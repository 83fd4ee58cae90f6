//! # wtodo - personal todo CLI
//!
//! A small command-line todo list that groups unfinished items by due-date
//! urgency: OVERDUE, DO TODAY, DO SOON, and DO LATER (with never-due items
//! trailing the last section, ordered by priority).
//!
//! ## Quick start
//!
//! ```bash
//! # List the agenda
//! wtodo
//!
//! # Add an item due tomorrow evening
//! wtodo add -n "Submit expenses" -d :2100 -p high -t work
//!
//! # Finish it
//! wtodo finish 1
//! ```
//!
//! ## Key commands
//!
//! - `wtodo list [--done]` - bucketed agenda, optionally with finished items
//! - `wtodo add` - add an item (bare `add` runs the interactive builder)
//! - `wtodo edit <id>` - change fields; `--rename` opens `$EDITOR`
//! - `wtodo finish <id>` / `wtodo reopen <id>` - toggle completion
//! - `wtodo delete <id>` - remove an item
//! - `wtodo setup` - choose between the flat data file and SQLite storage
//!
//! Data lives in `~/.wtodo/` (`wtodo.dat`, or `wtodo.db` for the SQLite
//! backend); preferences in `~/.wtodo/config.json`.

use clap::Parser;

pub mod cli;
pub mod cmd;
pub mod dates;
pub mod db;
pub mod fields;
pub mod render;
pub mod schedule;
pub mod settings;
pub mod store;
pub mod task;

use cli::Cli;
use cmd::*;
use db::SqliteStore;
use settings::Settings;
use store::{data_dir, FileStore, Store};

fn main() {
    let cli = Cli::parse();

    // Completions need no storage at all.
    if let Some(Commands::Completions { shell }) = &cli.command {
        cmd_completions(*shell);
        return;
    }

    let data_dir = match data_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Failed to prepare data directory: {e}");
            std::process::exit(1);
        }
    };

    if let Some(Commands::Setup) = &cli.command {
        cmd_setup(&data_dir);
        return;
    }

    // Pick the backend: --file forces the flat file, otherwise preferences
    // decide between the data file and SQLite.
    let settings = Settings::load(&data_dir);
    let mut store: Box<dyn Store> = if let Some(path) = cli.file {
        Box::new(or_exit(FileStore::open(path)))
    } else if settings.use_db {
        let path = settings.db_path.unwrap_or_else(|| data_dir.join("wtodo.db"));
        Box::new(or_exit(SqliteStore::open(&path)))
    } else {
        Box::new(or_exit(FileStore::open(data_dir.join("wtodo.dat"))))
    };

    match cli.command.unwrap_or(Commands::List { done: false }) {
        Commands::List { done } => cmd_list(store.as_mut(), done),

        Commands::Add { name, priority, length, due, start, tags } =>
            cmd_add(store.as_mut(), name, priority, length, due, start, tags),

        Commands::Edit { id, name, rename, priority, length, due, start, tags } =>
            cmd_edit(store.as_mut(), id, name, rename, priority, length, due, start, tags),

        Commands::Finish { id } => cmd_finish(store.as_mut(), id),

        Commands::Reopen { id } => cmd_reopen(store.as_mut(), id),

        Commands::Delete { id } => cmd_delete(store.as_mut(), id),

        Commands::Setup | Commands::Completions { .. } => unreachable!("handled above"),
    }
}
