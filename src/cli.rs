use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Simple, file-backed personal todo CLI.
/// Storage defaults to ~/.wtodo/wtodo.dat or a path passed via --file.
#[derive(Parser)]
#[command(name = "wtodo", version, about = "Personal todo list grouped by due-date urgency")]
pub struct Cli {
    /// Path to the data file (overrides preferences and the default location).
    #[arg(long, global = true)]
    pub file: Option<PathBuf>,

    /// With no subcommand the agenda is listed.
    #[command(subcommand)]
    pub command: Option<Commands>,
}
