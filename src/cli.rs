//! CLI argument parsing for taskwise.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "tw",
    about = "A to-do list with language-model priority suggestions",
    version,
    after_help = "Logs are written to: ~/.local/share/taskwise/logs/taskwise.log"
)]
pub struct Cli {
    /// Config file (default: ~/.config/taskwise/config.yaml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory for the preferences database
    #[arg(short = 'd', long)]
    pub data_dir: Option<PathBuf>,

    /// Never ask the language model for suggestions
    #[arg(long)]
    pub offline: bool,
}
