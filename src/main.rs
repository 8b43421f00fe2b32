//! taskwise CLI - an interactive to-do list with suggested priorities.

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use taskwise::{
    Config, Line, LlmSuggester, Preferences, Priority, PrioritySuggester, Reply, Session, Suggestion,
    SuggestionResult, Task, Theme,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

mod cli;

use cli::Cli;

fn setup_logging() -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("taskwise")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("taskwise.log");

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn format_priority(priority: Priority, theme: Theme) -> ColoredString {
    let label = priority.as_str();
    match (priority, theme) {
        (Priority::High, Theme::Light) => label.red(),
        (Priority::High, Theme::Dark) => label.bright_red(),
        (Priority::Medium, Theme::Light) => label.yellow(),
        (Priority::Medium, Theme::Dark) => label.bright_yellow(),
        (Priority::Low, Theme::Light) => label.green(),
        (Priority::Low, Theme::Dark) => label.bright_green(),
    }
}

fn print_task(n: usize, task: &Task, theme: Theme) {
    let check = if task.completed { "[x]".green() } else { "[ ]".normal() };
    let description = if task.completed {
        task.description.strikethrough()
    } else {
        task.description.normal()
    };
    let due = task
        .due_date
        .map(|d| format!(" due {}", d))
        .unwrap_or_default();
    let (done, total) = task.progress();
    let progress = if total > 0 {
        format!(" {}/{}", done, total)
    } else {
        String::new()
    };

    println!(
        "{:>3}. {} {} {} {}{}{}",
        n,
        check,
        format_priority(task.priority, theme),
        description,
        format!("#{}", task.category).dimmed(),
        due.cyan(),
        progress.dimmed()
    );
    for (m, subtask) in task.subtasks.iter().enumerate() {
        let check = if subtask.completed { "[x]".green() } else { "[ ]".normal() };
        println!("       {}.{} {} {}", n, m + 1, check, subtask.description);
    }
}

fn print_suggestion(suggestion: &Suggestion, theme: Theme) {
    println!(
        "{} Suggested {} priority because: {}",
        "★".blue(),
        format_priority(suggestion.priority, theme),
        suggestion.reasoning
    );
    println!("  {}", "'accept' to add with it, or 'add --priority P' to override".dimmed());
}

/// Print a reply. Returns false when the session should end.
fn render(reply: &Reply, theme: Theme) -> bool {
    match reply {
        Reply::Info(message) => println!("{} {}", "→".blue(), message),
        Reply::Task(n, task) => print_task(*n, task, theme),
        Reply::Tasks(tasks) if tasks.is_empty() => println!("{}", "No tasks".dimmed()),
        Reply::Tasks(tasks) => {
            for (n, task) in tasks {
                print_task(*n, task, theme);
            }
        }
        Reply::Draft {
            text,
            waiting,
            suggestion,
        } => {
            if text.is_empty() {
                println!("{}", "Draft is empty".dimmed());
            } else {
                println!("{}: {}", "Draft".bold(), text);
            }
            match suggestion {
                Some(s) => print_suggestion(s, theme),
                None if *waiting => println!("  {}", "asking for a priority...".dimmed()),
                None => {}
            }
        }
        Reply::Suggested(suggestion) => print_suggestion(suggestion, theme),
        Reply::Theme(theme) => println!("{} Theme: {}", "✓".green(), theme),
        Reply::Quit => return false,
    }
    true
}

fn prompt() {
    print!("{} ", ">".bold());
    std::io::stdout().flush().ok();
}

fn build_suggester(config: &Config, offline: bool) -> Result<Option<Arc<dyn PrioritySuggester>>> {
    if offline || !config.suggest.enabled {
        info!("Priority suggestions disabled");
        return Ok(None);
    }
    if config.suggest.api_key.is_none() {
        log::warn!("No API key configured; suggestion requests will likely be rejected");
    }
    let suggester = LlmSuggester::new(&config.suggest).context("Failed to create suggester")?;
    info!("Suggesting priorities with {}", suggester.model());
    let suggester: Arc<dyn PrioritySuggester> = Arc::new(suggester);
    Ok(Some(suggester))
}

async fn run_session(mut session: Session, mut results: mpsc::UnboundedReceiver<SuggestionResult>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut theme = session.theme().unwrap_or_default();

    println!("{} Type 'help' for commands.", "taskwise".bold());
    prompt();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    break;
                };
                if line.trim().is_empty() {
                    prompt();
                    continue;
                }

                match Line::parse_line(&line) {
                    Ok(command) => match session.execute(command) {
                        Ok(reply) => {
                            if let Reply::Theme(t) = &reply {
                                theme = *t;
                            }
                            if !render(&reply, theme) {
                                break;
                            }
                        }
                        Err(e) => eprintln!("{} {}", "Error:".red().bold(), e),
                    },
                    // Includes --help / help output
                    Err(e) => {
                        e.print().ok();
                    }
                }
                prompt();
            }

            Some((ticket, result)) = results.recv() => {
                if let Some(reply) = session.on_suggestion(ticket, result) {
                    println!();
                    render(&reply, theme);
                    prompt();
                }
            }
        }
    }

    info!("Session ended with {} task(s)", session.store().len());
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref()).context("Failed to load config")?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = Some(dir);
    }

    let prefs = Preferences::open(&config.data_dir()).context("Failed to open preferences")?;
    let suggester = build_suggester(&config, cli.offline)?;
    let (session, results) = Session::new(prefs, suggester);

    let rt = tokio::runtime::Runtime::new().context("Failed to create runtime")?;
    rt.block_on(run_session(session, results)).context("Session error")?;
    Ok(())
}

fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    info!("Command: {:?}", std::env::args().collect::<Vec<_>>());

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
