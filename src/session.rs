//! Interactive session: the command grammar and the state it drives.
//!
//! A session owns the task list, the draft and the preferences. Suggestion
//! requests run as tokio tasks and report back through a channel; the
//! owner of the receiver feeds results into [`Session::on_suggestion`].

use crate::draft::{Draft, Resolution, Ticket};
use crate::prefs::{Preferences, Theme};
use crate::store::{TaskFilter, TaskStore};
use crate::suggest::{PrioritySuggester, SuggestError, Suggestion};
use crate::types::{Category, Priority, Task};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use eyre::{Result, bail};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Result of one suggestion request, tagged with its ticket.
pub type SuggestionResult = (Ticket, Result<Suggestion, SuggestError>);

/// One input line.
#[derive(Parser, Debug)]
#[command(multicall = true)]
pub struct Line {
    #[command(subcommand)]
    pub command: Command,
}

impl Line {
    /// Parse a raw input line into a command.
    pub fn parse_line(input: &str) -> std::result::Result<Command, clap::Error> {
        Line::try_parse_from(input.split_whitespace()).map(|line| line.command)
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Type a task description (asks for a priority suggestion); no text shows the draft
    Draft {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        words: Vec<String>,
    },

    /// Discard the draft
    Clear,

    /// Add the draft (or TEXT) as a task
    #[command(visible_alias = "accept")]
    Add {
        /// Override the suggested priority
        #[arg(short, long)]
        priority: Option<Priority>,

        #[arg(short, long, default_value_t = Category::default())]
        category: Category,

        /// Due date (YYYY-MM-DD)
        #[arg(short, long)]
        due: Option<NaiveDate>,

        /// Task text; options go before it
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        words: Vec<String>,
    },

    /// List tasks
    #[command(visible_alias = "ls")]
    List {
        #[arg(short, long)]
        category: Option<Category>,

        /// Only tasks not yet done
        #[arg(long, conflicts_with = "done")]
        open: bool,

        /// Only completed tasks
        #[arg(long)]
        done: bool,
    },

    /// Toggle completion of task N
    Done { n: usize },

    /// Set the priority of task N
    Priority { n: usize, priority: Priority },

    /// Add a subtask to task N
    Sub {
        n: usize,
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        words: Vec<String>,
    },

    /// Toggle completion of subtask M of task N
    Subdone { n: usize, m: usize },

    /// Move task FROM to position TO
    #[command(name = "move", visible_alias = "mv")]
    Move { from: usize, to: usize },

    /// Set (or clear, without DATE) the due date of task N
    Due { n: usize, date: Option<NaiveDate> },

    /// Set the category of task N
    Category { n: usize, category: Category },

    /// Remove task N
    #[command(visible_alias = "remove")]
    Rm { n: usize },

    /// Toggle dark mode
    Theme,

    /// Leave the session
    #[command(visible_alias = "exit")]
    Quit,
}

/// What the presentation layer should show after a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Info(String),
    /// A task and its 1-based position
    Task(usize, Task),
    Tasks(Vec<(usize, Task)>),
    Draft {
        text: String,
        waiting: bool,
        suggestion: Option<Suggestion>,
    },
    Suggested(Suggestion),
    Theme(Theme),
    Quit,
}

pub struct Session {
    store: TaskStore,
    draft: Draft,
    prefs: Preferences,
    suggester: Option<Arc<dyn PrioritySuggester>>,
    results: mpsc::UnboundedSender<SuggestionResult>,
}

impl Session {
    /// Create a session and the receiver its suggestion results arrive on.
    pub fn new(
        prefs: Preferences,
        suggester: Option<Arc<dyn PrioritySuggester>>,
    ) -> (Self, mpsc::UnboundedReceiver<SuggestionResult>) {
        let (results, rx) = mpsc::unbounded_channel();
        let session = Self {
            store: TaskStore::new(),
            draft: Draft::new(),
            prefs,
            suggester,
            results,
        };
        (session, rx)
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn theme(&self) -> Result<Theme> {
        self.prefs.theme()
    }

    pub fn has_suggester(&self) -> bool {
        self.suggester.is_some()
    }

    /// Run one command. Errors leave the session unchanged.
    pub fn execute(&mut self, command: Command) -> Result<Reply> {
        match command {
            Command::Draft { words } if words.is_empty() => Ok(self.draft_reply()),

            Command::Draft { words } => {
                let text = words.join(" ");
                if let Some(ticket) = self.draft.set_text(&text) {
                    self.request_suggestion(ticket, text);
                }
                Ok(self.draft_reply())
            }

            Command::Clear => {
                self.draft.clear();
                Ok(Reply::Info("Draft cleared".to_string()))
            }

            Command::Add {
                priority,
                category,
                due,
                words,
            } => {
                let text = words.join(" ");
                // Text other than the draft has no suggestion; the draft stays put
                let task = if words.is_empty() || text == self.draft.text() {
                    self.draft.commit(&mut self.store, priority, category, due)?
                } else {
                    self.store
                        .add_task(&text, priority.unwrap_or_default(), category, due)?
                };
                Ok(Reply::Task(self.store.len(), task))
            }

            Command::List { category, open, done } => {
                let mut filter = TaskFilter::new();
                if let Some(category) = category {
                    filter = filter.category(category);
                }
                if open {
                    filter = filter.completed(false);
                } else if done {
                    filter = filter.completed(true);
                }
                let tasks = self
                    .store
                    .filter(&filter)
                    .into_iter()
                    .map(|(i, t)| (i + 1, t.clone()))
                    .collect();
                Ok(Reply::Tasks(tasks))
            }

            Command::Done { n } => {
                let id = self.task_id_at(n)?;
                self.store.toggle_complete(&id)?;
                self.task_reply(n)
            }

            Command::Priority { n, priority } => {
                let id = self.task_id_at(n)?;
                self.store.set_priority(&id, priority)?;
                self.task_reply(n)
            }

            Command::Sub { n, words } => {
                let id = self.task_id_at(n)?;
                self.store.add_subtask(&id, &words.join(" "))?;
                self.task_reply(n)
            }

            Command::Subdone { n, m } => {
                let id = self.task_id_at(n)?;
                let subtask_id = match m.checked_sub(1).and_then(|i| self.store.tasks()[n - 1].subtasks.get(i)) {
                    Some(subtask) => subtask.id.clone(),
                    None => bail!("task {} has no subtask {}", n, m),
                };
                self.store.toggle_subtask_complete(&id, &subtask_id)?;
                self.task_reply(n)
            }

            Command::Move { from, to } => {
                self.check_position(from)?;
                self.check_position(to)?;
                self.store.reorder(from - 1, to - 1)?;
                self.task_reply(to)
            }

            Command::Due { n, date } => {
                let id = self.task_id_at(n)?;
                self.store.set_due_date(&id, date)?;
                self.task_reply(n)
            }

            Command::Category { n, category } => {
                let id = self.task_id_at(n)?;
                self.store.set_category(&id, category)?;
                self.task_reply(n)
            }

            Command::Rm { n } => {
                let id = self.task_id_at(n)?;
                let task = self.store.remove_task(&id)?;
                Ok(Reply::Info(format!("Removed: {}", task.description)))
            }

            Command::Theme => Ok(Reply::Theme(self.prefs.toggle_theme()?)),

            Command::Quit => Ok(Reply::Quit),
        }
    }

    /// Feed back a finished suggestion request. Returns what to show, if anything.
    pub fn on_suggestion(&mut self, ticket: Ticket, result: Result<Suggestion, SuggestError>) -> Option<Reply> {
        match self.draft.resolve(ticket, result) {
            Resolution::Applied => self.draft.suggestion().cloned().map(Reply::Suggested),
            Resolution::Failed => Some(Reply::Info(format!(
                "No suggestion available; defaulting to {}",
                Priority::default()
            ))),
            Resolution::Stale => None,
        }
    }

    fn request_suggestion(&self, ticket: Ticket, text: String) {
        let Some(suggester) = self.suggester.clone() else {
            return;
        };
        let results = self.results.clone();
        log::debug!("Spawning suggestion request #{}", ticket.seq());
        tokio::spawn(async move {
            let result = suggester.suggest(&text).await;
            // Receiver gone means the session ended
            let _ = results.send((ticket, result));
        });
    }

    fn draft_reply(&self) -> Reply {
        Reply::Draft {
            text: self.draft.text().to_string(),
            waiting: self.suggester.is_some() && self.draft.is_waiting(),
            suggestion: self.draft.suggestion().cloned(),
        }
    }

    fn check_position(&self, n: usize) -> Result<()> {
        if n == 0 || n > self.store.len() {
            bail!("no task at position {}", n);
        }
        Ok(())
    }

    fn task_id_at(&self, n: usize) -> Result<String> {
        self.check_position(n)?;
        Ok(self.store.tasks()[n - 1].id.clone())
    }

    fn task_reply(&self, n: usize) -> Result<Reply> {
        self.check_position(n)?;
        Ok(Reply::Task(n, self.store.tasks()[n - 1].clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_session() -> Session {
        let prefs = Preferences::in_memory().unwrap();
        Session::new(prefs, None).0
    }

    fn run(session: &mut Session, line: &str) -> Result<Reply> {
        let command = Line::parse_line(line).map_err(|e| eyre::eyre!(e.to_string()))?;
        session.execute(command)
    }

    #[test]
    fn test_parse_add_with_flags() {
        let command = Line::parse_line("add --priority high -c work File report").unwrap();
        assert_eq!(
            command,
            Command::Add {
                priority: Some(Priority::High),
                category: Category::Work,
                due: None,
                words: vec!["File".to_string(), "report".to_string()],
            }
        );
    }

    #[test]
    fn test_parse_aliases_and_dates() {
        assert_eq!(Line::parse_line("mv 2 1").unwrap(), Command::Move { from: 2, to: 1 });
        assert_eq!(Line::parse_line("exit").unwrap(), Command::Quit);
        assert_eq!(
            Line::parse_line("due 1 2026-12-24").unwrap(),
            Command::Due {
                n: 1,
                date: NaiveDate::from_ymd_opt(2026, 12, 24)
            }
        );
        assert!(Line::parse_line("due 1 tomorrow").is_err());
        assert!(Line::parse_line("priority 1 urgent").is_err());
        assert!(Line::parse_line("frobnicate").is_err());
    }

    #[test]
    fn test_parse_add_hyphen_text() {
        let Command::Add { words, priority, .. } = Line::parse_line("add -p low -5 degrees outside").unwrap() else {
            panic!("expected add");
        };
        assert_eq!(priority, Some(Priority::Low));
        assert_eq!(words, vec!["-5", "degrees", "outside"]);
    }

    #[test]
    fn test_add_without_suggestion_is_medium() {
        let mut session = offline_session();
        let reply = run(&mut session, "add Buy groceries").unwrap();
        match reply {
            Reply::Task(1, task) => {
                assert_eq!(task.description, "Buy groceries");
                assert_eq!(task.priority, Priority::Medium);
                assert!(!task.completed);
                assert!(task.subtasks.is_empty());
            }
            other => panic!("unexpected reply {:?}", other),
        }
    }

    #[test]
    fn test_add_empty_draft_fails_without_change() {
        let mut session = offline_session();
        assert!(run(&mut session, "add").is_err());
        assert!(session.store().is_empty());
    }

    #[test]
    fn test_position_errors() {
        let mut session = offline_session();
        run(&mut session, "add One").unwrap();
        assert!(run(&mut session, "done 0").is_err());
        assert!(run(&mut session, "done 2").is_err());
        assert!(run(&mut session, "move 1 3").is_err());
        assert!(run(&mut session, "subdone 1 1").is_err());
        assert!(!session.store().tasks()[0].completed);
    }

    #[test]
    fn test_list_filters() {
        let mut session = offline_session();
        run(&mut session, "add -c work Report").unwrap();
        run(&mut session, "add -c shopping Milk").unwrap();
        run(&mut session, "done 2").unwrap();

        let Reply::Tasks(open) = run(&mut session, "list --open").unwrap() else {
            panic!("expected task list");
        };
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].0, 1);

        let Reply::Tasks(shopping) = run(&mut session, "ls -c shopping").unwrap() else {
            panic!("expected task list");
        };
        assert_eq!(shopping.len(), 1);
        assert_eq!(shopping[0].0, 2);
        assert!(shopping[0].1.completed);
    }

    #[test]
    fn test_theme_toggle() {
        let mut session = offline_session();
        assert_eq!(session.theme().unwrap(), Theme::Light);
        assert_eq!(run(&mut session, "theme").unwrap(), Reply::Theme(Theme::Dark));
        assert_eq!(session.theme().unwrap(), Theme::Dark);
    }

    #[test]
    fn test_draft_offline_never_waits() {
        let mut session = offline_session();
        let reply = run(&mut session, "draft Water plants").unwrap();
        assert!(matches!(
            reply,
            Reply::Draft { ref text, waiting: false, suggestion: None } if text == "Water plants"
        ));
        assert!(!session.has_suggester());
    }
}
