//! taskwise: a to-do list whose priorities are suggested by a language model.
//!
//! The task list lives in memory for the length of a session. While a task
//! is being typed, a [`PrioritySuggester`] proposes a priority and a short
//! justification; the user accepts it or picks their own when committing.
//!
//! # Example
//!
//! ```
//! use taskwise::{Category, Draft, Priority, TaskStore};
//!
//! let mut store = TaskStore::new();
//! let mut draft = Draft::new();
//!
//! // No suggestion has resolved yet, so the task falls back to medium
//! draft.set_text("Buy groceries");
//! let task = draft.commit(&mut store, None, Category::Shopping, None).unwrap();
//! assert_eq!(task.priority, Priority::Medium);
//!
//! let sub = store.add_subtask(&task.id, "Buy milk").unwrap();
//! assert!(store.toggle_subtask_complete(&task.id, &sub.id).unwrap());
//! ```

mod id;
mod types;

pub mod config;
pub mod draft;
pub mod prefs;
pub mod session;
pub mod store;
pub mod suggest;

// Re-export public API
pub use config::{Config, SuggestConfig};
pub use draft::{Draft, Resolution, Ticket};
pub use prefs::{Preferences, Theme};
pub use session::{Command, Line, Reply, Session, SuggestionResult};
pub use store::{StoreError, TaskFilter, TaskStore};
pub use suggest::{LlmSuggester, PrioritySuggester, SuggestError, Suggestion};
pub use types::{Category, MAX_DESCRIPTION_LEN, ParseEnumError, Priority, Subtask, Task, ValidationError};
