//! The task being composed and its pending priority suggestion.
//!
//! Every suggestion request is tagged with a [`Ticket`]. Tickets increase
//! monotonically, so a response that resolves after a newer one is already
//! displayed is discarded instead of overwriting it. Committing or clearing
//! the draft invalidates every ticket handed out before it.

use crate::store::{StoreError, TaskStore};
use crate::suggest::{SuggestError, Suggestion};
use crate::types::{Category, Priority, Task};
use chrono::NaiveDate;

/// Sequence number of one suggestion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn seq(&self) -> u64 {
        self.0
    }
}

/// What [`Draft::resolve`] did with a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The suggestion is now displayed.
    Applied,
    /// The request failed; no suggestion is displayed.
    Failed,
    /// Superseded by a newer response or a commit; ignored.
    Stale,
}

#[derive(Debug, Clone)]
struct Pending {
    ticket: Ticket,
    suggestion: Suggestion,
}

#[derive(Debug, Default)]
pub struct Draft {
    text: String,
    last_issued: u64,
    // Tickets at or below this are from before the last commit/clear.
    floor: u64,
    // Highest ticket resolved so far, success or failure.
    resolved: u64,
    pending: Option<Pending>,
}

impl Draft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the draft text.
    ///
    /// Returns a ticket for a new suggestion request when the text is not
    /// blank. Blank text drops the pending suggestion.
    pub fn set_text(&mut self, text: &str) -> Option<Ticket> {
        self.text = text.to_string();
        if text.trim().is_empty() {
            self.invalidate();
            return None;
        }
        self.last_issued += 1;
        Some(Ticket(self.last_issued))
    }

    /// Record the outcome of the request tagged `ticket`.
    pub fn resolve(&mut self, ticket: Ticket, result: Result<Suggestion, SuggestError>) -> Resolution {
        if ticket.0 <= self.floor || ticket.0 < self.resolved {
            log::debug!("Discarding stale suggestion #{}", ticket.0);
            return Resolution::Stale;
        }
        self.resolved = ticket.0;

        match result {
            Ok(suggestion) => {
                self.pending = Some(Pending { ticket, suggestion });
                Resolution::Applied
            }
            Err(e) => {
                log::warn!("No suggestion available: {}", e);
                self.pending = None;
                Resolution::Failed
            }
        }
    }

    /// The displayed suggestion, if any.
    pub fn suggestion(&self) -> Option<&Suggestion> {
        self.pending.as_ref().map(|p| &p.suggestion)
    }

    /// Ticket of the displayed suggestion.
    pub fn suggestion_ticket(&self) -> Option<Ticket> {
        self.pending.as_ref().map(|p| p.ticket)
    }

    /// Priority a commit would use without an override.
    pub fn priority(&self) -> Priority {
        self.suggestion().map(|s| s.priority).unwrap_or_default()
    }

    /// True if a request has been issued that has not resolved yet.
    pub fn is_waiting(&self) -> bool {
        self.last_issued > self.floor.max(self.resolved)
    }

    /// Add the draft to `store` and reset it.
    ///
    /// Priority is `override_priority`, else the displayed suggestion, else
    /// medium. On error the draft is kept as is.
    pub fn commit(
        &mut self,
        store: &mut TaskStore,
        override_priority: Option<Priority>,
        category: Category,
        due_date: Option<NaiveDate>,
    ) -> Result<Task, StoreError> {
        let priority = override_priority.unwrap_or_else(|| self.priority());
        let task = store.add_task(&self.text, priority, category, due_date)?;
        self.clear();
        Ok(task)
    }

    /// Drop the text and pending suggestion.
    pub fn clear(&mut self) {
        self.text.clear();
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.pending = None;
        self.floor = self.last_issued;
    }
}
