//! Shared test infrastructure for taskwise integration tests.
//!
//! Provides TestEnv for store tests and scripted suggesters for session tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use taskwise::{
    Category, Preferences, Priority, PrioritySuggester, Session, SuggestError, Suggestion, SuggestionResult,
    Task, TaskStore,
};
use tokio::sync::mpsc;

/// Test environment around a fresh store.
pub struct TestEnv {
    pub store: TaskStore,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            store: TaskStore::new(),
        }
    }

    /// Add a task with default priority and category.
    pub fn add(&mut self, description: &str) -> Task {
        self.store
            .add_task(description, Priority::Medium, Category::Personal, None)
            .expect("Failed to add task")
    }

    pub fn add_with_priority(&mut self, description: &str, priority: Priority) -> Task {
        self.store
            .add_task(description, priority, Category::Personal, None)
            .expect("Failed to add task")
    }

    /// Add `n` tasks named "Task 0".."Task n-1".
    pub fn add_many(&mut self, n: usize) -> Vec<Task> {
        (0..n).map(|i| self.add(&format!("Task {}", i))).collect()
    }

    pub fn ids(&self) -> Vec<String> {
        self.store.tasks().iter().map(|t| t.id.clone()).collect()
    }

    pub fn task(&self, id: &str) -> &Task {
        self.store.get(id).expect("Task not found")
    }

    pub fn count(&self) -> usize {
        self.store.len()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Suggester that answers from a script, optionally after a delay per answer.
pub struct ScriptedSuggester {
    answers: Mutex<VecDeque<(Duration, Result<Suggestion, SuggestError>)>>,
    pub seen: Mutex<Vec<String>>,
}

impl ScriptedSuggester {
    pub fn new() -> Self {
        Self {
            answers: Mutex::new(VecDeque::new()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn answer(self, priority: Priority, reasoning: &str) -> Self {
        self.answer_after(Duration::ZERO, priority, reasoning)
    }

    pub fn answer_after(self, delay: Duration, priority: Priority, reasoning: &str) -> Self {
        self.answers.lock().unwrap().push_back((
            delay,
            Ok(Suggestion {
                priority,
                reasoning: reasoning.to_string(),
            }),
        ));
        self
    }

    pub fn fail(self) -> Self {
        self.answers
            .lock()
            .unwrap()
            .push_back((Duration::ZERO, Err(SuggestError::EmptyResponse)));
        self
    }
}

#[async_trait]
impl PrioritySuggester for ScriptedSuggester {
    async fn suggest(&self, description: &str) -> Result<Suggestion, SuggestError> {
        self.seen.lock().unwrap().push(description.to_string());
        let next = self.answers.lock().unwrap().pop_front();
        match next {
            Some((delay, answer)) => {
                tokio::time::sleep(delay).await;
                answer
            }
            None => Err(SuggestError::EmptyResponse),
        }
    }
}

/// Session with in-memory preferences.
pub fn session_with(
    suggester: Option<std::sync::Arc<dyn PrioritySuggester>>,
) -> (Session, mpsc::UnboundedReceiver<SuggestionResult>) {
    let prefs = Preferences::in_memory().expect("Failed to open preferences");
    Session::new(prefs, suggester)
}
