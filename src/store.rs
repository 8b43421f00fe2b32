//! In-memory task list and its update operations.

use crate::id::generate_unique_id;
use crate::types::{Category, Priority, Subtask, Task, ValidationError, validate_description};
use chrono::NaiveDate;
use std::sync::Arc;

/// Errors that can occur during store operations.
///
/// A failed operation leaves the store unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Task not found.
    TaskNotFound(String),
    /// Subtask not found on the given task.
    SubtaskNotFound { task_id: String, subtask_id: String },
    /// Position outside the task list.
    IndexOutOfRange { index: usize, len: usize },
    /// Validation error.
    Validation(ValidationError),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::TaskNotFound(id) => write!(f, "task not found: {}", id),
            StoreError::SubtaskNotFound { task_id, subtask_id } => {
                write!(f, "subtask {} not found on task {}", subtask_id, task_id)
            }
            StoreError::IndexOutOfRange { index, len } => {
                write!(f, "position {} out of range (have {} tasks)", index, len)
            }
            StoreError::Validation(e) => write!(f, "validation error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<ValidationError> for StoreError {
    fn from(e: ValidationError) -> Self {
        StoreError::Validation(e)
    }
}

/// Criteria for [`TaskStore::filter`]. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub category: Option<Category>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
}

impl TaskFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn matches(&self, task: &Task) -> bool {
        self.category.is_none_or(|c| task.category == c)
            && self.completed.is_none_or(|c| task.completed == c)
            && self.priority.is_none_or(|p| task.priority == p)
    }
}

/// Ordered list of tasks.
///
/// The list is shared copy-on-write: a [`snapshot`](Self::snapshot) never
/// observes later mutations.
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    tasks: Arc<Vec<Task>>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new task.
    pub fn add_task(
        &mut self,
        description: &str,
        priority: Priority,
        category: Category,
        due_date: Option<NaiveDate>,
    ) -> Result<Task, StoreError> {
        let description = validate_description(description)?;
        let id = generate_unique_id(description, |candidate| self.contains(candidate));

        let task = Task {
            id,
            description: description.to_string(),
            priority,
            completed: false,
            subtasks: Vec::new(),
            due_date,
            category,
        };

        log::debug!("Adding task {} ({}, {})", task.id, task.priority, task.category);
        Arc::make_mut(&mut self.tasks).push(task.clone());
        Ok(task)
    }

    /// Flip a task's completed flag. Returns the new value.
    pub fn toggle_complete(&mut self, task_id: &str) -> Result<bool, StoreError> {
        let task = self.task_mut(task_id)?;
        task.completed = !task.completed;
        log::debug!("Task {} completed={}", task_id, task.completed);
        Ok(task.completed)
    }

    /// Overwrite a task's priority.
    pub fn set_priority(&mut self, task_id: &str, priority: Priority) -> Result<(), StoreError> {
        self.task_mut(task_id)?.priority = priority;
        log::debug!("Task {} priority={}", task_id, priority);
        Ok(())
    }

    /// Replace or clear a task's due date.
    pub fn set_due_date(&mut self, task_id: &str, due_date: Option<NaiveDate>) -> Result<(), StoreError> {
        self.task_mut(task_id)?.due_date = due_date;
        Ok(())
    }

    pub fn set_category(&mut self, task_id: &str, category: Category) -> Result<(), StoreError> {
        self.task_mut(task_id)?.category = category;
        Ok(())
    }

    /// Append a subtask to a task.
    pub fn add_subtask(&mut self, task_id: &str, description: &str) -> Result<Subtask, StoreError> {
        let description = validate_description(description)?;
        let index = self.position(task_id)?;

        let existing = &self.tasks[index].subtasks;
        let id = generate_unique_id(description, |candidate| existing.iter().any(|s| s.id == candidate));
        let subtask = Subtask {
            id,
            description: description.to_string(),
            completed: false,
        };

        Arc::make_mut(&mut self.tasks)[index].subtasks.push(subtask.clone());
        log::debug!("Task {} gained subtask {}", task_id, subtask.id);
        Ok(subtask)
    }

    /// Flip a subtask's completed flag. Returns the new value.
    pub fn toggle_subtask_complete(&mut self, task_id: &str, subtask_id: &str) -> Result<bool, StoreError> {
        let index = self.position(task_id)?;
        if self.tasks[index].subtask(subtask_id).is_none() {
            return Err(StoreError::SubtaskNotFound {
                task_id: task_id.to_string(),
                subtask_id: subtask_id.to_string(),
            });
        }

        let tasks = Arc::make_mut(&mut self.tasks);
        let mut completed = false;
        if let Some(subtask) = tasks[index].subtasks.iter_mut().find(|s| s.id == subtask_id) {
            subtask.completed = !subtask.completed;
            completed = subtask.completed;
        }
        Ok(completed)
    }

    /// Move the task at `from` to position `to`, keeping everything else in order.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), StoreError> {
        let len = self.tasks.len();
        for index in [from, to] {
            if index >= len {
                return Err(StoreError::IndexOutOfRange { index, len });
            }
        }
        if from == to {
            return Ok(());
        }

        let tasks = Arc::make_mut(&mut self.tasks);
        let task = tasks.remove(from);
        tasks.insert(to, task);
        log::debug!("Moved task from {} to {}", from, to);
        Ok(())
    }

    /// Remove a task and return it.
    pub fn remove_task(&mut self, task_id: &str) -> Result<Task, StoreError> {
        let index = self.position(task_id)?;
        let task = Arc::make_mut(&mut self.tasks).remove(index);
        log::debug!("Removed task {}", task.id);
        Ok(task)
    }

    pub fn get(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub fn contains(&self, task_id: &str) -> bool {
        self.get(task_id).is_some()
    }

    pub fn index_of(&self, task_id: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == task_id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Tasks in display order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Shared handle to the current list.
    pub fn snapshot(&self) -> Arc<Vec<Task>> {
        Arc::clone(&self.tasks)
    }

    /// Tasks matching the filter, with their display positions.
    pub fn filter(&self, filter: &TaskFilter) -> Vec<(usize, &Task)> {
        self.tasks.iter().enumerate().filter(|(_, t)| filter.matches(t)).collect()
    }

    /// Open tasks due before `today`.
    pub fn overdue(&self, today: NaiveDate) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.is_overdue(today)).collect()
    }

    fn position(&self, task_id: &str) -> Result<usize, StoreError> {
        self.index_of(task_id)
            .ok_or_else(|| StoreError::TaskNotFound(task_id.to_string()))
    }

    fn task_mut(&mut self, task_id: &str) -> Result<&mut Task, StoreError> {
        let index = self.position(task_id)?;
        Ok(&mut Arc::make_mut(&mut self.tasks)[index])
    }
}
