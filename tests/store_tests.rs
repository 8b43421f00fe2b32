//! Integration tests for task list operations.

mod common;

use common::TestEnv;
use std::collections::HashSet;
use taskwise::{Category, Draft, Priority, StoreError, ValidationError};

// =============================================================================
// Adding Tasks
// =============================================================================

#[test]
fn test_add_increases_count_by_one_with_unique_ids() {
    let mut env = TestEnv::new();
    let mut seen = HashSet::new();

    for i in 0..50 {
        let before = env.count();
        let task = env.add(&format!("Task number {}", i));
        assert_eq!(env.count(), before + 1);
        assert!(seen.insert(task.id.clone()), "duplicate id {}", task.id);
    }
}

#[test]
fn test_add_same_description_gets_distinct_ids() {
    let mut env = TestEnv::new();
    let a = env.add("Water plants");
    let b = env.add("Water plants");
    assert_ne!(a.id, b.id);
}

#[test]
fn test_blank_descriptions_are_ignored() {
    let mut env = TestEnv::new();
    env.add("Existing");

    for blank in ["", "   "] {
        let result = env.store.add_task(blank, Priority::Low, Category::Other, None);
        assert_eq!(
            result,
            Err(StoreError::Validation(ValidationError::EmptyDescription))
        );
    }
    assert_eq!(env.count(), 1);
}

#[test]
fn test_buy_groceries_without_suggestion() {
    let mut env = TestEnv::new();
    let mut draft = Draft::new();
    draft.set_text("Buy groceries");

    let task = draft
        .commit(&mut env.store, None, Category::Shopping, None)
        .unwrap();

    assert_eq!(task.priority, Priority::Medium);
    assert!(!task.completed);
    assert!(task.subtasks.is_empty());
    assert_eq!(task.category, Category::Shopping);
}

#[test]
fn test_description_is_trimmed() {
    let mut env = TestEnv::new();
    let task = env.add("  Call the dentist  ");
    assert_eq!(task.description, "Call the dentist");
}

// =============================================================================
// Completion and Priority
// =============================================================================

#[test]
fn test_toggle_complete_is_its_own_inverse() {
    let mut env = TestEnv::new();
    let task = env.add("Laundry");

    assert!(env.store.toggle_complete(&task.id).unwrap());
    assert!(!env.store.toggle_complete(&task.id).unwrap());
    assert_eq!(env.task(&task.id).completed, task.completed);
}

#[test]
fn test_toggle_only_touches_target() {
    let mut env = TestEnv::new();
    let tasks = env.add_many(3);

    env.store.toggle_complete(&tasks[1].id).unwrap();

    let flags: Vec<bool> = env.store.tasks().iter().map(|t| t.completed).collect();
    assert_eq!(flags, vec![false, true, false]);
}

#[test]
fn test_set_priority_overwrites() {
    let mut env = TestEnv::new();
    let task = env.add_with_priority("Taxes", Priority::Low);

    for priority in Priority::ALL {
        env.store.set_priority(&task.id, priority).unwrap();
        assert_eq!(env.task(&task.id).priority, priority);
    }
    // Setting the same value again is fine
    env.store.set_priority(&task.id, Priority::High).unwrap();
    assert_eq!(env.task(&task.id).priority, Priority::High);
}

#[test]
fn test_set_priority_missing_task() {
    let mut env = TestEnv::new();
    assert!(matches!(
        env.store.set_priority("tw-nonexistent", Priority::High),
        Err(StoreError::TaskNotFound(_))
    ));
}

// =============================================================================
// Subtasks
// =============================================================================

#[test]
fn test_buy_milk_subtask_toggles() {
    let mut env = TestEnv::new();
    let task = env.add("Buy groceries");
    let milk = env.store.add_subtask(&task.id, "Buy milk").unwrap();

    env.store.toggle_subtask_complete(&task.id, &milk.id).unwrap();
    assert!(env.task(&task.id).subtasks[0].completed);

    env.store.toggle_subtask_complete(&task.id, &milk.id).unwrap();
    assert!(!env.task(&task.id).subtasks[0].completed);
}

#[test]
fn test_subtasks_keep_order_and_owner() {
    let mut env = TestEnv::new();
    let a = env.add("Trip");
    let b = env.add("Party");

    env.store.add_subtask(&a.id, "Passport").unwrap();
    env.store.add_subtask(&a.id, "Tickets").unwrap();
    env.store.add_subtask(&b.id, "Cake").unwrap();

    let trip: Vec<&str> = env
        .task(&a.id)
        .subtasks
        .iter()
        .map(|s| s.description.as_str())
        .collect();
    assert_eq!(trip, vec!["Passport", "Tickets"]);
    assert_eq!(env.task(&b.id).subtasks.len(), 1);
}

#[test]
fn test_subtask_of_other_task_not_found() {
    let mut env = TestEnv::new();
    let a = env.add("A");
    let b = env.add("B");
    let sub = env.store.add_subtask(&a.id, "Only on A").unwrap();

    assert!(matches!(
        env.store.toggle_subtask_complete(&b.id, &sub.id),
        Err(StoreError::SubtaskNotFound { .. })
    ));
    assert!(!env.task(&a.id).subtasks[0].completed);
}

#[test]
fn test_blank_subtask_ignored() {
    let mut env = TestEnv::new();
    let task = env.add("Parent");
    assert!(env.store.add_subtask(&task.id, "  ").is_err());
    assert!(env.task(&task.id).subtasks.is_empty());
}

// =============================================================================
// Reordering
// =============================================================================

#[test]
fn test_reorder_is_a_permutation() {
    let mut env = TestEnv::new();
    env.add_many(6);
    let original: HashSet<String> = env.ids().into_iter().collect();

    for (from, to) in [(0, 5), (5, 0), (2, 3), (4, 1), (3, 3)] {
        env.store.reorder(from, to).unwrap();
        let now: HashSet<String> = env.ids().into_iter().collect();
        assert_eq!(now, original);
        assert_eq!(env.count(), 6);
    }
}

#[test]
fn test_reorder_preserves_relative_order_of_others() {
    let mut env = TestEnv::new();
    let tasks = env.add_many(5);
    let moved = tasks[1].id.clone();

    env.store.reorder(1, 3).unwrap();

    let ids = env.ids();
    assert_eq!(ids[3], moved);
    let others: Vec<&String> = ids.iter().filter(|id| **id != moved).collect();
    let expected: Vec<&String> = tasks.iter().map(|t| &t.id).filter(|id| **id != moved).collect();
    assert_eq!(others, expected);
}

#[test]
fn test_reorder_out_of_range_is_noop() {
    let mut env = TestEnv::new();
    env.add_many(3);
    let before = env.ids();

    assert!(env.store.reorder(3, 0).is_err());
    assert!(env.store.reorder(0, 3).is_err());
    assert_eq!(env.ids(), before);
}

#[test]
fn test_reorder_empty_store() {
    let mut env = TestEnv::new();
    assert_eq!(
        env.store.reorder(0, 0),
        Err(StoreError::IndexOutOfRange { index: 0, len: 0 })
    );
}

// =============================================================================
// Due Dates and Categories
// =============================================================================

#[test]
fn test_due_date_and_category_updates() {
    let mut env = TestEnv::new();
    let task = env.add("Dentist");
    let date = chrono::NaiveDate::from_ymd_opt(2026, 11, 2);

    env.store.set_due_date(&task.id, date).unwrap();
    env.store.set_category(&task.id, Category::Health).unwrap();
    assert_eq!(env.task(&task.id).due_date, date);
    assert_eq!(env.task(&task.id).category, Category::Health);

    env.store.set_due_date(&task.id, None).unwrap();
    assert!(env.task(&task.id).due_date.is_none());
}

#[test]
fn test_unicode_descriptions() {
    let mut env = TestEnv::new();
    let task = env.add("Acheter du pain \u{1F956}");
    assert_eq!(env.task(&task.id).description, "Acheter du pain \u{1F956}");
}
