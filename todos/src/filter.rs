//! Pure predicates over a todo collection.

use crate::types::{FilterMode, Todo};

/// Returns the todos visible under `mode`, preserving order
#[must_use]
pub fn filter_by_mode(todos: &[Todo], mode: FilterMode) -> Vec<Todo> {
    todos
        .iter()
        .filter(|todo| matches_mode(todo, mode))
        .cloned()
        .collect()
}

/// Whether `todo` is visible under `mode`
#[must_use]
pub const fn matches_mode(todo: &Todo, mode: FilterMode) -> bool {
    match mode {
        FilterMode::All => true,
        FilterMode::Active => !todo.completed,
        FilterMode::Completed => todo.completed,
    }
}

/// Number of incomplete todos
#[must_use]
pub fn count_active(todos: &[Todo]) -> usize {
    todos.iter().filter(|todo| !todo.completed).count()
}

/// Number of completed todos
#[must_use]
pub fn count_completed(todos: &[Todo]) -> usize {
    todos.iter().filter(|todo| todo.completed).count()
}

/// Whether every todo is completed (true for an empty collection)
#[must_use]
pub fn all_completed(todos: &[Todo]) -> bool {
    todos.iter().all(|todo| todo.completed)
}
