//! Read-only snapshot handed to the presentation layer.

use crate::filter::{all_completed, count_active, count_completed, filter_by_mode};
use crate::types::{ErrorKind, FilterMode, Todo, TodoId, TodoState};
use std::collections::BTreeSet;

/// Everything a front-end needs to render the list
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TodoView {
    /// Todos matching the current filter, in collection order
    pub visible: Vec<Todo>,
    /// Todo being created, shown after the list
    pub placeholder: Option<Todo>,
    /// Ids with a remote operation in flight
    pub processing: BTreeSet<TodoId>,
    /// Current filter
    pub filter: FilterMode,
    /// Error currently shown
    pub error: Option<ErrorKind>,
    /// Number of incomplete todos in the whole collection
    pub active_count: usize,
    /// Number of completed todos in the whole collection
    pub completed_count: usize,
    /// Whether the collection is non-empty
    pub has_todos: bool,
    /// Whether every todo is completed
    pub all_completed: bool,
    /// Focus request counter; a change means focus the new-todo input
    pub focus_requests: u64,
}

impl TodoView {
    /// Builds a view from controller state
    #[must_use]
    pub fn from_state(state: &TodoState) -> Self {
        Self {
            visible: filter_by_mode(&state.todos, state.filter),
            placeholder: state.placeholder.clone(),
            processing: state.processing.clone(),
            filter: state.filter,
            error: state.error_kind(),
            active_count: count_active(&state.todos),
            completed_count: count_completed(&state.todos),
            has_todos: !state.todos.is_empty(),
            all_completed: all_completed(&state.todos),
            focus_requests: state.focus_requests,
        }
    }

    /// Notification text of the current error
    #[must_use]
    pub fn error_message(&self) -> Option<&'static str> {
        self.error.map(ErrorKind::message)
    }

    /// Footer counter, always plural: "1 items left"
    #[must_use]
    pub fn items_left_label(&self) -> String {
        format!("{} items left", self.active_count)
    }

    /// Whether the footer (counter, filters, clear button) is shown
    #[must_use]
    pub const fn show_footer(&self) -> bool {
        self.has_todos
    }

    /// Whether "Clear completed" is enabled
    #[must_use]
    pub const fn can_clear_completed(&self) -> bool {
        self.completed_count > 0
    }

    /// Whether the toggle-all control is shown checked
    #[must_use]
    pub const fn toggle_all_checked(&self) -> bool {
        self.has_todos && self.all_completed
    }

    /// Whether `id` should be rendered as busy
    #[must_use]
    pub fn is_processing(&self, id: TodoId) -> bool {
        self.processing.contains(&id)
    }

    /// Whether the new-todo input should be disabled
    #[must_use]
    pub const fn input_locked(&self) -> bool {
        self.placeholder.is_some()
    }
}

impl From<&TodoState> for TodoView {
    fn from(state: &TodoState) -> Self {
        Self::from_state(state)
    }
}
