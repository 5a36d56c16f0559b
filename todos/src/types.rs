//! Domain types for the task list.
//!
//! A todo list is a collection of items owned by one user. Items are created,
//! edited, toggled, and deleted through a remote collection API; the reducer
//! keeps the authoritative in-memory copy.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Server-assigned identifier of a todo
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(u64);

impl TodoId {
    /// Id carried by a todo that has not been persisted yet
    pub const PLACEHOLDER: Self = Self(0);

    /// Creates a `TodoId` from its numeric value
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the numeric value
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Whether this is the placeholder id
    #[must_use]
    pub const fn is_placeholder(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the user owning the list
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(u64);

impl UserId {
    /// Creates a `UserId` from its numeric value
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the numeric value
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single todo item
///
/// Field names follow the remote API's JSON (`userId`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    /// Unique identifier (0 until the server assigns one)
    pub id: TodoId,
    /// Owning user
    pub user_id: UserId,
    /// Title of the todo
    pub title: String,
    /// Whether the todo is completed
    pub completed: bool,
}

impl Todo {
    /// Creates a todo
    #[must_use]
    pub fn new(id: TodoId, user_id: UserId, title: impl Into<String>, completed: bool) -> Self {
        Self {
            id,
            user_id,
            title: title.into(),
            completed,
        }
    }

    /// Creates the transient placeholder shown while a creation is in flight
    #[must_use]
    pub fn placeholder(user_id: UserId, title: impl Into<String>) -> Self {
        Self::new(TodoId::PLACEHOLDER, user_id, title, false)
    }

    /// Returns a copy with `completed` set to `completed`
    #[must_use]
    pub fn with_completed(&self, completed: bool) -> Self {
        Self {
            completed,
            ..self.clone()
        }
    }

    /// Returns a copy with a new title
    #[must_use]
    pub fn with_title(&self, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..self.clone()
        }
    }
}

/// Which subset of todos is displayed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FilterMode {
    /// Every todo
    #[default]
    All,
    /// Only incomplete todos
    Active,
    /// Only completed todos
    Completed,
}

impl FilterMode {
    /// Every mode, in display order
    pub const ALL: [Self; 3] = [Self::All, Self::Active, Self::Completed];

    /// The URL-hash route selecting this mode
    #[must_use]
    pub const fn route(self) -> &'static str {
        match self {
            Self::All => "#/",
            Self::Active => "#/active",
            Self::Completed => "#/completed",
        }
    }

    /// Human-readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Active => "Active",
            Self::Completed => "Completed",
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a filter name or route is not recognised
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown filter: {0}")]
pub struct ParseFilterError(String);

impl FromStr for FilterMode {
    type Err = ParseFilterError;

    /// Accepts `all`, `active`, `completed` (any case) and the hash routes
    /// `#/`, `#/active`, `#/completed`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().trim_start_matches('#').trim_start_matches('/');
        match name.to_ascii_lowercase().as_str() {
            "" | "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseFilterError(s.to_string())),
        }
    }
}

/// Category of the error shown in the notification slot
///
/// Failures collapse to the operation that failed, never to the underlying cause.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Initial load failed
    LoadFailed,
    /// New todo title was blank
    EmptyTitle,
    /// Create request failed
    AddFailed,
    /// Update request failed
    UpdateFailed,
    /// Delete request failed
    DeleteFailed,
}

impl ErrorKind {
    /// User-facing notification text
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::LoadFailed => "Unable to load todos",
            Self::EmptyTitle => "Title should not be empty",
            Self::AddFailed => "Unable to add a todo",
            Self::UpdateFailed => "Unable to update a todo",
            Self::DeleteFailed => "Unable to delete a todo",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// The error currently occupying the single notification slot
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ErrorNotice {
    /// What failed
    pub kind: ErrorKind,
    /// Identifies the auto-dismiss timer that owns this notice
    pub generation: u64,
}

/// Correlation id pairing a request intent with its outcome
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// State owned by the root controller
#[derive(Clone, Debug, Default)]
pub struct TodoState {
    /// Authoritative collection, in server order then creation order
    pub todos: Vec<Todo>,
    /// Current filter mode
    pub filter: FilterMode,
    /// Single-slot error notification
    pub error: Option<ErrorNotice>,
    /// Transient todo shown while a creation is in flight
    pub placeholder: Option<Todo>,
    /// Ids with a remote operation in flight
    pub processing: BTreeSet<TodoId>,
    /// Bumped whenever input focus should return to the new-todo field
    pub focus_requests: u64,
    /// Whether the initial load has been requested
    pub load_requested: bool,
    /// Last error generation handed out
    pub error_generation: u64,
}

impl TodoState {
    /// Creates an empty state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a state already holding `todos`
    #[must_use]
    pub fn with_todos(todos: Vec<Todo>) -> Self {
        Self {
            todos,
            ..Self::default()
        }
    }

    /// Returns a todo by id
    #[must_use]
    pub fn get(&self, id: TodoId) -> Option<&Todo> {
        self.todos.iter().find(|todo| todo.id == id)
    }

    /// Whether `id` has a remote operation in flight
    #[must_use]
    pub fn is_processing(&self, id: TodoId) -> bool {
        self.processing.contains(&id)
    }

    /// Kind of the error currently shown, if any
    #[must_use]
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.map(|notice| notice.kind)
    }
}

/// Actions representing user intents and remote outcomes
///
/// Intents come from the presentation layer. Outcomes are produced by
/// effects once a remote request settles and are fed back into the reducer.
#[derive(Clone, Debug, PartialEq)]
pub enum TodoAction {
    // ========== Intents ==========
    /// Fetch the full collection for the configured user
    Load,
    /// Create a todo from user input
    Add {
        /// Correlation id for the outcome
        request: RequestId,
        /// Raw input; trimmed before use
        title: String,
    },
    /// Persist an edited todo
    Update {
        /// Correlation id for the outcome
        request: RequestId,
        /// Full payload to send and, on success, store
        todo: Todo,
    },
    /// Delete one todo
    Delete {
        /// Todo to delete
        id: TodoId,
    },
    /// Delete every completed todo
    DeleteCompleted,
    /// Flip every todo towards all-completed or all-active
    ToggleAll,
    /// Change the displayed subset
    SetFilter(FilterMode),
    /// Hide the current error notification
    DismissError,

    // ========== Outcomes ==========
    /// Collection fetched
    Loaded {
        /// Server collection
        todos: Vec<Todo>,
    },
    /// Collection fetch failed
    LoadFailed {
        /// Transport or server error text
        reason: String,
    },
    /// Blank title refused before any request was made
    AddRejected {
        /// Correlation id of the `Add`
        request: RequestId,
    },
    /// Todo created
    Added {
        /// Correlation id of the `Add`
        request: RequestId,
        /// Server-returned todo with its real id
        todo: Todo,
    },
    /// Create request failed
    AddFailed {
        /// Correlation id of the `Add`
        request: RequestId,
        /// Trimmed title that was not saved
        title: String,
        /// Transport or server error text
        reason: String,
    },
    /// Update persisted
    Updated {
        /// Correlation id of the `Update`
        request: RequestId,
        /// Caller-supplied payload
        todo: Todo,
    },
    /// Update request failed
    UpdateFailed {
        /// Correlation id of the `Update`
        request: RequestId,
        /// Todo that was not updated
        id: TodoId,
        /// Transport or server error text
        reason: String,
    },
    /// One toggle-all update persisted
    Toggled {
        /// Caller-side payload with the flipped state
        todo: Todo,
    },
    /// One toggle-all update failed
    ToggleFailed {
        /// Todo that was not updated
        id: TodoId,
        /// Transport or server error text
        reason: String,
    },
    /// Single delete succeeded
    Deleted {
        /// Removed todo
        id: TodoId,
    },
    /// Single delete failed
    DeleteFailed {
        /// Todo that was not removed
        id: TodoId,
        /// Transport or server error text
        reason: String,
    },
    /// One bulk delete of a completed todo succeeded
    CompletedTodoDeleted {
        /// Removed todo
        id: TodoId,
    },
    /// One bulk delete of a completed todo failed
    CompletedTodoDeleteFailed {
        /// Todo that was not removed
        id: TodoId,
        /// Transport or server error text
        reason: String,
    },
    /// Every bulk delete settled
    ClearCompletedSettled,
    /// Auto-dismiss timer fired
    ErrorExpired {
        /// Generation of the notice the timer belongs to
        generation: u64,
    },
}

impl TodoAction {
    /// Correlation id of a request outcome, if this is one
    #[must_use]
    pub const fn request(&self) -> Option<RequestId> {
        match self {
            Self::AddRejected { request }
            | Self::Added { request, .. }
            | Self::AddFailed { request, .. }
            | Self::Updated { request, .. }
            | Self::UpdateFailed { request, .. } => Some(*request),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Test code

    use super::*;

    #[test]
    fn todo_uses_remote_field_names() {
        let todo = Todo::new(TodoId::new(3), UserId::new(11), "buy milk", true);
        let json = serde_json::to_value(&todo).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "id": 3, "userId": 11, "title": "buy milk", "completed": true })
        );
    }

    #[test]
    fn placeholder_has_zero_id() {
        let todo = Todo::placeholder(UserId::new(1), "x");
        assert!(todo.id.is_placeholder());
        assert!(!todo.completed);
    }

    #[test]
    fn filter_parses_names_and_routes() {
        assert_eq!("active".parse::<FilterMode>().unwrap(), FilterMode::Active);
        assert_eq!("Completed".parse::<FilterMode>().unwrap(), FilterMode::Completed);
        assert_eq!("#/".parse::<FilterMode>().unwrap(), FilterMode::All);
        assert_eq!("#/active".parse::<FilterMode>().unwrap(), FilterMode::Active);
        assert_eq!("all".parse::<FilterMode>().unwrap(), FilterMode::All);
        assert!("done".parse::<FilterMode>().is_err());

        for mode in FilterMode::ALL {
            assert_eq!(mode.route().parse::<FilterMode>().unwrap(), mode);
        }
    }

    #[test]
    fn error_messages() {
        assert_eq!(ErrorKind::LoadFailed.to_string(), "Unable to load todos");
        assert_eq!(ErrorKind::DeleteFailed.message(), "Unable to delete a todo");
    }

    #[test]
    fn request_correlation() {
        let action = TodoAction::AddRejected {
            request: RequestId(4),
        };
        assert_eq!(action.request(), Some(RequestId(4)));
        assert_eq!(TodoAction::Load.request(), None);
    }
}
