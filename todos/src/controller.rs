//! Controller façade over the store.
//!
//! The presentation layer talks to [`TodoController`] only: it sends user
//! intents, reads [`TodoView`] snapshots and subscribes to the revision
//! counter to learn when to re-render.

use crate::api::{ApiError, HttpTodoApi, TodoApi};
use crate::config::Config;
use crate::reducer::{TodoEnvironment, TodoReducer};
use crate::types::{ErrorKind, FilterMode, RequestId, Todo, TodoAction, TodoId, TodoState};
use crate::view::TodoView;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tasklist_runtime::{EffectHandle, Store, StoreError};
use thiserror::Error;
use tokio::sync::watch;

/// Broadcast capacity sized for bulk operations settling at once
const ACTION_CAPACITY: usize = 256;

/// Outcomes always arrive; each remote call is bounded by the API client.
const OUTCOME_WAIT: Duration = Duration::MAX;

/// Store type driven by the controller
pub type TodoStore = Store<TodoState, TodoAction, TodoEnvironment, TodoReducer>;

/// Errors returned to callers of [`TodoController`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TodoError {
    /// The title was blank; nothing was sent
    #[error("Title should not be empty")]
    Rejected,

    /// The remote call failed; `title` is the text the caller should keep
    #[error("{kind}")]
    Failed {
        /// Operation that failed
        kind: ErrorKind,
        /// Unsaved title
        title: String,
    },

    /// No todo with this id is loaded
    #[error("Todo {0} not found")]
    NotFound(TodoId),

    /// The store refused the intent
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Entry point for a front-end
///
/// Cloning is cheap; clones drive the same store.
#[derive(Clone)]
pub struct TodoController {
    store: TodoStore,
    next_request: Arc<AtomicU64>,
}

impl TodoController {
    /// Creates a controller over `env`
    #[must_use]
    pub fn new(env: TodoEnvironment) -> Self {
        Self {
            store: Store::with_broadcast_capacity(
                TodoState::new(),
                TodoReducer::new(),
                env,
                ACTION_CAPACITY,
            ),
            next_request: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Creates a controller over `api` with settings from `config`
    #[must_use]
    pub fn with_api(api: Arc<dyn TodoApi>, config: &Config) -> Self {
        Self::new(TodoEnvironment::from_config(api, config))
    }

    /// Creates a controller talking to the HTTP API described by `config`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the HTTP client cannot be built
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let api = HttpTodoApi::from_config(config)?;
        Ok(Self::with_api(Arc::new(api), config))
    }

    fn next_request(&self) -> RequestId {
        RequestId(self.next_request.fetch_add(1, Ordering::Relaxed))
    }

    async fn send(&self, action: TodoAction) -> Result<EffectHandle, TodoError> {
        Ok(self.store.send(action).await?)
    }

    /// Loads the collection; only the first call does anything
    ///
    /// # Errors
    ///
    /// Returns `TodoError::Store` if the store is shutting down
    pub async fn start(&self) -> Result<EffectHandle, TodoError> {
        tracing::info!("Starting task list");
        self.send(TodoAction::Load).await
    }

    /// Creates a todo and waits for the server's copy
    ///
    /// # Errors
    ///
    /// - `TodoError::Rejected` if the title is blank
    /// - `TodoError::Failed` with the trimmed title if the request failed
    /// - `TodoError::Store` if the store is shutting down or the outcome was
    ///   skipped by a lagging wait; re-read the view in that case
    pub async fn add(&self, title: impl Into<String>) -> Result<Todo, TodoError> {
        let request = self.next_request();
        let outcome = self
            .store
            .send_and_wait_for(
                TodoAction::Add {
                    request,
                    title: title.into(),
                },
                |action| action.request() == Some(request),
                OUTCOME_WAIT,
            )
            .await?;

        match outcome {
            TodoAction::Added { todo, .. } => Ok(todo),
            TodoAction::AddFailed { title, .. } => Err(TodoError::Failed {
                kind: ErrorKind::AddFailed,
                title,
            }),
            _ => Err(TodoError::Rejected),
        }
    }

    /// Persists `todo` and waits for the outcome
    ///
    /// # Errors
    ///
    /// - `TodoError::Failed` if the request failed
    /// - `TodoError::Store` if the store is shutting down or the wait lagged
    pub async fn update(&self, todo: Todo) -> Result<Todo, TodoError> {
        let request = self.next_request();
        let title = todo.title.clone();
        let outcome = self
            .store
            .send_and_wait_for(
                TodoAction::Update { request, todo },
                |action| action.request() == Some(request),
                OUTCOME_WAIT,
            )
            .await?;

        match outcome {
            TodoAction::Updated { todo, .. } => Ok(todo),
            _ => Err(TodoError::Failed {
                kind: ErrorKind::UpdateFailed,
                title,
            }),
        }
    }

    async fn get(&self, id: TodoId) -> Result<Todo, TodoError> {
        self.store
            .state(|state| state.get(id).cloned())
            .await
            .ok_or(TodoError::NotFound(id))
    }

    /// Applies an edited title
    ///
    /// An unchanged title does nothing and a blank one deletes the todo;
    /// both return `Ok(None)`.
    ///
    /// # Errors
    ///
    /// - `TodoError::NotFound` if `id` is not loaded
    /// - `TodoError::Failed` if the update failed
    pub async fn rename(&self, id: TodoId, title: &str) -> Result<Option<Todo>, TodoError> {
        let current = self.get(id).await?;
        let title = title.trim();

        if title == current.title {
            return Ok(None);
        }
        if title.is_empty() {
            self.delete(id).await?.wait().await;
            return Ok(None);
        }
        self.update(current.with_title(title)).await.map(Some)
    }

    /// Flips the completed flag of one todo
    ///
    /// # Errors
    ///
    /// - `TodoError::NotFound` if `id` is not loaded
    /// - `TodoError::Failed` if the update failed
    pub async fn toggle(&self, id: TodoId) -> Result<Todo, TodoError> {
        let current = self.get(id).await?;
        self.update(current.with_completed(!current.completed)).await
    }

    /// Deletes one todo
    ///
    /// # Errors
    ///
    /// Returns `TodoError::Store` if the store is shutting down
    pub async fn delete(&self, id: TodoId) -> Result<EffectHandle, TodoError> {
        self.send(TodoAction::Delete { id }).await
    }

    /// Deletes every completed todo
    ///
    /// # Errors
    ///
    /// Returns `TodoError::Store` if the store is shutting down
    pub async fn delete_completed(&self) -> Result<EffectHandle, TodoError> {
        self.send(TodoAction::DeleteCompleted).await
    }

    /// Completes every todo, or un-completes all when all are completed
    ///
    /// # Errors
    ///
    /// Returns `TodoError::Store` if the store is shutting down
    pub async fn toggle_all(&self) -> Result<EffectHandle, TodoError> {
        self.send(TodoAction::ToggleAll).await
    }

    /// Changes the displayed subset
    ///
    /// # Errors
    ///
    /// Returns `TodoError::Store` if the store is shutting down
    pub async fn set_filter(&self, filter: FilterMode) -> Result<(), TodoError> {
        self.send(TodoAction::SetFilter(filter)).await.map(drop)
    }

    /// Hides the current error notification
    ///
    /// # Errors
    ///
    /// Returns `TodoError::Store` if the store is shutting down
    pub async fn dismiss_error(&self) -> Result<(), TodoError> {
        self.send(TodoAction::DismissError).await.map(drop)
    }

    /// Current snapshot for rendering
    pub async fn view(&self) -> TodoView {
        self.store.state(TodoView::from_state).await
    }

    /// Full collection, ignoring the filter
    pub async fn todos(&self) -> Vec<Todo> {
        self.store.state(|state| state.todos.clone()).await
    }

    /// Revision counter, bumped after every state change
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.store.subscribe_changes()
    }

    /// Refuses new intents and waits for in-flight requests
    ///
    /// Requests already running still settle into state and resolve their
    /// callers.
    ///
    /// # Errors
    ///
    /// Returns `TodoError::Store` if requests are still running at `timeout`
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), TodoError> {
        Ok(self.store.shutdown(timeout).await?)
    }
}

impl std::fmt::Debug for TodoController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoController")
            .field("revision", &self.store.revision())
            .finish_non_exhaustive()
    }
}
