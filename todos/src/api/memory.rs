//! In-memory todo collection for tests and offline runs.

use super::{ApiError, ApiFuture, ApiResult, TodoApi};
use crate::types::{Todo, TodoId, UserId};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Remote operation, used to target injected failures and count calls
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ApiOperation {
    /// `list`
    List,
    /// `create`
    Create,
    /// `update`
    Update,
    /// `delete`
    Delete,
}

#[derive(Debug, Default)]
struct Inner {
    todos: Vec<Todo>,
    next_id: u64,
    failing: HashSet<ApiOperation>,
    failing_ids: HashSet<(ApiOperation, TodoId)>,
    calls: HashMap<ApiOperation, usize>,
}

impl Inner {
    /// Records the call and returns the injected failure, if any
    fn begin(&mut self, operation: ApiOperation, id: Option<TodoId>) -> ApiResult<()> {
        *self.calls.entry(operation).or_default() += 1;

        let targeted = id.is_some_and(|id| self.failing_ids.contains(&(operation, id)));
        if targeted || self.failing.contains(&operation) {
            let target = id.map_or_else(String::new, |id| format!(" todo {id}"));
            return Err(ApiError::Injected(format!("{operation:?}{target}")));
        }
        Ok(())
    }

    fn list(&mut self, user_id: UserId) -> ApiResult<Vec<Todo>> {
        self.begin(ApiOperation::List, None)?;
        Ok(self
            .todos
            .iter()
            .filter(|todo| todo.user_id == user_id)
            .cloned()
            .collect())
    }

    fn create(&mut self, user_id: UserId, title: String) -> ApiResult<Todo> {
        self.begin(ApiOperation::Create, None)?;
        let todo = Todo::new(TodoId::new(self.next_id), user_id, title, false);
        self.next_id += 1;
        self.todos.push(todo.clone());
        Ok(todo)
    }

    fn update(&mut self, todo: Todo) -> ApiResult<Todo> {
        self.begin(ApiOperation::Update, Some(todo.id))?;
        let stored = self
            .todos
            .iter_mut()
            .find(|stored| stored.id == todo.id)
            .ok_or(ApiError::NotFound(todo.id))?;
        *stored = todo.clone();
        Ok(todo)
    }

    fn delete(&mut self, id: TodoId) -> ApiResult<()> {
        self.begin(ApiOperation::Delete, Some(id))?;
        let before = self.todos.len();
        self.todos.retain(|todo| todo.id != id);
        if self.todos.len() == before {
            return Err(ApiError::NotFound(id));
        }
        Ok(())
    }
}

/// [`TodoApi`] backed by a `Vec`, with sequential ids and failure injection
///
/// Clones share the same collection, so a test can keep a handle for
/// assertions after giving one to the controller.
///
/// # Example
///
/// ```
/// use tasklist::api::{ApiOperation, InMemoryTodoApi};
/// use tasklist::types::TodoId;
///
/// let api = InMemoryTodoApi::new();
/// api.fail_for(ApiOperation::Delete, TodoId::new(3));
/// assert!(api.todos().is_empty());
/// ```
#[derive(Clone, Debug)]
pub struct InMemoryTodoApi {
    inner: Arc<Mutex<Inner>>,
    latency: Duration,
}

impl InMemoryTodoApi {
    /// Create an empty collection
    #[must_use]
    pub fn new() -> Self {
        Self::with_todos(Vec::new())
    }

    /// Create a collection seeded with `todos`
    ///
    /// New ids continue after the largest seeded id.
    #[must_use]
    pub fn with_todos(todos: Vec<Todo>) -> Self {
        let next_id = todos.iter().map(|t| t.id.get()).max().unwrap_or(0) + 1;
        Self {
            inner: Arc::new(Mutex::new(Inner {
                todos,
                next_id,
                ..Inner::default()
            })),
            latency: Duration::ZERO,
        }
    }

    /// Delay every call by `latency`
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every call of `operation` fail
    pub fn fail(&self, operation: ApiOperation) {
        self.lock().failing.insert(operation);
    }

    /// Make `operation` fail for one todo only
    pub fn fail_for(&self, operation: ApiOperation, id: TodoId) {
        self.lock().failing_ids.insert((operation, id));
    }

    /// Remove every injected failure
    pub fn clear_failures(&self) {
        let mut inner = self.lock();
        inner.failing.clear();
        inner.failing_ids.clear();
    }

    /// Number of calls made to `operation`, including failed ones
    #[must_use]
    pub fn calls(&self, operation: ApiOperation) -> usize {
        self.lock().calls.get(&operation).copied().unwrap_or(0)
    }

    /// Snapshot of the stored collection
    #[must_use]
    pub fn todos(&self) -> Vec<Todo> {
        self.lock().todos.clone()
    }

    async fn pause(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

impl Default for InMemoryTodoApi {
    fn default() -> Self {
        Self::new()
    }
}

impl TodoApi for InMemoryTodoApi {
    fn list(&self, user_id: UserId) -> ApiFuture<'_, Vec<Todo>> {
        Box::pin(async move {
            self.pause().await;
            self.lock().list(user_id)
        })
    }

    fn create(&self, user_id: UserId, title: String) -> ApiFuture<'_, Todo> {
        Box::pin(async move {
            self.pause().await;
            self.lock().create(user_id, title)
        })
    }

    fn update(&self, todo: Todo) -> ApiFuture<'_, Todo> {
        Box::pin(async move {
            self.pause().await;
            self.lock().update(todo)
        })
    }

    fn delete(&self, id: TodoId) -> ApiFuture<'_, ()> {
        Box::pin(async move {
            self.pause().await;
            self.lock().delete(id)
        })
    }
}
