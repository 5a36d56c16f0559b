//! Reducer logic for the task list.
//!
//! Intents mutate state optimistically where the UI needs it (placeholder,
//! processing flags) and return effects that call the remote API. Each effect
//! resolves to an outcome action that settles the state.

use crate::api::TodoApi;
use crate::config::{Config, DEFAULT_ERROR_TIMEOUT};
use crate::filter::all_completed;
use crate::types::{
    ErrorKind, ErrorNotice, RequestId, Todo, TodoAction, TodoId, TodoState, UserId,
};
use futures::stream::{self, FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tasklist_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};

/// Environment dependencies for the task list reducer
#[derive(Clone)]
pub struct TodoEnvironment {
    /// Remote collection
    pub api: Arc<dyn TodoApi>,
    /// User whose todos are managed
    pub user_id: UserId,
    /// How long an error notification stays visible
    pub error_timeout: Duration,
}

impl TodoEnvironment {
    /// Creates a new `TodoEnvironment` with the default error timeout
    #[must_use]
    pub fn new(api: Arc<dyn TodoApi>, user_id: UserId) -> Self {
        Self {
            api,
            user_id,
            error_timeout: DEFAULT_ERROR_TIMEOUT,
        }
    }

    /// Creates a `TodoEnvironment` from configuration
    #[must_use]
    pub fn from_config(api: Arc<dyn TodoApi>, config: &Config) -> Self {
        Self::new(api, config.user_id).with_error_timeout(config.error_timeout)
    }

    /// Overrides the error timeout
    #[must_use]
    pub const fn with_error_timeout(mut self, error_timeout: Duration) -> Self {
        self.error_timeout = error_timeout;
        self
    }
}

impl std::fmt::Debug for TodoEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoEnvironment")
            .field("user_id", &self.user_id)
            .field("error_timeout", &self.error_timeout)
            .finish_non_exhaustive()
    }
}

/// Reducer for the task list
#[derive(Clone, Debug, Default)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Puts `kind` in the error slot
    ///
    /// A different kind (or an empty slot) starts a new dismiss timer. The
    /// same kind keeps the timer that is already running.
    fn set_error(
        state: &mut TodoState,
        kind: ErrorKind,
        env: &TodoEnvironment,
    ) -> Effect<TodoAction> {
        if state.error_kind() == Some(kind) {
            return Effect::None;
        }

        state.error_generation += 1;
        let generation = state.error_generation;
        state.error = Some(ErrorNotice { kind, generation });

        Effect::Delay {
            duration: env.error_timeout,
            action: Box::new(TodoAction::ErrorExpired { generation }),
        }
    }

    fn replace(state: &mut TodoState, todo: Todo) {
        if let Some(existing) = state.todos.iter_mut().find(|t| t.id == todo.id) {
            *existing = todo;
        }
    }

    fn remove(state: &mut TodoState, id: TodoId) {
        state.todos.retain(|todo| todo.id != id);
    }

    fn load(env: &TodoEnvironment) -> Effect<TodoAction> {
        let api = Arc::clone(&env.api);
        let user_id = env.user_id;
        Effect::Future(Box::pin(async move {
            Some(match api.list(user_id).await {
                Ok(todos) => TodoAction::Loaded { todos },
                Err(error) => TodoAction::LoadFailed {
                    reason: error.to_string(),
                },
            })
        }))
    }

    fn create(
        env: &TodoEnvironment,
        request: RequestId,
        title: String,
    ) -> Effect<TodoAction> {
        let api = Arc::clone(&env.api);
        let user_id = env.user_id;
        Effect::Future(Box::pin(async move {
            Some(match api.create(user_id, title.clone()).await {
                Ok(todo) => TodoAction::Added { request, todo },
                Err(error) => TodoAction::AddFailed {
                    request,
                    title,
                    reason: error.to_string(),
                },
            })
        }))
    }

    fn delete(env: &TodoEnvironment, id: TodoId) -> Effect<TodoAction> {
        let api = Arc::clone(&env.api);
        Effect::Future(Box::pin(async move {
            Some(match api.delete(id).await {
                Ok(()) => TodoAction::Deleted { id },
                Err(error) => TodoAction::DeleteFailed {
                    id,
                    reason: error.to_string(),
                },
            })
        }))
    }

    /// Deletes `ids` concurrently, then reports that every delete settled
    fn delete_all(env: &TodoEnvironment, ids: Vec<TodoId>) -> Effect<TodoAction> {
        let deletes: FuturesUnordered<_> = ids
            .into_iter()
            .map(|id| {
                let api = Arc::clone(&env.api);
                async move {
                    match api.delete(id).await {
                        Ok(()) => TodoAction::CompletedTodoDeleted { id },
                        Err(error) => TodoAction::CompletedTodoDeleteFailed {
                            id,
                            reason: error.to_string(),
                        },
                    }
                }
            })
            .collect();

        Effect::Stream(Box::pin(
            deletes.chain(stream::once(async { TodoAction::ClearCompletedSettled })),
        ))
    }

    fn update(
        env: &TodoEnvironment,
        request: RequestId,
        todo: Todo,
    ) -> Effect<TodoAction> {
        let api = Arc::clone(&env.api);
        Effect::Future(Box::pin(async move {
            let id = todo.id;
            Some(match api.update(todo.clone()).await {
                // The caller's payload is stored, not the server echo
                Ok(_) => TodoAction::Updated { request, todo },
                Err(error) => TodoAction::UpdateFailed {
                    request,
                    id,
                    reason: error.to_string(),
                },
            })
        }))
    }

    fn toggle(env: &TodoEnvironment, todo: Todo) -> Effect<TodoAction> {
        let api = Arc::clone(&env.api);
        Effect::Future(Box::pin(async move {
            let id = todo.id;
            Some(match api.update(todo.clone()).await {
                Ok(_) => TodoAction::Toggled { todo },
                Err(error) => TodoAction::ToggleFailed {
                    id,
                    reason: error.to_string(),
                },
            })
        }))
    }
}

impl Reducer for TodoReducer {
    type State = TodoState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    #[allow(clippy::too_many_lines)] // One arm per action
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Intents ==========
            TodoAction::Load => {
                if state.load_requested {
                    tracing::debug!("Todos already requested");
                    return smallvec![Effect::None];
                }
                tracing::debug!(user_id = %env.user_id, "Loading todos");
                state.load_requested = true;
                smallvec![Self::load(env)]
            },

            TodoAction::Add { request, title } => {
                let title = title.trim();
                if title.is_empty() {
                    tracing::debug!(%request, "Rejected blank title");
                    return smallvec![
                        Self::set_error(state, ErrorKind::EmptyTitle, env),
                        Effect::Future(Box::pin(async move {
                            Some(TodoAction::AddRejected { request })
                        })),
                    ];
                }

                tracing::debug!(%request, "Adding todo");
                state.placeholder = Some(Todo::placeholder(env.user_id, title));
                smallvec![Self::create(env, request, title.to_string())]
            },

            TodoAction::Delete { id } => {
                tracing::debug!(%id, "Deleting todo");
                state.processing.clear();
                state.processing.insert(id);
                smallvec![Self::delete(env, id)]
            },

            TodoAction::DeleteCompleted => {
                let ids: Vec<TodoId> = state
                    .todos
                    .iter()
                    .filter(|todo| todo.completed)
                    .map(|todo| todo.id)
                    .collect();
                if ids.is_empty() {
                    return SmallVec::new();
                }

                tracing::debug!(count = ids.len(), "Deleting completed todos");
                state.processing.extend(ids.iter().copied());
                smallvec![Self::delete_all(env, ids)]
            },

            TodoAction::Update { request, todo } => {
                tracing::debug!(%request, id = %todo.id, "Updating todo");
                state.processing.insert(todo.id);
                smallvec![Self::update(env, request, todo)]
            },

            TodoAction::ToggleAll => {
                let all = all_completed(&state.todos);
                let selected: Vec<Todo> = state
                    .todos
                    .iter()
                    .filter(|todo| todo.completed == all)
                    .map(|todo| todo.with_completed(!all))
                    .collect();
                if selected.is_empty() {
                    return SmallVec::new();
                }

                tracing::debug!(count = selected.len(), completed = !all, "Toggling all todos");
                state.processing.extend(selected.iter().map(|todo| todo.id));
                let toggles = selected
                    .into_iter()
                    .map(|todo| Self::toggle(env, todo))
                    .collect();
                smallvec![Effect::merge(toggles)]
            },

            TodoAction::SetFilter(filter) => {
                state.filter = filter;
                SmallVec::new()
            },

            TodoAction::DismissError => {
                state.error = None;
                SmallVec::new()
            },

            // ========== Outcomes ==========
            TodoAction::Loaded { todos } => {
                tracing::info!(count = todos.len(), "Todos loaded");
                state.todos = todos
                    .into_iter()
                    .filter(|todo| !todo.id.is_placeholder())
                    .collect();
                SmallVec::new()
            },

            TodoAction::LoadFailed { reason } => {
                tracing::warn!(%reason, "Unable to load todos");
                smallvec![Self::set_error(state, ErrorKind::LoadFailed, env)]
            },

            TodoAction::AddRejected { .. } => SmallVec::new(),

            TodoAction::Added { request, todo } => {
                tracing::debug!(%request, id = %todo.id, "Todo added");
                state.placeholder = None;
                state.todos.push(todo);
                state.focus_requests += 1;
                SmallVec::new()
            },

            TodoAction::AddFailed { request, reason, .. } => {
                tracing::warn!(%request, %reason, "Unable to add a todo");
                state.placeholder = None;
                state.focus_requests += 1;
                smallvec![Self::set_error(state, ErrorKind::AddFailed, env)]
            },

            TodoAction::Updated { request, todo } => {
                tracing::debug!(%request, id = %todo.id, "Todo updated");
                Self::replace(state, todo);
                state.processing.clear();
                SmallVec::new()
            },

            TodoAction::UpdateFailed {
                request,
                id,
                reason,
            } => {
                tracing::warn!(%request, %id, %reason, "Unable to update a todo");
                state.processing.clear();
                smallvec![Self::set_error(state, ErrorKind::UpdateFailed, env)]
            },

            TodoAction::Toggled { todo } => {
                let target = todo.completed;
                Self::replace(state, todo);
                for todo in state.todos.iter_mut().filter(|t| t.completed != target) {
                    todo.completed = target;
                }
                state.processing.clear();
                SmallVec::new()
            },

            TodoAction::ToggleFailed { id, reason } => {
                tracing::warn!(%id, %reason, "Unable to toggle a todo");
                state.processing.clear();
                smallvec![Self::set_error(state, ErrorKind::UpdateFailed, env)]
            },

            TodoAction::Deleted { id } => {
                tracing::debug!(%id, "Todo deleted");
                Self::remove(state, id);
                state.processing.clear();
                state.focus_requests += 1;
                SmallVec::new()
            },

            TodoAction::DeleteFailed { id, reason } => {
                // The processing flag stays set
                tracing::warn!(%id, %reason, "Unable to delete a todo");
                state.focus_requests += 1;
                smallvec![Self::set_error(state, ErrorKind::DeleteFailed, env)]
            },

            TodoAction::CompletedTodoDeleted { id } => {
                Self::remove(state, id);
                SmallVec::new()
            },

            TodoAction::CompletedTodoDeleteFailed { id, reason } => {
                tracing::warn!(%id, %reason, "Unable to delete a completed todo");
                smallvec![Self::set_error(state, ErrorKind::DeleteFailed, env)]
            },

            TodoAction::ClearCompletedSettled => {
                state.processing.clear();
                state.focus_requests += 1;
                SmallVec::new()
            },

            TodoAction::ErrorExpired { generation } => {
                if state.error.is_some_and(|notice| notice.generation == generation) {
                    state.error = None;
                }
                SmallVec::new()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Test code

    use super::*;
    use crate::api::{ApiOperation, InMemoryTodoApi};
    use crate::types::FilterMode;
    use tasklist_testing::{ReducerTest, assertions, drain};

    const USER: UserId = UserId::new(1);

    fn todo(id: u64, title: &str, completed: bool) -> Todo {
        Todo::new(TodoId::new(id), USER, title, completed)
    }

    fn env(api: &InMemoryTodoApi) -> TodoEnvironment {
        TodoEnvironment::new(Arc::new(api.clone()), USER)
    }

    fn test_env() -> TodoEnvironment {
        env(&InMemoryTodoApi::new())
    }

    /// Reduce `action`, then reduce every action its effects produce
    async fn settle(state: &mut TodoState, action: TodoAction, env: &TodoEnvironment) {
        let mut queue = vec![action];
        while !queue.is_empty() {
            let mut next = Vec::new();
            for action in queue {
                let effects = TodoReducer.reduce(state, action, env);
                next.extend(drain(effects).await.actions);
            }
            queue = next;
        }
    }

    #[test]
    fn set_filter_has_no_effects() {
        ReducerTest::new(TodoReducer::new())
            .with_env(test_env())
            .given_state(TodoState::new())
            .when_action(TodoAction::SetFilter(FilterMode::Completed))
            .then_state(|state| assert_eq!(state.filter, FilterMode::Completed))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn add_publishes_trimmed_placeholder() {
        ReducerTest::new(TodoReducer::new())
            .with_env(test_env())
            .given_state(TodoState::new())
            .when_action(TodoAction::Add {
                request: RequestId(1),
                title: "  buy milk ".to_string(),
            })
            .then_state(|state| {
                let placeholder = state.placeholder.clone().unwrap();
                assert!(placeholder.id.is_placeholder());
                assert_eq!(placeholder.title, "buy milk");
                assert_eq!(placeholder.user_id, USER);
                assert!(state.todos.is_empty());
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[tokio::test]
    async fn blank_title_is_rejected_without_request() {
        let api = InMemoryTodoApi::new();
        let env = env(&api);
        let mut state = TodoState::new();

        let effects = TodoReducer.reduce(
            &mut state,
            TodoAction::Add {
                request: RequestId(2),
                title: "   ".to_string(),
            },
            &env,
        );
        assertions::assert_has_delay_effect(&effects);
        let drained = drain(effects).await;

        assert_eq!(drained.actions, vec![TodoAction::AddRejected {
            request: RequestId(2)
        }]);
        assert!(state.placeholder.is_none());
        assert_eq!(state.error_kind(), Some(ErrorKind::EmptyTitle));
        assert_eq!(api.calls(ApiOperation::Create), 0);
    }

    #[tokio::test]
    async fn add_success_appends_server_todo() {
        let api = InMemoryTodoApi::with_todos(vec![todo(1, "a", false)]);
        let env = env(&api);
        let mut state = TodoState::with_todos(vec![todo(1, "a", false)]);

        settle(
            &mut state,
            TodoAction::Add {
                request: RequestId(1),
                title: "b".to_string(),
            },
            &env,
        )
        .await;

        assert_eq!(state.todos, vec![todo(1, "a", false), todo(2, "b", false)]);
        assert!(state.placeholder.is_none());
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn add_failure_keeps_title_in_outcome() {
        let api = InMemoryTodoApi::new();
        api.fail(ApiOperation::Create);
        let env = env(&api);
        let mut state = TodoState::new();

        let effects = TodoReducer.reduce(
            &mut state,
            TodoAction::Add {
                request: RequestId(3),
                title: " buy milk".to_string(),
            },
            &env,
        );
        let outcome = drain(effects).await.actions.remove(0);
        assert!(matches!(
            &outcome,
            TodoAction::AddFailed { title, .. } if title == "buy milk"
        ));

        TodoReducer.reduce(&mut state, outcome, &env);
        assert!(state.placeholder.is_none());
        assert!(state.todos.is_empty());
        assert_eq!(state.error_kind(), Some(ErrorKind::AddFailed));
    }

    #[test]
    fn delete_replaces_processing_set() {
        let mut state = TodoState::with_todos(vec![todo(1, "a", false), todo(2, "b", false)]);
        state.processing.insert(TodoId::new(1));

        ReducerTest::new(TodoReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(TodoAction::Delete { id: TodoId::new(2) })
            .then_state(|state| {
                assert_eq!(state.processing.iter().copied().collect::<Vec<_>>(), vec![
                    TodoId::new(2)
                ]);
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[tokio::test]
    async fn delete_success_removes_only_that_todo() {
        let seed = vec![todo(1, "a", false), todo(2, "b", true), todo(3, "c", false)];
        let env = env(&InMemoryTodoApi::with_todos(seed.clone()));
        let mut state = TodoState::with_todos(seed);

        settle(&mut state, TodoAction::Delete { id: TodoId::new(2) }, &env).await;

        assert_eq!(state.todos, vec![todo(1, "a", false), todo(3, "c", false)]);
        assert!(state.processing.is_empty());
        assert_eq!(state.focus_requests, 1);
    }

    #[tokio::test]
    async fn delete_failure_keeps_todo_and_processing_flag() {
        let seed = vec![todo(1, "a", false), todo(2, "b", false)];
        let api = InMemoryTodoApi::with_todos(seed.clone());
        api.fail(ApiOperation::Delete);
        let env = env(&api);
        let mut state = TodoState::with_todos(seed.clone());

        settle(&mut state, TodoAction::Delete { id: TodoId::new(1) }, &env).await;

        assert_eq!(state.todos, seed);
        assert!(state.is_processing(TodoId::new(1)));
        assert_eq!(state.error_kind(), Some(ErrorKind::DeleteFailed));
        assert_eq!(state.focus_requests, 1);
    }

    #[tokio::test]
    async fn delete_completed_tolerates_partial_failure() {
        let seed = vec![
            todo(1, "a", true),
            todo(2, "b", false),
            todo(3, "c", true),
            todo(4, "d", false),
            todo(5, "e", true),
        ];
        let api = InMemoryTodoApi::with_todos(seed.clone());
        api.fail_for(ApiOperation::Delete, TodoId::new(3));
        let env = env(&api);
        let mut state = TodoState::with_todos(seed);

        let effects = TodoReducer.reduce(&mut state, TodoAction::DeleteCompleted, &env);
        assertions::assert_has_stream_effect(&effects);
        assert_eq!(state.processing.len(), 3);

        let outcomes = drain(effects).await.actions;
        assert_eq!(outcomes.len(), 4);
        assert_eq!(outcomes.last(), Some(&TodoAction::ClearCompletedSettled));
        for outcome in outcomes {
            TodoReducer.reduce(&mut state, outcome, &env);
        }

        assert_eq!(state.todos, vec![
            todo(2, "b", false),
            todo(3, "c", true),
            todo(4, "d", false)
        ]);
        assert_eq!(state.error_kind(), Some(ErrorKind::DeleteFailed));
        assert!(state.processing.is_empty());
        assert_eq!(state.focus_requests, 1);
    }

    #[test]
    fn delete_completed_without_completed_todos_does_nothing() {
        ReducerTest::new(TodoReducer::new())
            .with_env(test_env())
            .given_state(TodoState::with_todos(vec![todo(1, "a", false)]))
            .when_action(TodoAction::DeleteCompleted)
            .then_state(|state| assert!(state.processing.is_empty()))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[tokio::test]
    async fn update_stores_caller_payload_and_clears_all_processing() {
        let seed = vec![todo(1, "a", false), todo(2, "b", false)];
        let env = env(&InMemoryTodoApi::with_todos(seed.clone()));
        let mut state = TodoState::with_todos(seed);
        state.processing.insert(TodoId::new(2));

        settle(
            &mut state,
            TodoAction::Update {
                request: RequestId(1),
                todo: todo(1, "renamed", true),
            },
            &env,
        )
        .await;

        assert_eq!(state.todos[0], todo(1, "renamed", true));
        assert!(state.processing.is_empty());
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn update_failure_sets_error_and_clears_processing() {
        let seed = vec![todo(1, "a", false)];
        let api = InMemoryTodoApi::with_todos(seed.clone());
        api.fail(ApiOperation::Update);
        let env = env(&api);
        let mut state = TodoState::with_todos(seed.clone());

        settle(
            &mut state,
            TodoAction::Update {
                request: RequestId(1),
                todo: todo(1, "a", true),
            },
            &env,
        )
        .await;

        assert_eq!(state.todos, seed);
        assert!(state.processing.is_empty());
        assert_eq!(state.error_kind(), Some(ErrorKind::UpdateFailed));
    }

    #[tokio::test]
    async fn toggle_all_when_all_completed_clears_every_todo() {
        let seed = vec![todo(1, "a", true), todo(2, "b", true)];
        let env = env(&InMemoryTodoApi::with_todos(seed.clone()));
        let mut state = TodoState::with_todos(seed);

        settle(&mut state, TodoAction::ToggleAll, &env).await;

        assert!(state.todos.iter().all(|t| !t.completed));
        assert!(state.processing.is_empty());
    }

    #[tokio::test]
    async fn toggle_all_on_mixed_completes_only_the_active() {
        let seed = vec![todo(1, "a", true), todo(2, "b", false), todo(3, "c", false)];
        let api = InMemoryTodoApi::with_todos(seed.clone());
        let env = env(&api);
        let mut state = TodoState::with_todos(seed);

        let effects = TodoReducer.reduce(&mut state, TodoAction::ToggleAll, &env);
        assert_eq!(
            state.processing.iter().copied().collect::<Vec<_>>(),
            vec![TodoId::new(2), TodoId::new(3)]
        );
        for outcome in drain(effects).await.actions {
            TodoReducer.reduce(&mut state, outcome, &env);
        }

        assert!(state.todos.iter().all(|t| t.completed));
        assert_eq!(api.calls(ApiOperation::Update), 2);
    }

    #[tokio::test]
    async fn toggle_all_success_normalises_failed_siblings() {
        let seed = vec![todo(1, "a", false), todo(2, "b", false)];
        let api = InMemoryTodoApi::with_todos(seed.clone());
        api.fail_for(ApiOperation::Update, TodoId::new(2));
        let env = env(&api);
        let mut state = TodoState::with_todos(seed);

        let effects = TodoReducer.reduce(&mut state, TodoAction::ToggleAll, &env);
        let mut outcomes = drain(effects).await.actions;
        // Apply the failure first so the success's bulk pass runs last
        outcomes.sort_by_key(|a| matches!(a, TodoAction::Toggled { .. }));
        for outcome in outcomes {
            TodoReducer.reduce(&mut state, outcome, &env);
        }

        assert!(state.todos.iter().all(|t| t.completed));
        assert_eq!(state.error_kind(), Some(ErrorKind::UpdateFailed));
    }

    #[tokio::test]
    async fn load_failure_sets_error_and_keeps_collection_empty() {
        let api = InMemoryTodoApi::with_todos(vec![todo(1, "a", false)]);
        api.fail(ApiOperation::List);
        let env = env(&api);
        let mut state = TodoState::new();

        settle(&mut state, TodoAction::Load, &env).await;

        assert!(state.load_requested);
        assert!(state.todos.is_empty());
        assert_eq!(state.error_kind(), Some(ErrorKind::LoadFailed));
    }

    #[test]
    fn second_load_is_ignored() {
        ReducerTest::new(TodoReducer::new())
            .with_env(test_env())
            .given_state(TodoState {
                load_requested: true,
                ..TodoState::new()
            })
            .when_action(TodoAction::Load)
            .then_state(|state| assert!(state.todos.is_empty()))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[tokio::test]
    async fn overlapping_adds_each_append_their_own_todo() {
        let api = InMemoryTodoApi::new();
        let env = env(&api);
        let mut state = TodoState::new();

        let first = TodoReducer.reduce(
            &mut state,
            TodoAction::Add {
                request: RequestId(1),
                title: "a".to_string(),
            },
            &env,
        );
        let second = TodoReducer.reduce(
            &mut state,
            TodoAction::Add {
                request: RequestId(2),
                title: "b".to_string(),
            },
            &env,
        );
        assert_eq!(state.placeholder.as_ref().map(|t| t.title.as_str()), Some("b"));

        // Settle out of order: the later request answers first
        for effects in [second, first] {
            for action in drain(effects).await.actions {
                TodoReducer.reduce(&mut state, action, &env);
            }
        }

        let mut titles: Vec<_> = state.todos.iter().map(|t| t.title.clone()).collect();
        titles.sort();
        assert_eq!(titles, vec!["a", "b"]);
        assert!(state.placeholder.is_none());
        assert_eq!(state.focus_requests, 2);
    }

    #[test]
    fn same_error_kind_keeps_running_timer() {
        let mut state = TodoState::new();
        let env = test_env();

        let first = TodoReducer.reduce(
            &mut state,
            TodoAction::DeleteFailed {
                id: TodoId::new(1),
                reason: "x".to_string(),
            },
            &env,
        );
        assertions::assert_has_delay_effect(&first);
        let generation = state.error.unwrap().generation;

        ReducerTest::new(TodoReducer::new())
            .with_env(env)
            .given_state(state)
            .when_action(TodoAction::CompletedTodoDeleteFailed {
                id: TodoId::new(2),
                reason: "y".to_string(),
            })
            .then_state(move |state| {
                assert_eq!(state.error.unwrap().generation, generation);
            })
            .then_effects(assertions::assert_no_delay_effect)
            .run();
    }

    #[test]
    fn stale_expiry_does_not_clear_newer_error() {
        let mut state = TodoState::new();
        let env = test_env();
        let reason = || "x".to_string();

        TodoReducer.reduce(&mut state, TodoAction::LoadFailed { reason: reason() }, &env);
        let stale = state.error.unwrap().generation;
        let effects = TodoReducer.reduce(
            &mut state,
            TodoAction::UpdateFailed {
                request: RequestId(1),
                id: TodoId::new(1),
                reason: reason(),
            },
            &env,
        );
        assertions::assert_has_delay_effect(&effects);

        TodoReducer.reduce(&mut state, TodoAction::ErrorExpired { generation: stale }, &env);
        assert_eq!(state.error_kind(), Some(ErrorKind::UpdateFailed));

        let current = state.error.unwrap().generation;
        TodoReducer.reduce(&mut state, TodoAction::ErrorExpired { generation: current }, &env);
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn error_timer_uses_configured_timeout() {
        let env = test_env().with_error_timeout(Duration::from_millis(250));
        let mut state = TodoState::new();

        let effects = TodoReducer.reduce(
            &mut state,
            TodoAction::LoadFailed {
                reason: "x".to_string(),
            },
            &env,
        );
        let drained = drain(effects).await;

        assert_eq!(drained.delayed, vec![(
            Duration::from_millis(250),
            TodoAction::ErrorExpired { generation: 1 }
        )]);
    }

    #[test]
    fn dismiss_error_clears_slot() {
        let mut state = TodoState::new();
        state.error = Some(ErrorNotice {
            kind: ErrorKind::AddFailed,
            generation: 1,
        });

        ReducerTest::new(TodoReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(TodoAction::DismissError)
            .then_state(|state| assert!(state.error.is_none()))
            .run();
    }
}
