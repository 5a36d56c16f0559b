//! HTTP client for the remote todo collection

use super::{ApiError, ApiFuture, ApiResult, TodoApi};
use crate::config::Config;
use crate::types::{Todo, TodoId, UserId};
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Body of a create request
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewTodo<'a> {
    user_id: UserId,
    title: &'a str,
    completed: bool,
}

/// `reqwest`-backed [`TodoApi`]
///
/// Routes:
/// - `GET {base}/todos?userId={id}`
/// - `POST {base}/todos`
/// - `PATCH {base}/todos/{id}`
/// - `DELETE {base}/todos/{id}`
#[derive(Clone, Debug)]
pub struct HttpTodoApi {
    client: Client,
    base_url: String,
}

impl HttpTodoApi {
    /// Create a client for `base_url` with a per-request timeout
    ///
    /// # Errors
    ///
    /// Returns `ApiError::RequestFailed` if the HTTP client cannot be built
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// Returns `ApiError::RequestFailed` if the HTTP client cannot be built
    pub fn from_config(config: &Config) -> ApiResult<Self> {
        Self::new(config.api_base_url.clone(), config.request_timeout)
    }

    /// Base URL requests are issued against
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn todos_url(&self) -> String {
        format!("{}/todos", self.base_url)
    }

    fn todo_url(&self, id: TodoId) -> String {
        format!("{}/todos/{id}", self.base_url)
    }

    /// Map a response to its JSON body or an error
    async fn decode<T: DeserializeOwned>(response: Response, id: Option<TodoId>) -> ApiResult<T> {
        let response = Self::check_status(response, id).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::ResponseParseFailed(e.to_string()))
    }

    async fn check_status(response: Response, id: Option<TodoId>) -> ApiResult<Response> {
        match (response.status(), id) {
            (status, _) if status.is_success() => Ok(response),
            (StatusCode::NOT_FOUND, Some(id)) => Err(ApiError::NotFound(id)),
            (status, _) => {
                let body = response.text().await.unwrap_or_default();
                Err(ApiError::Status {
                    status: status.as_u16(),
                    message: body,
                })
            },
        }
    }
}

impl TodoApi for HttpTodoApi {
    fn list(&self, user_id: UserId) -> ApiFuture<'_, Vec<Todo>> {
        Box::pin(async move {
            tracing::debug!(%user_id, "GET todos");
            let response = self
                .client
                .get(self.todos_url())
                .query(&[("userId", user_id.get())])
                .send()
                .await
                .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

            Self::decode::<Vec<Todo>>(response, None).await
        })
    }

    fn create(&self, user_id: UserId, title: String) -> ApiFuture<'_, Todo> {
        Box::pin(async move {
            tracing::debug!(%user_id, "POST todo");
            let body = NewTodo {
                user_id,
                title: &title,
                completed: false,
            };
            let response = self
                .client
                .post(self.todos_url())
                .json(&body)
                .send()
                .await
                .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

            Self::decode::<Todo>(response, None).await
        })
    }

    fn update(&self, todo: Todo) -> ApiFuture<'_, Todo> {
        Box::pin(async move {
            tracing::debug!(id = %todo.id, "PATCH todo");
            let response = self
                .client
                .patch(self.todo_url(todo.id))
                .json(&todo)
                .send()
                .await
                .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

            Self::decode::<Todo>(response, Some(todo.id)).await
        })
    }

    fn delete(&self, id: TodoId) -> ApiFuture<'_, ()> {
        Box::pin(async move {
            tracing::debug!(%id, "DELETE todo");
            let response = self
                .client
                .delete(self.todo_url(id))
                .send()
                .await
                .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

            // The body (if any) carries nothing we use
            Self::check_status(response, Some(id)).await.map(drop)
        })
    }
}
