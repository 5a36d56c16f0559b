//! Remote todo collection API.
//!
//! The reducer only sees [`TodoApi`]; production wires in [`HttpTodoApi`],
//! tests and offline runs use [`InMemoryTodoApi`].

use crate::types::{Todo, TodoId, UserId};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

pub mod http;
pub mod memory;

pub use http::HttpTodoApi;
pub use memory::{ApiOperation, InMemoryTodoApi};

/// Errors returned by a [`TodoApi`] implementation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request never produced a response
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The server answered with a non-success status
    #[error("API error (status {status}): {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// The response body could not be decoded
    #[error("Response parsing failed: {0}")]
    ResponseParseFailed(String),

    /// The todo does not exist on the server
    #[error("Todo {0} not found")]
    NotFound(TodoId),

    /// Failure injected by a test double
    #[error("Injected failure: {0}")]
    Injected(String),
}

/// Result type for remote calls
pub type ApiResult<T> = Result<T, ApiError>;

/// Boxed future returned by [`TodoApi`] methods
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = ApiResult<T>> + Send + 'a>>;

/// CRUD contract of the remote todo collection
///
/// Methods return boxed futures so the API can live behind
/// `Arc<dyn TodoApi>` and be captured by effects.
pub trait TodoApi: Send + Sync {
    /// Fetch every todo owned by `user_id`
    fn list(&self, user_id: UserId) -> ApiFuture<'_, Vec<Todo>>;

    /// Create an incomplete todo and return it with its server-assigned id
    fn create(&self, user_id: UserId, title: String) -> ApiFuture<'_, Todo>;

    /// Replace a todo with `todo`, returning the server's copy
    fn update(&self, todo: Todo) -> ApiFuture<'_, Todo>;

    /// Delete a todo
    fn delete(&self, id: TodoId) -> ApiFuture<'_, ()>;
}
