//! Single-user task list over a remote CRUD API.
//!
//! The list is driven by a reducer: user intents and remote outcomes are
//! actions, remote calls are effects, and a store runtime feeds every outcome
//! back into the reducer. It provides:
//!
//! - Filtered views (all / active / completed) and counters
//! - Optimistic creation placeholder and per-todo processing flags
//! - A single auto-dismissing error notification
//! - Bulk toggle and bulk delete of completed todos
//! - An HTTP client and an in-memory double for the remote collection
//!
//! # Quick Start
//!
//! ```no_run
//! use tasklist::{Config, TodoController};
//! use tasklist::types::UserId;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::new(UserId::new(42));
//! let controller = TodoController::from_config(&config)?;
//!
//! controller.start().await?.wait().await;
//! let todo = controller.add("Buy milk").await?;
//! controller.toggle(todo.id).await?;
//!
//! let view = controller.view().await;
//! println!("{}", view.items_left_label());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod controller;
pub mod filter;
pub mod reducer;
pub mod types;
pub mod view;

// Re-export commonly used types
pub use api::{ApiError, HttpTodoApi, InMemoryTodoApi, TodoApi};
pub use config::{Config, ConfigError};
pub use controller::{TodoController, TodoError};
pub use reducer::{TodoEnvironment, TodoReducer};
pub use types::{ErrorKind, FilterMode, Todo, TodoAction, TodoId, TodoState, UserId};
pub use view::TodoView;
