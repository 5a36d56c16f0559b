//! # Tasklist Testing
//!
//! Testing utilities and helpers for the tasklist reducer architecture.
//!
//! This crate provides:
//! - [`ReducerTest`]: Given-When-Then harness for reducers
//! - [`assertions`]: Assertion helpers for effects
//! - [`drain`]: Runs effect descriptions in-process and collects the actions they produce
//!
//! ## Example
//!
//! ```ignore
//! use tasklist_testing::drain;
//!
//! #[tokio::test]
//! async fn load_produces_loaded() {
//!     let effects = reducer.reduce(&mut state, TodoAction::Load, &env);
//!     let drained = drain(effects).await;
//!     assert!(matches!(drained.actions[0], TodoAction::Loaded { .. }));
//! }
//! ```


pub use reducer_test::{ReducerTest, assertions};

use futures::StreamExt;
use futures::future::BoxFuture;
use std::time::Duration;
use tasklist_core::effect::Effect;

/// Actions collected by [`drain`]
#[derive(Debug, Clone)]
pub struct Drained<A> {
    /// Actions produced by `Future` and `Stream` effects, in execution order
    pub actions: Vec<A>,
    /// Actions scheduled by `Delay` effects, with their delay (not awaited)
    pub delayed: Vec<(Duration, A)>,
}

impl<A> Default for Drained<A> {
    fn default() -> Self {
        Self {
            actions: Vec::new(),
            delayed: Vec::new(),
        }
    }
}

/// Execute effects without a store and collect every action they produce
///
/// Parallel effects are run one after another so the output order is
/// deterministic. Delays are recorded rather than slept on.
pub async fn drain<A, I>(effects: I) -> Drained<A>
where
    A: Send + 'static,
    I: IntoIterator<Item = Effect<A>>,
{
    let mut drained = Drained::default();
    for effect in effects {
        drain_into(effect, &mut drained).await;
    }
    drained
}

fn drain_into<'a, A>(effect: Effect<A>, drained: &'a mut Drained<A>) -> BoxFuture<'a, ()>
where
    A: Send + 'static,
{
    Box::pin(async move {
        match effect {
            Effect::None => {},
            Effect::Future(fut) => {
                if let Some(action) = fut.await {
                    drained.actions.push(action);
                }
            },
            Effect::Stream(mut stream) => {
                while let Some(action) = stream.next().await {
                    drained.actions.push(action);
                }
            },
            Effect::Delay { duration, action } => drained.delayed.push((duration, *action)),
            Effect::Parallel(effects) => {
                for effect in effects {
                    drain_into(effect, drained).await;
                }
            },
        }
    })
}
