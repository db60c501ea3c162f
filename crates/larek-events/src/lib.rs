//! Synchronous publish/subscribe event bus.
//!
//! This crate provides:
//! - `EventBus` - Topic-keyed dispatcher for a single-threaded event loop
//! - `TopicPattern` - Exact, prefix-wildcard and catch-all subscriptions
//! - `Topic` - Trait tying an event payload to its topic string
//!
//! Dispatch is synchronous and depth-first: a handler that publishes runs
//! the nested dispatch to completion before the outer dispatch moves on.

mod bus;
mod pattern;

pub use bus::*;
pub use pattern::*;
