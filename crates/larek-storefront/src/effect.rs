//! Deferred gateway work.
//!
//! Event handlers run synchronously and cannot await. Anything that needs
//! the gateway is queued here and executed by
//! [`Storefront::settle`](crate::Storefront::settle).

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use larek_core::checkout::OrderRequest;
use larek_core::ids::ProductId;

/// A unit of deferred gateway work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Load a product for the preview panel.
    FetchItem(ProductId),
    /// Send an order for the given checkout attempt.
    SubmitOrder { attempt: u64, request: OrderRequest },
}

/// FIFO of pending effects, shared by the components that enqueue work.
#[derive(Debug, Clone, Default)]
pub struct EffectQueue {
    inner: Rc<RefCell<VecDeque<Effect>>>,
}

impl EffectQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, effect: Effect) {
        self.inner.borrow_mut().push_back(effect);
    }

    pub fn pop(&self) -> Option<Effect> {
        self.inner.borrow_mut().pop_front()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }

    /// Snapshot of the pending effects, oldest first.
    pub fn pending(&self) -> Vec<Effect> {
        self.inner.borrow().iter().cloned().collect()
    }
}
