//! Event bus implementation.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use tracing::{debug, error};

use crate::pattern::{Topic, TopicPattern};

type Handler<E> = Rc<dyn Fn(&E)>;

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

impl SubscriptionHandle {
    /// Numeric id of the subscription.
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Outcome of a single publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    /// Topic that was published.
    pub topic: String,
    /// Handlers that ran to completion.
    pub delivered: usize,
    /// Handlers that panicked.
    pub failed: usize,
}

impl PublishReport {
    /// Check if any handler received the event.
    pub fn was_handled(&self) -> bool {
        self.delivered + self.failed > 0
    }
}

struct Subscription<E> {
    id: u64,
    pattern: TopicPattern,
    handler: Handler<E>,
    active: Rc<Cell<bool>>,
}

struct Registry<E> {
    next_id: u64,
    subscriptions: Vec<Subscription<E>>,
}

/// Topic-keyed publish/subscribe dispatcher.
///
/// The bus is single-threaded and cheap to clone; clones share the same
/// subscriptions. Handlers are called synchronously, in subscription order,
/// with a reference to the published payload.
///
/// A publish delivers to the handlers registered when it starts. A handler
/// subscribed during that dispatch does not see it; a handler unsubscribed
/// during it is skipped if not yet reached. Nested publishes run depth-first.
pub struct EventBus<E> {
    registry: Rc<RefCell<Registry<E>>>,
    depth: Rc<Cell<usize>>,
}

impl<E> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            registry: Rc::clone(&self.registry),
            depth: Rc::clone(&self.depth),
        }
    }
}

impl<E> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.borrow();
        f.debug_struct("EventBus")
            .field("subscriptions", &registry.subscriptions.len())
            .field("depth", &self.depth.get())
            .finish()
    }
}

impl<E: Topic + 'static> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Topic + 'static> EventBus<E> {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                next_id: 0,
                subscriptions: Vec::new(),
            })),
            depth: Rc::new(Cell::new(0)),
        }
    }

    /// Register a handler for a topic pattern.
    pub fn subscribe<F>(&self, pattern: impl Into<TopicPattern>, handler: F) -> SubscriptionHandle
    where
        F: Fn(&E) + 'static,
    {
        let pattern = pattern.into();
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        debug!(subscription = id, pattern = %pattern, "subscribed");
        registry.subscriptions.push(Subscription {
            id,
            pattern,
            handler: Rc::new(handler),
            active: Rc::new(Cell::new(true)),
        });
        SubscriptionHandle(id)
    }

    /// Remove a subscription.
    ///
    /// Returns `false` if the handle was already removed.
    pub fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        let mut registry = self.registry.borrow_mut();
        match registry.subscriptions.iter().position(|s| s.id == handle.0) {
            Some(pos) => {
                let sub = registry.subscriptions.remove(pos);
                sub.active.set(false);
                debug!(subscription = handle.0, "unsubscribed");
                true
            }
            None => false,
        }
    }

    /// Deliver an event to every matching handler.
    ///
    /// A panicking handler is caught and logged; the remaining handlers
    /// still run and the bus stays usable.
    pub fn publish(&self, event: E) -> PublishReport {
        let topic = event.topic().to_string();

        // Snapshot so handlers may subscribe, unsubscribe or publish freely.
        let targets: Vec<(u64, Handler<E>, Rc<Cell<bool>>)> = {
            let registry = self.registry.borrow();
            registry
                .subscriptions
                .iter()
                .filter(|s| s.pattern.matches(&topic))
                .map(|s| (s.id, Rc::clone(&s.handler), Rc::clone(&s.active)))
                .collect()
        };

        let depth = self.depth.get();
        self.depth.set(depth + 1);
        debug!(topic = %topic, depth, handlers = targets.len(), "publishing");

        let mut report = PublishReport {
            topic,
            delivered: 0,
            failed: 0,
        };

        for (id, handler, active) in targets {
            if !active.get() {
                continue;
            }
            match panic::catch_unwind(AssertUnwindSafe(|| (*handler)(&event))) {
                Ok(()) => report.delivered += 1,
                Err(payload) => {
                    report.failed += 1;
                    error!(
                        topic = %report.topic,
                        subscription = id,
                        panic = %panic_message(payload.as_ref()),
                        "event handler panicked"
                    );
                }
            }
        }

        self.depth.set(depth);
        report
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.registry.borrow().subscriptions.len()
    }

    /// Current dispatch nesting depth; 0 outside any publish.
    pub fn depth(&self) -> usize {
        self.depth.get()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Ping(&'static str);

    impl Topic for Ping {
        fn topic(&self) -> &str {
            self.0
        }
    }

    fn recorder() -> Rc<RefCell<Vec<String>>> {
        Rc::new(RefCell::new(Vec::new()))
    }

    #[test]
    fn test_handlers_run_in_subscription_order() {
        let bus = EventBus::new();
        let log = recorder();

        for name in ["first", "second", "third"] {
            let log = Rc::clone(&log);
            bus.subscribe("cart:changed", move |_: &Ping| log.borrow_mut().push(name.to_string()));
        }

        let report = bus.publish(Ping("cart:changed"));
        assert_eq!(report.delivered, 3);
        assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_exact_and_pattern_subscriptions() {
        let bus = EventBus::new();
        let log = recorder();

        let l = Rc::clone(&log);
        bus.subscribe("cart:add", move |e: &Ping| l.borrow_mut().push(format!("exact {}", e.0)));
        let l = Rc::clone(&log);
        bus.subscribe("cart:*", move |e: &Ping| l.borrow_mut().push(format!("prefix {}", e.0)));
        let l = Rc::clone(&log);
        bus.subscribe("*", move |e: &Ping| l.borrow_mut().push(format!("any {}", e.0)));

        bus.publish(Ping("cart:add"));
        bus.publish(Ping("modal:opened"));

        assert_eq!(
            *log.borrow(),
            vec![
                "exact cart:add",
                "prefix cart:add",
                "any cart:add",
                "any modal:opened",
            ]
        );
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus: EventBus<Ping> = EventBus::new();
        let report = bus.publish(Ping("nobody:listens"));
        assert!(!report.was_handled());
    }

    #[test]
    fn test_unsubscribe() {
        let bus = EventBus::new();
        let count = Rc::new(Cell::new(0));

        let c = Rc::clone(&count);
        let handle = bus.subscribe("tick", move |_: &Ping| c.set(c.get() + 1));

        bus.publish(Ping("tick"));
        assert!(bus.unsubscribe(handle));
        assert!(!bus.unsubscribe(handle));
        bus.publish(Ping("tick"));

        assert_eq!(count.get(), 1);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_panicking_handler_does_not_stop_siblings() {
        let bus = EventBus::new();
        let log = recorder();

        let l = Rc::clone(&log);
        bus.subscribe("tick", move |_: &Ping| l.borrow_mut().push("before".to_string()));
        bus.subscribe("tick", |_: &Ping| panic!("handler failure"));
        let l = Rc::clone(&log);
        bus.subscribe("tick", move |_: &Ping| l.borrow_mut().push("after".to_string()));

        let report = bus.publish(Ping("tick"));
        assert_eq!(report.delivered, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(*log.borrow(), vec!["before", "after"]);
        assert_eq!(bus.depth(), 0);

        // Still usable afterwards.
        assert_eq!(bus.publish(Ping("tick")).delivered, 2);
    }

    #[test]
    fn test_reentrant_publish_is_depth_first() {
        let bus = EventBus::new();
        let log = recorder();

        let l = Rc::clone(&log);
        let inner_bus = bus.clone();
        bus.subscribe("outer", move |_: &Ping| {
            l.borrow_mut().push("outer-1 start".to_string());
            inner_bus.publish(Ping("inner"));
            l.borrow_mut().push("outer-1 end".to_string());
        });
        let l = Rc::clone(&log);
        bus.subscribe("outer", move |_: &Ping| l.borrow_mut().push("outer-2".to_string()));
        let l = Rc::clone(&log);
        let depth_bus = bus.clone();
        bus.subscribe("inner", move |_: &Ping| {
            l.borrow_mut().push(format!("inner depth {}", depth_bus.depth()));
        });

        bus.publish(Ping("outer"));

        assert_eq!(
            *log.borrow(),
            vec!["outer-1 start", "inner depth 2", "outer-1 end", "outer-2"]
        );
        assert_eq!(bus.depth(), 0);
    }

    #[test]
    fn test_subscribe_during_dispatch_waits_for_next_publish() {
        let bus = EventBus::new();
        let count = Rc::new(Cell::new(0));

        let b = bus.clone();
        let c = Rc::clone(&count);
        let subscribed = Rc::new(Cell::new(false));
        bus.subscribe("tick", move |_: &Ping| {
            if !subscribed.replace(true) {
                let c = Rc::clone(&c);
                b.subscribe("tick", move |_: &Ping| c.set(c.get() + 1));
            }
        });

        bus.publish(Ping("tick"));
        assert_eq!(count.get(), 0);
        bus.publish(Ping("tick"));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_unsubscribe_during_dispatch_skips_pending_handler() {
        let bus = EventBus::new();
        let count = Rc::new(Cell::new(0));
        let victim: Rc<Cell<Option<SubscriptionHandle>>> = Rc::new(Cell::new(None));

        let b = bus.clone();
        let v = Rc::clone(&victim);
        bus.subscribe("tick", move |_: &Ping| {
            if let Some(handle) = v.get() {
                b.unsubscribe(handle);
            }
        });
        let c = Rc::clone(&count);
        victim.set(Some(bus.subscribe("tick", move |_: &Ping| c.set(c.get() + 1))));

        let report = bus.publish(Ping("tick"));
        assert_eq!(report.delivered, 1);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_payload_passed_unchanged() {
        let bus = EventBus::new();
        let seen: Rc<RefCell<Option<Ping>>> = Rc::new(RefCell::new(None));

        let s = Rc::clone(&seen);
        bus.subscribe("*", move |e: &Ping| *s.borrow_mut() = Some(e.clone()));
        bus.publish(Ping("product:selected"));

        assert_eq!(*seen.borrow(), Some(Ping("product:selected")));
    }
}
