//! Publish/subscribe event registry
//!
//! Each emitting component owns its own [`EventEmitter`]; there is no global bus.
//! Key principles:
//! - Registration system (only handlers registered for a kind are notified)
//! - Subscribers are called in registration order
//! - Explicit unsubscribe through the returned [`SubscriptionId`]
//! - Emission works on a snapshot, so handlers may subscribe or unsubscribe
//!   while an event is being delivered

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;

/// An event that can be routed by kind
pub trait Event {
    /// Discriminant used to look up subscribers
    type Kind: Copy + Eq + Hash + Debug;

    /// Kind of this event
    fn kind(&self) -> Self::Kind;
}

/// Handle returned by [`EventEmitter::on`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Handler<E> = Rc<RefCell<dyn FnMut(&E)>>;

/// Event emitter with per-kind ordered subscriber lists
///
/// All methods take `&self` so an emitter can be shared by the component that
/// owns it and by the handlers it calls.
pub struct EventEmitter<E: Event> {
    handlers: RefCell<HashMap<E::Kind, Vec<(SubscriptionId, Handler<E>)>>>,
    next_id: Cell<u64>,
}

impl<E: Event> EventEmitter<E> {
    /// Create an emitter with no subscribers
    pub fn new() -> Self {
        Self {
            handlers: RefCell::new(HashMap::new()),
            next_id: Cell::new(0),
        }
    }

    /// Register a handler for one event kind
    pub fn on<F>(&self, kind: E::Kind, handler: F) -> SubscriptionId
    where
        F: FnMut(&E) + 'static,
    {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        let handler: Handler<E> = Rc::new(RefCell::new(handler));
        self.handlers
            .borrow_mut()
            .entry(kind)
            .or_default()
            .push((id, handler));

        log::trace!("Subscribed {:?} to {:?}", id, kind);
        id
    }

    /// Remove a single subscription, returns false if it was not registered
    pub fn off(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.borrow_mut();
        for subscribers in handlers.values_mut() {
            if let Some(index) = subscribers.iter().position(|(sub, _)| *sub == id) {
                subscribers.remove(index);
                return true;
            }
        }
        false
    }

    /// Remove every subscription of one kind, returns how many were removed
    pub fn off_kind(&self, kind: E::Kind) -> usize {
        self.handlers
            .borrow_mut()
            .remove(&kind)
            .map_or(0, |subscribers| subscribers.len())
    }

    /// Number of handlers registered for a kind
    pub fn subscriber_count(&self, kind: E::Kind) -> usize {
        self.handlers.borrow().get(&kind).map_or(0, Vec::len)
    }

    /// Deliver an event to every handler of its kind, returns how many ran
    ///
    /// Handlers added during delivery are first called on the next emission;
    /// handlers removed during delivery are not called.
    pub fn emit(&self, event: &E) -> usize {
        let kind = event.kind();
        let snapshot: Vec<(SubscriptionId, Handler<E>)> = self
            .handlers
            .borrow()
            .get(&kind)
            .cloned()
            .unwrap_or_default();

        let mut invoked = 0;
        for (id, handler) in snapshot {
            if !self.is_subscribed(kind, id) {
                continue;
            }
            match handler.try_borrow_mut() {
                Ok(mut handler) => {
                    (&mut *handler)(event);
                    invoked += 1;
                }
                Err(_) => log::warn!("Skipping re-entrant {:?} handler {:?}", kind, id),
            }
        }
        invoked
    }

    fn is_subscribed(&self, kind: E::Kind, id: SubscriptionId) -> bool {
        self.handlers
            .borrow()
            .get(&kind)
            .is_some_and(|subscribers| subscribers.iter().any(|(sub, _)| *sub == id))
    }
}

impl<E: Event> Default for EventEmitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum TestKind {
        Pressed,
        Released,
    }

    #[derive(Debug, Clone)]
    struct TestEvent {
        kind: TestKind,
        value: u32,
    }

    impl Event for TestEvent {
        type Kind = TestKind;

        fn kind(&self) -> TestKind {
            self.kind
        }
    }

    fn pressed(value: u32) -> TestEvent {
        TestEvent { kind: TestKind::Pressed, value }
    }

    #[test]
    fn test_handlers_run_in_registration_order() {
        let emitter: EventEmitter<TestEvent> = EventEmitter::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let log = Rc::clone(&log);
            emitter.on(TestKind::Pressed, move |event: &TestEvent| {
                log.borrow_mut().push((tag, event.value));
            });
        }

        assert_eq!(emitter.emit(&pressed(7)), 3);
        assert_eq!(
            *log.borrow(),
            vec![("first", 7), ("second", 7), ("third", 7)]
        );
    }

    #[test]
    fn test_only_matching_kind_is_notified() {
        let emitter: EventEmitter<TestEvent> = EventEmitter::new();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        emitter.on(TestKind::Released, move |_| counter.set(counter.get() + 1));

        emitter.emit(&pressed(1));
        assert_eq!(hits.get(), 0);
        emitter.emit(&TestEvent { kind: TestKind::Released, value: 1 });
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_off_removes_subscription() {
        let emitter: EventEmitter<TestEvent> = EventEmitter::new();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let id = emitter.on(TestKind::Pressed, move |_| counter.set(counter.get() + 1));

        assert!(emitter.off(id));
        assert!(!emitter.off(id));
        emitter.emit(&pressed(1));
        assert_eq!(hits.get(), 0);
        assert_eq!(emitter.subscriber_count(TestKind::Pressed), 0);
    }

    #[test]
    fn test_subscription_changes_during_emit() {
        let emitter = Rc::new(EventEmitter::<TestEvent>::new());
        let late_hits = Rc::new(Cell::new(0));
        let victim_hits = Rc::new(Cell::new(0));

        // Registered first so it runs before the victim
        let victim_id = Rc::new(Cell::new(None));
        {
            let emitter_ref = Rc::downgrade(&emitter);
            let late_hits = Rc::clone(&late_hits);
            let victim_id = Rc::clone(&victim_id);
            emitter.on(TestKind::Pressed, move |_| {
                let Some(emitter) = emitter_ref.upgrade() else { return };
                if let Some(id) = victim_id.take() {
                    emitter.off(id);
                }
                let late_hits = Rc::clone(&late_hits);
                emitter.on(TestKind::Released, move |_| late_hits.set(late_hits.get() + 1));
            });
        }
        let counter = Rc::clone(&victim_hits);
        victim_id.set(Some(emitter.on(TestKind::Pressed, move |_| counter.set(counter.get() + 1))));

        assert_eq!(emitter.emit(&pressed(1)), 1);
        assert_eq!(victim_hits.get(), 0);
        assert_eq!(emitter.subscriber_count(TestKind::Released), 1);
        assert_eq!(late_hits.get(), 0);
    }

    #[test]
    fn test_off_kind_clears_all() {
        let emitter: EventEmitter<TestEvent> = EventEmitter::default();
        emitter.on(TestKind::Pressed, |_| {});
        emitter.on(TestKind::Pressed, |_| {});
        assert_eq!(emitter.off_kind(TestKind::Pressed), 2);
        assert_eq!(emitter.emit(&pressed(0)), 0);
    }
}
