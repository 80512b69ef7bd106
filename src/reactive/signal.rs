use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::cancelable::Cancelable;

type Handler<T> = Box<dyn FnMut(&T) -> bool>;

struct Subscriber<T> {
    active: Rc<Cell<bool>>,
    handler: Rc<RefCell<Handler<T>>>,
    token: Cancelable,
}

impl<T> Clone for Subscriber<T> {
    fn clone(&self) -> Self {
        Self {
            active: self.active.clone(),
            handler: self.handler.clone(),
            token: self.token.clone(),
        }
    }
}

struct SignalInner<T> {
    value: Option<T>,
    /// Bumped on every accepted `notify`, used to abandon stale passes.
    version: u64,
    subscribers: Vec<(u64, Subscriber<T>)>,
    next_subscriber_id: u64,
}

/// A single-slot observable value.
///
/// A `Signal` holds the latest value and pushes every *distinct* new value to
/// its subscribers, in the order they subscribed. New subscribers receive the
/// current value immediately, so late subscribers are never behind.
///
/// Handlers return `true` to keep observing and `false` to unsubscribe.
///
/// # Re-entrancy
/// Handlers may notify or observe the same signal. Each notification pass
/// iterates over a snapshot of the subscribers taken when the pass begins.
/// Subscribers canceled mid-pass are skipped, and if a handler notifies a
/// newer value the remainder of the older pass is dropped, so the last value
/// always wins.
pub struct Signal<T> {
    inner: Rc<RefCell<SignalInner<T>>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Signal<T> {
    pub fn new(value: T) -> Self {
        Self::with_slot(Some(value))
    }

    /// A signal without a value yet. Subscribers wait for the first `notify`.
    pub fn empty() -> Self {
        Self::with_slot(None)
    }

    fn with_slot(value: Option<T>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SignalInner {
                value,
                version: 0,
                subscribers: Vec::new(),
                next_subscriber_id: 0,
            })),
        }
    }

    pub fn has_value(&self) -> bool {
        self.inner.borrow().value.is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner
            .borrow()
            .subscribers
            .iter()
            .filter(|(_, subscriber)| subscriber.active.get())
            .count()
    }

    /// Borrow the current value.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(Option<&T>) -> R,
    {
        f(self.inner.borrow().value.as_ref())
    }
}

impl<T: Clone + 'static> Signal<T> {
    pub fn get(&self) -> Option<T> {
        self.inner.borrow().value.clone()
    }

    /// Subscribe to the value.
    ///
    /// The handler runs right away with the current value if there is one,
    /// and then once per distinct value until it returns `false` or the
    /// returned [`Cancelable`] is invoked.
    pub fn observe<F>(&self, handler: F) -> Cancelable
    where
        F: FnMut(&T) -> bool + 'static,
    {
        let active = Rc::new(Cell::new(true));
        let token = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_subscriber_id;
            inner.next_subscriber_id += 1;

            let token = unsubscribe_token(Rc::downgrade(&self.inner), id, active.clone());
            inner.subscribers.push((
                id,
                Subscriber {
                    active: active.clone(),
                    handler: Rc::new(RefCell::new(Box::new(handler))),
                    token: token.clone(),
                },
            ));
            token
        };

        let current = self.get();
        if let Some(value) = current {
            let subscriber = self
                .inner
                .borrow()
                .subscribers
                .last()
                .map(|(_, subscriber)| subscriber.clone());
            if let Some(subscriber) = subscriber {
                deliver(&subscriber, &value);
            }
        }

        token
    }
}

impl<T: Clone + PartialEq + 'static> Signal<T> {
    /// Store `value` and push it to subscribers if it differs from the
    /// current value.
    pub fn notify(&self, value: T) {
        let (snapshot, version) = {
            let mut inner = self.inner.borrow_mut();
            if inner.value.as_ref() == Some(&value) {
                return;
            }
            inner.value = Some(value.clone());
            inner.version += 1;
            inner.subscribers.retain(|(_, subscriber)| subscriber.active.get());
            let snapshot: Vec<Subscriber<T>> = inner
                .subscribers
                .iter()
                .map(|(_, subscriber)| subscriber.clone())
                .collect();
            (snapshot, inner.version)
        };

        for subscriber in snapshot {
            if self.inner.borrow().version != version {
                // A handler notified a newer value; that pass already
                // delivered it to everyone.
                break;
            }
            deliver(&subscriber, &value);
        }
    }

    /// Modify the current value in place, notifying if it changed.
    /// Does nothing while the signal is empty.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut T),
    {
        let Some(mut value) = self.get() else {
            return;
        };
        f(&mut value);
        self.notify(value);
    }
}

fn unsubscribe_token<T: 'static>(
    inner: Weak<RefCell<SignalInner<T>>>,
    id: u64,
    active: Rc<Cell<bool>>,
) -> Cancelable {
    Cancelable::from_fn(move || {
        active.set(false);
        if let Some(inner) = inner.upgrade() {
            // The cancel may run from inside a notify pass that still holds
            // a snapshot; only the live list is touched here.
            if let Ok(mut inner) = inner.try_borrow_mut() {
                inner.subscribers.retain(|(sub_id, _)| *sub_id != id);
            } else {
                log::debug!("signal busy, subscriber {id} will be pruned lazily");
            }
        }
    })
}

fn deliver<T>(subscriber: &Subscriber<T>, value: &T) {
    if !subscriber.active.get() {
        return;
    }
    let keep = {
        let Ok(mut handler) = subscriber.handler.try_borrow_mut() else {
            log::debug!("handler is already running, skipping re-entrant delivery");
            return;
        };
        handler(value)
    };
    if !keep {
        subscriber.token.cancel();
    }
}

pub fn create_signal<T>(value: T) -> Signal<T> {
    Signal::new(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder<T: Clone + 'static>() -> (Rc<RefCell<Vec<T>>>, impl FnMut(&T) -> bool) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        (seen, move |value: &T| {
            s.borrow_mut().push(value.clone());
            true
        })
    }

    #[test]
    fn test_create_signal_and_get() {
        let signal = create_signal(42);
        assert_eq!(signal.get(), Some(42));
    }

    #[test]
    fn test_empty_signal_has_no_value() {
        let signal: Signal<i32> = Signal::empty();
        assert!(!signal.has_value());
        assert_eq!(signal.get(), None);
    }

    #[test]
    fn test_observe_replays_current_value() {
        let signal = create_signal(7);
        let (seen, handler) = recorder();
        let _token = signal.observe(handler);
        assert_eq!(*seen.borrow(), vec![7]);
    }

    #[test]
    fn test_observe_empty_waits_for_first_value() {
        let signal = Signal::empty();
        let (seen, handler) = recorder();
        let _token = signal.observe(handler);
        assert!(seen.borrow().is_empty());

        signal.notify(3);
        assert_eq!(*seen.borrow(), vec![3]);
    }

    #[test]
    fn test_notify_skips_equal_values() {
        let signal = create_signal(1);
        let (seen, handler) = recorder();
        let _token = signal.observe(handler);

        signal.notify(1);
        signal.notify(2);
        signal.notify(2);

        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_subscribers_called_in_subscription_order() {
        let signal = Signal::empty();
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut tokens = Vec::new();
        for n in 0..3 {
            let o = order.clone();
            tokens.push(signal.observe(move |_: &i32| {
                o.borrow_mut().push(n);
                true
            }));
        }

        signal.notify(10);

        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn test_handler_returning_false_unsubscribes() {
        let signal = Signal::empty();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let token = signal.observe(move |_: &i32| {
            c.set(c.get() + 1);
            false
        });

        signal.notify(1);
        signal.notify(2);

        assert_eq!(count.get(), 1);
        assert!(token.is_canceled());
        assert_eq!(signal.subscriber_count(), 0);
    }

    #[test]
    fn test_handler_returning_false_on_replay() {
        let signal = create_signal(5);
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let token = signal.observe(move |_: &i32| {
            c.set(c.get() + 1);
            false
        });

        signal.notify(6);

        assert_eq!(count.get(), 1);
        assert!(token.is_canceled());
        assert_eq!(signal.subscriber_count(), 0);
    }

    #[test]
    fn test_cancel_stops_delivery() {
        let signal = Signal::empty();
        let (seen, handler) = recorder();
        let token = signal.observe(handler);

        signal.notify(1);
        token.cancel();
        token.cancel();
        signal.notify(2);

        assert_eq!(*seen.borrow(), vec![1]);
        assert_eq!(signal.subscriber_count(), 0);
    }

    #[test]
    fn test_duplicate_subscriptions_are_independent() {
        let signal = Signal::empty();
        let (seen_a, handler_a) = recorder();
        let (seen_b, handler_b) = recorder();
        let token_a = signal.observe(handler_a);
        let _token_b = signal.observe(handler_b);

        signal.notify(1);
        token_a.cancel();
        signal.notify(2);

        assert_eq!(*seen_a.borrow(), vec![1]);
        assert_eq!(*seen_b.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_cancel_during_pass_skips_later_subscriber() {
        let signal = Signal::empty();
        let later: Rc<RefCell<Option<Cancelable>>> = Rc::new(RefCell::new(None));
        let l = later.clone();
        let _first = signal.observe(move |_: &i32| {
            if let Some(token) = l.borrow().as_ref() {
                token.cancel();
            }
            true
        });
        let (seen, handler) = recorder();
        *later.borrow_mut() = Some(signal.observe(handler));

        signal.notify(1);

        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_reentrant_notify_last_value_wins() {
        let signal = Signal::empty();
        let s = signal.clone();
        let _bouncer = signal.observe(move |value: &i32| {
            if *value == 1 {
                s.notify(2);
            }
            true
        });
        let (seen, handler) = recorder();
        let _watcher = signal.observe(handler);

        signal.notify(1);

        assert_eq!(signal.get(), Some(2));
        assert_eq!(*seen.borrow(), vec![2]);
    }

    #[test]
    fn test_observe_inside_handler() {
        let signal = Signal::empty();
        let nested_seen = Rc::new(RefCell::new(Vec::new()));
        let tokens: Rc<RefCell<Vec<Cancelable>>> = Rc::new(RefCell::new(Vec::new()));
        let s = signal.clone();
        let n = nested_seen.clone();
        let t = tokens.clone();
        let _outer = signal.observe(move |_: &i32| {
            let n = n.clone();
            t.borrow_mut().push(s.observe(move |value: &i32| {
                n.borrow_mut().push(*value);
                true
            }));
            false
        });

        signal.notify(4);
        signal.notify(5);

        assert_eq!(*nested_seen.borrow(), vec![4, 5]);
    }

    #[test]
    fn test_update_with_closure() {
        let signal = create_signal(5);
        signal.update(|v| *v += 10);
        assert_eq!(signal.get(), Some(15));
    }

    #[test]
    fn test_update_on_empty_is_noop() {
        let signal: Signal<i32> = Signal::empty();
        signal.update(|v| *v += 1);
        assert_eq!(signal.get(), None);
    }

    #[test]
    fn test_clone_shares_underlying_value() {
        let signal1 = create_signal(50);
        let signal2 = signal1.clone();

        signal1.notify(75);
        assert_eq!(signal2.get(), Some(75));
    }

    #[test]
    fn test_with_for_borrowing() {
        let signal = create_signal(String::from("hello"));
        let length = signal.with(|s| s.map(|s| s.len()));
        assert_eq!(length, Some(5));
    }
}
