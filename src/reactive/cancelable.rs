//! One-shot, idempotent release handles.
//!
//! Every subscription and every in-flight camera operation hands back a
//! [`Cancelable`]. Invoking it releases whatever it guards. Calling it again,
//! or after the guarded operation already finished, does nothing.
//!
//! # Example
//!
//! ```ignore
//! let token = signal.observe(|value| {
//!     println!("{value:?}");
//!     true
//! });
//!
//! token.cancel();
//! token.cancel(); // no-op
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

type CancelFn = Box<dyn FnOnce()>;

struct CancelableInner {
    action: RefCell<Option<CancelFn>>,
    canceled: Cell<bool>,
}

/// A capability that releases a subscription or stops an operation.
///
/// Clones share the same underlying action, so canceling any clone cancels
/// all of them.
#[derive(Clone)]
pub struct Cancelable {
    inner: Rc<CancelableInner>,
}

impl Cancelable {
    /// Create a cancelable that runs `f` the first time it is canceled.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        Self {
            inner: Rc::new(CancelableInner {
                action: RefCell::new(Some(Box::new(f))),
                canceled: Cell::new(false),
            }),
        }
    }

    /// A cancelable that guards nothing.
    pub fn empty() -> Self {
        Self {
            inner: Rc::new(CancelableInner {
                action: RefCell::new(None),
                canceled: Cell::new(false),
            }),
        }
    }

    /// A cancelable that is already spent.
    pub fn canceled() -> Self {
        let cancelable = Self::empty();
        cancelable.inner.canceled.set(true);
        cancelable
    }

    /// Bundle several cancelables; canceling the bundle cancels each of them
    /// in order.
    pub fn combined(cancelables: impl IntoIterator<Item = Cancelable>) -> Self {
        let cancelables: Vec<Cancelable> = cancelables.into_iter().collect();
        Self::from_fn(move || {
            for cancelable in cancelables {
                cancelable.cancel();
            }
        })
    }

    /// Release the guarded resource. Only the first call has an effect.
    pub fn cancel(&self) {
        if self.inner.canceled.replace(true) {
            return;
        }
        // Take the action out before running it so that a re-entrant cancel
        // from inside the action sees an empty slot.
        let action = self.inner.action.borrow_mut().take();
        if let Some(action) = action {
            action();
        }
    }

    /// Whether [`cancel`](Self::cancel) has been invoked.
    pub fn is_canceled(&self) -> bool {
        self.inner.canceled.get()
    }

    /// Wrap into a guard that cancels when dropped.
    pub fn into_guard(self) -> CancelGuard {
        CancelGuard {
            cancelable: Some(self),
        }
    }
}

impl fmt::Debug for Cancelable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cancelable")
            .field("canceled", &self.is_canceled())
            .finish()
    }
}

/// Cancels its [`Cancelable`] on drop.
#[derive(Debug)]
pub struct CancelGuard {
    cancelable: Option<Cancelable>,
}

impl CancelGuard {
    /// Give back the cancelable without canceling it.
    pub fn disarm(mut self) -> Cancelable {
        self.cancelable.take().unwrap_or_else(Cancelable::canceled)
    }
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        if let Some(cancelable) = self.cancelable.take() {
            cancelable.cancel();
        }
    }
}
