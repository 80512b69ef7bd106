use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::camera::CameraOptions;
use crate::reactive::Cancelable;

/// Receives camera values. Return `false` to stop receiving.
pub type CameraHandler = Box<dyn FnMut(&CameraOptions) -> bool>;

/// A strategy that keeps computing the camera the map should show.
///
/// The data source follows the [`Signal`](crate::reactive::Signal) contract:
/// the latest value is replayed to new subscribers, later values arrive only
/// when they change.
pub trait ViewportState {
    fn observe_data_source(&self, handler: CameraHandler) -> Cancelable;

    /// Allow the state to drive the camera on its own.
    fn start_updating_camera(&self);

    fn stop_updating_camera(&self);
}

/// Shared handle to a [`ViewportState`]. Two handles are equal only if they
/// point at the same state object.
#[derive(Clone)]
pub struct StateHandle(Rc<dyn ViewportState>);

impl StateHandle {
    pub fn new<S: ViewportState + 'static>(state: S) -> Self {
        Self(Rc::new(state))
    }

    fn addr(&self) -> *const () {
        Rc::as_ptr(&self.0) as *const ()
    }
}

impl<S: ViewportState + 'static> From<Rc<S>> for StateHandle {
    fn from(state: Rc<S>) -> Self {
        Self(state)
    }
}

impl std::ops::Deref for StateHandle {
    type Target = dyn ViewportState;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl PartialEq for StateHandle {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl Eq for StateHandle {}

impl fmt::Debug for StateHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StateHandle({:p})", self.addr())
    }
}

/// The observation a state holds while it is allowed to update the camera.
#[derive(Default)]
pub(crate) struct UpdatingSlot(RefCell<Option<Cancelable>>);

impl UpdatingSlot {
    /// Start with the cancelable produced by `begin`, unless already started.
    pub(crate) fn start<F>(&self, begin: F)
    where
        F: FnOnce() -> Cancelable,
    {
        if self.is_active() {
            return;
        }
        let cancelable = begin();
        *self.0.borrow_mut() = Some(cancelable);
    }

    pub(crate) fn stop(&self) {
        let cancelable = self.0.borrow_mut().take();
        if let Some(cancelable) = cancelable {
            cancelable.cancel();
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.0.borrow().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::Signal;

    struct Constant(Signal<CameraOptions>);

    impl ViewportState for Constant {
        fn observe_data_source(&self, handler: CameraHandler) -> Cancelable {
            self.0.observe(handler)
        }

        fn start_updating_camera(&self) {}

        fn stop_updating_camera(&self) {}
    }

    #[test]
    fn test_handles_compare_by_identity() {
        let a = StateHandle::new(Constant(Signal::new(CameraOptions::new())));
        let b = StateHandle::new(Constant(Signal::new(CameraOptions::new())));

        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn test_updating_slot_starts_once() {
        let slot = UpdatingSlot::default();
        let mut starts = 0;
        slot.start(|| {
            starts += 1;
            Cancelable::empty()
        });
        slot.start(|| {
            starts += 1;
            Cancelable::empty()
        });
        assert_eq!(starts, 1);

        slot.stop();
        assert!(!slot.is_active());
    }
}
