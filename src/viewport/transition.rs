use std::fmt;
use std::rc::Rc;

use super::state::StateHandle;
use crate::reactive::Cancelable;

/// Called once when a transition hands over to its destination. The flag is
/// `false` when the camera did not reach the destination, e.g. because a
/// gesture stopped the animation.
pub type TransitionCompletion = Box<dyn FnOnce(bool)>;

/// Moves the camera from whatever it shows now to a [`ViewportState`].
///
/// Canceling the returned [`Cancelable`] stops every animation the run
/// started and unsubscribes from the destination. `completion` is never
/// called after that.
///
/// [`ViewportState`]: super::ViewportState
pub trait ViewportTransition {
    fn run(
        &self,
        from: Option<&StateHandle>,
        to: &StateHandle,
        completion: TransitionCompletion,
    ) -> Cancelable;
}

/// Shared handle to a [`ViewportTransition`], compared by identity.
#[derive(Clone)]
pub struct TransitionHandle(Rc<dyn ViewportTransition>);

impl TransitionHandle {
    pub fn new<T: ViewportTransition + 'static>(transition: T) -> Self {
        Self(Rc::new(transition))
    }

    fn addr(&self) -> *const () {
        Rc::as_ptr(&self.0) as *const ()
    }
}

impl<T: ViewportTransition + 'static> From<Rc<T>> for TransitionHandle {
    fn from(transition: Rc<T>) -> Self {
        Self(transition)
    }
}

impl std::ops::Deref for TransitionHandle {
    type Target = dyn ViewportTransition;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl PartialEq for TransitionHandle {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl Eq for TransitionHandle {}

impl fmt::Debug for TransitionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransitionHandle({:p})", self.addr())
    }
}
