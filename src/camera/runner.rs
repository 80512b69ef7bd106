use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::animator::{AnimatorState, CameraAnimator};
use super::clock::Clock;
use super::owner::AnimationOwner;

/// Drives every live [`CameraAnimator`] once per display refresh.
///
/// Animators leave the runner by themselves when they stop.
pub struct CameraAnimatorsRunner {
    animators: RefCell<Vec<Rc<CameraAnimator>>>,
    enabled: Cell<bool>,
    clock: Rc<dyn Clock>,
    weak_self: Weak<CameraAnimatorsRunner>,
}

impl CameraAnimatorsRunner {
    pub fn new(clock: Rc<dyn Clock>) -> Rc<Self> {
        Rc::new_cyclic(|weak_self| Self {
            animators: RefCell::new(Vec::new()),
            enabled: Cell::new(true),
            clock,
            weak_self: weak_self.clone(),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    /// While disabled, running animators are canceled and new ones are
    /// stopped as soon as they are added.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
        if !enabled {
            self.cancel_animations();
        }
    }

    pub fn animator_count(&self) -> usize {
        self.animators.borrow().len()
    }

    pub fn animators(&self) -> Vec<Rc<CameraAnimator>> {
        self.animators.borrow().clone()
    }

    pub fn add(&self, animator: Rc<CameraAnimator>) {
        if !self.enabled.get() {
            animator.stop_animation();
            return;
        }
        self.animators.borrow_mut().push(animator.clone());

        let runner = self.weak_self.clone();
        let weak_animator = Rc::downgrade(&animator);
        // The handler unsubscribes itself once the animator stops, which also
        // covers an animator that was already stopped when added.
        let _ = animator.status_signal().observe(move |state| {
            if !matches!(state, AnimatorState::Stopped(_)) {
                return true;
            }
            if let (Some(runner), Some(animator)) = (runner.upgrade(), weak_animator.upgrade()) {
                runner.remove(&animator);
            }
            false
        });
    }

    fn remove(&self, animator: &Rc<CameraAnimator>) {
        self.animators
            .borrow_mut()
            .retain(|candidate| !Rc::ptr_eq(candidate, animator));
    }

    /// Advance every animator to the current time.
    pub fn update(&self) {
        if !self.enabled.get() {
            self.cancel_animations();
            return;
        }
        let now = self.clock.now();
        for animator in self.animators() {
            animator.update(now);
        }
    }

    pub fn cancel_animations(&self) {
        for animator in self.animators() {
            animator.cancel();
        }
    }

    pub fn cancel_animations_with_owners(&self, owners: &[AnimationOwner]) {
        for animator in self.animators() {
            if owners.contains(animator.owner()) {
                animator.cancel();
            }
        }
    }
}
