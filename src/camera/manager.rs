use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use super::animator::{AnimatingPosition, AnimationCompletion, CameraAnimator};
use super::clock::Clock;
use super::options::CameraOptions;
use super::owner::AnimationOwner;
use super::runner::CameraAnimatorsRunner;
use super::timing::TimingFunction;
use crate::map::MapCamera;
use crate::reactive::Cancelable;

/// High level entry point for animating the camera.
pub struct CameraAnimationsManager {
    runner: Rc<CameraAnimatorsRunner>,
    map: Rc<dyn MapCamera>,
    clock: Rc<dyn Clock>,
    animations_enabled: Cell<bool>,
}

impl CameraAnimationsManager {
    pub fn new(
        runner: Rc<CameraAnimatorsRunner>,
        map: Rc<dyn MapCamera>,
        clock: Rc<dyn Clock>,
    ) -> Self {
        Self {
            runner,
            map,
            clock,
            animations_enabled: Cell::new(true),
        }
    }

    pub fn runner(&self) -> &Rc<CameraAnimatorsRunner> {
        &self.runner
    }

    pub fn map(&self) -> &Rc<dyn MapCamera> {
        &self.map
    }

    pub fn animations_enabled(&self) -> bool {
        self.animations_enabled.get()
    }

    /// When disabled, [`ease_to`](Self::ease_to) jumps straight to the target.
    pub fn set_animations_enabled(&self, enabled: bool) {
        self.animations_enabled.set(enabled);
    }

    /// Animate from the current camera to `to`.
    ///
    /// Animations already running for `owner` are canceled first. The
    /// returned [`Cancelable`] stops the new animation; its completion then
    /// runs with [`AnimatingPosition::Current`].
    pub fn ease_to(
        &self,
        to: CameraOptions,
        duration: Duration,
        curve: TimingFunction,
        owner: AnimationOwner,
        completion: Option<AnimationCompletion>,
    ) -> Cancelable {
        self.runner.cancel_animations_with_owners(&[owner.clone()]);

        if !self.animations_enabled.get() {
            log::trace!("animations disabled, applying camera for {} directly", owner);
            self.map.set_camera(&to);
            if let Some(completion) = completion {
                completion(AnimatingPosition::End);
            }
            return Cancelable::canceled();
        }

        let animator = Rc::new(CameraAnimator::new(
            owner,
            None,
            to,
            duration,
            curve,
            self.map.clone(),
            self.clock.clone(),
        ));
        if let Some(completion) = completion {
            animator.add_completion(completion);
        }
        self.runner.add(animator.clone());
        animator.start();

        let weak = Rc::downgrade(&animator);
        Cancelable::from_fn(move || {
            if let Some(animator) = weak.upgrade() {
                animator.cancel();
            }
        })
    }

    /// An inactive animator registered with the runner. The caller starts
    /// it and observes its completion.
    pub fn make_simple_animator(
        &self,
        from: CameraOptions,
        to: CameraOptions,
        duration: Duration,
        curve: TimingFunction,
        owner: AnimationOwner,
    ) -> Rc<CameraAnimator> {
        let animator = Rc::new(CameraAnimator::new(
            owner,
            Some(from),
            to,
            duration,
            curve,
            self.map.clone(),
            self.clock.clone(),
        ));
        self.runner.add(animator.clone());
        animator
    }

    pub fn cancel_animations(&self) {
        self.runner.cancel_animations();
    }

    pub fn cancel_animations_with_owners(&self, owners: &[AnimationOwner]) {
        self.runner.cancel_animations_with_owners(owners);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::animator::tests::RecordingMap;
    use crate::camera::{AnimatorState, ManualClock};
    use std::cell::RefCell;

    fn setup() -> (Rc<RecordingMap>, Rc<ManualClock>, CameraAnimationsManager) {
        let map = Rc::new(RecordingMap::default());
        let clock = Rc::new(ManualClock::new());
        let runner = CameraAnimatorsRunner::new(clock.clone());
        let manager = CameraAnimationsManager::new(runner, map.clone(), clock.clone());
        (map, clock, manager)
    }

    fn recorder() -> (Rc<RefCell<Vec<AnimatingPosition>>>, AnimationCompletion) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        (seen, Box::new(move |pos| s.borrow_mut().push(pos)))
    }

    #[test]
    fn test_ease_to_animates_through_runner() {
        let (map, clock, manager) = setup();
        let (seen, completion) = recorder();

        manager.ease_to(
            CameraOptions::new().zoom(6.0),
            Duration::from_secs(1),
            TimingFunction::Linear,
            AnimationOwner::CAMERA_ANIMATIONS_MANAGER,
            Some(completion),
        );
        assert_eq!(manager.runner().animator_count(), 1);

        clock.advance(Duration::from_secs(1));
        manager.runner().update();

        assert_eq!(map.state.borrow().zoom, 6.0);
        assert_eq!(*seen.borrow(), vec![AnimatingPosition::End]);
    }

    #[test]
    fn test_ease_to_cancels_same_owner_only() {
        let (_map, _clock, manager) = setup();
        let (first_seen, first) = recorder();
        let (other_seen, other) = recorder();

        manager.ease_to(
            CameraOptions::new().zoom(3.0),
            Duration::from_secs(1),
            TimingFunction::Linear,
            AnimationOwner::VIEWPORT_STATE,
            Some(first),
        );
        manager.ease_to(
            CameraOptions::new().pitch(30.0),
            Duration::from_secs(1),
            TimingFunction::Linear,
            AnimationOwner::GESTURES,
            Some(other),
        );
        manager.ease_to(
            CameraOptions::new().zoom(5.0),
            Duration::from_secs(1),
            TimingFunction::Linear,
            AnimationOwner::VIEWPORT_STATE,
            None,
        );

        assert_eq!(*first_seen.borrow(), vec![AnimatingPosition::Current]);
        assert!(other_seen.borrow().is_empty());
        assert_eq!(manager.runner().animator_count(), 2);
    }

    #[test]
    fn test_disabled_animations_complete_synchronously() {
        let (map, _clock, manager) = setup();
        manager.set_animations_enabled(false);
        let (seen, completion) = recorder();

        let token = manager.ease_to(
            CameraOptions::new().zoom(12.0),
            Duration::from_secs(2),
            TimingFunction::EaseInOut,
            AnimationOwner::CAMERA_ANIMATIONS_MANAGER,
            Some(completion),
        );

        assert_eq!(map.state.borrow().zoom, 12.0);
        assert_eq!(*seen.borrow(), vec![AnimatingPosition::End]);
        assert_eq!(manager.runner().animator_count(), 0);
        token.cancel();
        assert_eq!(*seen.borrow(), vec![AnimatingPosition::End]);
    }

    #[test]
    fn test_cancelable_stops_animation() {
        let (_map, _clock, manager) = setup();
        let (seen, completion) = recorder();

        let token = manager.ease_to(
            CameraOptions::new().zoom(3.0),
            Duration::from_secs(1),
            TimingFunction::Linear,
            AnimationOwner::CAMERA_ANIMATIONS_MANAGER,
            Some(completion),
        );
        token.cancel();

        assert_eq!(*seen.borrow(), vec![AnimatingPosition::Current]);
        assert_eq!(manager.runner().animator_count(), 0);
    }

    #[test]
    fn test_simple_animator_is_registered_but_inactive() {
        let (_map, _clock, manager) = setup();
        let animator = manager.make_simple_animator(
            CameraOptions::new().zoom(1.0),
            CameraOptions::new().zoom(2.0),
            Duration::from_millis(500),
            TimingFunction::EaseInOut,
            AnimationOwner::VIEWPORT_TRANSITION,
        );

        assert_eq!(animator.state(), AnimatorState::Inactive);
        assert_eq!(manager.runner().animator_count(), 1);

        manager.cancel_animations_with_owners(&[AnimationOwner::VIEWPORT_TRANSITION]);
        assert_eq!(manager.runner().animator_count(), 0);
    }
}
