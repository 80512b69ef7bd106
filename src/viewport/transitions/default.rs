use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use super::keyframes;
use crate::camera::{
    AnimatingPosition, AnimationOwner, CameraAnimationsManager, CameraAnimator, CameraFields,
    CameraOptions, TimingFunction,
};
use crate::reactive::Cancelable;
use crate::viewport::state::StateHandle;
use crate::viewport::transition::{TransitionCompletion, ViewportTransition};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DefaultTransitionOptions {
    /// Upper bound for the whole transition. Longer plans are compressed.
    pub max_duration: Duration,
}

impl Default for DefaultTransitionOptions {
    fn default() -> Self {
        Self {
            max_duration: Duration::from_millis(3500),
        }
    }
}

impl DefaultTransitionOptions {
    pub fn max_duration(mut self, max_duration: Duration) -> Self {
        self.max_duration = max_duration;
        self
    }
}

/// Animates to the destination with staggered per-property animations.
///
/// Values the destination produces while the animation runs retarget the
/// animators that are still moving.
pub struct DefaultTransition {
    options: Cell<DefaultTransitionOptions>,
    manager: Rc<CameraAnimationsManager>,
}

impl DefaultTransition {
    pub fn new(options: DefaultTransitionOptions, manager: Rc<CameraAnimationsManager>) -> Self {
        Self {
            options: Cell::new(options),
            manager,
        }
    }

    pub fn options(&self) -> DefaultTransitionOptions {
        self.options.get()
    }

    pub fn set_options(&self, options: DefaultTransitionOptions) {
        self.options.set(options);
    }
}

impl ViewportTransition for DefaultTransition {
    fn run(
        &self,
        _from: Option<&StateHandle>,
        to: &StateHandle,
        completion: TransitionCompletion,
    ) -> Cancelable {
        let run = Rc::new(TransitionRun {
            manager: self.manager.clone(),
            max_duration: self.options.get().max_duration,
            components: RefCell::new(Vec::new()),
            remaining: Cell::new(0),
            reached_end: Cell::new(true),
            completion: RefCell::new(Some(completion)),
            planned: Cell::new(false),
            subscription: RefCell::new(None),
        });

        let handler_run = run.clone();
        let subscription = to.observe_data_source(Box::new(move |camera| {
            handler_run.on_camera(camera);
            !handler_run.is_done()
        }));
        if !run.is_done() {
            *run.subscription.borrow_mut() = Some(subscription);
        }

        Cancelable::from_fn(move || run.cancel())
    }
}

struct Component {
    fields: CameraFields,
    animator: Rc<CameraAnimator>,
}

/// State of a single `run` call.
struct TransitionRun {
    manager: Rc<CameraAnimationsManager>,
    max_duration: Duration,
    components: RefCell<Vec<Component>>,
    remaining: Cell<usize>,
    reached_end: Cell<bool>,
    /// Taken when the run completes or is canceled.
    completion: RefCell<Option<TransitionCompletion>>,
    planned: Cell<bool>,
    /// Observation of the destination, released when the run ends.
    subscription: RefCell<Option<Cancelable>>,
}

impl TransitionRun {
    fn is_done(&self) -> bool {
        self.completion.borrow().is_none()
    }

    fn on_camera(self: &Rc<Self>, camera: &CameraOptions) {
        if self.is_done() {
            return;
        }
        if self.planned.replace(true) {
            self.retarget(camera);
        } else {
            self.start(camera);
        }
    }

    fn start(self: &Rc<Self>, camera: &CameraOptions) {
        let map = self.manager.map().clone();
        if !self.manager.animations_enabled() {
            map.set_camera(camera);
            self.finish(true);
            return;
        }

        let current = map.camera_state();
        let plan = keyframes::plan(&current, camera, self.max_duration);
        if plan.is_empty() {
            self.finish(true);
            return;
        }

        let from = CameraOptions::from(current);
        let components: Vec<(Component, Duration)> = plan
            .into_iter()
            .map(|keyframe| {
                let animator = self.manager.make_simple_animator(
                    from.restricted_to(keyframe.fields),
                    keyframe.camera,
                    keyframe.duration,
                    TimingFunction::EaseInOut,
                    AnimationOwner::VIEWPORT_TRANSITION,
                );
                (
                    Component {
                        fields: keyframe.fields,
                        animator,
                    },
                    keyframe.delay,
                )
            })
            .collect();

        self.remaining.set(components.len());
        let mut started = Vec::with_capacity(components.len());
        for (component, delay) in components {
            started.push((component.animator.clone(), delay));
            self.components.borrow_mut().push(component);
        }

        // Completions are attached only after every component is recorded;
        // an animator stopped by a disabled runner completes immediately.
        for (animator, _) in &started {
            let run = Rc::downgrade(self);
            animator.add_completion(move |position| {
                if let Some(run) = run.upgrade() {
                    run.component_finished(position);
                }
            });
        }
        for (animator, delay) in started {
            animator.start_after_delay(delay);
        }
    }

    fn retarget(&self, camera: &CameraOptions) {
        let components: Vec<(CameraFields, Rc<CameraAnimator>)> = self
            .components
            .borrow()
            .iter()
            .map(|component| (component.fields, component.animator.clone()))
            .collect();

        for (fields, animator) in components {
            let target = camera.restricted_to(fields);
            if target.is_empty() {
                continue;
            }
            if animator.is_running() {
                animator.set_to(target);
            } else {
                self.manager.map().set_camera(&target);
            }
        }
    }

    fn component_finished(&self, position: AnimatingPosition) {
        if position != AnimatingPosition::End {
            self.reached_end.set(false);
        }
        let remaining = self.remaining.get().saturating_sub(1);
        self.remaining.set(remaining);
        if remaining == 0 {
            self.finish(self.reached_end.get());
        }
    }

    fn release_subscription(&self) {
        let subscription = self.subscription.borrow_mut().take();
        if let Some(subscription) = subscription {
            subscription.cancel();
        }
    }

    fn finish(&self, success: bool) {
        self.release_subscription();
        let completion = self.completion.borrow_mut().take();
        if let Some(completion) = completion {
            log::debug!("default transition finished (success: {success})");
            completion(success);
        }
    }

    fn cancel(&self) {
        self.completion.borrow_mut().take();
        self.release_subscription();
        let animators: Vec<Rc<CameraAnimator>> = self
            .components
            .borrow()
            .iter()
            .map(|component| component.animator.clone())
            .collect();
        for animator in animators {
            animator.cancel();
        }
    }
}
