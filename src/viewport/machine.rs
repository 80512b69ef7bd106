//! The viewport status machine.
//!
//! [`Viewport`] decides which state or transition is allowed to move the
//! camera. Every request tears down whatever was running before wiring up the
//! next one, so at most one driver is alive at a time.
//!
//! # Example
//!
//! ```ignore
//! let viewport = Viewport::new(map, default_transition, ViewportOptions::default());
//!
//! let _status = viewport.status_signal().observe(|status| {
//!     log::info!("viewport is now {:?}", status);
//!     true
//! });
//!
//! viewport.transition(follow.into(), None, Some(Box::new(|ok| {
//!     log::info!("arrived: {ok}");
//! })));
//!
//! // A pan gesture takes over
//! viewport.handle_user_interaction();
//! ```

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use super::state::StateHandle;
use super::status::{StatusChange, ViewportStatus, ViewportStatusChangeReason};
use super::transition::{TransitionCompletion, TransitionHandle};
use crate::map::MapCamera;
use crate::reactive::{Cancelable, Signal};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewportOptions {
    /// Go idle when the user starts interacting with the map.
    pub transitions_to_idle_upon_user_interaction: bool,
}

impl Default for ViewportOptions {
    fn default() -> Self {
        Self {
            transitions_to_idle_upon_user_interaction: true,
        }
    }
}

impl ViewportOptions {
    pub fn transitions_to_idle_upon_user_interaction(mut self, enabled: bool) -> Self {
        self.transitions_to_idle_upon_user_interaction = enabled;
        self
    }
}

pub struct Viewport {
    /// Source of truth. The signals below may lag behind while a
    /// notification pass is running.
    current_status: RefCell<ViewportStatus>,
    status: Signal<ViewportStatus>,
    changes: Signal<StatusChange>,
    /// Changes not yet published, in the order they happened.
    pending_changes: RefCell<VecDeque<StatusChange>>,
    publishing: Cell<bool>,
    /// Releases whatever currently drives the camera.
    current: RefCell<Option<Cancelable>>,
    default_transition: RefCell<TransitionHandle>,
    options: Cell<ViewportOptions>,
    map: Rc<dyn MapCamera>,
    weak_self: Weak<Viewport>,
}

impl Viewport {
    pub fn new(
        map: Rc<dyn MapCamera>,
        default_transition: TransitionHandle,
        options: ViewportOptions,
    ) -> Rc<Self> {
        Rc::new_cyclic(|weak_self| Self {
            current_status: RefCell::new(ViewportStatus::Idle),
            status: Signal::new(ViewportStatus::Idle),
            changes: Signal::empty(),
            pending_changes: RefCell::new(VecDeque::new()),
            publishing: Cell::new(false),
            current: RefCell::new(None),
            default_transition: RefCell::new(default_transition),
            options: Cell::new(options),
            map,
            weak_self: weak_self.clone(),
        })
    }

    pub fn status(&self) -> ViewportStatus {
        self.current_status.borrow().clone()
    }

    pub fn status_signal(&self) -> Signal<ViewportStatus> {
        self.status.clone()
    }

    /// Every status change together with its reason.
    pub fn change_signal(&self) -> Signal<StatusChange> {
        self.changes.clone()
    }

    pub fn options(&self) -> ViewportOptions {
        self.options.get()
    }

    pub fn set_options(&self, options: ViewportOptions) {
        self.options.set(options);
    }

    pub fn default_transition(&self) -> TransitionHandle {
        self.default_transition.borrow().clone()
    }

    pub fn set_default_transition(&self, transition: TransitionHandle) {
        *self.default_transition.borrow_mut() = transition;
    }

    pub fn idle(&self) {
        self.go_idle(ViewportStatusChangeReason::IdleRequested);
    }

    /// Called by the host when a gesture starts.
    pub fn handle_user_interaction(&self) {
        if self.options.get().transitions_to_idle_upon_user_interaction && !self.status().is_idle()
        {
            self.go_idle(ViewportStatusChangeReason::UserInteraction);
        }
    }

    /// Hand the camera to `state` without a transition.
    ///
    /// The first camera the state produces is applied directly; after that
    /// the state updates the camera itself.
    pub fn set_state(&self, state: StateHandle) {
        if self.status().state() == Some(&state) {
            return;
        }
        self.cancel_current();

        let map = self.map.clone();
        let first_value = state.observe_data_source(Box::new(move |camera| {
            map.set_camera(camera);
            false
        }));
        state.start_updating_camera();

        let updating = state.clone();
        self.replace_current(Cancelable::combined([
            first_value,
            Cancelable::from_fn(move || updating.stop_updating_camera()),
        ]));
        self.set_status(
            ViewportStatus::State(state),
            ViewportStatusChangeReason::StateRequested,
        );
    }

    /// Move to `to_state` using `transition`, or the default transition.
    ///
    /// `completion` receives `true` once `to_state` has taken over. It
    /// receives `false` when the transition fails, is superseded by another
    /// request, or is dropped because a transition to the same state is
    /// already running.
    pub fn transition(
        &self,
        to_state: StateHandle,
        transition: Option<TransitionHandle>,
        completion: Option<TransitionCompletion>,
    ) {
        let status = self.status();
        match &status {
            ViewportStatus::State(state) if *state == to_state => {
                log::debug!("viewport already in requested state");
                if let Some(completion) = completion {
                    completion(true);
                }
                return;
            }
            ViewportStatus::Transition(_, destination) if *destination == to_state => {
                log::debug!("transition to requested state already running, ignoring request");
                if let Some(completion) = completion {
                    completion(false);
                }
                return;
            }
            _ => {}
        }

        let from_state = status.state().cloned();
        self.cancel_current();

        let transition = transition.unwrap_or_else(|| self.default_transition());
        let completion = Rc::new(RefCell::new(completion));
        let settled = Rc::new(Cell::new(false));

        let on_done: TransitionCompletion = {
            let weak = self.weak_self.clone();
            let to_state = to_state.clone();
            let completion = completion.clone();
            let settled = settled.clone();
            Box::new(move |success| {
                if settled.replace(true) {
                    return;
                }
                if let Some(viewport) = weak.upgrade() {
                    viewport.finish_transition(to_state, success);
                }
                let completion = completion.borrow_mut().take();
                if let Some(completion) = completion {
                    completion(success);
                }
            })
        };

        let run = transition.run(from_state.as_ref(), &to_state, on_done);
        if settled.get() {
            return;
        }

        self.replace_current(Cancelable::from_fn(move || {
            settled.set(true);
            run.cancel();
            let completion = completion.borrow_mut().take();
            if let Some(completion) = completion {
                completion(false);
            }
        }));
        self.set_status(
            ViewportStatus::Transition(transition, to_state),
            ViewportStatusChangeReason::TransitionStarted,
        );
    }

    fn finish_transition(&self, to_state: StateHandle, success: bool) {
        // The run is over; its cancelable has nothing left to release.
        self.current.borrow_mut().take();

        if success {
            to_state.start_updating_camera();
            let updating = to_state.clone();
            self.replace_current(Cancelable::from_fn(move || {
                updating.stop_updating_camera()
            }));
            self.set_status(
                ViewportStatus::State(to_state),
                ViewportStatusChangeReason::TransitionSucceeded,
            );
        } else {
            self.set_status(
                ViewportStatus::Idle,
                ViewportStatusChangeReason::TransitionFailed,
            );
        }
    }

    fn go_idle(&self, reason: ViewportStatusChangeReason) {
        self.cancel_current();
        self.set_status(ViewportStatus::Idle, reason);
    }

    fn cancel_current(&self) {
        let current = self.current.borrow_mut().take();
        if let Some(current) = current {
            current.cancel();
        }
    }

    fn replace_current(&self, cancelable: Cancelable) {
        let previous = self.current.borrow_mut().replace(cancelable);
        if let Some(previous) = previous {
            previous.cancel();
        }
    }

    fn set_status(&self, status: ViewportStatus, reason: ViewportStatusChangeReason) {
        let from = self.current_status.replace(status.clone());
        if from == status {
            return;
        }
        log::debug!("viewport status {:?} -> {:?} ({:?})", from, status, reason);
        self.pending_changes.borrow_mut().push_back(StatusChange {
            from,
            to: status,
            reason,
        });
        self.publish_changes();
    }

    /// Publish queued changes in order. Observers that change the status
    /// again only enqueue; the outermost call delivers their changes after
    /// the current one.
    fn publish_changes(&self) {
        if self.publishing.replace(true) {
            return;
        }
        loop {
            let next = self.pending_changes.borrow_mut().pop_front();
            let Some(change) = next else {
                break;
            };
            self.status.notify(change.to.clone());
            self.changes.notify(change);
        }
        self.publishing.set(false);
    }
}

impl Drop for Viewport {
    fn drop(&mut self) {
        if let Some(current) = self.current.get_mut().take() {
            current.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::animator::tests::RecordingMap;
    use crate::camera::CameraOptions;
    use crate::viewport::state::{CameraHandler, ViewportState};
    use crate::viewport::transition::ViewportTransition;

    /// A state with an observable lifecycle.
    struct ProbeState {
        camera: Signal<CameraOptions>,
        updating: Cell<bool>,
        starts: Cell<usize>,
        stops: Cell<usize>,
    }

    impl ProbeState {
        fn new(camera: CameraOptions) -> Rc<Self> {
            Rc::new(Self {
                camera: Signal::new(camera),
                updating: Cell::new(false),
                starts: Cell::new(0),
                stops: Cell::new(0),
            })
        }
    }

    impl ViewportState for ProbeState {
        fn observe_data_source(&self, handler: CameraHandler) -> Cancelable {
            self.camera.observe(handler)
        }

        fn start_updating_camera(&self) {
            self.updating.set(true);
            self.starts.set(self.starts.get() + 1);
        }

        fn stop_updating_camera(&self) {
            self.updating.set(false);
            self.stops.set(self.stops.get() + 1);
        }
    }

    /// A transition that completes only when told to.
    #[derive(Default)]
    struct ManualTransition {
        runs: Cell<usize>,
        pending: RefCell<Option<TransitionCompletion>>,
        cancels: Rc<Cell<usize>>,
    }

    impl ManualTransition {
        fn complete(&self, success: bool) {
            let completion = self.pending.borrow_mut().take();
            if let Some(completion) = completion {
                completion(success);
            }
        }
    }

    impl ViewportTransition for ManualTransition {
        fn run(
            &self,
            _from: Option<&StateHandle>,
            _to: &StateHandle,
            completion: TransitionCompletion,
        ) -> Cancelable {
            self.runs.set(self.runs.get() + 1);
            *self.pending.borrow_mut() = Some(completion);
            let cancels = self.cancels.clone();
            Cancelable::from_fn(move || cancels.set(cancels.get() + 1))
        }
    }

    struct Fixture {
        map: Rc<RecordingMap>,
        transition: Rc<ManualTransition>,
        viewport: Rc<Viewport>,
    }

    fn fixture() -> Fixture {
        let map = Rc::new(RecordingMap::default());
        let transition = Rc::new(ManualTransition::default());
        let viewport = Viewport::new(
            map.clone(),
            transition.clone().into(),
            ViewportOptions::default(),
        );
        Fixture {
            map,
            transition,
            viewport,
        }
    }

    fn recorder() -> (Rc<RefCell<Vec<bool>>>, Option<TransitionCompletion>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        (seen, Some(Box::new(move |ok| s.borrow_mut().push(ok))))
    }

    #[test]
    fn test_initial_status_is_idle() {
        let f = fixture();
        assert_eq!(f.viewport.status(), ViewportStatus::Idle);
    }

    #[test]
    fn test_set_state_applies_first_value_and_starts_updating() {
        let f = fixture();
        let state = ProbeState::new(CameraOptions::new().zoom(7.0));

        f.viewport.set_state(state.clone().into());

        assert_eq!(f.viewport.status(), ViewportStatus::State(state.clone().into()));
        assert_eq!(*f.map.sets.borrow(), vec![CameraOptions::new().zoom(7.0)]);
        assert!(state.updating.get());
        assert_eq!(state.camera.subscriber_count(), 0);
    }

    #[test]
    fn test_idle_stops_state() {
        let f = fixture();
        let state = ProbeState::new(CameraOptions::new());
        f.viewport.set_state(state.clone().into());

        f.viewport.idle();
        f.viewport.idle();

        assert_eq!(f.viewport.status(), ViewportStatus::Idle);
        assert!(!state.updating.get());
        assert_eq!(state.stops.get(), 1);
    }

    #[test]
    fn test_transition_enters_state_on_success() {
        let f = fixture();
        let state = ProbeState::new(CameraOptions::new());
        let handle: StateHandle = state.clone().into();
        let (seen, completion) = recorder();

        f.viewport.transition(handle.clone(), None, completion);
        assert_eq!(
            f.viewport.status(),
            ViewportStatus::Transition(f.transition.clone().into(), handle.clone())
        );

        f.transition.complete(true);

        assert_eq!(f.viewport.status(), ViewportStatus::State(handle));
        assert!(state.updating.get());
        assert_eq!(*seen.borrow(), vec![true]);
    }

    #[test]
    fn test_failed_transition_goes_idle() {
        let f = fixture();
        let state = ProbeState::new(CameraOptions::new());
        let (seen, completion) = recorder();
        let changes = Rc::new(RefCell::new(Vec::new()));
        let c = changes.clone();
        let _token = f.viewport.change_signal().observe(move |change| {
            c.borrow_mut().push(change.reason);
            true
        });

        f.viewport.transition(state.clone().into(), None, completion);
        f.transition.complete(false);

        assert_eq!(f.viewport.status(), ViewportStatus::Idle);
        assert!(!state.updating.get());
        assert_eq!(*seen.borrow(), vec![false]);
        assert_eq!(
            *changes.borrow(),
            vec![
                ViewportStatusChangeReason::TransitionStarted,
                ViewportStatusChangeReason::TransitionFailed,
            ]
        );
    }

    #[test]
    fn test_same_destination_is_not_restarted() {
        let f = fixture();
        let state: StateHandle = ProbeState::new(CameraOptions::new()).into();
        let other = Rc::new(ManualTransition::default());
        let (first_seen, first) = recorder();
        let (second_seen, second) = recorder();

        f.viewport.transition(state.clone(), None, first);
        f.viewport.transition(state.clone(), Some(other.clone().into()), second);

        assert_eq!(f.transition.runs.get(), 1);
        assert_eq!(other.runs.get(), 0);
        assert_eq!(*second_seen.borrow(), vec![false]);
        assert!(first_seen.borrow().is_empty());

        f.transition.complete(true);
        assert_eq!(*first_seen.borrow(), vec![true]);
    }

    #[test]
    fn test_transition_to_current_state_completes_immediately() {
        let f = fixture();
        let state: StateHandle = ProbeState::new(CameraOptions::new()).into();
        f.viewport.set_state(state.clone());
        let (seen, completion) = recorder();

        f.viewport.transition(state.clone(), None, completion);

        assert_eq!(f.transition.runs.get(), 0);
        assert_eq!(*seen.borrow(), vec![true]);
        assert_eq!(f.viewport.status(), ViewportStatus::State(state));
    }

    #[test]
    fn test_new_request_cancels_in_flight_transition() {
        let f = fixture();
        let a: StateHandle = ProbeState::new(CameraOptions::new()).into();
        let b = ProbeState::new(CameraOptions::new());
        let (a_seen, a_completion) = recorder();

        f.viewport.transition(a, None, a_completion);
        f.viewport.set_state(b.clone().into());

        assert_eq!(f.transition.cancels.get(), 1);
        assert_eq!(*a_seen.borrow(), vec![false]);
        assert_eq!(f.viewport.status(), ViewportStatus::State(b.into()));

        // A late completion from the superseded run is ignored.
        f.transition.complete(true);
        assert_eq!(*a_seen.borrow(), vec![false]);
    }

    #[test]
    fn test_transition_from_state_stops_previous_state() {
        let f = fixture();
        let a = ProbeState::new(CameraOptions::new());
        let b: StateHandle = ProbeState::new(CameraOptions::new()).into();
        f.viewport.set_state(a.clone().into());

        f.viewport.transition(b, None, None);

        assert!(!a.updating.get());
        assert_eq!(a.stops.get(), 1);
    }

    #[test]
    fn test_user_interaction_idles_when_enabled() {
        let f = fixture();
        let state = ProbeState::new(CameraOptions::new());
        f.viewport.set_state(state.clone().into());

        f.viewport
            .set_options(ViewportOptions::default().transitions_to_idle_upon_user_interaction(false));
        f.viewport.handle_user_interaction();
        assert!(!f.viewport.status().is_idle());

        f.viewport.set_options(ViewportOptions::default());
        f.viewport.handle_user_interaction();
        assert!(f.viewport.status().is_idle());
        assert!(!state.updating.get());
    }

    #[test]
    fn test_observer_reentering_machine_sees_changes_in_order() {
        let f = fixture();
        let state: StateHandle = ProbeState::new(CameraOptions::new()).into();
        let weak = Rc::downgrade(&f.viewport);
        let statuses = Rc::new(RefCell::new(Vec::new()));
        let s = statuses.clone();
        let _status_token = f.viewport.status_signal().observe(move |status| {
            s.borrow_mut().push(status.is_idle());
            if status.state().is_some() {
                if let Some(viewport) = weak.upgrade() {
                    viewport.idle();
                }
            }
            true
        });
        let changes = Rc::new(RefCell::new(Vec::new()));
        let c = changes.clone();
        let _change_token = f.viewport.change_signal().observe(move |change| {
            c.borrow_mut().push((change.from.is_idle(), change.to.is_idle(), change.reason));
            true
        });

        f.viewport.set_state(state.clone());

        assert!(f.viewport.status().is_idle());
        assert_eq!(*statuses.borrow(), vec![true, false, true]);
        assert_eq!(
            *changes.borrow(),
            vec![
                (true, false, ViewportStatusChangeReason::StateRequested),
                (false, true, ViewportStatusChangeReason::IdleRequested),
            ]
        );
        assert_eq!(
            f.viewport.change_signal().get().map(|change| change.to),
            Some(ViewportStatus::Idle)
        );
        assert_eq!(f.viewport.status_signal().get(), Some(ViewportStatus::Idle));
    }

    #[test]
    fn test_drop_releases_current_driver() {
        let f = fixture();
        let state = ProbeState::new(CameraOptions::new());
        f.viewport.set_state(state.clone().into());

        drop(f.viewport);

        assert!(!state.updating.get());
    }
}
