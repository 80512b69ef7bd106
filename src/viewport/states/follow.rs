//! Keeps the camera centred on a moving position.
//!
//! # Example
//!
//! ```ignore
//! let position = Signal::empty();
//! let follow = FollowState::new(position.clone(), FollowOptions::default().zoom(15.0), manager);
//!
//! viewport.transition(follow.clone().into(), None, None);
//!
//! // from the location provider
//! position.notify(TrackedPosition::new(Coordinate::new(48.85, 2.35)).heading(90.0));
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::camera::{
    AnimationOwner, CameraAnimationsManager, CameraOptions, Coordinate, EdgeInsets,
    TimingFunction,
};
use crate::reactive::{Cancelable, Signal};
use crate::viewport::state::{CameraHandler, UpdatingSlot, ViewportState};

const UPDATE_DURATION: Duration = Duration::from_secs(1);

/// A position reported by a location provider.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackedPosition {
    pub coordinate: Coordinate,
    /// Direction the device is pointing, in degrees.
    pub heading: Option<f64>,
    /// Direction of travel, in degrees.
    pub course: Option<f64>,
}

impl TrackedPosition {
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            heading: None,
            course: None,
        }
    }

    pub fn heading(mut self, heading: f64) -> Self {
        self.heading = Some(heading);
        self
    }

    pub fn course(mut self, course: f64) -> Self {
        self.course = Some(course);
        self
    }
}

/// How the camera bearing is chosen while following.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum FollowBearing {
    Constant(f64),
    #[default]
    Heading,
    Course,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FollowOptions {
    pub padding: EdgeInsets,
    pub zoom: f64,
    /// `None` leaves the bearing alone.
    pub bearing: Option<FollowBearing>,
    pub pitch: f64,
}

impl Default for FollowOptions {
    fn default() -> Self {
        Self {
            padding: EdgeInsets::zero(),
            zoom: 16.35,
            bearing: Some(FollowBearing::Heading),
            pitch: 45.0,
        }
    }
}

impl FollowOptions {
    pub fn padding(mut self, padding: EdgeInsets) -> Self {
        self.padding = padding;
        self
    }

    pub fn zoom(mut self, zoom: f64) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn bearing(mut self, bearing: Option<FollowBearing>) -> Self {
        self.bearing = bearing;
        self
    }

    pub fn pitch(mut self, pitch: f64) -> Self {
        self.pitch = pitch;
        self
    }

    fn camera_for(&self, position: &TrackedPosition) -> CameraOptions {
        let bearing = match self.bearing {
            Some(FollowBearing::Constant(bearing)) => Some(bearing),
            Some(FollowBearing::Heading) => position.heading,
            Some(FollowBearing::Course) => position.course,
            None => None,
        };
        CameraOptions {
            center: Some(position.coordinate),
            padding: Some(self.padding),
            anchor: None,
            zoom: Some(self.zoom),
            bearing,
            pitch: Some(self.pitch),
        }
    }
}

pub struct FollowState {
    options: RefCell<FollowOptions>,
    position: Signal<TrackedPosition>,
    camera: Signal<CameraOptions>,
    updating: UpdatingSlot,
    manager: Rc<CameraAnimationsManager>,
    /// Observation of `position`, released on drop.
    subscription: RefCell<Option<Cancelable>>,
}

impl FollowState {
    pub fn new(
        position: Signal<TrackedPosition>,
        options: FollowOptions,
        manager: Rc<CameraAnimationsManager>,
    ) -> Rc<Self> {
        let state = Rc::new(Self {
            options: RefCell::new(options),
            position: position.clone(),
            camera: Signal::empty(),
            updating: UpdatingSlot::default(),
            manager,
            subscription: RefCell::new(None),
        });

        let weak: Weak<FollowState> = Rc::downgrade(&state);
        let subscription = position.observe(move |position| match weak.upgrade() {
            Some(state) => {
                state.recompute(position);
                true
            }
            None => false,
        });
        *state.subscription.borrow_mut() = Some(subscription);

        state
    }

    pub fn options(&self) -> FollowOptions {
        *self.options.borrow()
    }

    /// Replace the options. The camera is recomputed when a position is known.
    pub fn set_options(&self, options: FollowOptions) {
        *self.options.borrow_mut() = options;
        if let Some(position) = self.position.get() {
            self.recompute(&position);
        }
    }

    pub fn is_updating_camera(&self) -> bool {
        self.updating.is_active()
    }

    fn recompute(&self, position: &TrackedPosition) {
        let camera = self.options.borrow().camera_for(position);
        self.camera.notify(camera);
    }
}

impl ViewportState for FollowState {
    fn observe_data_source(&self, handler: CameraHandler) -> Cancelable {
        self.camera.observe(handler)
    }

    fn start_updating_camera(&self) {
        let manager = self.manager.clone();
        let camera = self.camera.clone();
        self.updating.start(move || {
            let animations = manager.clone();
            let observation = camera.observe(move |camera| {
                manager.ease_to(
                    *camera,
                    UPDATE_DURATION,
                    TimingFunction::Linear,
                    AnimationOwner::VIEWPORT_STATE,
                    None,
                );
                true
            });
            Cancelable::combined([
                observation,
                Cancelable::from_fn(move || {
                    animations.cancel_animations_with_owners(&[AnimationOwner::VIEWPORT_STATE])
                }),
            ])
        });
    }

    fn stop_updating_camera(&self) {
        self.updating.stop();
    }
}

impl Drop for FollowState {
    fn drop(&mut self) {
        if let Some(subscription) = self.subscription.get_mut().take() {
            subscription.cancel();
        }
    }
}
