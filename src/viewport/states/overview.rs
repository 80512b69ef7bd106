use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use geo_types::Geometry;

use crate::camera::{
    AnimationOwner, CameraAnimationsManager, CameraOptions, EdgeInsets, TimingFunction,
};
use crate::map::CameraFit;
use crate::reactive::{Cancelable, Signal};
use crate::viewport::state::{CameraHandler, UpdatingSlot, ViewportState};

#[derive(Clone, Debug, PartialEq)]
pub struct OverviewOptions {
    pub geometry: Geometry<f64>,
    pub padding: EdgeInsets,
    pub bearing: Option<f64>,
    pub pitch: Option<f64>,
    /// Seconds used to ease towards each new camera while updating.
    /// Negative values are treated as zero.
    pub animation_duration: f64,
}

impl OverviewOptions {
    pub fn new(geometry: impl Into<Geometry<f64>>) -> Self {
        Self {
            geometry: geometry.into(),
            padding: EdgeInsets::zero(),
            bearing: Some(0.0),
            pitch: Some(0.0),
            animation_duration: 1.0,
        }
    }

    pub fn padding(mut self, padding: EdgeInsets) -> Self {
        self.padding = padding;
        self
    }

    pub fn bearing(mut self, bearing: Option<f64>) -> Self {
        self.bearing = bearing;
        self
    }

    pub fn pitch(mut self, pitch: Option<f64>) -> Self {
        self.pitch = pitch;
        self
    }

    pub fn animation_duration(mut self, seconds: f64) -> Self {
        self.animation_duration = seconds;
        self
    }

    fn easing_duration(&self) -> Duration {
        // NaN and negative values become zero, values too large for a
        // `Duration` saturate.
        Duration::try_from_secs_f64(self.animation_duration.max(0.0)).unwrap_or(Duration::MAX)
    }
}

/// Frames a geometry.
pub struct OverviewState {
    options: Rc<RefCell<OverviewOptions>>,
    camera: Signal<CameraOptions>,
    updating: UpdatingSlot,
    fit: Rc<dyn CameraFit>,
    manager: Rc<CameraAnimationsManager>,
}

impl OverviewState {
    pub fn new(
        options: OverviewOptions,
        fit: Rc<dyn CameraFit>,
        manager: Rc<CameraAnimationsManager>,
    ) -> Rc<Self> {
        let camera = Signal::new(Self::fit_camera(&*fit, &options));
        Rc::new(Self {
            options: Rc::new(RefCell::new(options)),
            camera,
            updating: UpdatingSlot::default(),
            fit,
            manager,
        })
    }

    pub fn options(&self) -> OverviewOptions {
        self.options.borrow().clone()
    }

    pub fn set_options(&self, options: OverviewOptions) {
        let camera = Self::fit_camera(&*self.fit, &options);
        *self.options.borrow_mut() = options;
        self.camera.notify(camera);
    }

    pub fn is_updating_camera(&self) -> bool {
        self.updating.is_active()
    }

    fn fit_camera(fit: &dyn CameraFit, options: &OverviewOptions) -> CameraOptions {
        fit.camera_for_geometry(
            &options.geometry,
            options.padding,
            options.bearing,
            options.pitch,
        )
    }
}

impl ViewportState for OverviewState {
    fn observe_data_source(&self, handler: CameraHandler) -> Cancelable {
        self.camera.observe(handler)
    }

    fn start_updating_camera(&self) {
        let manager = self.manager.clone();
        let camera = self.camera.clone();
        let options = self.options.clone();
        self.updating.start(move || {
            let animations = manager.clone();
            let observation = camera.observe(move |camera| {
                let duration = options.borrow().easing_duration();
                manager.ease_to(
                    *camera,
                    duration,
                    TimingFunction::EaseInOut,
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
