use std::cell::RefCell;
use std::rc::Rc;

use crate::camera::{CameraOptions, EdgeInsets};
use crate::map::{MapCamera, StyleMetadata};
use crate::reactive::{Cancelable, Signal};
use crate::viewport::state::{CameraHandler, UpdatingSlot, ViewportState};

enum Source {
    Fixed,
    StyleDefault {
        padding: EdgeInsets,
        style: Rc<dyn StyleMetadata>,
        pending: RefCell<Option<Cancelable>>,
    },
}

/// A state that shows a camera which does not depend on live data: either a
/// fixed camera or the default camera of the current style.
pub struct CameraViewportState {
    source: Source,
    camera: Signal<CameraOptions>,
    updating: UpdatingSlot,
    map: Rc<dyn MapCamera>,
}

impl CameraViewportState {
    pub fn fixed(camera: CameraOptions, map: Rc<dyn MapCamera>) -> Rc<Self> {
        Rc::new(Self {
            source: Source::Fixed,
            camera: Signal::new(camera),
            updating: UpdatingSlot::default(),
            map,
        })
    }

    /// The style's default camera with `padding` applied. Until the style has
    /// loaded, subscribers are registered but receive nothing.
    pub fn style_default(
        padding: EdgeInsets,
        style: Rc<dyn StyleMetadata>,
        map: Rc<dyn MapCamera>,
    ) -> Rc<Self> {
        let state = Rc::new(Self {
            source: Source::StyleDefault {
                padding,
                style: style.clone(),
                pending: RefCell::new(None),
            },
            camera: Signal::empty(),
            updating: UpdatingSlot::default(),
            map,
        });

        if style.is_style_loaded() {
            state.initialize_camera_options();
        } else {
            let weak = Rc::downgrade(&state);
            let pending = style.on_style_loaded(Box::new(move || {
                if let Some(state) = weak.upgrade() {
                    state.initialize_camera_options();
                }
            }));
            if let Source::StyleDefault { pending: slot, .. } = &state.source {
                *slot.borrow_mut() = Some(pending);
            }
        }

        state
    }

    /// Compute the camera from the loaded style. Only the first call after the
    /// style is available has an effect.
    pub fn initialize_camera_options(&self) {
        let Source::StyleDefault { padding, style, .. } = &self.source else {
            return;
        };
        if self.camera.has_value() || !style.is_style_loaded() {
            return;
        }
        let camera = style.style_default_camera().padding(*padding);
        log::debug!("style default camera available: {:?}", camera);
        self.camera.notify(camera);
    }

    pub fn has_camera(&self) -> bool {
        self.camera.has_value()
    }
}

impl ViewportState for CameraViewportState {
    fn observe_data_source(&self, handler: CameraHandler) -> Cancelable {
        self.camera.observe(handler)
    }

    fn start_updating_camera(&self) {
        let map = self.map.clone();
        let camera = self.camera.clone();
        self.updating.start(move || {
            camera.observe(move |camera| {
                map.set_camera(camera);
                true
            })
        });
    }

    fn stop_updating_camera(&self) {
        self.updating.stop();
    }
}

impl Drop for CameraViewportState {
    fn drop(&mut self) {
        if let Source::StyleDefault { pending, .. } = &self.source {
            if let Some(pending) = pending.borrow_mut().take() {
                pending.cancel();
            }
        }
    }
}
