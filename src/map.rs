//! Collaborators provided by the host map engine.
//!
//! The viewport never talks to a renderer directly. Everything it needs from
//! the engine goes through these traits, which the host implements on top of
//! its own map object.

use geo_types::Geometry;

use crate::camera::{CameraOptions, CameraState, EdgeInsets};
use crate::reactive::Cancelable;

/// The render target's camera.
pub trait MapCamera {
    fn set_camera(&self, options: &CameraOptions);

    fn camera_state(&self) -> CameraState;
}

/// Style loading status and style-provided defaults.
pub trait StyleMetadata {
    fn is_style_loaded(&self) -> bool;

    /// The camera declared by the loaded style. Only meaningful once
    /// [`is_style_loaded`](Self::is_style_loaded) returns `true`.
    fn style_default_camera(&self) -> CameraOptions;

    /// Run `callback` once, the next time a style finishes loading.
    fn on_style_loaded(&self, callback: Box<dyn FnOnce()>) -> Cancelable;
}

/// Computes a camera that frames a geometry. Projection stays with the host.
pub trait CameraFit {
    fn camera_for_geometry(
        &self,
        geometry: &Geometry<f64>,
        padding: EdgeInsets,
        bearing: Option<f64>,
        pitch: Option<f64>,
    ) -> CameraOptions;
}
