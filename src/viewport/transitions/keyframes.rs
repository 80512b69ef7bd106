//! Planning of the per-property animations used by [`DefaultTransition`].
//!
//! Each camera property group gets its own animator with its own delay and
//! duration. When zooming in, the camera first travels to the new centre and
//! zooms once it is on its way; when zooming out, it zooms out first and then
//! travels. Bearing finishes together with the zoom and pitch settles shortly
//! after it.
//!
//! [`DefaultTransition`]: super::DefaultTransition

use std::time::Duration;

use crate::camera::{CameraFields, CameraOptions, CameraState};

const CENTER_DURATION: f64 = 1.0;
/// Zoom levels per second.
const ZOOM_RATE: f64 = 2.2;
const MAX_ZOOM_DURATION: f64 = 3.0;
const BEARING_DURATION: f64 = 1.8;
const PITCH_DURATION: f64 = 1.2;
const PITCH_AFTER_ZOOM: f64 = 0.1;
const PADDING_DURATION: f64 = 1.2;

/// One animator's worth of a transition.
#[derive(Clone, Debug, PartialEq)]
pub struct Keyframe {
    pub fields: CameraFields,
    pub camera: CameraOptions,
    pub delay: Duration,
    pub duration: Duration,
}

impl Keyframe {
    fn new(fields: CameraFields, target: &CameraOptions, delay: f64, duration: f64) -> Self {
        Self {
            fields,
            camera: target.restricted_to(fields),
            delay: Duration::from_secs_f64(delay.max(0.0)),
            duration: Duration::from_secs_f64(duration.max(0.0)),
        }
    }

    pub fn end(&self) -> Duration {
        self.delay + self.duration
    }

    fn scaled(&self, factor: f64) -> Self {
        Self {
            fields: self.fields,
            camera: self.camera,
            delay: self.delay.mul_f64(factor),
            duration: self.duration.mul_f64(factor),
        }
    }
}

/// Split the move from `current` to `target` into keyframes. Only the
/// properties `target` sets are animated. The whole plan is compressed to fit
/// within `max_duration`.
pub fn plan(
    current: &CameraState,
    target: &CameraOptions,
    max_duration: Duration,
) -> Vec<Keyframe> {
    let zoom_delta = target.zoom.map_or(0.0, |zoom| zoom - current.zoom);
    let zoom_duration = (zoom_delta.abs() / ZOOM_RATE).min(MAX_ZOOM_DURATION);

    let set = target.fields();
    let moves_center = set.contains(CameraFields::CENTER);

    // Zoom waits for the centre only when there is a centre to move.
    let (center_delay, zoom_delay) = if zoom_delta < 0.0 {
        (zoom_duration / 2.0, 0.0)
    } else if moves_center {
        (0.0, CENTER_DURATION / 2.0)
    } else {
        (0.0, 0.0)
    };
    let zoom_end = zoom_delay + zoom_duration;

    let mut keyframes = Vec::new();

    if moves_center {
        keyframes.push(Keyframe::new(
            CameraFields::CENTER,
            target,
            center_delay,
            CENTER_DURATION,
        ));
    }
    if set.contains(CameraFields::ZOOM) {
        keyframes.push(Keyframe::new(CameraFields::ZOOM, target, zoom_delay, zoom_duration));
    }
    if set.contains(CameraFields::BEARING) {
        keyframes.push(Keyframe::new(
            CameraFields::BEARING,
            target,
            zoom_end - BEARING_DURATION,
            BEARING_DURATION,
        ));
    }
    if set.contains(CameraFields::PITCH) {
        keyframes.push(Keyframe::new(
            CameraFields::PITCH,
            target,
            zoom_end + PITCH_AFTER_ZOOM - PITCH_DURATION,
            PITCH_DURATION,
        ));
    }
    let insets = set & (CameraFields::PADDING | CameraFields::ANCHOR);
    if !insets.is_empty() {
        keyframes.push(Keyframe::new(insets, target, 0.0, PADDING_DURATION));
    }

    let total = keyframes
        .iter()
        .map(Keyframe::end)
        .max()
        .unwrap_or(Duration::ZERO);
    if total > max_duration && !total.is_zero() {
        let factor = max_duration.as_secs_f64() / total.as_secs_f64();
        log::trace!("compressing transition of {:?} by {:.3}", total, factor);
        keyframes = keyframes.iter().map(|keyframe| keyframe.scaled(factor)).collect();
    }

    keyframes
}
