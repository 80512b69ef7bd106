//! Timing curves for camera animations.
//!
//! A timing function maps the elapsed fraction of an animation to the
//! fraction of the way the camera should be between its start and target.
//!
//! `EaseIn`, `EaseOut` and `EaseInOut` are the CSS `ease-in`, `ease-out` and
//! `ease-in-out` beziers. Follow updates use [`TimingFunction::Linear`] and
//! transitions use [`TimingFunction::EaseInOut`].
//!
//! ## Example
//!
//! ```ignore
//! manager.ease_to(
//!     camera,
//!     Duration::from_secs(1),
//!     TimingFunction::EaseOut,
//!     AnimationOwner::CAMERA_ANIMATIONS_MANAGER,
//!     None,
//! );
//! ```

use std::fmt;
use std::rc::Rc;

#[derive(Clone, Default)]
pub enum TimingFunction {
    Linear,
    EaseIn,
    EaseOut,
    #[default]
    EaseInOut,
    /// Control points `(x1, y1, x2, y2)` of a unit cubic bezier.
    CubicBezier(f64, f64, f64, f64),
    Custom(Rc<dyn Fn(f64) -> f64>),
}

impl TimingFunction {
    /// Evaluate the curve at `t` in `[0, 1]`. Input outside that range is
    /// clamped and both endpoints map to themselves exactly.
    pub fn evaluate(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        if t == 0.0 || t == 1.0 {
            return t;
        }
        if let TimingFunction::Custom(curve) = self {
            return curve(t);
        }
        match self.control_points() {
            Some((x1, y1, x2, y2)) => cubic_bezier(t, x1, y1, x2, y2),
            None => t,
        }
    }

    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(f64) -> f64 + 'static,
    {
        TimingFunction::Custom(Rc::new(f))
    }

    /// Bezier control points of the named curves, using the CSS presets.
    /// `None` for linear and custom curves.
    pub fn control_points(&self) -> Option<(f64, f64, f64, f64)> {
        match *self {
            TimingFunction::Linear | TimingFunction::Custom(_) => None,
            TimingFunction::EaseIn => Some((0.42, 0.0, 1.0, 1.0)),
            TimingFunction::EaseOut => Some((0.0, 0.0, 0.58, 1.0)),
            TimingFunction::EaseInOut => Some((0.42, 0.0, 0.58, 1.0)),
            TimingFunction::CubicBezier(x1, y1, x2, y2) => Some((x1, y1, x2, y2)),
        }
    }
}

impl fmt::Debug for TimingFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimingFunction::Linear => "Linear",
            TimingFunction::EaseIn => "EaseIn",
            TimingFunction::EaseOut => "EaseOut",
            TimingFunction::EaseInOut => "EaseInOut",
            TimingFunction::CubicBezier(..) => {
                return f
                    .debug_tuple("CubicBezier")
                    .field(&self.control_points())
                    .finish();
            }
            TimingFunction::Custom(_) => "Custom",
        };
        f.write_str(name)
    }
}

/// Solves x(s) = t with Newton-Raphson, then returns y(s).
fn cubic_bezier(t: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let mut s = t;
    for _ in 0..8 {
        let x = bezier_component(s, x1, x2);
        let slope = bezier_slope(s, x1, x2);
        if slope.abs() < 1e-6 {
            break;
        }
        s -= (x - t) / slope;
    }
    bezier_component(s, y1, y2)
}

fn bezier_component(s: f64, p1: f64, p2: f64) -> f64 {
    let ms = 1.0 - s;
    3.0 * ms * ms * s * p1 + 3.0 * ms * s * s * p2 + s * s * s
}

fn bezier_slope(s: f64, p1: f64, p2: f64) -> f64 {
    let ms = 1.0 - s;
    3.0 * ms * ms * p1 + 6.0 * ms * s * (p2 - p1) + 3.0 * s * s * (1.0 - p2)
}
