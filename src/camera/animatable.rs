use super::options::{wrap_degrees, Coordinate, EdgeInsets};

/// Types that can be interpolated between two values.
pub trait Animatable: Clone + PartialEq + 'static {
    /// `t = 0.0` returns `from`, `t = 1.0` returns `to`.
    fn lerp(from: &Self, to: &Self, t: f64) -> Self;
}

impl Animatable for f64 {
    fn lerp(from: &Self, to: &Self, t: f64) -> Self {
        from + (to - from) * t
    }
}

impl Animatable for EdgeInsets {
    fn lerp(from: &Self, to: &Self, t: f64) -> Self {
        EdgeInsets {
            top: f64::lerp(&from.top, &to.top, t),
            left: f64::lerp(&from.left, &to.left, t),
            bottom: f64::lerp(&from.bottom, &to.bottom, t),
            right: f64::lerp(&from.right, &to.right, t),
        }
    }
}

/// Longitude follows the shorter way around the antimeridian and the result
/// is wrapped back into `[-180, 180]`.
impl Animatable for Coordinate {
    fn lerp(from: &Self, to: &Self, t: f64) -> Self {
        Coordinate {
            latitude: f64::lerp(&from.latitude, &to.latitude, t),
            longitude: wrap_degrees(lerp_angle(from.longitude, to.longitude, t)),
        }
    }
}

/// Interpolate between two angles in degrees along the shortest arc.
/// The result is not normalized.
pub fn lerp_angle(from: f64, to: f64, t: f64) -> f64 {
    let mut delta = (to - from).rem_euclid(360.0);
    if delta > 180.0 {
        delta -= 360.0;
    }
    from + delta * t
}
