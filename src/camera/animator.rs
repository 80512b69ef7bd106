use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

use super::animatable::{lerp_angle, Animatable};
use super::clock::Clock;
use super::options::{CameraOptions, Coordinate, EdgeInsets};
use super::owner::AnimationOwner;
use super::timing::TimingFunction;
use crate::map::MapCamera;
use crate::reactive::Signal;

/// Where an animator was when it finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimatingPosition {
    /// The target was reached.
    End,
    /// Stopped early, the camera stays wherever it was.
    Current,
}

/// Lifecycle of a [`CameraAnimator`]. Only moves forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimatorState {
    Inactive,
    Active,
    Stopped(AnimatingPosition),
}

pub type AnimationCompletion = Box<dyn FnOnce(AnimatingPosition)>;

enum Phase {
    Inactive,
    Active { started_at: Instant, delay: Duration },
    Stopped(AnimatingPosition),
}

/// Animates the camera from a start value to a target over a fixed duration.
///
/// Properties set in the target are interpolated; properties the start value
/// lacks jump to the target on the first frame. The anchor is never
/// interpolated.
pub struct CameraAnimator {
    owner: AnimationOwner,
    duration: Duration,
    curve: TimingFunction,
    /// Captured from the camera on the first frame when not given up front.
    from: RefCell<Option<CameraOptions>>,
    to: RefCell<CameraOptions>,
    phase: RefCell<Phase>,
    completions: RefCell<Vec<AnimationCompletion>>,
    status: Signal<AnimatorState>,
    map: Rc<dyn MapCamera>,
    clock: Rc<dyn Clock>,
}

impl CameraAnimator {
    pub fn new(
        owner: AnimationOwner,
        from: Option<CameraOptions>,
        to: CameraOptions,
        duration: Duration,
        curve: TimingFunction,
        map: Rc<dyn MapCamera>,
        clock: Rc<dyn Clock>,
    ) -> Self {
        Self {
            owner,
            duration,
            curve,
            from: RefCell::new(from),
            to: RefCell::new(to),
            phase: RefCell::new(Phase::Inactive),
            completions: RefCell::new(Vec::new()),
            status: Signal::new(AnimatorState::Inactive),
            map,
            clock,
        }
    }

    pub fn owner(&self) -> &AnimationOwner {
        &self.owner
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn state(&self) -> AnimatorState {
        match *self.phase.borrow() {
            Phase::Inactive => AnimatorState::Inactive,
            Phase::Active { .. } => AnimatorState::Active,
            Phase::Stopped(position) => AnimatorState::Stopped(position),
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state(), AnimatorState::Active)
    }

    /// State changes, used by the runner to drop finished animators.
    pub fn status_signal(&self) -> Signal<AnimatorState> {
        self.status.clone()
    }

    pub fn to(&self) -> CameraOptions {
        *self.to.borrow()
    }

    /// Retarget the animation. Progress and timing are kept.
    pub fn set_to(&self, to: CameraOptions) {
        let mut current = self.to.borrow_mut();
        if current.fields() != to.fields() {
            log::warn!(
                "animator {} retargeted with different fields: {:?} -> {:?}",
                self.owner,
                current.fields(),
                to.fields()
            );
        }
        *current = to;
    }

    pub fn start(&self) {
        self.start_after_delay(Duration::ZERO);
    }

    pub fn start_after_delay(&self, delay: Duration) {
        {
            let mut phase = self.phase.borrow_mut();
            if !matches!(*phase, Phase::Inactive) {
                return;
            }
            *phase = Phase::Active {
                started_at: self.clock.now(),
                delay,
            };
        }
        log::trace!("animator {} started (delay {:?})", self.owner, delay);
        self.status.notify(AnimatorState::Active);
    }

    /// Stop where the camera currently is.
    pub fn stop_animation(&self) {
        self.finish(AnimatingPosition::Current);
    }

    /// Same as [`stop_animation`](Self::stop_animation).
    pub fn cancel(&self) {
        self.stop_animation();
    }

    /// Run `completion` when the animator stops. Runs immediately if it
    /// already has.
    pub fn add_completion<F>(&self, completion: F)
    where
        F: FnOnce(AnimatingPosition) + 'static,
    {
        let stopped = match *self.phase.borrow() {
            Phase::Stopped(position) => Some(position),
            _ => None,
        };
        match stopped {
            Some(position) => completion(position),
            None => self.completions.borrow_mut().push(Box::new(completion)),
        }
    }

    /// Advance to `now` and push the interpolated camera to the map.
    pub fn update(&self, now: Instant) {
        let (started_at, delay) = match *self.phase.borrow() {
            Phase::Active { started_at, delay } => (started_at, delay),
            _ => return,
        };
        let elapsed = now.saturating_duration_since(started_at);
        if elapsed < delay {
            return;
        }

        let fraction = if self.duration.is_zero() {
            1.0
        } else {
            ((elapsed - delay).as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
        };

        let from = self.capture_from();
        let to = self.to();
        if fraction >= 1.0 {
            self.map.set_camera(&to);
            self.finish(AnimatingPosition::End);
        } else {
            let frame = interpolate(&from, &to, self.curve.evaluate(fraction));
            self.map.set_camera(&frame);
        }
    }

    fn capture_from(&self) -> CameraOptions {
        let mut from = self.from.borrow_mut();
        *from.get_or_insert_with(|| self.map.camera_state().into())
    }

    fn finish(&self, position: AnimatingPosition) {
        {
            let mut phase = self.phase.borrow_mut();
            if matches!(*phase, Phase::Stopped(_)) {
                return;
            }
            *phase = Phase::Stopped(position);
        }
        log::trace!("animator {} stopped at {:?}", self.owner, position);
        self.status.notify(AnimatorState::Stopped(position));

        let completions = std::mem::take(&mut *self.completions.borrow_mut());
        for completion in completions {
            completion(position);
        }
    }
}

impl fmt::Debug for CameraAnimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CameraAnimator")
            .field("owner", &self.owner)
            .field("state", &self.state())
            .field("duration", &self.duration)
            .finish()
    }
}

fn interpolate(from: &CameraOptions, to: &CameraOptions, t: f64) -> CameraOptions {
    CameraOptions {
        center: to.center.map(|target| match from.center {
            Some(start) => Coordinate::lerp(&start, &target, t),
            None => target,
        }),
        padding: to.padding.map(|target| match from.padding {
            Some(start) => EdgeInsets::lerp(&start, &target, t),
            None => target,
        }),
        anchor: to.anchor,
        zoom: lerp_field(from.zoom, to.zoom, t),
        bearing: to.bearing.map(|target| match from.bearing {
            Some(start) => lerp_angle(start, target, t),
            None => target,
        }),
        pitch: lerp_field(from.pitch, to.pitch, t),
    }
}

fn lerp_field(from: Option<f64>, to: Option<f64>, t: f64) -> Option<f64> {
    to.map(|target| match from {
        Some(start) => f64::lerp(&start, &target, t),
        None => target,
    })
}
