use std::borrow::Cow;
use std::fmt;

/// Tag identifying who started an animation.
///
/// Used to cancel a family of animations at once, e.g. a gesture cancels
/// everything owned by [`AnimationOwner::VIEWPORT_TRANSITION`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AnimationOwner(Cow<'static, str>);

impl AnimationOwner {
    pub const GESTURES: AnimationOwner = AnimationOwner(Cow::Borrowed("gestures"));
    pub const CAMERA_ANIMATIONS_MANAGER: AnimationOwner =
        AnimationOwner(Cow::Borrowed("camera-animations-manager"));
    pub const VIEWPORT_TRANSITION: AnimationOwner =
        AnimationOwner(Cow::Borrowed("viewport-transition"));
    pub const VIEWPORT_STATE: AnimationOwner = AnimationOwner(Cow::Borrowed("viewport-state"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnimationOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for AnimationOwner {
    fn from(name: &'static str) -> Self {
        Self::new(name)
    }
}

impl From<String> for AnimationOwner {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}
