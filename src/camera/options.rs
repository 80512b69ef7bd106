use bitflags::bitflags;

/// A geographic position in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// The same position with longitude folded into `[-180, 180]`.
    pub fn wrapped(self) -> Self {
        Self {
            latitude: self.latitude,
            longitude: wrap_degrees(self.longitude),
        }
    }
}

/// Insets from the edges of the map view, in screen points.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EdgeInsets {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl EdgeInsets {
    pub fn new(top: f64, left: f64, bottom: f64, right: f64) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    pub fn all(value: f64) -> Self {
        Self::new(value, value, value, value)
    }

    pub fn zero() -> Self {
        Self::default()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

bitflags! {
    /// Which properties of a [`CameraOptions`] are set.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct CameraFields: u8 {
        const CENTER  = 0b000001;
        const PADDING = 0b000010;
        const ANCHOR  = 0b000100;
        const ZOOM    = 0b001000;
        const BEARING = 0b010000;
        const PITCH   = 0b100000;
    }
}

/// A partial camera description. `None` leaves the property unchanged.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CameraOptions {
    pub center: Option<Coordinate>,
    pub padding: Option<EdgeInsets>,
    pub anchor: Option<ScreenPoint>,
    pub zoom: Option<f64>,
    pub bearing: Option<f64>,
    pub pitch: Option<f64>,
}

impl CameraOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn center(mut self, center: Coordinate) -> Self {
        self.center = Some(center);
        self
    }

    pub fn padding(mut self, padding: EdgeInsets) -> Self {
        self.padding = Some(padding);
        self
    }

    pub fn anchor(mut self, anchor: ScreenPoint) -> Self {
        self.anchor = Some(anchor);
        self
    }

    pub fn zoom(mut self, zoom: f64) -> Self {
        self.zoom = Some(zoom);
        self
    }

    pub fn bearing(mut self, bearing: f64) -> Self {
        self.bearing = Some(bearing);
        self
    }

    pub fn pitch(mut self, pitch: f64) -> Self {
        self.pitch = Some(pitch);
        self
    }

    pub fn fields(&self) -> CameraFields {
        let mut fields = CameraFields::empty();
        fields.set(CameraFields::CENTER, self.center.is_some());
        fields.set(CameraFields::PADDING, self.padding.is_some());
        fields.set(CameraFields::ANCHOR, self.anchor.is_some());
        fields.set(CameraFields::ZOOM, self.zoom.is_some());
        fields.set(CameraFields::BEARING, self.bearing.is_some());
        fields.set(CameraFields::PITCH, self.pitch.is_some());
        fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    /// Overlay the set properties of `other` onto `self`.
    pub fn merged(&self, other: &CameraOptions) -> CameraOptions {
        CameraOptions {
            center: other.center.or(self.center),
            padding: other.padding.or(self.padding),
            anchor: other.anchor.or(self.anchor),
            zoom: other.zoom.or(self.zoom),
            bearing: other.bearing.or(self.bearing),
            pitch: other.pitch.or(self.pitch),
        }
    }

    /// Keep only the properties in `fields`.
    pub fn restricted_to(&self, fields: CameraFields) -> CameraOptions {
        CameraOptions {
            center: self.center.filter(|_| fields.contains(CameraFields::CENTER)),
            padding: self.padding.filter(|_| fields.contains(CameraFields::PADDING)),
            anchor: self.anchor.filter(|_| fields.contains(CameraFields::ANCHOR)),
            zoom: self.zoom.filter(|_| fields.contains(CameraFields::ZOOM)),
            bearing: self.bearing.filter(|_| fields.contains(CameraFields::BEARING)),
            pitch: self.pitch.filter(|_| fields.contains(CameraFields::PITCH)),
        }
    }
}

/// The fully resolved camera as reported by the render engine.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CameraState {
    pub center: Coordinate,
    pub padding: EdgeInsets,
    pub zoom: f64,
    pub bearing: f64,
    pub pitch: f64,
}

impl CameraState {
    /// Apply the set properties of `options`. The anchor only affects how the
    /// engine pivots and is not part of the resolved state.
    pub fn applying(&self, options: &CameraOptions) -> CameraState {
        CameraState {
            center: options.center.unwrap_or(self.center),
            padding: options.padding.unwrap_or(self.padding),
            zoom: options.zoom.unwrap_or(self.zoom),
            bearing: options.bearing.unwrap_or(self.bearing),
            pitch: options.pitch.unwrap_or(self.pitch),
        }
    }
}

impl From<CameraState> for CameraOptions {
    fn from(state: CameraState) -> Self {
        CameraOptions {
            center: Some(state.center),
            padding: Some(state.padding),
            anchor: None,
            zoom: Some(state.zoom),
            bearing: Some(state.bearing),
            pitch: Some(state.pitch),
        }
    }
}

/// Fold an angle in degrees into `[-180, 180]`.
pub(crate) fn wrap_degrees(value: f64) -> f64 {
    if (-180.0..=180.0).contains(&value) {
        return value;
    }
    let wrapped = (value + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 && value > 0.0 {
        180.0
    } else {
        wrapped
    }
}
