//! Follows a simulated vehicle, then zooms out to an overview of its route.
//!
//! Run with `RUST_LOG=debug cargo run --example follow_demo` to see the
//! viewport's status changes.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use geo_types::{Geometry, LineString};
use meridian::prelude::*;

/// Keeps the camera state in memory so it can be printed.
#[derive(Default)]
struct ConsoleMap {
    state: RefCell<CameraState>,
}

impl MapCamera for ConsoleMap {
    fn set_camera(&self, options: &CameraOptions) {
        let next = self.state.borrow().applying(options);
        *self.state.borrow_mut() = next;
    }

    fn camera_state(&self) -> CameraState {
        *self.state.borrow()
    }
}

/// Centres on the middle of the geometry's bounding box at a fixed zoom.
struct BoundsFit;

impl CameraFit for BoundsFit {
    fn camera_for_geometry(
        &self,
        geometry: &Geometry<f64>,
        padding: EdgeInsets,
        bearing: Option<f64>,
        pitch: Option<f64>,
    ) -> CameraOptions {
        let coords: Vec<geo_types::Coord<f64>> = match geometry {
            Geometry::Point(point) => vec![point.0],
            Geometry::LineString(line) => line.coords().copied().collect(),
            _ => Vec::new(),
        };
        let (mut min_x, mut min_y) = (f64::MAX, f64::MAX);
        let (mut max_x, mut max_y) = (f64::MIN, f64::MIN);
        for coord in coords {
            min_x = min_x.min(coord.x);
            min_y = min_y.min(coord.y);
            max_x = max_x.max(coord.x);
            max_y = max_y.max(coord.y);
        }

        let mut camera = CameraOptions::new()
            .center(Coordinate::new((min_y + max_y) / 2.0, (min_x + max_x) / 2.0))
            .padding(padding)
            .zoom(11.0);
        camera.bearing = bearing;
        camera.pitch = pitch;
        camera
    }
}

struct App {
    position: Signal<TrackedPosition>,
}

fn print_camera(frame: usize, map: &ConsoleMap, viewport: &Viewport) {
    let camera = map.camera_state();
    println!(
        "frame {frame:>3}  center ({:.5}, {:.5})  zoom {:>5.2}  bearing {:>6.1}  pitch {:>4.1}  {:?}",
        camera.center.latitude,
        camera.center.longitude,
        camera.zoom,
        camera.bearing,
        camera.pitch,
        viewport.status(),
    );
}

fn main() -> Result<(), SchedulerError> {
    env_logger::init();

    let map = Rc::new(ConsoleMap::default());
    let map_viewport = MapViewport::with_config(
        map.clone(),
        ViewportConfig::default().default_transition(
            DefaultTransitionOptions::default().max_duration(Duration::from_secs(2)),
        ),
    );

    let route: Vec<(f64, f64)> = (0..40)
        .map(|n| (2.3522 + n as f64 * 0.0004, 48.8566 + n as f64 * 0.0002))
        .collect();

    let mut app = App {
        position: Signal::empty(),
    };
    let follow = map_viewport.make_follow_state(app.position.clone(), FollowOptions::default());
    let overview = map_viewport.make_overview_state(
        OverviewOptions::new(LineString::from(route.clone())).padding(EdgeInsets::all(40.0)),
        Rc::new(BoundsFit),
    );

    let _changes = map_viewport.viewport().change_signal().observe(|change| {
        println!("status: {:?} ({:?})", change.to, change.reason);
        true
    });

    let mut coordinator = Coordinator::<App>::new()?;
    let handle = coordinator.handle();
    let provider = std::thread::spawn(move || {
        for (n, (lon, lat)) in route.into_iter().enumerate() {
            let position = TrackedPosition::new(Coordinate::new(lat, lon)).heading(n as f64 * 2.0);
            if handle
                .run(move |app: &mut App| app.position.notify(position))
                .is_err()
            {
                break;
            }
            std::thread::sleep(Duration::from_millis(50));
        }
    });

    map_viewport
        .viewport()
        .transition(follow.into(), None, None);

    for frame in 0..180 {
        coordinator.dispatch(Some(Duration::from_millis(16)), &mut app)?;
        map_viewport.tick();
        if frame == 120 {
            map_viewport
                .viewport()
                .transition(overview.clone().into(), None, None);
        }
        if frame % 10 == 0 {
            print_camera(frame, &map, map_viewport.viewport());
        }
    }

    if provider.join().is_err() {
        log::warn!("position provider panicked");
    }
    Ok(())
}
