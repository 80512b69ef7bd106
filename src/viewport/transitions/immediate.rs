use std::rc::Rc;

use crate::map::MapCamera;
use crate::reactive::Cancelable;
use crate::viewport::state::StateHandle;
use crate::viewport::transition::{TransitionCompletion, ViewportTransition};

/// Jumps to the destination's first camera without animating.
pub struct ImmediateTransition {
    map: Rc<dyn MapCamera>,
}

impl ImmediateTransition {
    pub fn new(map: Rc<dyn MapCamera>) -> Self {
        Self { map }
    }
}

impl ViewportTransition for ImmediateTransition {
    fn run(
        &self,
        _from: Option<&StateHandle>,
        to: &StateHandle,
        completion: TransitionCompletion,
    ) -> Cancelable {
        let map = self.map.clone();
        let mut completion = Some(completion);
        to.observe_data_source(Box::new(move |camera| {
            map.set_camera(camera);
            if let Some(completion) = completion.take() {
                completion(true);
            }
            false
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::animator::tests::RecordingMap;
    use crate::camera::CameraOptions;
    use crate::reactive::Signal;
    use crate::viewport::state::{CameraHandler, ViewportState};
    use std::cell::RefCell;

    struct Source(Signal<CameraOptions>);

    impl ViewportState for Source {
        fn observe_data_source(&self, handler: CameraHandler) -> Cancelable {
            self.0.observe(handler)
        }

        fn start_updating_camera(&self) {}

        fn stop_updating_camera(&self) {}
    }

    fn run(
        signal: &Signal<CameraOptions>,
    ) -> (Rc<RecordingMap>, Rc<RefCell<Vec<bool>>>, Cancelable) {
        let map = Rc::new(RecordingMap::default());
        let transition = ImmediateTransition::new(map.clone());
        let to = StateHandle::new(Source(signal.clone()));
        let results = Rc::new(RefCell::new(Vec::new()));
        let r = results.clone();
        let token = transition.run(None, &to, Box::new(move |ok| r.borrow_mut().push(ok)));
        (map, results, token)
    }

    #[test]
    fn test_applies_first_value_and_completes() {
        let signal = Signal::new(CameraOptions::new().zoom(9.0));
        let (map, results, _token) = run(&signal);

        assert_eq!(*results.borrow(), vec![true]);
        assert_eq!(map.state.borrow().zoom, 9.0);
        assert_eq!(signal.subscriber_count(), 0);

        signal.notify(CameraOptions::new().zoom(1.0));
        assert_eq!(map.sets.borrow().len(), 1);
    }

    #[test]
    fn test_waits_for_first_value() {
        let signal = Signal::empty();
        let (map, results, _token) = run(&signal);
        assert!(results.borrow().is_empty());

        signal.notify(CameraOptions::new().pitch(30.0));

        assert_eq!(*results.borrow(), vec![true]);
        assert_eq!(map.state.borrow().pitch, 30.0);
    }

    #[test]
    fn test_cancel_before_value_never_completes() {
        let signal = Signal::empty();
        let (map, results, token) = run(&signal);

        token.cancel();
        signal.notify(CameraOptions::new().zoom(3.0));

        assert!(results.borrow().is_empty());
        assert!(map.sets.borrow().is_empty());
    }
}
