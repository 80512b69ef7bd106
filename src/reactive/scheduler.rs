//! Marshaling work onto the coordinating thread.
//!
//! All viewport objects are single-threaded. Location providers, network
//! callbacks and other producers that live on background threads hand their
//! work to a [`CoordinatorHandle`], and the owning thread runs it the next
//! time it pumps the [`Coordinator`].
//!
//! # Example
//!
//! ```ignore
//! let mut coordinator = Coordinator::<Viewport>::new()?;
//! let handle = coordinator.handle();
//!
//! std::thread::spawn(move || {
//!     handle.run(|viewport| viewport.idle()).ok();
//! });
//!
//! coordinator.dispatch(Some(Duration::from_millis(16)), &mut viewport)?;
//! ```

use std::time::Duration;

use calloop::channel::{self, Channel, Event, Sender};
use calloop::EventLoop;
use thiserror::Error;

/// A unit of work to run on the coordinating thread.
pub type Task<D> = Box<dyn FnOnce(&mut D) + Send>;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] calloop::Error),
    #[error("coordinator has been dropped")]
    Disconnected,
}

/// Owns the calloop event loop that executes marshaled tasks against `D`.
pub struct Coordinator<D: 'static> {
    event_loop: EventLoop<'static, D>,
    sender: Sender<Task<D>>,
}

impl<D: 'static> Coordinator<D> {
    pub fn new() -> Result<Self, SchedulerError> {
        let event_loop = EventLoop::try_new()?;
        let (sender, receiver): (Sender<Task<D>>, Channel<Task<D>>) = channel::channel();

        event_loop
            .handle()
            .insert_source(receiver, |event, _, data: &mut D| match event {
                Event::Msg(task) => task(data),
                Event::Closed => log::debug!("all coordinator handles dropped"),
            })
            .map_err(|e| e.error)?;

        Ok(Self { event_loop, sender })
    }

    /// A thread-safe handle for submitting tasks.
    pub fn handle(&self) -> CoordinatorHandle<D> {
        CoordinatorHandle {
            sender: self.sender.clone(),
        }
    }

    /// Wait up to `timeout` for tasks and run everything that is ready.
    /// `None` blocks until at least one event arrives.
    pub fn dispatch(
        &mut self,
        timeout: Option<Duration>,
        data: &mut D,
    ) -> Result<(), SchedulerError> {
        self.event_loop.dispatch(timeout, data)?;
        Ok(())
    }

    /// Run the tasks that are already queued without blocking.
    pub fn dispatch_pending(&mut self, data: &mut D) -> Result<(), SchedulerError> {
        self.dispatch(Some(Duration::ZERO), data)
    }
}

/// Sending half of a [`Coordinator`]. Cheap to clone and `Send`.
pub struct CoordinatorHandle<D> {
    sender: Sender<Task<D>>,
}

impl<D> Clone for CoordinatorHandle<D> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<D: 'static> CoordinatorHandle<D> {
    /// Queue `task` to run on the coordinating thread.
    pub fn run<F>(&self, task: F) -> Result<(), SchedulerError>
    where
        F: FnOnce(&mut D) + Send + 'static,
    {
        self.sender
            .send(Box::new(task))
            .map_err(|_| SchedulerError::Disconnected)
    }
}
