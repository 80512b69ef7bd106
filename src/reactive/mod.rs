pub mod cancelable;
pub mod scheduler;
pub mod signal;

pub use cancelable::{CancelGuard, Cancelable};
pub use scheduler::{Coordinator, CoordinatorHandle, SchedulerError, Task};
pub use signal::{Signal, create_signal};
