mod default;
mod immediate;
pub mod keyframes;

pub use default::{DefaultTransition, DefaultTransitionOptions};
pub use immediate::ImmediateTransition;
