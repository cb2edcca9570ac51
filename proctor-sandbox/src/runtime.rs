//! External process execution

mod group;
mod process;

pub use process::{ProcessOutput, ProcessRunner, ProcessSpec, RunError};
