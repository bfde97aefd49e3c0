//! Run an external executable with an auto-detected input payload.
//!
//! The input is classified as a remote address, a local file, or literal
//! data. References are passed to the child as its first argument; literal
//! data is written to its stdin. The run resolves to the child's stdout text,
//! a bare success flag when stdout stayed empty, or an error carrying whatever
//! the child wrote to stderr.

pub mod args;
pub mod config;
pub mod error;
pub mod input;
pub mod runner;
pub mod support;

pub use args::{resolve_arguments, ArgumentSpec};
pub use error::RunError;
pub use input::{classify, InputKind};
pub use runner::{run_command, ExitPolicy, Invocation, Outcome, RunReport};
