//! Command-line interface module.

mod args;
pub mod purge;
pub mod serve;

pub use args::{Cli, Commands, PurgeArgs};
