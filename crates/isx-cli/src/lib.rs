//! Command-line driver for the isx completion engine.
//!
//! This crate provides:
//! - `args` - clap definitions of the `isx` command line
//! - `config` - The `isx.json` project file
//! - `driver` - Program assembly, caret resolution and output rendering
//! - `inserter` - `UsingDirectiveInserter`, the host side of import insertion
//! - `tracing_config` - Subscriber setup from `ISX_LOG` and `ISX_LOG_FORMAT`

pub mod args;
pub mod config;
pub mod driver;
pub mod inserter;
pub mod tracing_config;

#[cfg(test)]
#[path = "tests/args_tests.rs"]
mod args_tests;
#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod config_tests;
#[cfg(test)]
#[path = "tests/driver_tests.rs"]
mod driver_tests;
