// THEORY:
// This file is the main entry point for the `stitch_console` library crate. The
// binary in `main.rs` is a thin shell around the `Console` exported here; keeping
// the loop in the library lets whole sessions be driven from tests with in-memory
// input and output.
//
// The `core_modules` hold the components the console dispatches to: the image
// loader, the viewer, the feature inspector, the stitcher adapter and the
// black-border analysis. All pixel work is delegated to OpenCV through the
// `opencv` crate.

pub mod config;
pub mod console;
pub mod core_modules;
pub mod error;
pub mod session;

pub use config::ConsoleConfig;
pub use console::{Command, Console};
pub use error::{ConsoleError, Result};
