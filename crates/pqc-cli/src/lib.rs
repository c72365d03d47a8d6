//! Library side of the `pqc` binary: settings file and logging setup.

pub mod config;
pub mod logging;
