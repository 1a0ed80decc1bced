//! Core support modules: CLI arguments, configuration, logging setup.

pub mod args;
pub mod config;
pub mod logging;

pub use args::CommandlineArgs;
pub use config::Settings;
