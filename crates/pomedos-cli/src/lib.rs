//! Library components of the `pomedos` command-line tool.

pub mod config;
pub mod logging;
pub mod output;
