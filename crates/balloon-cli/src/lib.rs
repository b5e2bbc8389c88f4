//! Library components of the balloon schema CLI.

pub mod commands;
pub mod logging;
