//! Command-line front end

pub mod commands;

pub use commands::Args;
