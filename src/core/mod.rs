//! Core translation engine module

pub mod cloud;
pub mod config;
pub mod errors;
#[cfg(feature = "local")]
pub mod local;
pub mod models;
pub mod pipeline;
pub mod tokens;
pub mod translator;
