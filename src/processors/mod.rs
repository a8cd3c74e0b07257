//! Text processing applied around the translation pipeline

pub mod sentences;
