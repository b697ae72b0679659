//! WeddingWall utilities.

pub mod error;
pub mod sanitize;

pub use error::*;
pub use sanitize::*;
