//! WeddingWall command module
//!
//! Commands run against [`crate::AppState`] and return `CommandError` on
//! failure, so the CLI prints the same `[E_CODE] message` shape the FFI does.

pub mod auth;
pub mod gallery;
pub mod lightbox;
pub mod logging;
pub mod photos;
pub mod settings;

pub use auth::*;
pub use gallery::*;
pub use lightbox::*;
pub use logging::*;
pub use photos::*;
pub use settings::*;
