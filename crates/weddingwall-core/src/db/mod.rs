//! Local cache database

pub mod cache_dao;
pub mod connection;
pub mod schema;

pub use cache_dao::CacheEntry;
pub use connection::Database;
