//! Repository modules for database operations

pub mod cache;
pub mod results;
pub mod tasks;
