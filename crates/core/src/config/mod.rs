//! Configuration loading and schema definitions
//!
//! A TOML file supplies defaults; environment-style values override it.

mod loader;
mod schema;

pub use loader::*;
pub use schema::*;
