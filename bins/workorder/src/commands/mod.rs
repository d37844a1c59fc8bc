//! CLI command implementations

pub mod geocode;
pub mod health;
pub mod locations;
pub mod map;
pub mod orders;
pub mod whoami;
