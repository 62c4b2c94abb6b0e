//! Configuration loading and schema definitions
//!
//! Tool configuration is read once at startup and passed down by reference.

mod loader;
mod schema;

pub use loader::Config;
pub use schema::*;
