//! Port traits the domain consumes.

pub mod config_port;
pub mod price_port;
