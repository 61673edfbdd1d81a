// ipsift - platform/mod.rs
//
// Platform abstraction layer: filesystem and config directory access.
// Dependencies: standard library, directories, toml.
// Must NOT depend on: app.

pub mod config;
pub mod fs;
