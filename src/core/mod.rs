// ipsift - core/mod.rs
//
// Core inference and extraction layer.
// Works on in-memory text only; never touches the filesystem or the CLI.

pub mod classify;
pub mod dedup;
pub mod delimiter;
pub mod mixed;
pub mod model;
pub mod protocol;
pub mod table;
pub mod tabular;
pub mod template;
