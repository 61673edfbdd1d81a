// ipsift - app/mod.rs
//
// Application layer: run orchestration between the core engine and the
// filesystem.
// Dependencies: core, platform, util.

pub mod pipeline;
