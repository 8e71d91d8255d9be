//! Application layer: path resolution and the host-facing command table.

pub mod command;
pub mod resolver;
pub mod status;
