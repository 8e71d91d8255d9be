//! Core domain types shared across the resolver and its hosts.

pub mod errors;
pub mod model;
