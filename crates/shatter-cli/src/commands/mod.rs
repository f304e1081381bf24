//! CLI subcommand implementations.

pub mod fracture;
pub mod info;
pub mod sites;
