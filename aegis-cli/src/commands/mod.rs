//! Subcommand implementations.

pub mod compare;
pub mod extract;
pub mod identify;
