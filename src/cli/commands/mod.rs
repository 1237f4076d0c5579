//! Subcommands of the `aif-control` binary

pub mod plan;
pub mod policies;
pub mod reachability;
