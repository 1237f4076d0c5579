//! CLI infrastructure for the policy-evaluation toolkit
//!
//! This module provides the command-line interface for enumerating policies,
//! planning one step from a JSON problem file and inspecting inductive
//! reachability tables.

pub mod commands;
pub mod logging;
pub mod output;
pub mod problem;
