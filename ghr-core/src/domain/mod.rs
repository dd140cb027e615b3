//! Domain models
//!
//! Entities shared between the reconciler, the collaborators and the CLI.

pub mod runner;
pub mod scope;
