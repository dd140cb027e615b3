//! ghr Core
//!
//! Core types and fleet logic for the ghr self-hosted runner manager.
//!
//! This crate contains:
//! - Domain types: runner records, remote status, scope
//! - Identity scheme: runner numbering and naming
//! - Resolver: addressing a runner by number, name or container id prefix
//! - Fleet reconciler: up/down/scale and per-runner lifecycle operations
//! - Status merger: joining local container state with the control plane view
//!
//! The container runtime and the control plane are consumed through the
//! traits in [`runtime`] and [`control_plane`]; concrete implementations live
//! in `ghr-docker` and `ghr-client`.

pub mod config;
pub mod control_plane;
pub mod credential;
pub mod domain;
pub mod error;
pub mod fleet;
pub mod identity;
pub mod labels;
pub mod merge;
pub mod resolver;
pub mod runtime;
pub mod spec;

pub use error::{FleetError, Result};
