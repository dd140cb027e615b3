//! Fleet scope
//!
//! A fleet registers either against an organization-wide job queue or against
//! a single repository.

use serde::{Deserialize, Serialize};

/// Where the fleet's runners register on the control plane
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scope {
    /// Organization-wide runners
    Organization { org: String },

    /// Runners bound to one repository
    Repository { owner: String, name: String },
}

impl Scope {
    /// Short scope identifier as stored in labels and passed to the runner image
    pub fn kind(&self) -> &'static str {
        match self {
            Scope::Organization { .. } => "org",
            Scope::Repository { .. } => "repo",
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Organization { org } => write!(f, "org {}", org),
            Scope::Repository { owner, name } => write!(f, "repo {}/{}", owner, name),
        }
    }
}
