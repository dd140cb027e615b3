//! Error types for fleet operations

use thiserror::Error;

use crate::fleet::CreatedRunner;

/// Result type alias for fleet operations
pub type Result<T> = std::result::Result<T, FleetError>;

/// Collaborator that failed to answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collaborator {
    /// The local container runtime
    Runtime,
    /// The remote CI control plane
    ControlPlane,
}

impl std::fmt::Display for Collaborator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Collaborator::Runtime => write!(f, "container runtime"),
            Collaborator::ControlPlane => write!(f, "control plane"),
        }
    }
}

/// Errors that can occur while driving the fleet
#[derive(Debug, Error)]
pub enum FleetError {
    /// Bad count, target or token supplied by the caller
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No managed runner matched the given token
    #[error("Runner {0:?} not found")]
    NotFound(String),

    /// A container id prefix matched more than one runner
    #[error("Ambiguous container id prefix {prefix:?} matches: {}", candidates.join(", "))]
    AmbiguousPrefix {
        /// The prefix as typed
        prefix: String,
        /// Names of all matching runners
        candidates: Vec<String>,
    },

    /// A collaborator could not be reached or rejected our credentials
    #[error("The {collaborator} is unavailable: {message}")]
    Unavailable {
        /// Which collaborator failed
        collaborator: Collaborator,
        /// Details from the collaborator
        message: String,
    },

    /// The access token could not be resolved
    #[error("Could not resolve access token: {0}")]
    Credential(String),

    /// A container runtime operation failed
    #[error("Container runtime error: {0}")]
    Runtime(String),

    /// A control plane request failed
    #[error("Control plane error: {0}")]
    ControlPlane(String),

    /// Scale-up stopped part way; runners created before the failure are kept
    #[error(
        "Failed to create {name}: {source} ({} runner(s) created before the failure){}",
        created.len(),
        unstarted_note(unstarted)
    )]
    PartialCreate {
        /// Name of the runner that failed
        name: String,
        /// Runners created before the failure
        created: Vec<CreatedRunner>,
        /// Container id of the failed runner when it was created but did not start
        unstarted: Option<String>,
        /// Underlying error
        #[source]
        source: Box<FleetError>,
    },
}

fn unstarted_note(unstarted: &Option<String>) -> String {
    match unstarted {
        Some(id) => format!("; container {} was created but not started", id),
        None => String::new(),
    }
}

impl FleetError {
    /// Create an error for an unreachable container runtime
    pub fn runtime_unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            collaborator: Collaborator::Runtime,
            message: message.into(),
        }
    }

    /// Create an error for an unreachable control plane
    pub fn control_plane_unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            collaborator: Collaborator::ControlPlane,
            message: message.into(),
        }
    }

    /// Check if this error means a collaborator could not be used at all
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::Credential(_))
    }

    /// Check if this error is a resolver miss
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_message_names_collaborator() {
        let err = FleetError::runtime_unavailable("connection refused");
        assert_eq!(
            err.to_string(),
            "The container runtime is unavailable: connection refused"
        );
        assert!(err.is_unavailable());
    }

    #[test]
    fn test_ambiguous_prefix_lists_candidates() {
        let err = FleetError::AmbiguousPrefix {
            prefix: "ab".to_string(),
            candidates: vec!["ghr-runner-1".to_string(), "ghr-runner-2".to_string()],
        };
        assert!(err.to_string().contains("ghr-runner-1, ghr-runner-2"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_partial_create_names_unstarted_container() {
        let err = FleetError::PartialCreate {
            name: "ghr-runner-2".to_string(),
            created: Vec::new(),
            unstarted: Some("b00200000000".to_string()),
            source: Box::new(FleetError::Runtime("port in use".to_string())),
        };
        assert!(
            err.to_string()
                .ends_with("; container b00200000000 was created but not started")
        );
    }
}
