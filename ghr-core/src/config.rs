//! Fleet configuration
//!
//! The settings the reconciler needs to name runners and build their
//! containers. How they are loaded from disk is the CLI's concern.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::domain::scope::Scope;

/// Configuration injected into the fleet reconciler
#[derive(Debug, Clone)]
pub struct FleetConfig {
    /// Organization or repository the runners register against
    pub scope: Scope,

    /// Prefix for runner names (`{prefix}-runner-{n}`)
    pub name_prefix: String,

    /// Runner container image
    pub image: String,

    /// Labels the runners register with on the control plane
    pub runner_labels: Vec<String>,

    /// Runner group on the control plane
    pub group: String,

    /// Whether runners deregister after a single job
    pub ephemeral: bool,

    /// Additional environment passed to every runner container
    pub extra_env: BTreeMap<String, String>,

    /// Bind-mount the host's docker socket into runners
    pub mount_docker_socket: bool,

    /// Host path of the docker socket
    pub docker_socket: String,

    /// Container restart policy (e.g. "unless-stopped")
    pub restart_policy: String,

    /// Host directory for per-runner work dirs; named volumes when unset
    pub work_dir_base: Option<String>,

    /// Grace period before a stopping container is killed
    pub stop_timeout: Duration,
}

impl FleetConfig {
    /// Creates a configuration with defaults for the given scope
    pub fn new(scope: Scope) -> Self {
        Self {
            scope,
            name_prefix: "ghr".to_string(),
            image: "myoung34/github-runner:latest".to_string(),
            runner_labels: vec!["local".to_string(), "dev".to_string()],
            group: "Default".to_string(),
            ephemeral: true,
            extra_env: BTreeMap::new(),
            mount_docker_socket: true,
            docker_socket: "/var/run/docker.sock".to_string(),
            restart_policy: "unless-stopped".to_string(),
            work_dir_base: None,
            stop_timeout: Duration::from_secs(30),
        }
    }
}
