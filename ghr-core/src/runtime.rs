//! Container runtime collaborator
//!
//! The reconciler talks to the container runtime only through
//! [`ContainerRuntime`]. Implementations are expected to apply their own
//! timeouts; the reconciler performs no retries.

use std::collections::BTreeMap;
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncRead;

use crate::error::Result;

/// Byte stream of container log output
pub type LogStream = Pin<Box<dyn AsyncRead + Send>>;

/// Equality label filter used to select managed containers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSelector {
    labels: BTreeMap<String, String>,
}

impl LabelSelector {
    pub fn new(labels: BTreeMap<String, String>) -> Self {
        Self { labels }
    }

    pub fn labels(&self) -> &BTreeMap<String, String> {
        &self.labels
    }

    /// Whether a container's labels satisfy every selector entry
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.labels
            .iter()
            .all(|(key, value)| labels.get(key) == Some(value))
    }
}

/// A container as listed by the runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSummary {
    pub id: String,
    pub name: String,
    pub labels: BTreeMap<String, String>,
    /// Machine-readable state (running, exited, ...)
    pub state: String,
    /// Human-readable status line
    pub status: String,
}

/// Kind of a container mount
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountKind {
    /// Host path bind mount
    Bind,
    /// Named volume
    Volume,
}

/// A mount in a container creation spec
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mount {
    pub kind: MountKind,
    pub source: String,
    pub target: String,
}

/// Everything the runtime needs to create a runner container
#[derive(Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    /// Environment in insertion order; may contain secrets
    pub env: Vec<(String, String)>,
    pub labels: BTreeMap<String, String>,
    pub mounts: Vec<Mount>,
    pub restart_policy: String,
}

impl ContainerSpec {
    /// Looks up an environment value by key
    pub fn env_value(&self, key: &str) -> Option<&str> {
        self.env
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

// Environment values are omitted: the spec carries the access token.
impl std::fmt::Debug for ContainerSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let env_keys: Vec<&str> = self.env.iter().map(|(k, _)| k.as_str()).collect();
        f.debug_struct("ContainerSpec")
            .field("name", &self.name)
            .field("image", &self.image)
            .field("env", &env_keys)
            .field("labels", &self.labels)
            .field("mounts", &self.mounts)
            .field("restart_policy", &self.restart_policy)
            .finish()
    }
}

/// Options for reading container logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogOptions {
    /// Keep streaming new output
    pub follow: bool,
    /// Number of trailing lines to start from
    pub tail: usize,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            follow: false,
            tail: 100,
        }
    }
}

/// Container runtime operations used by the fleet reconciler
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Lists all containers (running or not) matching the selector
    async fn list(&self, selector: &LabelSelector) -> Result<Vec<ContainerSummary>>;

    /// Creates a container and returns its id; does not start it
    async fn create(&self, spec: &ContainerSpec) -> Result<String>;

    /// Starts a created or stopped container
    async fn start(&self, reference: &str) -> Result<()>;

    /// Stops a running container, killing it after `timeout`
    async fn stop(&self, reference: &str, timeout: Duration) -> Result<()>;

    /// Removes a container; `force` removes it even while running
    async fn remove(&self, reference: &str, force: bool) -> Result<()>;

    /// Opens the container's log output
    async fn logs(&self, reference: &str, options: LogOptions) -> Result<LogStream>;
}
