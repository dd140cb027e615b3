//! Docker endpoint discovery
//!
//! Resolution order:
//! 1. `DOCKER_HOST`, used as is
//! 2. The endpoint of the active docker CLI context (OrbStack, colima, ...)
//! 3. `unix://{socket}` from the fleet configuration

use std::path::Path;

use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::debug;

#[derive(Debug, Deserialize)]
struct CliConfig {
    #[serde(rename = "currentContext", default)]
    current_context: String,
}

#[derive(Debug, Deserialize)]
struct ContextMeta {
    #[serde(rename = "Endpoints", default)]
    endpoints: std::collections::HashMap<String, ContextEndpoint>,
}

#[derive(Debug, Deserialize)]
struct ContextEndpoint {
    #[serde(rename = "Host", default)]
    host: String,
}

/// Resolves the daemon endpoint from the process environment
///
/// # Arguments
/// * `socket` - Fallback socket path from the configuration
pub fn resolve_endpoint(socket: &str) -> String {
    let docker_host = std::env::var("DOCKER_HOST").ok();
    let docker_dir = dirs::home_dir().map(|home| home.join(".docker"));
    resolve_endpoint_with(docker_host, docker_dir.as_deref(), socket)
}

/// Resolves the daemon endpoint from explicit inputs
pub fn resolve_endpoint_with(
    docker_host: Option<String>,
    docker_dir: Option<&Path>,
    socket: &str,
) -> String {
    if let Some(host) = docker_host.filter(|h| !h.is_empty()) {
        debug!("Using DOCKER_HOST endpoint {}", host);
        return host;
    }

    if let Some(host) = docker_dir.and_then(context_endpoint) {
        debug!("Using docker context endpoint {}", host);
        return host;
    }

    format!("unix://{}", socket)
}

/// Reads the endpoint of the active docker CLI context
///
/// Returns `None` when there is no config, the context is "default", or the
/// context metadata has no docker endpoint.
pub fn context_endpoint(docker_dir: &Path) -> Option<String> {
    let data = std::fs::read(docker_dir.join("config.json")).ok()?;
    let config: CliConfig = serde_json::from_slice(&data).ok()?;

    let context = config.current_context;
    if context.is_empty() || context == "default" {
        return None;
    }

    // The CLI stores context metadata under the sha256 of the context name
    let hash = format!("{:x}", Sha256::digest(context.as_bytes()));
    let meta_path = docker_dir
        .join("contexts")
        .join("meta")
        .join(hash)
        .join("meta.json");

    let data = std::fs::read(meta_path).ok()?;
    let meta: ContextMeta = serde_json::from_slice(&data).ok()?;

    meta.endpoints
        .get("docker")
        .map(|endpoint| endpoint.host.clone())
        .filter(|host| !host.is_empty())
}
