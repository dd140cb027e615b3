//! Runner container specs
//!
//! Builds the creation spec for a runner container: the environment the
//! runner image reads to register itself, the ownership labels and the mount
//! layout.

use crate::config::FleetConfig;
use crate::domain::scope::Scope;
use crate::identity::runner_name;
use crate::labels::managed_labels;
use crate::runtime::{ContainerSpec, Mount, MountKind};

const DOCKER_SOCKET_TARGET: &str = "/var/run/docker.sock";
const WORK_DIR_TARGET: &str = "/home/runner/_work";

/// Builds the container spec for runner `number`
///
/// # Arguments
/// * `config` - Fleet configuration
/// * `number` - The runner number to create
/// * `token` - Resolved access token handed to the runner
pub fn runner_container_spec(config: &FleetConfig, number: u32, token: &str) -> ContainerSpec {
    let name = runner_name(&config.name_prefix, number);

    let mut env = vec![
        ("RUNNER_SCOPE".to_string(), config.scope.kind().to_string()),
        ("RUNNER_NAME".to_string(), name.clone()),
        ("RUNNER_LABELS".to_string(), config.runner_labels.join(",")),
        ("RUNNER_GROUP".to_string(), config.group.clone()),
        ("ACCESS_TOKEN".to_string(), token.to_string()),
    ];
    match &config.scope {
        Scope::Organization { org } => env.push(("ORG_NAME".to_string(), org.clone())),
        Scope::Repository { owner, name } => env.push((
            "REPO_URL".to_string(),
            format!("https://github.com/{}/{}", owner, name),
        )),
    }
    if config.ephemeral {
        env.push(("EPHEMERAL".to_string(), "true".to_string()));
    }
    for (key, value) in &config.extra_env {
        env.push((key.clone(), value.clone()));
    }

    let mut mounts = Vec::new();
    if config.mount_docker_socket {
        mounts.push(Mount {
            kind: MountKind::Bind,
            source: config.docker_socket.clone(),
            target: DOCKER_SOCKET_TARGET.to_string(),
        });
    }
    match &config.work_dir_base {
        Some(base) => mounts.push(Mount {
            kind: MountKind::Bind,
            source: format!("{}/{}", base.trim_end_matches('/'), name),
            target: WORK_DIR_TARGET.to_string(),
        }),
        None => mounts.push(Mount {
            kind: MountKind::Volume,
            source: format!("{}-work", name),
            target: WORK_DIR_TARGET.to_string(),
        }),
    }

    ContainerSpec {
        name,
        image: config.image.clone(),
        env,
        labels: managed_labels(&config.scope, number),
        mounts,
        restart_policy: config.restart_policy.clone(),
    }
}
