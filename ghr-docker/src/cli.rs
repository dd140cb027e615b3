//! Docker CLI argument building and output parsing

use std::collections::BTreeMap;
use std::time::Duration;

use ghr_core::runtime::{ContainerSpec, ContainerSummary, LabelSelector, LogOptions, MountKind};

use crate::error::{Result, RuntimeError};

/// `docker ps` format: one container per line, tab separated
pub const PS_FORMAT: &str = "{{.ID}}\t{{.Names}}\t{{.State}}\t{{.Status}}\t{{.Labels}}";

/// Arguments listing all containers matching the selector
pub fn ps_args(selector: &LabelSelector) -> Vec<String> {
    let mut args = vec!["ps".to_string(), "-a".to_string(), "--no-trunc".to_string()];
    for (key, value) in selector.labels() {
        args.push("--filter".to_string());
        args.push(format!("label={}={}", key, value));
    }
    args.push("--format".to_string());
    args.push(PS_FORMAT.to_string());
    args
}

/// Arguments creating a container from a spec
///
/// Environment entries are passed as bare `-e KEY`; the values must be set
/// in the child's environment so they never show up in the process list.
pub fn create_args(spec: &ContainerSpec) -> Vec<String> {
    let mut args = vec![
        "create".to_string(),
        "--name".to_string(),
        spec.name.clone(),
    ];

    for (key, value) in &spec.labels {
        args.push("--label".to_string());
        args.push(format!("{}={}", key, value));
    }

    for (key, _) in &spec.env {
        args.push("-e".to_string());
        args.push(key.clone());
    }

    for mount in &spec.mounts {
        let kind = match mount.kind {
            MountKind::Bind => "bind",
            MountKind::Volume => "volume",
        };
        args.push("--mount".to_string());
        args.push(format!(
            "type={},source={},target={}",
            kind, mount.source, mount.target
        ));
    }

    if !spec.restart_policy.is_empty() {
        args.push("--restart".to_string());
        args.push(spec.restart_policy.clone());
    }

    args.push(spec.image.clone());
    args
}

pub fn stop_args(reference: &str, timeout: Duration) -> Vec<String> {
    vec![
        "stop".to_string(),
        "--time".to_string(),
        timeout.as_secs().to_string(),
        reference.to_string(),
    ]
}

pub fn remove_args(reference: &str, force: bool) -> Vec<String> {
    let mut args = vec!["rm".to_string()];
    if force {
        args.push("-f".to_string());
    }
    args.push(reference.to_string());
    args
}

pub fn logs_args(reference: &str, options: LogOptions) -> Vec<String> {
    let mut args = vec![
        "logs".to_string(),
        "--tail".to_string(),
        options.tail.to_string(),
    ];
    if options.follow {
        args.push("-f".to_string());
    }
    args.push(reference.to_string());
    args
}

/// Parses `docker ps` output produced with [`PS_FORMAT`]
pub fn parse_ps_output(output: &str) -> Result<Vec<ContainerSummary>> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_ps_line)
        .collect()
}

fn parse_ps_line(line: &str) -> Result<ContainerSummary> {
    let fields: Vec<&str> = line.splitn(5, '\t').collect();
    let [id, names, state, status, labels] = fields.as_slice() else {
        return Err(RuntimeError::Parse(format!("malformed ps line: {:?}", line)));
    };

    // Linked containers list several names; the first is the container's own
    let name = names.split(',').next().unwrap_or_default();

    Ok(ContainerSummary {
        id: id.trim().to_string(),
        name: name.trim().trim_start_matches('/').to_string(),
        labels: parse_labels(labels),
        state: state.trim().to_lowercase(),
        status: status.trim().to_string(),
    })
}

/// Parses the `k=v,k=v` label column
pub fn parse_labels(raw: &str) -> BTreeMap<String, String> {
    raw.trim()
        .split(',')
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            let key = key.trim();
            (!key.is_empty()).then(|| (key.to_string(), value.to_string()))
        })
        .collect()
}

/// Renders a command line for logs and error messages
pub fn display_command(binary: &str, args: &[String]) -> String {
    std::iter::once(binary)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}
