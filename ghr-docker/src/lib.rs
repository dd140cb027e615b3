//! Docker container runtime
//!
//! Drives runner containers through the `docker` CLI. Another binary can be
//! configured, but it must accept docker's arguments and honour `DOCKER_HOST`:
//! - Checking daemon availability
//! - Listing managed containers by label
//! - Creating, starting, stopping and removing runner containers
//! - Streaming container logs
//!
//! Every child process talks to the endpoint resolved by [`endpoint`] and is
//! killed if the calling future is dropped.

pub mod cli;
pub mod endpoint;
pub mod error;

pub use error::{Result, RuntimeError};

use std::pin::Pin;
use std::process::Stdio;
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;
use ghr_core::runtime::{
    ContainerRuntime, ContainerSpec, ContainerSummary, LabelSelector, LogOptions, LogStream,
};
use tokio::io::{AsyncRead, ReadBuf};
use tokio::process::{Child, ChildStdout, Command};
use tracing::{debug, info};

/// Container runtime backed by the docker CLI
#[derive(Debug, Clone)]
pub struct DockerRuntime {
    binary: String,
    endpoint: String,
}

impl DockerRuntime {
    /// Creates a runtime, resolving the daemon endpoint
    ///
    /// # Arguments
    /// * `binary` - Name or path of the docker-compatible CLI
    /// * `socket` - Fallback socket path when no other endpoint is configured
    pub fn new(binary: impl Into<String>, socket: &str) -> Self {
        Self::with_endpoint(binary, endpoint::resolve_endpoint(socket))
    }

    /// Creates a runtime talking to an explicit endpoint
    pub fn with_endpoint(binary: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Checks that the daemon is reachable
    ///
    /// # Returns
    /// The server version reported by the daemon
    pub async fn check_available(&self) -> Result<String> {
        let args = vec![
            "version".to_string(),
            "--format".to_string(),
            "{{.Server.Version}}".to_string(),
        ];
        let version = self.run(&args, &[]).await?;
        let version = version.trim().to_string();

        info!("Docker is available: {} ({})", version, self.endpoint);
        Ok(version)
    }

    fn command(&self, args: &[String]) -> Command {
        let mut command = Command::new(&self.binary);
        command
            .args(args)
            .env("DOCKER_HOST", &self.endpoint)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        command
    }

    /// Runs a command to completion and returns its stdout
    async fn run(&self, args: &[String], env: &[(String, String)]) -> Result<String> {
        let command_line = cli::display_command(&self.binary, args);
        debug!("Running {}", command_line);

        let output = self
            .command(args)
            .envs(env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .output()
            .await
            .map_err(|source| RuntimeError::BinaryMissing {
                binary: self.binary.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !stdout.trim().is_empty() {
            debug!("stdout: {}", stdout.trim());
        }
        if !stderr.trim().is_empty() {
            debug!("stderr: {}", stderr.trim());
        }

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            return Err(RuntimeError::from_failure(command_line, code, &stderr));
        }

        Ok(stdout)
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn list(&self, selector: &LabelSelector) -> ghr_core::Result<Vec<ContainerSummary>> {
        let output = self.run(&cli::ps_args(selector), &[]).await?;
        Ok(cli::parse_ps_output(&output)?)
    }

    async fn create(&self, spec: &ContainerSpec) -> ghr_core::Result<String> {
        debug!("Creating container {:?}", spec);

        let output = self.run(&cli::create_args(spec), &spec.env).await?;
        let id = output.trim().to_string();
        if id.is_empty() {
            return Err(RuntimeError::Parse(format!("no container id returned for {}", spec.name)).into());
        }
        Ok(id)
    }

    async fn start(&self, reference: &str) -> ghr_core::Result<()> {
        let args = vec!["start".to_string(), reference.to_string()];
        self.run(&args, &[]).await?;
        Ok(())
    }

    async fn stop(&self, reference: &str, timeout: Duration) -> ghr_core::Result<()> {
        self.run(&cli::stop_args(reference, timeout), &[]).await?;
        Ok(())
    }

    async fn remove(&self, reference: &str, force: bool) -> ghr_core::Result<()> {
        self.run(&cli::remove_args(reference, force), &[]).await?;
        Ok(())
    }

    async fn logs(&self, reference: &str, options: LogOptions) -> ghr_core::Result<LogStream> {
        let args = cli::logs_args(reference, options);
        debug!("Streaming {}", cli::display_command(&self.binary, &args));

        // Container stderr goes straight to ours; stdout is the returned stream
        let mut child = self
            .command(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| RuntimeError::BinaryMissing {
                binary: self.binary.clone(),
                source,
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RuntimeError::Parse("log process has no stdout".to_string()))?;

        Ok(Box::pin(ChildLogStream {
            _child: child,
            stdout,
        }))
    }
}

/// Log output of a `docker logs` child; dropping it kills the child
struct ChildLogStream {
    _child: Child,
    stdout: ChildStdout,
}

impl AsyncRead for ChildLogStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.stdout).poll_read(cx, buf)
    }
}
