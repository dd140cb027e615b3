//! Command context
//!
//! Everything a fleet command needs: the validated configuration and the
//! collaborators built from it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use ghr_client::GitHubClient;
use ghr_core::credential::CredentialSource;
use ghr_core::fleet::FleetManager;
use ghr_docker::DockerRuntime;

use crate::config::{self, Config};

pub struct AppContext {
    pub config: Config,
    pub config_path: PathBuf,
}

impl AppContext {
    /// Locates, loads and validates the configuration
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config_path = config::locate(explicit)?;
        let config = Config::load(&config_path)?;
        config.validate().context("invalid config")?;

        tracing::debug!("Loaded config from {}", config_path.display());
        Ok(Self {
            config,
            config_path,
        })
    }

    pub fn docker(&self) -> DockerRuntime {
        DockerRuntime::new(&self.config.docker.binary, &self.config.docker.socket)
    }

    /// Builds the fleet reconciler over the docker runtime
    pub fn fleet(&self) -> Result<FleetManager> {
        Ok(FleetManager::new(
            self.config.fleet_config()?,
            Arc::new(self.docker()),
            Arc::new(self.config.token_reference()),
        ))
    }

    /// Builds an authenticated GitHub client
    pub fn github(&self) -> Result<GitHubClient> {
        let token = self.config.token_reference().resolve()?;
        Ok(GitHubClient::new(token))
    }
}
