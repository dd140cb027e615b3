//! Configuration module
//!
//! Loads the YAML configuration (`~/.ghr/config.yaml` by default) and turns
//! it into the reconciler's [`FleetConfig`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use ghr_core::config::FleetConfig;
use ghr_core::credential::TokenReference;
use ghr_core::domain::scope::Scope;
use serde::{Deserialize, Serialize};

/// Directory holding the configuration and `.env` file (`~/.ghr`)
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".ghr"))
        .unwrap_or_else(|| PathBuf::from(".ghr"))
}

pub fn default_config_path() -> PathBuf {
    config_dir().join("config.yaml")
}

pub fn dotenv_path() -> PathBuf {
    config_dir().join(".env")
}

/// Picks the configuration file to load
///
/// An explicit path is used as is; otherwise the default location must exist.
pub fn locate(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    let path = default_config_path();
    if !path.exists() {
        bail!("no config file found; run `ghr init` to create one");
    }
    Ok(path)
}

/// CLI configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// "org" or "repo"
    pub scope: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub org: String,

    pub repo: RepoConfig,

    /// Token reference: `env:NAME` or a literal token
    pub token: String,

    pub runners: RunnerSettings,

    pub docker: DockerSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoConfig {
    pub owner: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerSettings {
    /// Default count for `ghr up`
    pub count: usize,
    pub image: String,
    pub labels: Vec<String>,
    pub group: String,
    pub name_prefix: String,
    pub ephemeral: bool,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_env: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockerSettings {
    /// Docker-compatible CLI to invoke
    pub binary: String,
    pub socket: String,
    pub mount_docker_socket: bool,
    pub restart_policy: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_dir_base: Option<String>,
    /// Seconds a stopping runner gets before it is killed
    pub stop_timeout: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scope: "org".to_string(),
            org: String::new(),
            repo: RepoConfig::default(),
            token: "env:GH_TOKEN".to_string(),
            runners: RunnerSettings::default(),
            docker: DockerSettings::default(),
        }
    }
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            count: 10,
            image: "myoung34/github-runner:latest".to_string(),
            labels: vec!["local".to_string(), "dev".to_string()],
            group: "Default".to_string(),
            name_prefix: "ghr".to_string(),
            ephemeral: true,
            extra_env: BTreeMap::new(),
        }
    }
}

impl Default for DockerSettings {
    fn default() -> Self {
        Self {
            binary: "docker".to_string(),
            socket: "/var/run/docker.sock".to_string(),
            mount_docker_socket: true,
            restart_policy: "unless-stopped".to_string(),
            work_dir_base: None,
            stop_timeout: 30,
        }
    }
}

impl Config {
    /// Reads a configuration file over the defaults
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;

        serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }

    /// Writes the configuration, creating its directory
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory {}", dir.display()))?;
        }

        let data = serde_yaml::to_string(self).context("Failed to serialize config")?;
        std::fs::write(path, data)
            .with_context(|| format!("Failed to write config {}", path.display()))
    }

    /// Checks required fields
    pub fn validate(&self) -> Result<()> {
        match self.scope.as_str() {
            "org" => {
                if self.org.is_empty() {
                    bail!("org name is required when scope is 'org'");
                }
            }
            "repo" => {
                if self.repo.owner.is_empty() || self.repo.name.is_empty() {
                    bail!("repo owner and name are required when scope is 'repo'");
                }
            }
            other => bail!("scope must be 'org' or 'repo', got {:?}", other),
        }

        if self.token.is_empty() {
            bail!("token is required");
        }
        if self.runners.image.is_empty() {
            bail!("runner image is required");
        }
        if self.runners.name_prefix.is_empty() {
            bail!("runner name_prefix is required");
        }

        let valid_prefix = self
            .runners
            .name_prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));
        if !valid_prefix {
            bail!(
                "runner name_prefix {:?} may only contain letters, digits, '_', '.' and '-'",
                self.runners.name_prefix
            );
        }

        Ok(())
    }

    /// The runner scope described by this configuration
    pub fn scope(&self) -> Result<Scope> {
        match self.scope.as_str() {
            "org" => Ok(Scope::Organization {
                org: self.org.clone(),
            }),
            "repo" => Ok(Scope::Repository {
                owner: self.repo.owner.clone(),
                name: self.repo.name.clone(),
            }),
            other => bail!("scope must be 'org' or 'repo', got {:?}", other),
        }
    }

    pub fn token_reference(&self) -> TokenReference {
        TokenReference::new(self.token.clone())
    }

    /// Builds the reconciler configuration
    pub fn fleet_config(&self) -> Result<FleetConfig> {
        let mut fleet = FleetConfig::new(self.scope()?);
        fleet.name_prefix = self.runners.name_prefix.clone();
        fleet.image = self.runners.image.clone();
        fleet.runner_labels = self.runners.labels.clone();
        fleet.group = self.runners.group.clone();
        fleet.ephemeral = self.runners.ephemeral;
        fleet.extra_env = self.runners.extra_env.clone();
        fleet.mount_docker_socket = self.docker.mount_docker_socket;
        fleet.docker_socket = self.docker.socket.clone();
        fleet.restart_policy = self.docker.restart_policy.clone();
        fleet.work_dir_base = self
            .docker
            .work_dir_base
            .clone()
            .filter(|base| !base.is_empty());
        fleet.stop_timeout = Duration::from_secs(self.docker.stop_timeout);
        Ok(fleet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn org_config() -> Config {
        Config {
            org: "acme".to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "scope: repo\nrepo:\n  owner: octo\n  name: app\nrunners:\n  count: 3\n  labels: [gpu]\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();

        assert_eq!(config.scope, "repo");
        assert_eq!(config.repo.owner, "octo");
        assert_eq!(config.runners.count, 3);
        assert_eq!(config.runners.labels, vec!["gpu"]);
        assert_eq!(config.runners.image, "myoung34/github-runner:latest");
        assert_eq!(config.token, "env:GH_TOKEN");
        assert_eq!(config.docker.restart_policy, "unless-stopped");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let mut config = org_config();
        config
            .runners
            .extra_env
            .insert("DISABLE_AUTO_UPDATE".to_string(), "1".to_string());
        config.docker.work_dir_base = Some("/srv/runners".to_string());
        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_rejects_invalid_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "runners: [not, a, map]\n").unwrap();

        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_validate() {
        assert!(org_config().validate().is_ok());

        let cases: Vec<(Box<dyn Fn(&mut Config)>, &str)> = vec![
            (Box::new(|c| c.scope = "enterprise".to_string()), "scope must be"),
            (Box::new(|c| c.org.clear()), "org name is required"),
            (
                Box::new(|c| {
                    c.scope = "repo".to_string();
                    c.repo.owner = "octo".to_string();
                }),
                "repo owner and name",
            ),
            (Box::new(|c| c.token.clear()), "token is required"),
            (Box::new(|c| c.runners.image.clear()), "image is required"),
            (Box::new(|c| c.runners.name_prefix.clear()), "name_prefix is required"),
            (
                Box::new(|c| c.runners.name_prefix = "my runners".to_string()),
                "may only contain",
            ),
        ];

        for (mutate, expected) in cases {
            let mut config = org_config();
            mutate(&mut config);
            let err = config.validate().unwrap_err().to_string();
            assert!(err.contains(expected), "{err:?} should contain {expected:?}");
        }
    }

    #[test]
    fn test_fleet_config() {
        let mut config = org_config();
        config.runners.name_prefix = "ci".to_string();
        config.docker.stop_timeout = 5;
        config.docker.work_dir_base = Some(String::new());

        let fleet = config.fleet_config().unwrap();

        assert_eq!(
            fleet.scope,
            Scope::Organization {
                org: "acme".to_string()
            }
        );
        assert_eq!(fleet.name_prefix, "ci");
        assert_eq!(fleet.stop_timeout, Duration::from_secs(5));
        assert_eq!(fleet.work_dir_base, None);
    }

    #[test]
    fn test_locate_explicit_path() {
        let path = Path::new("/tmp/ghr-custom.yaml");
        assert_eq!(locate(Some(path)).unwrap(), path);
    }
}
