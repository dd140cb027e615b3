//! Runner domain model
//!
//! A runner is a managed container registered as a self-hosted job runner.
//! Locally it is described by a [`RunnerRecord`]; the control plane's view of
//! the same runner is a [`RemoteStatus`]. The two are joined by name into an
//! [`EnrichedRunner`] for display.

use serde::{Deserialize, Serialize};

/// A managed runner container as reported by the container runtime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerRecord {
    /// Fleet-wide addressing key, read from the container's number label
    pub number: u32,

    /// Container name, `{prefix}-runner-{number}`
    pub name: String,

    /// Container id (short form)
    pub container_id: String,

    /// Container state as reported by the runtime
    pub state: RuntimeState,

    /// Human-readable status line from the runtime (e.g. "Up 5 minutes")
    pub status: String,
}

/// Container state, passed through from the runtime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RuntimeState {
    Created,
    Running,
    Paused,
    Restarting,
    Removing,
    Exited,
    Dead,
    /// Any state this crate does not know about
    Other(String),
}

impl RuntimeState {
    /// Whether the container is currently running
    pub fn is_running(&self) -> bool {
        matches!(self, RuntimeState::Running)
    }
}

impl From<&str> for RuntimeState {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "created" => RuntimeState::Created,
            "running" => RuntimeState::Running,
            "paused" => RuntimeState::Paused,
            "restarting" => RuntimeState::Restarting,
            "removing" => RuntimeState::Removing,
            "exited" => RuntimeState::Exited,
            "dead" => RuntimeState::Dead,
            _ => RuntimeState::Other(value.trim().to_string()),
        }
    }
}

impl From<String> for RuntimeState {
    fn from(value: String) -> Self {
        RuntimeState::from(value.as_str())
    }
}

impl From<RuntimeState> for String {
    fn from(state: RuntimeState) -> Self {
        state.to_string()
    }
}

impl std::fmt::Display for RuntimeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeState::Created => write!(f, "created"),
            RuntimeState::Running => write!(f, "running"),
            RuntimeState::Paused => write!(f, "paused"),
            RuntimeState::Restarting => write!(f, "restarting"),
            RuntimeState::Removing => write!(f, "removing"),
            RuntimeState::Exited => write!(f, "exited"),
            RuntimeState::Dead => write!(f, "dead"),
            RuntimeState::Other(state) => write!(f, "{}", state),
        }
    }
}

/// Control plane connectivity of a runner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnlineStatus {
    /// Runner is connected and can take jobs
    Online,

    /// Runner is registered but not connected
    Offline,
}

impl std::fmt::Display for OnlineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OnlineStatus::Online => write!(f, "online"),
            OnlineStatus::Offline => write!(f, "offline"),
        }
    }
}

/// A runner as registered on the control plane
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteStatus {
    /// Runner name, used as the join key
    pub name: String,

    /// Control plane id of the registration
    pub remote_id: u64,

    /// Whether the runner is connected
    pub online: OnlineStatus,

    /// Whether the runner is executing a job
    pub busy: bool,

    /// Labels the runner registered with
    #[serde(default)]
    pub labels: Vec<String>,
}

/// A local runner record with the matching control plane entry, if any
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedRunner {
    #[serde(flatten)]
    pub record: RunnerRecord,

    /// Control plane view, `None` when the runner is not registered (yet)
    pub remote: Option<RemoteStatus>,
}

impl EnrichedRunner {
    /// Control plane id, if registered
    pub fn remote_id(&self) -> Option<u64> {
        self.remote.as_ref().map(|r| r.remote_id)
    }

    /// Connectivity as seen by the control plane, if registered
    pub fn online(&self) -> Option<OnlineStatus> {
        self.remote.as_ref().map(|r| r.online)
    }

    /// Busy flag as seen by the control plane, if registered
    pub fn busy(&self) -> Option<bool> {
        self.remote.as_ref().map(|r| r.busy)
    }
}

/// Running/stopped counts for a fleet listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FleetSummary {
    pub total: usize,
    pub running: usize,
    pub stopped: usize,
}

impl FleetSummary {
    /// Count running and stopped runners
    pub fn from_records(records: &[RunnerRecord]) -> Self {
        let running = records.iter().filter(|r| r.state.is_running()).count();
        Self {
            total: records.len(),
            running,
            stopped: records.len() - running,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(number: u32, state: &str) -> RunnerRecord {
        RunnerRecord {
            number,
            name: format!("ghr-runner-{}", number),
            container_id: format!("c0ffee{:06}", number),
            state: RuntimeState::from(state),
            status: String::new(),
        }
    }

    #[test]
    fn test_runtime_state_passes_unknown_values_through() {
        assert_eq!(RuntimeState::from("running"), RuntimeState::Running);
        assert_eq!(RuntimeState::from("Exited"), RuntimeState::Exited);

        let odd = RuntimeState::from("hibernating");
        assert_eq!(odd, RuntimeState::Other("hibernating".to_string()));
        assert_eq!(odd.to_string(), "hibernating");
    }

    #[test]
    fn test_summary_counts_running_and_stopped() {
        let records = vec![
            record(1, "running"),
            record(2, "exited"),
            record(3, "running"),
            record(4, "created"),
        ];

        let summary = FleetSummary::from_records(&records);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.running, 2);
        assert_eq!(summary.stopped, 2);
    }

    #[test]
    fn test_enriched_runner_without_remote_has_empty_fields() {
        let enriched = EnrichedRunner {
            record: record(1, "running"),
            remote: None,
        };
        assert_eq!(enriched.remote_id(), None);
        assert_eq!(enriched.online(), None);
        assert_eq!(enriched.busy(), None);
    }
}
