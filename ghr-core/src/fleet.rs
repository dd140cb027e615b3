//! Fleet reconciler
//!
//! Drives the runner fleet through the container runtime:
//! - Up: create runners in the lowest free numbers
//! - Down: remove runners, highest numbers first
//! - Scale: converge on an absolute runner count
//! - Stop / Start / Remove: one runner or the whole fleet
//!
//! The reconciler keeps no state of its own. Every operation re-lists the
//! managed containers first, so numbers are always derived from what the
//! runtime reports at that moment.
//!
//! Batch operations run sequentially and never stop on a per-runner failure;
//! failures are logged and collected in a [`BatchReport`].

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::FleetConfig;
use crate::control_plane::ControlPlane;
use crate::credential::CredentialSource;
use crate::domain::runner::{EnrichedRunner, RunnerRecord, RuntimeState};
use crate::error::{FleetError, Result};
use crate::identity::{highest_numbers, next_numbers};
use crate::labels::{fleet_selector, runner_number};
use crate::merge::merge;
use crate::resolver::resolve;
use crate::runtime::{ContainerRuntime, ContainerSummary, LogOptions, LogStream};
use crate::spec::runner_container_spec;

/// Length of the short container id shown to users
const SHORT_ID_LEN: usize = 12;

/// A runner created by [`FleetManager::up`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedRunner {
    pub number: u32,
    pub name: String,
    pub container_id: String,
}

/// Which runners [`FleetManager::down`] removes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownTarget {
    /// The given number of highest-numbered runners
    Highest(usize),
    /// Every managed runner
    All,
}

/// Target of a per-runner lifecycle operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// A single runner addressed by number, name or container id prefix
    One(String),
    /// Every managed runner
    All,
}

/// Lifecycle operation applied to runners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchAction {
    Stop,
    Start,
    Remove,
}

impl BatchAction {
    /// Verb used in progress messages
    pub fn progressive(&self) -> &'static str {
        match self {
            BatchAction::Stop => "Stopping",
            BatchAction::Start => "Starting",
            BatchAction::Remove => "Removing",
        }
    }

    /// Verb used in completion messages
    pub fn past(&self) -> &'static str {
        match self {
            BatchAction::Stop => "Stopped",
            BatchAction::Start => "Started",
            BatchAction::Remove => "Removed",
        }
    }
}

impl std::fmt::Display for BatchAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchAction::Stop => write!(f, "stop"),
            BatchAction::Start => write!(f, "start"),
            BatchAction::Remove => write!(f, "remove"),
        }
    }
}

/// Outcome of one runner inside a batch
#[derive(Debug)]
pub struct BatchItem {
    pub number: u32,
    pub name: String,
    pub result: Result<()>,
}

/// Per-runner outcomes of a batch operation, in the order attempted
#[derive(Debug)]
pub struct BatchReport {
    pub action: BatchAction,
    pub items: Vec<BatchItem>,
}

impl BatchReport {
    fn empty(action: BatchAction) -> Self {
        Self {
            action,
            items: Vec::new(),
        }
    }

    /// Runners the operation succeeded on
    pub fn succeeded(&self) -> impl Iterator<Item = &BatchItem> {
        self.items.iter().filter(|item| item.result.is_ok())
    }

    /// Runners the operation failed on
    pub fn failed(&self) -> impl Iterator<Item = &BatchItem> {
        self.items.iter().filter(|item| item.result.is_err())
    }

    /// Whether every attempted runner succeeded
    pub fn is_success(&self) -> bool {
        self.failed().next().is_none()
    }

    /// Number of runners attempted
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Result of [`FleetManager::scale`]
#[derive(Debug)]
pub enum ScaleOutcome {
    /// Fleet already had the requested size
    Unchanged { current: usize },
    /// Runners were added
    ScaledUp {
        from: usize,
        to: usize,
        created: Vec<CreatedRunner>,
    },
    /// Runners were removed
    ScaledDown {
        from: usize,
        to: usize,
        report: BatchReport,
    },
}

/// Runs `op` on every target in order, collecting a per-runner result
///
/// A failure is logged and recorded; the remaining targets are still
/// attempted.
pub async fn run_batch<F, Fut>(action: BatchAction, targets: Vec<RunnerRecord>, op: F) -> BatchReport
where
    F: Fn(RunnerRecord) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let mut items = Vec::with_capacity(targets.len());

    for record in targets {
        info!("{} {}...", action.progressive(), record.name);

        let result = op(record.clone()).await;
        match &result {
            Ok(()) => info!("  {} {}", action.past(), record.name),
            Err(e) => warn!("  Failed to {} {}: {}", action, record.name, e),
        }

        items.push(BatchItem {
            number: record.number,
            name: record.name,
            result,
        });
    }

    BatchReport { action, items }
}

/// Shortens a runtime container id for display and addressing
pub fn short_id(id: &str) -> String {
    id.chars().take(SHORT_ID_LEN).collect()
}

/// Fleet reconciler over injected collaborators
pub struct FleetManager {
    config: FleetConfig,
    runtime: Arc<dyn ContainerRuntime>,
    credentials: Arc<dyn CredentialSource>,
}

impl FleetManager {
    /// Creates a new fleet manager
    ///
    /// # Arguments
    /// * `config` - Fleet configuration
    /// * `runtime` - Container runtime the fleet lives in
    /// * `credentials` - Source of the access token handed to new runners
    pub fn new(
        config: FleetConfig,
        runtime: Arc<dyn ContainerRuntime>,
        credentials: Arc<dyn CredentialSource>,
    ) -> Self {
        Self {
            config,
            runtime,
            credentials,
        }
    }

    /// Lists managed runners, sorted ascending by number
    pub async fn list(&self) -> Result<Vec<RunnerRecord>> {
        let selector = fleet_selector();
        let containers = self.runtime.list(&selector).await?;

        let mut records: Vec<RunnerRecord> = containers.into_iter().map(to_record).collect();
        records.sort_by_key(|r| r.number);

        debug!("Listed {} managed runner(s)", records.len());
        Ok(records)
    }

    /// Creates and starts `count` new runners in the lowest free numbers
    ///
    /// Stops at the first failure. Runners created before it are kept and
    /// returned inside [`FleetError::PartialCreate`], along with the container
    /// of the failed runner if it was created but could not be started.
    ///
    /// # Returns
    /// The created runners in creation order
    pub async fn up(&self, count: usize) -> Result<Vec<CreatedRunner>> {
        if count < 1 {
            return Err(FleetError::InvalidArgument(format!(
                "runner count must be at least 1, got {}",
                count
            )));
        }

        let token = self.credentials.resolve()?;

        let existing = self.list().await?;
        let occupied: Vec<u32> = existing.iter().map(|r| r.number).collect();
        let numbers = next_numbers(&occupied, count);

        let mut created = Vec::with_capacity(numbers.len());
        for number in numbers {
            let spec = runner_container_spec(&self.config, number, &token);
            info!("Creating {}...", spec.name);

            let container_id = match self.runtime.create(&spec).await {
                Ok(id) => short_id(&id),
                Err(e) => {
                    return Err(FleetError::PartialCreate {
                        name: spec.name,
                        created,
                        unstarted: None,
                        source: Box::new(e),
                    });
                }
            };

            if let Err(e) = self.runtime.start(&container_id).await {
                warn!("  {} was created as {} but did not start", spec.name, container_id);
                return Err(FleetError::PartialCreate {
                    name: spec.name,
                    created,
                    unstarted: Some(container_id),
                    source: Box::new(e),
                });
            }

            info!("  Started {} ({})", spec.name, container_id);
            created.push(CreatedRunner {
                number,
                name: spec.name,
                container_id,
            });
        }

        Ok(created)
    }

    /// Removes runners, highest numbers first
    pub async fn down(&self, target: DownTarget) -> Result<BatchReport> {
        if target == DownTarget::Highest(0) {
            return Err(FleetError::InvalidArgument(
                "runner count must be at least 1, got 0".to_string(),
            ));
        }

        let existing = self.list().await?;
        if existing.is_empty() {
            info!("No managed runners found.");
            return Ok(BatchReport::empty(BatchAction::Remove));
        }

        let count = match target {
            DownTarget::Highest(count) => count,
            DownTarget::All => existing.len(),
        };
        let targets = select_highest(existing, count);

        Ok(self.run(BatchAction::Remove, targets).await)
    }

    /// Adds or removes runners until exactly `target` exist
    pub async fn scale(&self, target: usize) -> Result<ScaleOutcome> {
        let current = self.list().await?.len();

        match current.cmp(&target) {
            std::cmp::Ordering::Equal => {
                info!("Already at {} runners.", target);
                Ok(ScaleOutcome::Unchanged { current })
            }
            std::cmp::Ordering::Less => {
                let diff = target - current;
                info!(
                    "Scaling up: {} -> {} (adding {})",
                    current, target, diff
                );
                let created = self.up(diff).await?;
                Ok(ScaleOutcome::ScaledUp {
                    from: current,
                    to: target,
                    created,
                })
            }
            std::cmp::Ordering::Greater => {
                let diff = current - target;
                info!(
                    "Scaling down: {} -> {} (removing {})",
                    current, target, diff
                );
                let report = self.down(DownTarget::Highest(diff)).await?;
                Ok(ScaleOutcome::ScaledDown {
                    from: current,
                    to: target,
                    report,
                })
            }
        }
    }

    /// Stops one runner or the whole fleet without removing containers
    pub async fn stop(&self, selection: Selection) -> Result<BatchReport> {
        self.apply(BatchAction::Stop, selection).await
    }

    /// Starts one stopped runner or the whole fleet
    pub async fn start(&self, selection: Selection) -> Result<BatchReport> {
        self.apply(BatchAction::Start, selection).await
    }

    /// Removes one runner or the whole fleet
    pub async fn remove(&self, selection: Selection) -> Result<BatchReport> {
        self.apply(BatchAction::Remove, selection).await
    }

    /// Resolves a token to a managed runner
    pub async fn find(&self, token: &str) -> Result<RunnerRecord> {
        let existing = self.list().await?;
        let resolved = resolve(token, &existing, &self.config.name_prefix)?;
        debug!(
            "Resolved {:?} to {} by {}",
            token, resolved.record.name, resolved.kind
        );
        Ok(resolved.record.clone())
    }

    /// Opens the log output of the runner addressed by `token`
    pub async fn logs(&self, token: &str, options: LogOptions) -> Result<(RunnerRecord, LogStream)> {
        let record = self.find(token).await?;
        let stream = self.runtime.logs(&record.container_id, options).await?;
        Ok((record, stream))
    }

    /// Lists runners joined with the control plane's view of them
    ///
    /// Without a control plane every runner has empty remote fields.
    pub async fn status(&self, control_plane: Option<&dyn ControlPlane>) -> Result<Vec<EnrichedRunner>> {
        let records = self.list().await?;

        let remote = match control_plane {
            Some(control_plane) if !records.is_empty() => {
                control_plane.list_workers(&self.config.scope).await?
            }
            _ => Vec::new(),
        };

        Ok(merge(records, remote))
    }

    async fn apply(&self, action: BatchAction, selection: Selection) -> Result<BatchReport> {
        let existing = self.list().await?;

        match selection {
            Selection::All => {
                if existing.is_empty() {
                    info!("No managed runners found.");
                }
                Ok(self.run(action, existing).await)
            }
            Selection::One(token) => {
                let resolved = resolve(&token, &existing, &self.config.name_prefix)?;
                let record = resolved.record.clone();
                debug!("Resolved {:?} to {} by {}", token, record.name, resolved.kind);

                info!("{} {}...", action.progressive(), record.name);
                self.perform(action, &record).await?;

                Ok(BatchReport {
                    action,
                    items: vec![BatchItem {
                        number: record.number,
                        name: record.name,
                        result: Ok(()),
                    }],
                })
            }
        }
    }

    async fn run(&self, action: BatchAction, targets: Vec<RunnerRecord>) -> BatchReport {
        run_batch(action, targets, |record| async move {
            self.perform(action, &record).await
        })
        .await
    }

    async fn perform(&self, action: BatchAction, record: &RunnerRecord) -> Result<()> {
        match action {
            BatchAction::Stop => {
                self.runtime
                    .stop(&record.container_id, self.config.stop_timeout)
                    .await
            }
            BatchAction::Start => self.runtime.start(&record.container_id).await,
            BatchAction::Remove => self.runtime.remove(&record.container_id, true).await,
        }
    }

}

fn to_record(container: ContainerSummary) -> RunnerRecord {
    RunnerRecord {
        number: runner_number(&container.labels),
        name: container.name,
        container_id: short_id(&container.id),
        state: RuntimeState::from(container.state),
        status: container.status,
    }
}

/// Picks the `count` highest-numbered records, highest first
fn select_highest(records: Vec<RunnerRecord>, count: usize) -> Vec<RunnerRecord> {
    let numbers: Vec<u32> = records.iter().map(|r| r.number).collect();

    let mut by_number: HashMap<u32, Vec<RunnerRecord>> = HashMap::new();
    for record in records {
        by_number.entry(record.number).or_default().push(record);
    }

    highest_numbers(&numbers, count)
        .into_iter()
        .filter_map(|number| {
            let bucket = by_number.get_mut(&number)?;
            (!bucket.is_empty()).then(|| bucket.remove(0))
        })
        .collect()
}
