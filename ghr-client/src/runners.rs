//! Self-hosted runner endpoints

use ghr_core::domain::runner::{OnlineStatus, RemoteStatus};
use serde::Deserialize;

use crate::GitHubClient;
use crate::error::Result;

/// Page size requested from the API (its maximum)
const PER_PAGE: usize = 100;

/// A self-hosted runner as returned by the API
#[derive(Debug, Clone, Deserialize)]
pub struct ApiRunner {
    pub id: u64,
    pub name: String,
    /// "online" or "offline"
    pub status: String,
    #[serde(default)]
    pub busy: bool,
    #[serde(default)]
    pub labels: Vec<ApiRunnerLabel>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiRunnerLabel {
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct RunnersPage {
    total_count: usize,
    #[serde(default)]
    runners: Vec<ApiRunner>,
}

impl From<ApiRunner> for RemoteStatus {
    fn from(runner: ApiRunner) -> Self {
        let online = if runner.status.eq_ignore_ascii_case("online") {
            OnlineStatus::Online
        } else {
            OnlineStatus::Offline
        };

        RemoteStatus {
            name: runner.name,
            remote_id: runner.id,
            online,
            busy: runner.busy,
            labels: runner.labels.into_iter().map(|l| l.name).collect(),
        }
    }
}

impl GitHubClient {
    /// List all self-hosted runners registered to an organization
    ///
    /// # Arguments
    /// * `org` - Organization login
    ///
    /// # Returns
    /// Every runner across all result pages
    pub async fn list_org_runners(&self, org: &str) -> Result<Vec<ApiRunner>> {
        let url = format!("{}/orgs/{}/actions/runners", self.base_url, org);
        self.list_runners(&url).await
    }

    /// List all self-hosted runners registered to a repository
    ///
    /// # Arguments
    /// * `owner` - Repository owner
    /// * `repo` - Repository name
    pub async fn list_repo_runners(&self, owner: &str, repo: &str) -> Result<Vec<ApiRunner>> {
        let url = format!("{}/repos/{}/{}/actions/runners", self.base_url, owner, repo);
        self.list_runners(&url).await
    }

    async fn list_runners(&self, url: &str) -> Result<Vec<ApiRunner>> {
        let mut all = Vec::new();
        let mut page = 1;

        loop {
            let query = [("per_page", PER_PAGE.to_string()), ("page", page.to_string())];
            let result: RunnersPage = self.get_json(url, &query).await?;

            let received = result.runners.len();
            all.extend(result.runners);

            if received < PER_PAGE || all.len() >= result.total_count {
                break;
            }
            page += 1;
        }

        tracing::debug!("Fetched {} runner registration(s) from {}", all.len(), url);
        Ok(all)
    }
}
