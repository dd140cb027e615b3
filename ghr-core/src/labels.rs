//! Container ownership labels
//!
//! Managed containers are recognised purely by their labels; the runner
//! number is read from a label rather than parsed out of the name.

use std::collections::BTreeMap;

use crate::domain::scope::Scope;
use crate::runtime::LabelSelector;

pub const LABEL_MANAGED: &str = "dev.ghr.managed";
pub const LABEL_RUNNER_NUM: &str = "dev.ghr.runner-num";
pub const LABEL_SCOPE: &str = "dev.ghr.scope";
pub const LABEL_ORG: &str = "dev.ghr.org";
pub const LABEL_REPO_OWNER: &str = "dev.ghr.repo-owner";
pub const LABEL_REPO_NAME: &str = "dev.ghr.repo-name";

/// Labels identifying the fleet a container belongs to
fn scope_labels(scope: &Scope) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    labels.insert(LABEL_MANAGED.to_string(), "true".to_string());
    labels.insert(LABEL_SCOPE.to_string(), scope.kind().to_string());
    match scope {
        Scope::Organization { org } => {
            labels.insert(LABEL_ORG.to_string(), org.clone());
        }
        Scope::Repository { owner, name } => {
            labels.insert(LABEL_REPO_OWNER.to_string(), owner.clone());
            labels.insert(LABEL_REPO_NAME.to_string(), name.clone());
        }
    }
    labels
}

/// Full label set for a new runner container
pub fn managed_labels(scope: &Scope, number: u32) -> BTreeMap<String, String> {
    let mut labels = scope_labels(scope);
    labels.insert(LABEL_RUNNER_NUM.to_string(), number.to_string());
    labels
}

/// Selector matching every managed container on the host
///
/// Scope labels are not part of it: runner names do not carry the scope, so
/// containers left over from an earlier org or repo still occupy their numbers.
pub fn fleet_selector() -> LabelSelector {
    let mut labels = BTreeMap::new();
    labels.insert(LABEL_MANAGED.to_string(), "true".to_string());
    LabelSelector::new(labels)
}

/// Reads the runner number label; 0 when missing or malformed
pub fn runner_number(labels: &BTreeMap<String, String>) -> u32 {
    labels
        .get(LABEL_RUNNER_NUM)
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_org_labels() {
        let scope = Scope::Organization {
            org: "acme".to_string(),
        };
        let labels = managed_labels(&scope, 4);

        assert_eq!(labels.get(LABEL_MANAGED).map(String::as_str), Some("true"));
        assert_eq!(labels.get(LABEL_RUNNER_NUM).map(String::as_str), Some("4"));
        assert_eq!(labels.get(LABEL_SCOPE).map(String::as_str), Some("org"));
        assert_eq!(labels.get(LABEL_ORG).map(String::as_str), Some("acme"));
        assert!(!labels.contains_key(LABEL_REPO_OWNER));
    }

    #[test]
    fn test_selector_matches_any_scope() {
        let repo = Scope::Repository {
            owner: "acme".to_string(),
            name: "widgets".to_string(),
        };
        let org = Scope::Organization {
            org: "other".to_string(),
        };
        let selector = fleet_selector();

        assert_eq!(selector.labels().len(), 1);
        assert!(selector.matches(&managed_labels(&repo, 9)));
        assert!(selector.matches(&managed_labels(&org, 1)));
        assert!(!selector.matches(&BTreeMap::new()));
    }

    #[test]
    fn test_runner_number_parsing() {
        let mut labels = BTreeMap::new();
        assert_eq!(runner_number(&labels), 0);

        labels.insert(LABEL_RUNNER_NUM.to_string(), "12".to_string());
        assert_eq!(runner_number(&labels), 12);

        labels.insert(LABEL_RUNNER_NUM.to_string(), "twelve".to_string());
        assert_eq!(runner_number(&labels), 0);
    }
}
