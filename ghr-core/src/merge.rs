//! Status merger
//!
//! Joins local runner records with the control plane's registrations by
//! runner name. The join is best-effort: a local runner that is not (yet)
//! registered simply has no remote fields.

use std::collections::HashMap;

use crate::domain::runner::{EnrichedRunner, RemoteStatus, RunnerRecord};

/// Attach the matching remote status to every local record
///
/// Output order follows `local`. If `remote` contains duplicate names the last
/// one wins.
pub fn merge(local: Vec<RunnerRecord>, remote: Vec<RemoteStatus>) -> Vec<EnrichedRunner> {
    let by_name: HashMap<String, RemoteStatus> = remote
        .into_iter()
        .map(|status| (status.name.clone(), status))
        .collect();

    local
        .into_iter()
        .map(|record| {
            let remote = by_name.get(&record.name).cloned();
            EnrichedRunner { record, remote }
        })
        .collect()
}
