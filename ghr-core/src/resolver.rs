//! Runner resolver
//!
//! Resolves what a user typed (a number, a full name, or a container id
//! prefix) to exactly one managed runner. Rules are tried in priority order;
//! the first rule that matches wins.

use crate::domain::runner::RunnerRecord;
use crate::error::{FleetError, Result};

/// Which rule matched a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Token equals the runner name
    Name,
    /// `{prefix}-runner-{token}` equals the runner name
    PrefixedNumber,
    /// Token equals the runner number
    Number,
    /// Token is a prefix of the container id
    ContainerIdPrefix,
}

impl std::fmt::Display for MatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchKind::Name => write!(f, "name"),
            MatchKind::PrefixedNumber => write!(f, "number"),
            MatchKind::Number => write!(f, "number label"),
            MatchKind::ContainerIdPrefix => write!(f, "container id prefix"),
        }
    }
}

/// A resolved runner and the rule that found it
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
    pub record: &'a RunnerRecord,
    pub kind: MatchKind,
}

/// Resolve a token to a single runner
///
/// Exact rules (name, prefixed number, number) are checked across all records
/// before falling back to a container id prefix match.
///
/// # Arguments
/// * `token` - What the user typed
/// * `records` - Current managed runners
/// * `name_prefix` - Configured runner name prefix
///
/// # Errors
/// Returns an error if:
/// - No runner matches the token
/// - The token is a container id prefix shared by several runners
pub fn resolve<'a>(
    token: &str,
    records: &'a [RunnerRecord],
    name_prefix: &str,
) -> Result<Resolved<'a>> {
    let token = token.trim();
    if token.is_empty() {
        return Err(FleetError::NotFound(token.to_string()));
    }

    let prefixed = format!("{}-runner-{}", name_prefix, token);

    let exact_rules: [(MatchKind, &dyn Fn(&RunnerRecord) -> bool); 3] = [
        (MatchKind::Name, &|r| r.name == token),
        (MatchKind::PrefixedNumber, &|r| r.name == prefixed),
        (MatchKind::Number, &|r| r.number.to_string() == token),
    ];

    for (kind, rule) in exact_rules {
        if let Some(record) = records.iter().find(|r| rule(r)) {
            return Ok(Resolved { record, kind });
        }
    }

    let prefix = token.to_lowercase();
    let matches: Vec<&RunnerRecord> = records
        .iter()
        .filter(|r| r.container_id.to_lowercase().starts_with(&prefix))
        .collect();

    match matches.as_slice() {
        [] => Err(FleetError::NotFound(token.to_string())),
        [record] => Ok(Resolved {
            record,
            kind: MatchKind::ContainerIdPrefix,
        }),
        many => Err(FleetError::AmbiguousPrefix {
            prefix: token.to_string(),
            candidates: many.iter().map(|r| r.name.clone()).collect(),
        }),
    }
}
