//! Access token resolution
//!
//! The token handed to runner containers is configured either literally or as
//! an `env:NAME` reference to an environment variable.

use crate::error::{FleetError, Result};

const ENV_PREFIX: &str = "env:";

/// Source of the bearer token runners register with
pub trait CredentialSource: Send + Sync {
    /// Resolves the token; fails when it cannot be obtained
    fn resolve(&self) -> Result<String>;
}

/// A configured token value: a literal or an `env:NAME` reference
#[derive(Clone, PartialEq, Eq)]
pub struct TokenReference {
    raw: String,
}

impl TokenReference {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// Name of the referenced environment variable, if this is a reference
    pub fn env_var(&self) -> Option<&str> {
        self.raw.strip_prefix(ENV_PREFIX)
    }

    /// Resolves the token using `lookup` for environment references
    pub fn resolve_with<F>(&self, lookup: F) -> Result<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        match self.env_var() {
            Some(var) => match lookup(var) {
                Some(value) if !value.is_empty() => Ok(value),
                _ => Err(FleetError::Credential(format!(
                    "environment variable {:?} is not set",
                    var
                ))),
            },
            None if self.raw.is_empty() => {
                Err(FleetError::Credential("token is empty".to_string()))
            }
            None => Ok(self.raw.clone()),
        }
    }
}

impl CredentialSource for TokenReference {
    fn resolve(&self) -> Result<String> {
        self.resolve_with(|var| std::env::var(var).ok())
    }
}

impl std::fmt::Debug for TokenReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.env_var() {
            Some(_) => write!(f, "TokenReference({})", self.raw),
            None => write!(f, "TokenReference(<literal>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_token() {
        let token = TokenReference::new("ghp_literal");
        assert_eq!(token.resolve_with(|_| None).unwrap(), "ghp_literal");
        assert_eq!(format!("{:?}", token), "TokenReference(<literal>)");
    }

    #[test]
    fn test_env_reference() {
        let token = TokenReference::new("env:GH_TOKEN");
        assert_eq!(token.env_var(), Some("GH_TOKEN"));

        let resolved = token
            .resolve_with(|var| (var == "GH_TOKEN").then(|| "from-env".to_string()))
            .unwrap();
        assert_eq!(resolved, "from-env");
    }

    #[test]
    fn test_missing_env_reference_fails() {
        let token = TokenReference::new("env:GH_TOKEN");
        let err = token.resolve_with(|_| None).unwrap_err();
        assert!(matches!(err, FleetError::Credential(_)));

        let err = token.resolve_with(|_| Some(String::new())).unwrap_err();
        assert!(err.is_unavailable());
    }

    #[test]
    fn test_empty_literal_fails() {
        assert!(TokenReference::new("").resolve_with(|_| None).is_err());
    }
}
