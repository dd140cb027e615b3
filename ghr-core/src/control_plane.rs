//! Control plane collaborator
//!
//! Lists the runners registered on the remote CI control plane. Pagination
//! is handled by the implementation; callers see a flat list.

use async_trait::async_trait;

use crate::domain::runner::RemoteStatus;
use crate::domain::scope::Scope;
use crate::error::Result;

/// Read access to the control plane's runner registry
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Lists every runner registered for the scope
    async fn list_workers(&self, scope: &Scope) -> Result<Vec<RemoteStatus>>;
}
