//! Identity resolution against the external session provider.
//!
//! The service never manages credentials itself; a session token is handed
//! to the collaborator and comes back as an [`Identity`] or nothing.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// The authenticated principal for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub username: String,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve a session token to the identity it belongs to, if any.
    /// `Ok(None)` means the token is unknown or expired.
    async fn resolve(&self, token: &str) -> Result<Option<Identity>, IdentityError>;
}
