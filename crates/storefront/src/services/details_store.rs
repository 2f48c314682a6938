//! Storage for the customer details record.
//!
//! A visitor has at most one saved record. Saving overwrites it wholesale;
//! there is no history.

use std::future::Future;

use panier_core::UserDetails;
use tower_sessions::Session;

use crate::models::session_keys;

/// Errors persisting the details record.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("session storage failed: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

/// Where the customer details record is kept.
pub trait UserDetailsStore {
    /// The saved record, if any.
    ///
    /// A record that cannot be read is treated as absent.
    fn get(&self) -> impl Future<Output = Option<UserDetails>> + Send;

    /// Overwrite the saved record.
    fn save(&self, details: &UserDetails) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Details record kept in the visitor's session under a fixed key.
#[derive(Debug, Clone)]
pub struct SessionDetailsStore {
    session: Session,
}

impl SessionDetailsStore {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }
}

impl UserDetailsStore for SessionDetailsStore {
    async fn get(&self) -> Option<UserDetails> {
        match self
            .session
            .get::<UserDetails>(session_keys::USER_DETAILS)
            .await
        {
            Ok(details) => details,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read saved customer details");
                None
            }
        }
    }

    async fn save(&self, details: &UserDetails) -> Result<(), StoreError> {
        self.session
            .insert(session_keys::USER_DETAILS, details)
            .await?;
        Ok(())
    }
}
