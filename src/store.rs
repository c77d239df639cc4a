//! In-memory user store.
//!
//! Records are handed out as clones. Writes go through `commit_completion`, a
//! conditional swap: the whole record is replaced in one write-locked step, and
//! only if nobody else committed since it was read.
//!
//! Writers for one user are serialized with `lock_user`, held across
//! load -> apply -> commit. Different users never wait on each other.

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::domain::User;
use crate::error::AppError;

#[derive(Clone, Default)]
pub struct UserStore {
    by_id: Arc<RwLock<HashMap<String, User>>>,
    /// Normalized email -> user id.
    by_email: Arc<RwLock<HashMap<String, String>>>,
    /// User id -> writer lock, created alongside the record.
    writers: Arc<RwLock<HashMap<String, Arc<Mutex<()>>>>>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh record with zeroed counters. `email` must already be normalized.
    #[instrument(level = "info", skip(self, name, email, now))]
    pub async fn create(&self, name: String, email: String, now: DateTime<Utc>) -> Result<User, AppError> {
        // Both locks held so two signups with the same email cannot interleave.
        let mut by_email = self.by_email.write().await;
        let mut by_id = self.by_id.write().await;
        if by_email.contains_key(&email) {
            return Err(AppError::DuplicateEmail);
        }
        let user = User::new(Uuid::new_v4().to_string(), name, email, now);
        by_email.insert(user.email.clone(), user.id.clone());
        by_id.insert(user.id.clone(), user.clone());
        self.writers.write().await.insert(user.id.clone(), Arc::default());
        debug!(target: "progress", user = %user.id, "User record created");
        Ok(user)
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn load_by_id(&self, id: &str) -> Result<User, AppError> {
        self.by_id
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::user_not_found(id))
    }

    /// Exclusive write access to one user's record until the guard drops.
    pub async fn lock_user(&self, id: &str) -> Result<OwnedMutexGuard<()>, AppError> {
        let slot = self
            .writers
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::user_not_found(id))?;
        Ok(slot.lock_owned().await)
    }

    /// Persist `user` after appending `mission_id` to its ledger.
    ///
    /// Succeeds only if the stored record is still at `expected_version` and does not
    /// already list `mission_id`; otherwise nothing is written and
    /// `ConcurrentUpdateConflict` is returned.
    #[instrument(level = "debug", skip(self, user), fields(user = %user.id))]
    pub async fn commit_completion(
        &self,
        mut user: User,
        expected_version: u64,
        mission_id: &str,
    ) -> Result<User, AppError> {
        let mut by_id = self.by_id.write().await;
        let current = by_id.get(&user.id).ok_or_else(|| AppError::user_not_found(&user.id))?;
        if current.version != expected_version || current.has_completed(mission_id) {
            warn!(
                target: "progress",
                user = %user.id,
                %mission_id,
                expected_version,
                stored_version = current.version,
                "Conditional ledger commit lost a race"
            );
            return Err(AppError::ConcurrentUpdateConflict);
        }
        user.version = expected_version + 1;
        by_id.insert(user.id.clone(), user.clone());
        Ok(user)
    }
}
