//! Typed accessors for the well-known blob store keys.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serenpaths_common::{Experience, UserPreferences};

use crate::store::{BlobStore, StoreError};

/// Well-known store keys.
pub mod keys {
    pub const EXPERIENCES: &str = "experiences";
    pub const USER_PREFERENCES: &str = "userPreferences";
    pub const PENDING_FEEDBACK: &str = "pendingFeedback";
    pub const PENDING_PREFERENCES: &str = "pendingPreferences";
    pub const AI_ENABLED: &str = "aiEnabled";
    pub const AUTO_SAVE: &str = "autoSaveExperiences";
}

/// Feedback that could not be delivered to the backend yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingFeedback {
    /// Backend-side id; local challenges use `local-*` / `challenge-skipped-*`.
    pub experience_id: String,
    pub feedback: String,
    pub timestamp: DateTime<Utc>,
}

/// Latest experience list the backend has not acknowledged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingPreferences {
    pub experiences: Vec<Experience>,
    pub timestamp: DateTime<Utc>,
}

/// Read and parse a JSON value. `Ok(None)` when the key is absent.
pub fn load_json<T, S>(store: &S, key: &str) -> Result<Option<T>, StoreError>
where
    T: DeserializeOwned,
    S: BlobStore + ?Sized,
{
    let Some(text) = store.get(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&text)
        .map(Some)
        .map_err(|source| StoreError::Json {
            key: key.to_string(),
            source,
        })
}

/// Serialize and write a JSON value.
pub fn save_json<T, S>(store: &mut S, key: &str, value: &T) -> Result<(), StoreError>
where
    T: Serialize + ?Sized,
    S: BlobStore + ?Sized,
{
    let text = serde_json::to_string(value).map_err(|source| StoreError::Json {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &text)
}

pub fn load_experiences<S: BlobStore + ?Sized>(store: &S) -> Result<Vec<Experience>, StoreError> {
    Ok(load_json(store, keys::EXPERIENCES)?.unwrap_or_default())
}

pub fn save_experiences<S: BlobStore + ?Sized>(
    store: &mut S,
    experiences: &[Experience],
) -> Result<(), StoreError> {
    save_json(store, keys::EXPERIENCES, experiences)?;
    tracing::debug!(count = experiences.len(), "experiences saved");
    Ok(())
}

/// `None` until onboarding has been completed.
pub fn load_preferences<S: BlobStore + ?Sized>(
    store: &S,
) -> Result<Option<UserPreferences>, StoreError> {
    load_json(store, keys::USER_PREFERENCES)
}

pub fn save_preferences<S: BlobStore + ?Sized>(
    store: &mut S,
    preferences: &UserPreferences,
) -> Result<(), StoreError> {
    save_json(store, keys::USER_PREFERENCES, preferences)
}

/// Feature toggles are on unless explicitly stored as `"false"`.
pub fn flag<S: BlobStore + ?Sized>(store: &S, key: &str) -> Result<bool, StoreError> {
    Ok(store.get(key)?.is_none_or(|v| v.trim() != "false"))
}

pub fn set_flag<S: BlobStore + ?Sized>(
    store: &mut S,
    key: &str,
    enabled: bool,
) -> Result<(), StoreError> {
    store.set(key, if enabled { "true" } else { "false" })
}

pub fn load_pending_feedback<S: BlobStore + ?Sized>(
    store: &S,
) -> Result<Vec<PendingFeedback>, StoreError> {
    Ok(load_json(store, keys::PENDING_FEEDBACK)?.unwrap_or_default())
}

/// Append to the pending feedback queue.
pub fn push_pending_feedback<S: BlobStore + ?Sized>(
    store: &mut S,
    item: PendingFeedback,
) -> Result<usize, StoreError> {
    let mut queue = load_pending_feedback(store)?;
    queue.push(item);
    save_json(store, keys::PENDING_FEEDBACK, &queue)?;
    Ok(queue.len())
}

/// Replace the queue; an empty queue removes the key.
pub fn save_pending_feedback<S: BlobStore + ?Sized>(
    store: &mut S,
    queue: &[PendingFeedback],
) -> Result<(), StoreError> {
    if queue.is_empty() {
        store.remove(keys::PENDING_FEEDBACK)
    } else {
        save_json(store, keys::PENDING_FEEDBACK, queue)
    }
}

pub fn load_pending_preferences<S: BlobStore + ?Sized>(
    store: &S,
) -> Result<Option<PendingPreferences>, StoreError> {
    load_json(store, keys::PENDING_PREFERENCES)
}

/// Only the latest snapshot is kept.
pub fn save_pending_preferences<S: BlobStore + ?Sized>(
    store: &mut S,
    pending: &PendingPreferences,
) -> Result<(), StoreError> {
    save_json(store, keys::PENDING_PREFERENCES, pending)
}

pub fn clear_pending_preferences<S: BlobStore + ?Sized>(store: &mut S) -> Result<(), StoreError> {
    store.remove(keys::PENDING_PREFERENCES)
}
