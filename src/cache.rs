use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::index::IndexStore;
use crate::profile::{DetailDefaults, PhotoFallback, ProfileDetail, ProfileId};
use crate::source::ProfileSource;
use crate::{FeedError, Result};

/// What to do with the placeholder produced by a failed detail fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Return the placeholder without caching it; the next request
    /// fetches again.
    #[default]
    Never,
    /// Cache the placeholder for the rest of the session.
    Permanent,
    /// Cache the placeholder for a limited time.
    Expire { seconds: u64 },
}

struct CacheEntry {
    detail: ProfileDetail,
    /// Set only for placeholders that are allowed to age out.
    expires_at: Option<Instant>,
    placeholder: bool,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at
            .map(|deadline| now >= deadline)
            .unwrap_or(false)
    }
}

/// Session memo of profile details, keyed by id.
///
/// Successful fetches are kept for the whole session. Failed fetches
/// are handled according to the [`FailurePolicy`].
pub struct ProfileCache {
    /// Label for logging
    label: String,
    entries: RwLock<HashMap<ProfileId, CacheEntry>>,
    policy: FailurePolicy,
    photos: PhotoFallback,
    defaults: DetailDefaults,
}

impl ProfileCache {
    pub fn new(
        label: impl Into<String>,
        policy: FailurePolicy,
        photos: PhotoFallback,
        defaults: DetailDefaults,
    ) -> Self {
        let label = label.into();
        log::debug!("cache/{}: initialized with {:?}", label, policy);
        Self {
            label,
            entries: RwLock::new(HashMap::new()),
            policy,
            photos,
            defaults,
        }
    }

    /// Returns the detail for `id`, fetching it from `source` at most
    /// once per session unless a placeholder is due for a retry.
    ///
    /// Failures are never returned for ids known to `index`: a
    /// placeholder built from the summary is returned instead.
    pub async fn fetch<S: ProfileSource + ?Sized>(
        &self,
        id: ProfileId,
        index: &IndexStore,
        source: &S,
    ) -> Result<ProfileDetail> {
        if let Some(detail) = self.lookup(id) {
            log::debug!("cache/{}: hit for {}", self.label, id);
            return Ok(detail);
        }

        let summary = index.get(id).ok_or(FeedError::UnknownProfile(id))?;

        // No lock is held across this await, so fetches for other ids
        // can proceed meanwhile.
        match source.fetch_detail(id).await {
            Ok(record) => {
                let mut detail = record.resolve(&self.photos);
                if detail.id != id {
                    log::warn!(
                        "cache/{}: asked for {} but source answered {}",
                        self.label,
                        id,
                        detail.id
                    );
                    detail.id = id;
                }
                self.store(
                    id,
                    CacheEntry {
                        detail: detail.clone(),
                        expires_at: None,
                        placeholder: false,
                    },
                );
                Ok(detail)
            }
            Err(err) => {
                log::warn!(
                    "cache/{}: detail fetch for {} failed: {}",
                    self.label,
                    id,
                    err
                );
                let placeholder =
                    ProfileDetail::placeholder(summary, &self.defaults);
                let expires_at = match self.policy {
                    FailurePolicy::Never => return Ok(placeholder),
                    FailurePolicy::Permanent => None,
                    FailurePolicy::Expire { seconds } => Instant::now()
                        .checked_add(Duration::from_secs(seconds)),
                };
                self.store(
                    id,
                    CacheEntry {
                        detail: placeholder.clone(),
                        expires_at,
                        placeholder: true,
                    },
                );
                Ok(placeholder)
            }
        }
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: ProfileId) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&id)
    }

    /// `Some(true)` when the cached entry for `id` is a placeholder.
    pub fn is_placeholder(&self, id: ProfileId) -> Option<bool> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .map(|entry| entry.placeholder)
    }

    fn lookup(&self, id: ProfileId) -> Option<ProfileDetail> {
        let now = Instant::now();
        {
            let entries = self
                .entries
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            match entries.get(&id) {
                None => return None,
                Some(entry) if !entry.is_expired(now) => {
                    return Some(entry.detail.clone())
                }
                Some(_) => {}
            }
        }

        log::debug!("cache/{}: placeholder for {} expired", self.label, id);
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
        None
    }

    fn store(&self, id: ProfileId, entry: CacheEntry) {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        entries.insert(id, entry);
        log::debug!(
            "cache/{}: stored {}, {} entries",
            self.label,
            id,
            entries.len()
        );
    }
}
