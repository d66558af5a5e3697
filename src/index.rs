use std::collections::HashMap;

use crate::profile::{
    fallback_profiles, PhotoFallback, ProfileId, ProfileSummary, SummaryRecord,
};
use crate::source::ProfileSource;

/// Where the contents of an [`IndexStore`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOrigin {
    Source,
    Fallback,
}

/// All profile summaries known to the session, in index order.
///
/// Populated once and never mutated afterwards.
#[derive(Debug)]
pub struct IndexStore {
    profiles: Vec<ProfileSummary>,
    positions: HashMap<ProfileId, usize>,
    collisions: HashMap<ProfileId, usize>,
    origin: IndexOrigin,
}

impl IndexStore {
    /// Loads the index from `source`, substituting the built-in profiles
    /// on any failure or when the source lists nobody.
    pub async fn load<S: ProfileSource + ?Sized>(
        source: &S,
        photos: &PhotoFallback,
    ) -> Self {
        log::info!("index: loading profile summaries");
        match source.fetch_index().await {
            Ok(records) if records.is_empty() => {
                log::warn!("index: source returned no profiles, using fallback");
                Self::fallback(photos)
            }
            Ok(records) => {
                let summaries = records
                    .into_iter()
                    .map(|record: SummaryRecord| record.resolve(photos))
                    .collect();
                let index = Self::build(summaries, IndexOrigin::Source);
                log::info!("index: {} profiles loaded", index.len());
                index
            }
            Err(err) => {
                log::warn!("index: load failed ({}), using fallback", err);
                Self::fallback(photos)
            }
        }
    }

    pub fn fallback(photos: &PhotoFallback) -> Self {
        Self::build(fallback_profiles(photos), IndexOrigin::Fallback)
    }

    pub fn from_summaries(summaries: Vec<ProfileSummary>) -> Self {
        Self::build(summaries, IndexOrigin::Source)
    }

    fn build(summaries: Vec<ProfileSummary>, origin: IndexOrigin) -> Self {
        let mut index = IndexStore {
            profiles: Vec::with_capacity(summaries.len()),
            positions: HashMap::new(),
            collisions: HashMap::new(),
            origin,
        };

        for summary in summaries {
            if index.positions.contains_key(&summary.id) {
                if let Some(nonempty) = index.collisions.get_mut(&summary.id) {
                    *nonempty += 1;
                } else {
                    index.collisions.insert(summary.id, 2);
                }
            } else {
                index
                    .positions
                    .insert(summary.id, index.profiles.len());
                index.profiles.push(summary);
            }
        }

        if !index.collisions.is_empty() {
            log::warn!(
                "index: {} ids listed more than once, kept first occurrences",
                index.collisions.len()
            );
        }
        index
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn origin(&self) -> IndexOrigin {
        self.origin
    }

    pub fn ids(&self) -> Vec<ProfileId> {
        self.profiles.iter().map(|p| p.id).collect()
    }

    pub fn contains(&self, id: ProfileId) -> bool {
        self.positions.contains_key(&id)
    }

    pub fn get(&self, id: ProfileId) -> Option<&ProfileSummary> {
        self.positions
            .get(&id)
            .map(|position| &self.profiles[*position])
    }

    pub fn profiles(&self) -> &[ProfileSummary] {
        &self.profiles
    }

    /// Ids that appeared more than once, with how many times they did.
    pub fn collisions(&self) -> &HashMap<ProfileId, usize> {
        &self.collisions
    }
}
