use crate::index::IndexStore;
use crate::profile::ProfileId;
use crate::queue::Queue;
use crate::Result;

pub const DEFAULT_SLOTS: usize = 5;

/// The fixed-size window of ids currently shown as cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleSet {
    slots: Vec<ProfileId>,
    capacity: usize,
}

impl VisibleSet {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Fills the window with `min(capacity, |index|)` ids from `queue`,
    /// discarding whatever it held before.
    pub fn fill(&mut self, queue: &mut Queue, index: &IndexStore) -> Result<()> {
        let wanted = self.capacity.min(index.len());
        let mut slots = Vec::with_capacity(wanted);
        for _ in 0..wanted {
            slots.push(queue.take_next(index)?);
        }
        self.slots = slots;
        log::debug!("visible: filled {:?}", self.slots);
        Ok(())
    }

    /// Overwrites the first slot holding `id` with the next queued id.
    ///
    /// Returns the slot position, or `None` if `id` is not visible, in
    /// which case nothing changes.
    pub fn replace(
        &mut self,
        id: ProfileId,
        queue: &mut Queue,
        index: &IndexStore,
    ) -> Result<Option<usize>> {
        let Some(position) = self.position(id) else {
            log::debug!("visible: {} not shown, nothing to replace", id);
            return Ok(None);
        };

        let next = queue.take_next(index)?;
        self.slots[position] = next;
        log::debug!("visible: slot {} {} -> {}", position, id, next);
        Ok(Some(position))
    }

    pub fn position(&self, id: ProfileId) -> Option<usize> {
        self.slots.iter().position(|slot| *slot == id)
    }

    pub fn contains(&self, id: ProfileId) -> bool {
        self.position(id).is_some()
    }

    pub fn ids(&self) -> &[ProfileId] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for VisibleSet {
    fn default() -> Self {
        Self::new(DEFAULT_SLOTS)
    }
}
