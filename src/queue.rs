use std::collections::VecDeque;

use fastrand::Rng;
use serde::{Deserialize, Serialize};

use crate::index::IndexStore;
use crate::profile::ProfileId;
use crate::shuffle::shuffle;
use crate::{FeedError, Result};

/// Order in which the queue is refilled once drained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefillOrder {
    /// Index order.
    Sequential,
    #[default]
    Shuffled,
}

/// Rotation order deciding which profile backfills a dismissed card.
pub struct Queue {
    pending: VecDeque<ProfileId>,
    order: RefillOrder,
    rng: Rng,
    refills: usize,
}

impl Queue {
    pub fn new(order: RefillOrder) -> Self {
        Self::with_rng(order, Rng::new())
    }

    pub fn with_seed(order: RefillOrder, seed: u64) -> Self {
        Self::with_rng(order, Rng::with_seed(seed))
    }

    fn with_rng(order: RefillOrder, rng: Rng) -> Self {
        Self {
            pending: VecDeque::new(),
            order,
            rng,
            refills: 0,
        }
    }

    /// Pops the next id, refilling from `index` first if drained.
    ///
    /// Fails with [`FeedError::EmptyIndex`] when there is nothing to
    /// refill from.
    pub fn take_next(&mut self, index: &IndexStore) -> Result<ProfileId> {
        if self.pending.is_empty() {
            self.refill(index)?;
        }
        self.pending.pop_front().ok_or(FeedError::EmptyIndex)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// How many times the queue has been refilled so far.
    pub fn refills(&self) -> usize {
        self.refills
    }

    fn refill(&mut self, index: &IndexStore) -> Result<()> {
        if index.is_empty() {
            return Err(FeedError::EmptyIndex);
        }

        let mut ids = index.ids();
        if self.order == RefillOrder::Shuffled {
            shuffle(&mut ids, &mut self.rng);
        }
        self.refills += 1;
        log::debug!(
            "queue: refill #{} with {} ids ({:?})",
            self.refills,
            ids.len(),
            self.order
        );
        self.pending.extend(ids);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::index::tests::index_of;

    #[test]
    fn sequential_follows_index_order() {
        let index = index_of(&[10, 20, 30]);
        let mut queue = Queue::new(RefillOrder::Sequential);
        let taken: Vec<_> = (0..6)
            .map(|_| queue.take_next(&index).unwrap())
            .collect();
        assert_eq!(taken, vec![10, 20, 30, 10, 20, 30]);
        assert_eq!(queue.refills(), 2);
    }

    #[test]
    fn one_pass_visits_every_id_once() {
        let index = index_of(&[1, 2, 3, 4, 5, 6, 7, 8]);
        let mut queue = Queue::with_seed(RefillOrder::Shuffled, 3);
        let taken: HashSet<_> = (0..index.len())
            .map(|_| queue.take_next(&index).unwrap())
            .collect();
        assert_eq!(taken, index.ids().into_iter().collect());
        assert!(queue.is_empty());
    }

    #[test]
    fn every_id_offered_again_after_refill() {
        let index = index_of(&[1, 2, 3]);
        let mut queue = Queue::with_seed(RefillOrder::Shuffled, 99);
        for _ in 0..index.len() {
            queue.take_next(&index).unwrap();
        }
        let second: HashSet<_> = (0..index.len())
            .map(|_| queue.take_next(&index).unwrap())
            .collect();
        assert_eq!(second.len(), 3);
    }

    #[test]
    fn single_profile_repeats() {
        let index = index_of(&[42]);
        let mut queue = Queue::new(RefillOrder::Shuffled);
        assert_eq!(queue.take_next(&index).unwrap(), 42);
        assert_eq!(queue.take_next(&index).unwrap(), 42);
    }

    #[test]
    fn empty_index_is_an_error() {
        let index = index_of(&[]);
        let mut queue = Queue::new(RefillOrder::Sequential);
        assert!(matches!(
            queue.take_next(&index),
            Err(FeedError::EmptyIndex)
        ));
        assert_eq!(queue.refills(), 0);
    }
}
