//! Randomized, non-repeating traversal order for Random mode.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Queue of playlist indices drawn from a fresh shuffle.
///
/// A regenerated queue never starts with the index currently on screen
/// unless the playlist has a single entry.
#[derive(Debug)]
pub struct RandomSequencer {
    queue: VecDeque<usize>,
    rng: StdRng,
}

impl Default for RandomSequencer {
    fn default() -> Self { Self::new() }
}

impl RandomSequencer {
    /// Creates a sequencer seeded from the thread-local generator.
    #[must_use]
    pub fn new() -> Self { Self::from_rng(StdRng::from_rng(&mut rand::rng())) }

    /// Creates a sequencer with a fixed seed, for reproducible orders.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self { Self::from_rng(StdRng::seed_from_u64(seed)) }

    const fn from_rng(rng: StdRng) -> Self {
        Self {
            queue: VecDeque::new(),
            rng,
        }
    }

    /// Refills the queue with a shuffled permutation of `0..size`, leaving out
    /// `exclude`. A single-entry playlist always yields `[0]`.
    pub fn regenerate(&mut self, size: usize, exclude: Option<usize>) {
        self.queue.clear();

        match size {
            0 => {}
            1 => self.queue.push_back(0),
            _ => {
                let mut order: Vec<usize> =
                    (0..size).filter(|&index| Some(index) != exclude).collect();
                order.shuffle(&mut self.rng);
                self.queue.extend(order);
            }
        }

        tracing::trace!(size, ?exclude, queued = self.queue.len(), "random queue regenerated");
    }

    /// Pops the next index. `None` means the caller must regenerate.
    pub fn dequeue_next(&mut self) -> Option<usize> { self.queue.pop_front() }

    /// Picks one uniform index in `0..size` other than `avoid`, without
    /// touching the queue.
    pub fn random_index(&mut self, size: usize, avoid: Option<usize>) -> Option<usize> {
        match (size, avoid.filter(|&index| index < size)) {
            (0, _) => None,
            (1, _) => Some(0),
            (_, Some(avoid)) => {
                let pick = self.rng.random_range(0..size - 1);
                Some(if pick >= avoid { pick + 1 } else { pick })
            }
            (_, None) => Some(self.rng.random_range(0..size)),
        }
    }

    /// Drops a pruned playlist index and shifts the indices above it down.
    pub fn forget(&mut self, removed: usize) {
        self.queue.retain(|&index| index != removed);
        for index in &mut self.queue {
            if *index > removed {
                *index -= 1;
            }
        }
    }

    /// Discards the remaining queue.
    pub fn clear(&mut self) { self.queue.clear(); }

    /// Number of indices left before the next regeneration.
    #[must_use]
    pub fn len(&self) -> usize { self.queue.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.queue.is_empty() }
}
