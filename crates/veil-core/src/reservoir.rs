//! Uniform reservoir sampling over a stream of unknown length
//!
//! Each offered item ends up in the reservoir with probability `k/n`, where
//! `n` is the number of items offered so far. The selector only decides;
//! mirroring decisions onto disk is the storage layer's job.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Item, Result};

/// Outcome of offering one item to the reservoir
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    /// Reservoir not yet full; item stored in the next free slot
    AdmitFill { slot: usize },
    /// Item replaced the previous occupant of `slot`
    Replace { slot: usize, evicted: Item },
    /// Item is not retained
    Reject,
}

impl Decision {
    pub fn is_admitted(&self) -> bool {
        !matches!(self, Decision::Reject)
    }
}

pub struct ReservoirSelector<R = StdRng> {
    capacity: usize,
    rng: R,
    slots: Vec<Item>,
    seen: u64,
    last: Option<Item>,
    finalized: bool,
}

impl ReservoirSelector<StdRng> {
    /// Selector driven by a `StdRng` seeded from `seed`
    pub fn seeded(capacity: usize, seed: u64) -> Result<Self> {
        Self::new(capacity, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> ReservoirSelector<R> {
    pub fn new(capacity: usize, rng: R) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::Configuration(
                "reservoir capacity must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            capacity,
            rng,
            slots: Vec::with_capacity(capacity),
            seen: 0,
            last: None,
            finalized: false,
        })
    }

    /// Offer the next stream item. Must be called once per item, in order.
    pub fn offer(&mut self, item: Item) -> Result<Decision> {
        if self.finalized {
            return Err(Error::Precondition(
                "offer called after finalize".to_string(),
            ));
        }
        if item.ordinal != self.seen {
            return Err(Error::Precondition(format!(
                "expected ordinal {}, got {}",
                self.seen, item.ordinal
            )));
        }

        self.seen += 1;
        self.last = Some(item);
        let n = self.seen;

        if n <= self.capacity as u64 {
            let slot = self.slots.len();
            self.slots.push(item);
            debug!(ordinal = item.ordinal, slot, "reservoir fill");
            return Ok(Decision::AdmitFill { slot });
        }

        Ok(self.trial(item, n - 1))
    }

    /// Extra replacement trial for the last item once the stream is exhausted.
    ///
    /// Returns `None` when the stream never exceeded the capacity, in which case
    /// nothing is drawn and no state changes. A second call is an error.
    pub fn finalize(&mut self) -> Result<Option<Decision>> {
        if self.finalized {
            return Err(Error::Precondition("finalize called twice".to_string()));
        }
        self.finalized = true;

        let last = match self.last {
            Some(last) if self.seen > self.capacity as u64 => last,
            _ => return Ok(None),
        };

        if self.contains(last.ordinal) {
            // Still drawn so the random sequence does not depend on membership.
            let _ = self.rng.gen_range(0..=last.ordinal);
            debug!(ordinal = last.ordinal, "finalize: last item already retained");
            return Ok(Some(Decision::Reject));
        }

        Ok(Some(self.trial(last, last.ordinal)))
    }

    /// Draw `j` in `[0, upper]` and replace slot `j` when it falls inside the reservoir
    fn trial(&mut self, item: Item, upper: u64) -> Decision {
        let j = self.rng.gen_range(0..=upper);

        if j < self.capacity as u64 {
            let slot = j as usize;
            let evicted = std::mem::replace(&mut self.slots[slot], item);
            debug!(
                ordinal = item.ordinal,
                slot,
                evicted = evicted.ordinal,
                "reservoir replace"
            );
            Decision::Replace { slot, evicted }
        } else {
            debug!(ordinal = item.ordinal, draw = j, "reservoir reject");
            Decision::Reject
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of items offered so far
    pub fn seen(&self) -> u64 {
        self.seen
    }

    /// Current reservoir size, always `min(seen, capacity)`
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Retained items in slot order
    pub fn members(&self) -> &[Item] {
        &self.slots
    }

    pub fn contains(&self, ordinal: u64) -> bool {
        self.slots.iter().any(|item| item.ordinal == ordinal)
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(ordinal: u64) -> Item {
        Item::new(ordinal, 16)
    }

    #[test]
    fn test_zero_capacity_is_configuration_error() {
        let result = ReservoirSelector::seeded(0, 42);
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_initial_fill() {
        let mut selector = ReservoirSelector::seeded(3, 42).unwrap();

        for ordinal in 0..3 {
            let decision = selector.offer(item(ordinal)).unwrap();
            assert_eq!(
                decision,
                Decision::AdmitFill {
                    slot: ordinal as usize
                }
            );
        }

        assert_eq!(selector.len(), 3);
        assert_eq!(selector.seen(), 3);
    }

    #[test]
    fn test_size_is_min_of_capacity_and_seen() {
        for capacity in 1..6 {
            let mut selector = ReservoirSelector::seeded(capacity, 7).unwrap();
            for ordinal in 0..20u64 {
                selector.offer(item(ordinal)).unwrap();
                let expected = (ordinal as usize + 1).min(capacity);
                assert_eq!(selector.len(), expected);
            }
            selector.finalize().unwrap();
            assert_eq!(selector.len(), capacity.min(20));
        }
    }

    #[test]
    fn test_replace_reports_previous_occupant() {
        let mut selector = ReservoirSelector::seeded(2, 3).unwrap();
        selector.offer(item(0)).unwrap();
        selector.offer(item(1)).unwrap();

        for ordinal in 2..50 {
            let before = selector.members().to_vec();
            match selector.offer(item(ordinal)).unwrap() {
                Decision::Replace { slot, evicted } => {
                    assert_eq!(before[slot], evicted);
                    assert_eq!(selector.members()[slot].ordinal, ordinal);
                }
                Decision::Reject => assert_eq!(selector.members(), &before[..]),
                Decision::AdmitFill { .. } => panic!("reservoir already full"),
            }
        }
    }

    #[test]
    fn test_out_of_order_offer_is_rejected() {
        let mut selector = ReservoirSelector::seeded(2, 42).unwrap();
        selector.offer(item(0)).unwrap();

        let result = selector.offer(item(2));
        assert!(matches!(result, Err(Error::Precondition(_))));
        assert_eq!(selector.seen(), 1);
    }

    #[test]
    fn test_same_seed_same_sample() {
        let run = |seed| {
            let mut selector = ReservoirSelector::seeded(4, seed).unwrap();
            for ordinal in 0..100 {
                selector.offer(item(ordinal)).unwrap();
            }
            selector.members().to_vec()
        };

        assert_eq!(run(11), run(11));
    }

    #[test]
    fn test_finalize_is_noop_when_stream_fits() {
        let mut selector = ReservoirSelector::seeded(5, 42).unwrap();
        for ordinal in 0..5 {
            selector.offer(item(ordinal)).unwrap();
        }
        let before = selector.members().to_vec();

        assert_eq!(selector.finalize().unwrap(), None);
        assert_eq!(selector.members(), &before[..]);
        assert!(selector.is_finalized());
    }

    #[test]
    fn test_finalize_on_empty_stream() {
        let mut selector = ReservoirSelector::seeded(3, 42).unwrap();
        assert_eq!(selector.finalize().unwrap(), None);
        assert!(selector.is_empty());
    }

    #[test]
    fn test_finalize_twice_fails() {
        let mut selector = ReservoirSelector::seeded(1, 42).unwrap();
        selector.offer(item(0)).unwrap();
        selector.finalize().unwrap();

        assert!(matches!(selector.finalize(), Err(Error::Precondition(_))));
        assert!(matches!(
            selector.offer(item(1)),
            Err(Error::Precondition(_))
        ));
    }

    #[test]
    fn test_finalize_trial_keeps_size() {
        for seed in 0..200 {
            let mut selector = ReservoirSelector::seeded(3, seed).unwrap();
            for ordinal in 0..10 {
                selector.offer(item(ordinal)).unwrap();
            }
            let was_retained = selector.contains(9);

            match selector.finalize().unwrap() {
                Some(Decision::Replace { evicted, .. }) => {
                    assert!(!was_retained);
                    assert_ne!(evicted.ordinal, 9);
                    assert!(selector.contains(9));
                }
                Some(Decision::Reject) => {}
                other => panic!("unexpected finalize outcome: {:?}", other),
            }
            assert_eq!(selector.len(), 3);
        }
    }

    #[test]
    fn test_uniform_selection_frequency() {
        const RUNS: u64 = 20_000;
        let (n, k) = (10u64, 3usize);
        let mut hits = vec![0u64; n as usize];

        for seed in 0..RUNS {
            let mut selector = ReservoirSelector::seeded(k, seed).unwrap();
            for ordinal in 0..n {
                selector.offer(item(ordinal)).unwrap();
            }
            for member in selector.members() {
                hits[member.ordinal as usize] += 1;
            }
        }

        let expected = k as f64 / n as f64;
        for (ordinal, count) in hits.iter().enumerate() {
            let freq = *count as f64 / RUNS as f64;
            assert!(
                (freq - expected).abs() < 0.02,
                "item {} selected with frequency {}, expected {}",
                ordinal,
                freq,
                expected
            );
        }
    }

    #[test]
    fn test_probability_holds_at_every_prefix() {
        const RUNS: u64 = 10_000;
        let k = 2usize;
        // After 5 items, each of them should be retained with probability 2/5.
        let mut hits = [0u64; 5];

        for seed in 0..RUNS {
            let mut selector = ReservoirSelector::seeded(k, seed).unwrap();
            for ordinal in 0..5 {
                selector.offer(item(ordinal)).unwrap();
            }
            for member in selector.members() {
                hits[member.ordinal as usize] += 1;
            }
        }

        for count in hits {
            let freq = count as f64 / RUNS as f64;
            assert!((freq - 0.4).abs() < 0.03, "frequency {}", freq);
        }
    }
}
