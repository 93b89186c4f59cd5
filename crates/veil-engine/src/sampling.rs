//! Streaming test-set selection mirrored onto disk
//!
//! One payload is in flight at a time: it is materialized, offered to the
//! reservoir, and the decision is applied to the store before the next
//! payload is pulled. Between offers the number of artifacts on disk
//! always equals the reservoir size.

use std::time::Duration;

use rand::Rng;
use rand::rngs::StdRng;
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{debug, info, warn};
use veil_core::{Decision, Error, Item, Payload, ReservoirSelector, Result};
use veil_sources::CorpusSource;
use veil_storage::{ArtifactRef, ArtifactStore};

#[derive(Debug, Clone)]
pub struct SamplingOptions {
    /// Pause after each fully mirrored item
    pub latency: Duration,
    /// Run the selector's extra trial for the last item on exhaustion
    pub finalize_trial: bool,
}

impl Default for SamplingOptions {
    fn default() -> Self {
        Self {
            latency: Duration::ZERO,
            finalize_trial: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DecisionCounts {
    pub filled: u64,
    pub replaced: u64,
    pub rejected: u64,
}

/// Result of a completed sampling run
#[derive(Debug, Clone, Serialize)]
pub struct SampleSummary {
    pub run_id: String,
    pub capacity: usize,
    pub items_seen: u64,
    pub decisions: DecisionCounts,
    pub finalize: Option<Decision>,
    /// Retained artifacts in ascending ordinal order
    pub retained: Vec<ArtifactRef>,
    #[serde(with = "time::serde::timestamp")]
    pub started_at: OffsetDateTime,
    #[serde(with = "time::serde::timestamp")]
    pub finished_at: OffsetDateTime,
}

impl SampleSummary {
    pub fn retained_ordinals(&self) -> Vec<u64> {
        self.retained.iter().map(|a| a.ordinal).collect()
    }
}

pub struct SamplingPipeline<R = StdRng> {
    selector: ReservoirSelector<R>,
    store: ArtifactStore,
    options: SamplingOptions,
    counts: DecisionCounts,
    /// Content of the last item when it was rejected, kept for the finalize trial
    last_rejected: Option<Payload>,
    finished: bool,
    /// Set by any failed offer; ordinals and the mirror are no longer trusted
    failed: bool,
    run_id: String,
    started_at: OffsetDateTime,
}

impl<R: Rng> SamplingPipeline<R> {
    /// Start a run. The store is reset so the mirror holds from the first offer.
    pub fn new(
        selector: ReservoirSelector<R>,
        mut store: ArtifactStore,
        options: SamplingOptions,
    ) -> Result<Self> {
        if selector.seen() > 0 {
            return Err(Error::Precondition(
                "selector has already consumed items".to_string(),
            ));
        }

        store.reset()?;

        let run_id = uuid::Uuid::new_v4().to_string();
        info!(
            run_id = %run_id,
            capacity = selector.capacity(),
            root = %store.root().display(),
            "sampling run started"
        );

        Ok(Self {
            selector,
            store,
            options,
            counts: DecisionCounts::default(),
            last_rejected: None,
            finished: false,
            failed: false,
            run_id,
            started_at: OffsetDateTime::now_utc(),
        })
    }

    /// Process one payload end to end: write, decide, mirror.
    ///
    /// Any error ends the run: later offers and `finish` fail with
    /// `Precondition` instead of assigning ordinals against a broken mirror.
    pub fn offer(&mut self, payload: Payload) -> Result<Decision> {
        self.ensure_active()?;

        let result = self.apply(payload);
        if let Err(e) = &result {
            self.failed = true;
            warn!(run_id = %self.run_id, error = %e, "sampling run aborted");
        }
        result
    }

    fn apply(&mut self, payload: Payload) -> Result<Decision> {
        let ordinal = self.selector.seen();
        let item = Item::new(ordinal, payload.byte_size());

        self.store.materialize(ordinal, &payload.content)?;

        let decision = match self.selector.offer(item) {
            Ok(decision) => decision,
            Err(e) => {
                self.store.discard(ordinal)?;
                return Err(e);
            }
        };

        self.last_rejected = None;
        match decision {
            Decision::AdmitFill { slot } => {
                self.counts.filled += 1;
                info!(ordinal, slot, "item kept for test set (initial fill)");
            }
            Decision::Replace { slot, evicted } => {
                self.evict(evicted)?;
                self.counts.replaced += 1;
                info!(ordinal, slot, evicted = evicted.ordinal, "item replaced reservoir slot");
            }
            Decision::Reject => {
                self.store.discard(ordinal)?;
                self.counts.rejected += 1;
                self.last_rejected = Some(payload);
                debug!(ordinal, "item rejected");
            }
        }

        debug_assert_eq!(self.store.len(), self.selector.len());

        if !self.options.latency.is_zero() {
            std::thread::sleep(self.options.latency);
        }

        Ok(decision)
    }

    /// Pull every payload from `source`, then finish the run.
    ///
    /// A source error aborts the run; artifacts already mirrored stay valid
    /// for the prefix consumed.
    pub fn run<S: CorpusSource + ?Sized>(&mut self, source: &mut S) -> Result<SampleSummary> {
        info!(source = %source.describe(), "consuming corpus");

        while let Some(payload) = source.next_payload() {
            self.offer(payload?)?;
        }

        self.finish()
    }

    /// Apply the finalize trial (when enabled) and summarize the retained set
    pub fn finish(&mut self) -> Result<SampleSummary> {
        self.ensure_active()?;
        self.finished = true;

        let finalize = if self.options.finalize_trial {
            self.selector.finalize()?
        } else {
            None
        };

        if let Some(Decision::Replace { slot, evicted }) = finalize {
            let last = self
                .selector
                .members()
                .get(slot)
                .copied()
                .ok_or_else(|| Error::Precondition(format!("slot {} is empty", slot)))?;
            let payload = self.last_rejected.take().ok_or_else(|| {
                Error::Precondition(format!("content of item {} is no longer held", last.ordinal))
            })?;

            self.store.materialize(last.ordinal, &payload.content)?;
            self.evict(evicted)?;
            info!(
                ordinal = last.ordinal,
                slot,
                evicted = evicted.ordinal,
                "last item admitted by finalize trial"
            );
        }

        let summary = SampleSummary {
            run_id: self.run_id.clone(),
            capacity: self.selector.capacity(),
            items_seen: self.selector.seen(),
            decisions: self.counts,
            finalize,
            retained: self.store.artifacts().cloned().collect(),
            started_at: self.started_at,
            finished_at: OffsetDateTime::now_utc(),
        };

        info!(
            run_id = %summary.run_id,
            items_seen = summary.items_seen,
            retained = summary.retained.len(),
            "test set summary"
        );
        for artifact in &summary.retained {
            info!(ordinal = artifact.ordinal, path = %artifact.path.display(), "retained");
        }

        Ok(summary)
    }

    fn ensure_active(&self) -> Result<()> {
        if self.failed {
            return Err(Error::Precondition(
                "sampling run aborted by an earlier error".to_string(),
            ));
        }
        if self.finished {
            return Err(Error::Precondition("sampling run already finished".to_string()));
        }
        Ok(())
    }

    /// Remove the evicted item's artifact, resolving it to its ascending-ordinal slot
    fn evict(&mut self, evicted: Item) -> Result<()> {
        let rank = self
            .store
            .rank_of(evicted.ordinal)
            .ok_or(Error::MirrorDivergence {
                ordinal: evicted.ordinal,
            })?;

        let removed = self.store.evict(rank)?;
        if removed.ordinal != evicted.ordinal {
            return Err(Error::MirrorDivergence {
                ordinal: evicted.ordinal,
            });
        }
        Ok(())
    }

    pub fn selector(&self) -> &ReservoirSelector<R> {
        &self.selector
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    pub fn counts(&self) -> DecisionCounts {
        self.counts
    }

    pub fn is_failed(&self) -> bool {
        self.failed
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }
}
