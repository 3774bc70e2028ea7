//! Events emitted while seeding and propagating a bracket.
//!
//! Every decision the propagation engine makes is pushed into an injectable
//! [`BracketObserver`], so callers can audit a seeding or result pass without
//! the engine writing to any output of its own.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::entities::{BracketMatchNumber, OutgoingBracketLink, PairId, Rank, SlotPos};

/// A single decision made while mutating the bracket graph.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum BracketEvent {
    /// A round-1 slot received the pair seeded at `rank`.
    SeedAssigned {
        match_number: BracketMatchNumber,
        slot: SlotPos,
        rank: Rank,
        pair: PairId,
    },
    /// A slot was marked dead (bye, withdrawal, or dead-branch cascade).
    SlotDead {
        match_number: BracketMatchNumber,
        slot: SlotPos,
    },
    /// A walkover pushed an assigned pair into its downstream slot without
    /// the match being played.
    FastForwarded {
        from: BracketMatchNumber,
        to: OutgoingBracketLink,
        pair: PairId,
    },
    /// A slot was bound to a pair reported by match management.
    PairAssigned {
        match_number: BracketMatchNumber,
        slot: SlotPos,
        pair: PairId,
    },
}

impl fmt::Display for BracketEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::SeedAssigned {
                match_number,
                slot,
                rank,
                pair,
            } => {
                format!("seed {rank} puts pair {pair} into match {match_number}.{slot}")
            }
            Self::SlotDead { match_number, slot } => {
                format!("match {match_number}.{slot} marked dead")
            }
            Self::FastForwarded { from, to, pair } => {
                format!("pair {pair} fast-forwarded from match {from} to {to}")
            }
            Self::PairAssigned {
                match_number,
                slot,
                pair,
            } => format!("pair {pair} assigned to match {match_number}.{slot}"),
        };
        write!(f, "{repr}")
    }
}

/// Sink for bracket mutation decisions.
pub trait BracketObserver {
    fn on_event(&mut self, event: &BracketEvent);
}

/// Observer that discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl BracketObserver for NoopObserver {
    fn on_event(&mut self, _event: &BracketEvent) {}
}

/// Observer that keeps every event in order, for audit trails and tests.
#[derive(Clone, Debug, Default)]
pub struct RecordedEvents {
    events: Vec<BracketEvent>,
}

impl RecordedEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[BracketEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl BracketObserver for RecordedEvents {
    fn on_event(&mut self, event: &BracketEvent) {
        self.events.push(*event);
    }
}
