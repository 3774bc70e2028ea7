//! Elimination bracket core: template resolution, seeding, propagation,
//! result application, and forward traversal.
//!
//! This module provides the foundational bracket machinery:
//! - Template tags and their resolution into a validated progression graph
//! - Seeding with automatic bye handling
//! - The branch propagation engine (walkovers, dead branches, fast-forwards)
//! - Result application from match management
//! - Traversal to the next genuinely playable match

// Submodules
pub mod draw;
pub mod entities;
pub mod events;
pub mod generator;
pub mod graph;
pub mod template;

pub use entities::{
    BracketMatchData, BracketMatchNumber, BracketSlot, BranchAction, BranchState,
    IncomingBracketLink, MatchRecord, OutgoingBracketLink, PairId, PairRole, Rank, Round, SlotPos,
    SlotProvenance,
};
pub use events::{BracketEvent, BracketObserver, NoopObserver, RecordedEvents};
pub use graph::{BracketError, BracketGraph, BracketResult};
pub use template::{MatchTag, SlotSource, SlotTag};
