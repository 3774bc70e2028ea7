//! # Knockout
//!
//! An elimination-bracket progression engine.
//!
//! This library builds the match graph of a knockout tournament category
//! from a declarative template, populates it from a seeding order, and keeps
//! every slot assignment truthful while byes, walkovers, and real match
//! results land. It is a pure in-memory state machine: no I/O, no clocks,
//! no rendering. Persistence, scheduling, and presentation belong to the
//! surrounding tournament software.
//!
//! ## Architecture
//!
//! The core revolves around five cooperating pieces:
//!
//! - **Template resolution**: flat match/slot tags become a validated
//!   [`BracketGraph`] whose edges are checked once, at construction
//! - **Seeding**: round-1 slots bind ranked player pairs; missing entrants
//!   become byes
//! - **Propagation**: a five-case engine advances walkover winners and marks
//!   dead branches, cascading through later rounds in match-number order
//! - **Result application**: real match outcomes feed the same engine, so a
//!   late withdrawal behaves exactly like an initial bye
//! - **Traversal**: resolves where a match's winner or loser actually plays
//!   next, skipping fast-forwarded intermediates
//!
//! ## Example
//!
//! ```
//! use knockout::BracketGraph;
//! use knockout::bracket::generator;
//!
//! // A four-pair field with one entrant short: seed 1 gets a bye.
//! let (matches, slots) = generator::single_elimination(4, false).unwrap();
//! let mut graph = BracketGraph::from_template(&matches, &slots).unwrap();
//! graph.apply_seeding(&[101, 102, 103]).unwrap();
//!
//! // Only 102 v 103 is actually contested in round 1; pair 101 already
//! // sits in the final.
//! assert_eq!(graph.playable_matches().len(), 1);
//! ```

/// Bracket graph construction and progression.
pub mod bracket;
pub use bracket::{
    BracketError, BracketEvent, BracketGraph, BracketMatchData, BracketMatchNumber,
    BracketObserver, BracketResult, BranchAction, BranchState, IncomingBracketLink, MatchRecord,
    MatchTag, NoopObserver, OutgoingBracketLink, PairId, PairRole, Rank, RecordedEvents, Round,
    SlotPos, SlotSource, SlotTag,
};
