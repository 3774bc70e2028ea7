//! The bracket progression graph and its state machine.
//!
//! A [`BracketGraph`] is built once from a validated template, seeded once
//! when the category enters its first round, and then mutated in place by
//! every subsequent real match result. All mutation funnels through a single
//! propagation routine so that byes, walkovers, and withdrawals cascade
//! through later rounds by exactly the same rules.
//!
//! The graph performs no I/O and keeps no history. Callers needing atomicity
//! across a failed pass should clone the graph first and restore the clone.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use super::entities::{
    BracketMatchData, BracketMatchNumber, BranchAction, BranchState, IncomingBracketLink,
    MatchRecord, OutgoingBracketLink, PairId, PairRole, Rank, Round, SlotPos,
};
use super::events::{BracketEvent, BracketObserver, NoopObserver};
use super::template::{MatchTag, SlotSource, SlotTag};

/// Errors raised while building or mutating a bracket graph.
#[derive(Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum BracketError {
    #[error("no slot receives the winner of match {0}")]
    DanglingWinnerRef(BracketMatchNumber),
    #[error("no slot receives the loser of match {0}")]
    DanglingLoserRef(BracketMatchNumber),
    #[error("duplicate match number {0} in template")]
    DuplicateMatchNumber(BracketMatchNumber),
    #[error("missing slot tag for match {number} position {pos}")]
    MissingSlotTag {
        number: BracketMatchNumber,
        pos: SlotPos,
    },
    #[error("duplicate slot tag for match {number} position {pos}")]
    DuplicateSlotTag {
        number: BracketMatchNumber,
        pos: SlotPos,
    },
    #[error("the {role} of match {src} feeds more than one slot")]
    AmbiguousSourceRef {
        src: BracketMatchNumber,
        role: PairRole,
    },
    #[error("match {number} is in round {round} but slot {pos} has the wrong source kind")]
    WrongProvenance {
        number: BracketMatchNumber,
        round: Round,
        pos: SlotPos,
    },
    #[error("match {number} declares an invalid round")]
    InvalidRound { number: BracketMatchNumber },
    #[error("link from match {from} to match {to} does not ascend")]
    NonAscendingLink {
        from: BracketMatchNumber,
        to: BracketMatchNumber,
    },
    #[error("slot source of match {number} position {pos} does not match any outgoing edge")]
    InconsistentProvenance {
        number: BracketMatchNumber,
        pos: SlotPos,
    },
    #[error("slot of match {number} references unknown match {src}")]
    UnknownSourceMatch {
        number: BracketMatchNumber,
        src: BracketMatchNumber,
    },
    #[error("unknown bracket match number {0}")]
    UnknownMatchNumber(BracketMatchNumber),
    #[error("slot source of match {number} position {pos} may not be zero")]
    ZeroSourceRef {
        number: BracketMatchNumber,
        pos: SlotPos,
    },
    #[error("field size {0} cannot form a single-elimination bracket")]
    InvalidFieldSize(u16),
    #[error("match {0} has two dead slots where a playable match was expected")]
    ConsistencyFault(BracketMatchNumber),
    #[error("invalid bracket state: match {number} slot {pos} has no assigned pair")]
    MissingAssignedPair {
        number: BracketMatchNumber,
        pos: SlotPos,
    },
}

pub type BracketResult<T> = Result<T, BracketError>;

/// The five mutually exclusive situations the propagation engine can find a
/// match in, derived from its two slot states.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum PropagationCase {
    /// Both slots hold a pair; the match will actually be played.
    Playable,
    /// At least one slot still waits on an earlier match, and none is dead.
    Pending,
    /// The given slot holds a pair, the other slot is dead.
    Walkover(SlotPos),
    /// One slot alive, one dead: only the loser branch can be settled now.
    LoserBranchDead,
    /// Both slots dead; the match can never take place.
    Void,
}

impl PropagationCase {
    pub(crate) fn classify(states: (BranchState, BranchState)) -> Self {
        use BranchState::{Alive, Assigned, Dead};
        match states {
            (Assigned, Assigned) => Self::Playable,
            (Assigned, Dead) => Self::Walkover(SlotPos::P1),
            (Dead, Assigned) => Self::Walkover(SlotPos::P2),
            (Alive, Dead) | (Dead, Alive) => Self::LoserBranchDead,
            (Dead, Dead) => Self::Void,
            (Alive, _) | (_, Alive) => Self::Pending,
        }
    }
}

/// The progression graph of one elimination bracket.
///
/// Nodes are kept sorted ascending by match number; a match-number-to-index
/// map is built and checked once at construction, so slot mutation never
/// relies on positional arithmetic.
#[derive(Clone, Debug, PartialEq)]
pub struct BracketGraph {
    nodes: Vec<BracketMatchData>,
    index: HashMap<BracketMatchNumber, usize>,
}

impl BracketGraph {
    /// Resolves a flat tag set into a validated graph with every slot alive.
    ///
    /// Any unresolved, duplicate, or contradictory reference invalidates the
    /// whole template: construction aborts and no graph is produced.
    pub fn from_template(match_tags: &[MatchTag], slot_tags: &[SlotTag]) -> BracketResult<Self> {
        let mut tags: Vec<MatchTag> = match_tags.to_vec();
        tags.sort_by_key(|tag| tag.number);
        for pair in tags.windows(2) {
            if pair[0].number == pair[1].number {
                return Err(BracketError::DuplicateMatchNumber(pair[0].number));
            }
        }

        // Reject duplicate slot declarations and sources feeding two slots
        // before resolving anything against them.
        for (i, tag) in slot_tags.iter().enumerate() {
            for earlier in &slot_tags[..i] {
                if earlier.number == tag.number && earlier.pos == tag.pos {
                    return Err(BracketError::DuplicateSlotTag {
                        number: tag.number,
                        pos: tag.pos,
                    });
                }
                match (earlier.source, tag.source) {
                    (SlotSource::WinnerOf(a), SlotSource::WinnerOf(b)) if a == b => {
                        return Err(BracketError::AmbiguousSourceRef {
                            src: a,
                            role: PairRole::Winner,
                        });
                    }
                    (SlotSource::LoserOf(a), SlotSource::LoserOf(b)) if a == b => {
                        return Err(BracketError::AmbiguousSourceRef {
                            src: a,
                            role: PairRole::Loser,
                        });
                    }
                    _ => {}
                }
            }
        }

        let find_feed = |src: BracketMatchNumber, role: PairRole| {
            slot_tags.iter().find_map(|tag| {
                let matches = match (role, tag.source) {
                    (PairRole::Winner, SlotSource::WinnerOf(n)) => n == src,
                    (PairRole::Loser, SlotSource::LoserOf(n)) => n == src,
                    _ => false,
                };
                matches.then_some(OutgoingBracketLink {
                    dst_match: tag.number,
                    dst_slot: tag.pos,
                })
            })
        };
        let find_slot = |number: BracketMatchNumber, pos: SlotPos| {
            slot_tags
                .iter()
                .find(|tag| tag.number == number && tag.pos == pos)
        };

        let mut nodes = Vec::with_capacity(tags.len());
        for tag in &tags {
            if tag.round.0 == 0 {
                return Err(BracketError::InvalidRound { number: tag.number });
            }
            let winner_action = match tag.winner_rank {
                Some(rank) => BranchAction::Finish(rank),
                None => BranchAction::Advance(
                    find_feed(tag.number, PairRole::Winner)
                        .ok_or(BracketError::DanglingWinnerRef(tag.number))?,
                ),
            };
            let loser_action = match tag.loser_rank {
                Some(rank) => BranchAction::Finish(rank),
                None => BranchAction::Advance(
                    find_feed(tag.number, PairRole::Loser)
                        .ok_or(BracketError::DanglingLoserRef(tag.number))?,
                ),
            };

            let mut sources = [SlotSource::Seed(Rank(0)); 2];
            for pos in SlotPos::BOTH {
                sources[pos.index()] = find_slot(tag.number, pos)
                    .ok_or(BracketError::MissingSlotTag {
                        number: tag.number,
                        pos,
                    })?
                    .source;
            }

            let node = if tag.round.0 == 1 {
                let mut ranks = [Rank(0); 2];
                for pos in SlotPos::BOTH {
                    ranks[pos.index()] = match sources[pos.index()] {
                        SlotSource::Seed(rank) => rank,
                        _ => {
                            return Err(BracketError::WrongProvenance {
                                number: tag.number,
                                round: tag.round,
                                pos,
                            });
                        }
                    };
                }
                BracketMatchData::new_round_one(tag.number, ranks, winner_action, loser_action)
            } else {
                // Each slot derives its role from its own source reference.
                let mut links = [IncomingBracketLink {
                    src_match: BracketMatchNumber(0),
                    role: PairRole::Winner,
                }; 2];
                for pos in SlotPos::BOTH {
                    links[pos.index()] = match sources[pos.index()] {
                        SlotSource::WinnerOf(src) => IncomingBracketLink {
                            src_match: src,
                            role: PairRole::Winner,
                        },
                        SlotSource::LoserOf(src) => IncomingBracketLink {
                            src_match: src,
                            role: PairRole::Loser,
                        },
                        SlotSource::Seed(_) => {
                            return Err(BracketError::WrongProvenance {
                                number: tag.number,
                                round: tag.round,
                                pos,
                            });
                        }
                    };
                }
                BracketMatchData::new_linked(
                    tag.number,
                    tag.round,
                    links,
                    winner_action,
                    loser_action,
                )
            };
            nodes.push(node);
        }

        let mut index = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            index.insert(node.number(), i);
        }

        let graph = Self { nodes, index };
        graph.validate()?;
        for node in &graph.nodes {
            debug!("{node}");
        }
        Ok(graph)
    }

    /// Checks that every edge ascends in match number and round, and that
    /// outgoing edges and slot provenance describe the same wiring.
    fn validate(&self) -> BracketResult<()> {
        for node in &self.nodes {
            for role in [PairRole::Winner, PairRole::Loser] {
                if let BranchAction::Advance(link) = node.action(role) {
                    let dst = self
                        .node(link.dst_match)
                        .ok_or(BracketError::UnknownMatchNumber(link.dst_match))?;
                    if dst.number() <= node.number() || dst.round() <= node.round() {
                        return Err(BracketError::NonAscendingLink {
                            from: node.number(),
                            to: dst.number(),
                        });
                    }
                    match dst.incoming_link(link.dst_slot) {
                        Some(incoming)
                            if incoming.src_match == node.number() && incoming.role == role => {}
                        _ => {
                            return Err(BracketError::InconsistentProvenance {
                                number: dst.number(),
                                pos: link.dst_slot,
                            });
                        }
                    }
                }
            }
            for pos in SlotPos::BOTH {
                if let Some(incoming) = node.incoming_link(pos) {
                    let src =
                        self.node(incoming.src_match)
                            .ok_or(BracketError::UnknownSourceMatch {
                                number: node.number(),
                                src: incoming.src_match,
                            })?;
                    match src.action(incoming.role) {
                        BranchAction::Advance(link)
                            if link.dst_match == node.number() && link.dst_slot == pos => {}
                        _ => {
                            return Err(BracketError::InconsistentProvenance {
                                number: node.number(),
                                pos,
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, number: BracketMatchNumber) -> Option<&BracketMatchData> {
        self.index.get(&number).map(|&i| &self.nodes[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &BracketMatchData> {
        self.nodes.iter()
    }

    /// Highest round index in the bracket, 0 when the graph is empty.
    pub fn num_rounds(&self) -> u16 {
        self.nodes.iter().map(|node| node.round().0).max().unwrap_or(0)
    }

    pub fn matches_in_round(&self, round: Round) -> Vec<&BracketMatchData> {
        self.nodes
            .iter()
            .filter(|node| node.round() == round)
            .collect()
    }

    /// Matches whose both slots hold a concrete pair.
    pub fn playable_matches(&self) -> Vec<&BracketMatchData> {
        self.nodes
            .iter()
            .filter(|node| node.is_fully_assigned())
            .collect()
    }

    /// Returns every slot to alive and unbound, ahead of a full re-seeding.
    pub fn reset(&mut self) {
        for node in &mut self.nodes {
            for pos in SlotPos::BOTH {
                node.slot_mut(pos).reset();
            }
        }
    }

    /// Populates round 1 from a ranked seed list and cascades the resulting
    /// byes through all later rounds in one forward pass.
    ///
    /// Seeds beyond the round-1 slot count are ignored; round-1 slots whose
    /// initial rank exceeds the seed count become byes.
    pub fn apply_seeding(&mut self, seed: &[PairId]) -> BracketResult<()> {
        self.apply_seeding_observed(seed, &mut NoopObserver)
    }

    pub fn apply_seeding_observed(
        &mut self,
        seed: &[PairId],
        observer: &mut dyn BracketObserver,
    ) -> BracketResult<()> {
        for idx in 0..self.nodes.len() {
            if self.nodes[idx].round() != Round(1) {
                continue;
            }
            let number = self.nodes[idx].number();
            for pos in SlotPos::BOTH {
                let rank = self.nodes[idx].initial_rank(pos).ok_or(
                    BracketError::WrongProvenance {
                        number,
                        round: Round(1),
                        pos,
                    },
                )?;
                if rank.0 as usize <= seed.len() && rank.0 > 0 {
                    let pair = seed[rank.0 as usize - 1];
                    self.nodes[idx].slot_mut(pos).assign(pair);
                    debug!("seed assignment: match {number}.{pos} = pair {pair}");
                    observer.on_event(&BracketEvent::SeedAssigned {
                        match_number: number,
                        slot: pos,
                        rank,
                        pair,
                    });
                } else {
                    self.nodes[idx].slot_mut(pos).mark_dead();
                    debug!("match {number}.{pos} is a bye");
                    observer.on_event(&BracketEvent::SlotDead {
                        match_number: number,
                        slot: pos,
                    });
                }
            }
        }

        self.propagate_all_observed(observer)
    }

    /// Runs the propagation engine over every match in ascending match-number
    /// order. Safe to re-run at any time; a fully propagated graph is left
    /// unchanged.
    pub fn propagate_all(&mut self) -> BracketResult<()> {
        self.propagate_all_observed(&mut NoopObserver)
    }

    pub fn propagate_all_observed(
        &mut self,
        observer: &mut dyn BracketObserver,
    ) -> BracketResult<()> {
        for idx in 0..self.nodes.len() {
            self.propagate_at(idx, observer)?;
        }
        Ok(())
    }

    /// Applies a batch of real-world matches and lets each one cascade.
    ///
    /// The batch is sorted by bracket match number before processing;
    /// propagation correctness depends on that order, not on insertion
    /// order. Records with neither side bound are skipped.
    pub fn apply_match_records(&mut self, records: &[MatchRecord]) -> BracketResult<()> {
        self.apply_match_records_observed(records, &mut NoopObserver)
    }

    pub fn apply_match_records_observed(
        &mut self,
        records: &[MatchRecord],
        observer: &mut dyn BracketObserver,
    ) -> BracketResult<()> {
        let mut sorted: Vec<MatchRecord> = records.to_vec();
        sorted.sort_by_key(|record| record.number);

        for record in &sorted {
            if record.is_empty() {
                continue;
            }
            let idx = self.index_of(record.number)?;
            for pos in SlotPos::BOTH {
                match record.pair(pos) {
                    Some(pair) => {
                        self.nodes[idx].slot_mut(pos).assign(pair);
                        debug!("match {}.{pos} = pair {pair}", record.number);
                        observer.on_event(&BracketEvent::PairAssigned {
                            match_number: record.number,
                            slot: pos,
                            pair,
                        });
                    }
                    None => {
                        self.nodes[idx].slot_mut(pos).mark_dead();
                        debug!("match {}.{pos} has no pair, marked dead", record.number);
                        observer.on_event(&BracketEvent::SlotDead {
                            match_number: record.number,
                            slot: pos,
                        });
                    }
                }
            }
            self.propagate_at(idx, observer)?;
        }
        Ok(())
    }

    /// Resolves where the winner or loser of `from` actually ends up: the
    /// next genuinely playable downstream match, or the terminal rank if the
    /// branch leaves the bracket without further play.
    ///
    /// Matches with exactly one dead slot are passed through along their
    /// winner direction. Reaching a match with both slots dead means the
    /// graph was not propagated consistently and is reported as a fault.
    pub fn traverse_forward(
        &self,
        from: BracketMatchNumber,
        role: PairRole,
    ) -> BracketResult<BranchAction> {
        let start = self
            .node(from)
            .ok_or(BracketError::UnknownMatchNumber(from))?;
        let mut link = match start.action(role) {
            BranchAction::Finish(rank) => return Ok(BranchAction::Finish(*rank)),
            BranchAction::Advance(link) => *link,
        };

        loop {
            let current = self
                .node(link.dst_match)
                .ok_or(BracketError::UnknownMatchNumber(link.dst_match))?;
            match PropagationCase::classify(current.states()) {
                PropagationCase::Void => {
                    return Err(BracketError::ConsistencyFault(current.number()));
                }
                PropagationCase::Playable | PropagationCase::Pending => {
                    return Ok(BranchAction::Advance(link));
                }
                PropagationCase::Walkover(_) | PropagationCase::LoserBranchDead => {
                    // Single-sided: whoever sits here advances without play.
                    match current.winner_action() {
                        BranchAction::Finish(rank) => return Ok(BranchAction::Finish(*rank)),
                        BranchAction::Advance(next) => link = *next,
                    }
                }
            }
        }
    }

    /// Applies the propagation rules to the match at `idx`. Destinations
    /// always carry a higher match number, so nodes already visited by an
    /// ascending pass are never touched again.
    fn propagate_at(
        &mut self,
        idx: usize,
        observer: &mut dyn BracketObserver,
    ) -> BracketResult<()> {
        let node = &self.nodes[idx];
        let number = node.number();
        let winner_action = *node.winner_action();
        let loser_action = *node.loser_action();

        match PropagationCase::classify(node.states()) {
            PropagationCase::Playable | PropagationCase::Pending => Ok(()),
            PropagationCase::Walkover(pos) => {
                let pair = self.nodes[idx]
                    .slot(pos)
                    .pair()
                    .ok_or(BracketError::MissingAssignedPair { number, pos })?;
                match winner_action {
                    BranchAction::Advance(link) => {
                        let dst = self.index_of(link.dst_match)?;
                        self.nodes[dst].slot_mut(link.dst_slot).assign(pair);
                        debug!("fast-forward {number}.{pos} -> {link}");
                        observer.on_event(&BracketEvent::FastForwarded {
                            from: number,
                            to: link,
                            pair,
                        });
                    }
                    BranchAction::Finish(rank) => {
                        debug!("pair {pair} finishes at rank {rank} without further play");
                    }
                }
                if let BranchAction::Advance(link) = loser_action {
                    self.kill_slot(link, observer)?;
                }
                Ok(())
            }
            PropagationCase::LoserBranchDead => {
                if let BranchAction::Advance(link) = loser_action {
                    self.kill_slot(link, observer)?;
                }
                Ok(())
            }
            PropagationCase::Void => {
                if let BranchAction::Advance(link) = winner_action {
                    self.kill_slot(link, observer)?;
                }
                if let BranchAction::Advance(link) = loser_action {
                    self.kill_slot(link, observer)?;
                }
                Ok(())
            }
        }
    }

    fn kill_slot(
        &mut self,
        link: OutgoingBracketLink,
        observer: &mut dyn BracketObserver,
    ) -> BracketResult<()> {
        let idx = self.index_of(link.dst_match)?;
        self.nodes[idx].slot_mut(link.dst_slot).mark_dead();
        debug!("match {link} marked dead");
        observer.on_event(&BracketEvent::SlotDead {
            match_number: link.dst_match,
            slot: link.dst_slot,
        });
        Ok(())
    }

    fn index_of(&self, number: BracketMatchNumber) -> BracketResult<usize> {
        self.index
            .get(&number)
            .copied()
            .ok_or(BracketError::UnknownMatchNumber(number))
    }
}
