//! Core bracket entities: match numbers, ranks, links, slots, and match nodes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Player pair ID type
pub type PairId = i64;

/// Bracket-local match number.
///
/// Unique per bracket and consistent with round order: a match never feeds
/// a lower-numbered match.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct BracketMatchNumber(pub u16);

impl fmt::Display for BracketMatchNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Round index within a bracket (1-based).
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Round(pub u16);

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A final placement achieved by leaving the bracket.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Rank(pub u16);

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One of the two player slots of a match.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum SlotPos {
    P1,
    P2,
}

impl SlotPos {
    /// Both positions, in slot order.
    pub const BOTH: [SlotPos; 2] = [SlotPos::P1, SlotPos::P2];

    pub(crate) const fn index(self) -> usize {
        match self {
            Self::P1 => 0,
            Self::P2 => 1,
        }
    }

    pub const fn other(self) -> SlotPos {
        match self {
            Self::P1 => Self::P2,
            Self::P2 => Self::P1,
        }
    }
}

impl fmt::Display for SlotPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::P1 => "1",
            Self::P2 => "2",
        };
        write!(f, "{repr}")
    }
}

/// Role a pair carries out of a match.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum PairRole {
    Winner,
    Loser,
}

impl fmt::Display for PairRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Winner => "W",
            Self::Loser => "L",
        };
        write!(f, "{repr}")
    }
}

/// Where a branch continues: destination match and slot.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct OutgoingBracketLink {
    pub dst_match: BracketMatchNumber,
    pub dst_slot: SlotPos,
}

impl fmt::Display for OutgoingBracketLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.dst_match, self.dst_slot)
    }
}

/// Where a slot's occupant comes from: source match and the role the
/// occupant leaves that match with.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct IncomingBracketLink {
    pub src_match: BracketMatchNumber,
    pub role: PairRole,
}

impl fmt::Display for IncomingBracketLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.role, self.src_match)
    }
}

/// What happens to a match's winner or loser: advance to another match
/// or finish at a final rank.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum BranchAction {
    Advance(OutgoingBracketLink),
    Finish(Rank),
}

impl BranchAction {
    pub const fn advance_link(&self) -> Option<&OutgoingBracketLink> {
        match self {
            Self::Advance(link) => Some(link),
            Self::Finish(_) => None,
        }
    }

    pub const fn final_rank(&self) -> Option<Rank> {
        match self {
            Self::Advance(_) => None,
            Self::Finish(rank) => Some(*rank),
        }
    }
}

impl fmt::Display for BranchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Advance(link) => write!(f, "{link}"),
            Self::Finish(rank) => write!(f, "rank {rank}"),
        }
    }
}

/// Occupancy state of one bracket slot.
///
/// Transitions are monotonic: `Alive -> Assigned` or `Alive -> Dead`, both
/// terminal until a full graph reset.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum BranchState {
    /// Occupant still depends on earlier undecided matches.
    Alive,
    /// A concrete player pair is bound to the slot.
    Assigned,
    /// The slot can provably never be occupied.
    Dead,
}

/// Where a slot's occupant originally comes from: an initial seed rank in
/// round 1, an incoming link in every later round.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum SlotProvenance {
    InitialRank(Rank),
    FromMatch(IncomingBracketLink),
}

/// One player slot of a bracket match.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct BracketSlot {
    provenance: SlotProvenance,
    state: BranchState,
    pair: Option<PairId>,
}

impl BracketSlot {
    const fn new(provenance: SlotProvenance) -> Self {
        Self {
            provenance,
            state: BranchState::Alive,
            pair: None,
        }
    }

    pub const fn provenance(&self) -> &SlotProvenance {
        &self.provenance
    }

    pub const fn state(&self) -> BranchState {
        self.state
    }

    pub const fn pair(&self) -> Option<PairId> {
        self.pair
    }

    pub(crate) fn assign(&mut self, pair: PairId) {
        self.pair = Some(pair);
        self.state = BranchState::Assigned;
    }

    pub(crate) fn mark_dead(&mut self) {
        self.pair = None;
        self.state = BranchState::Dead;
    }

    pub(crate) fn reset(&mut self) {
        self.pair = None;
        self.state = BranchState::Alive;
    }
}

/// One node of the bracket graph: a match, its round, the actions applied
/// to its winner and loser, and its two player slots.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct BracketMatchData {
    number: BracketMatchNumber,
    round: Round,
    winner_action: BranchAction,
    loser_action: BranchAction,
    slots: [BracketSlot; 2],
}

impl BracketMatchData {
    pub(crate) const fn new_round_one(
        number: BracketMatchNumber,
        initial_ranks: [Rank; 2],
        winner_action: BranchAction,
        loser_action: BranchAction,
    ) -> Self {
        Self {
            number,
            round: Round(1),
            winner_action,
            loser_action,
            slots: [
                BracketSlot::new(SlotProvenance::InitialRank(initial_ranks[0])),
                BracketSlot::new(SlotProvenance::InitialRank(initial_ranks[1])),
            ],
        }
    }

    pub(crate) const fn new_linked(
        number: BracketMatchNumber,
        round: Round,
        links: [IncomingBracketLink; 2],
        winner_action: BranchAction,
        loser_action: BranchAction,
    ) -> Self {
        Self {
            number,
            round,
            winner_action,
            loser_action,
            slots: [
                BracketSlot::new(SlotProvenance::FromMatch(links[0])),
                BracketSlot::new(SlotProvenance::FromMatch(links[1])),
            ],
        }
    }

    pub const fn number(&self) -> BracketMatchNumber {
        self.number
    }

    pub const fn round(&self) -> Round {
        self.round
    }

    pub const fn winner_action(&self) -> &BranchAction {
        &self.winner_action
    }

    pub const fn loser_action(&self) -> &BranchAction {
        &self.loser_action
    }

    /// The action applied to the pair leaving this match with `role`.
    pub const fn action(&self, role: PairRole) -> &BranchAction {
        match role {
            PairRole::Winner => &self.winner_action,
            PairRole::Loser => &self.loser_action,
        }
    }

    pub const fn slot(&self, pos: SlotPos) -> &BracketSlot {
        &self.slots[pos.index()]
    }

    pub(crate) const fn slot_mut(&mut self, pos: SlotPos) -> &mut BracketSlot {
        &mut self.slots[pos.index()]
    }

    /// Initial seed rank of a slot. `None` for rounds past the first.
    pub const fn initial_rank(&self, pos: SlotPos) -> Option<Rank> {
        match self.slot(pos).provenance() {
            SlotProvenance::InitialRank(rank) => Some(*rank),
            SlotProvenance::FromMatch(_) => None,
        }
    }

    /// Incoming link of a slot. `None` for round-1 slots.
    pub const fn incoming_link(&self, pos: SlotPos) -> Option<&IncomingBracketLink> {
        match self.slot(pos).provenance() {
            SlotProvenance::InitialRank(_) => None,
            SlotProvenance::FromMatch(link) => Some(link),
        }
    }

    /// Downstream match of the winner, if the winner advances at all.
    pub const fn next_winner_match(&self) -> Option<&OutgoingBracketLink> {
        self.winner_action.advance_link()
    }

    /// Downstream match of the loser, if the loser advances at all.
    pub const fn next_loser_match(&self) -> Option<&OutgoingBracketLink> {
        self.loser_action.advance_link()
    }

    /// Final rank awarded to the winner, if any.
    pub const fn winner_rank(&self) -> Option<Rank> {
        self.winner_action.final_rank()
    }

    /// Final rank awarded to the loser, if any.
    pub const fn loser_rank(&self) -> Option<Rank> {
        self.loser_action.final_rank()
    }

    pub const fn states(&self) -> (BranchState, BranchState) {
        (self.slots[0].state(), self.slots[1].state())
    }

    /// Both slots hold a concrete pair, so the match can actually be played.
    pub fn is_fully_assigned(&self) -> bool {
        self.states() == (BranchState::Assigned, BranchState::Assigned)
    }

    pub fn has_dead_slot(&self) -> bool {
        let (s1, s2) = self.states();
        s1 == BranchState::Dead || s2 == BranchState::Dead
    }
}

impl fmt::Display for BracketMatchData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}: round {}, ", self.number, self.round)?;
        for pos in SlotPos::BOTH {
            match self.slot(pos).provenance() {
                SlotProvenance::InitialRank(rank) => write!(f, "P{pos}.ini = {rank}, ")?,
                SlotProvenance::FromMatch(link) => write!(f, "P{pos} = {link}, ")?,
            }
        }
        write!(f, "W -> {}, L -> {}", self.winner_action, self.loser_action)
    }
}

/// A real-world match as reported by the match-management collaborator.
///
/// A missing pair ID signals an unassigned or withdrawn side.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct MatchRecord {
    pub number: BracketMatchNumber,
    pub pair1: Option<PairId>,
    pub pair2: Option<PairId>,
}

impl MatchRecord {
    pub const fn new(number: u16, pair1: Option<PairId>, pair2: Option<PairId>) -> Self {
        Self {
            number: BracketMatchNumber(number),
            pair1,
            pair2,
        }
    }

    pub const fn pair(&self, pos: SlotPos) -> Option<PairId> {
        match pos {
            SlotPos::P1 => self.pair1,
            SlotPos::P2 => self.pair2,
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.pair1.is_none() && self.pair2.is_none()
    }
}
