//! Declarative bracket template descriptors.
//!
//! A bracket template is a flat set of tags: one [`MatchTag`] per match and
//! one [`SlotTag`] per match slot. Templates come from an external authoring
//! layer; [`BracketGraph::from_template`](super::graph::BracketGraph::from_template)
//! resolves the tags into a validated graph.

use serde::{Deserialize, Serialize};

use super::entities::{BracketMatchNumber, PairRole, Rank, Round, SlotPos};
use super::graph::{BracketError, BracketResult};

/// Declares one match: its number, round, and what the winner and loser
/// receive. A `None` rank means the pair advances to another match, found
/// by scanning the slot tags for the matching source reference.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct MatchTag {
    pub number: BracketMatchNumber,
    pub round: Round,
    pub winner_rank: Option<Rank>,
    pub loser_rank: Option<Rank>,
}

impl MatchTag {
    pub const fn new(number: u16, round: u16) -> Self {
        Self {
            number: BracketMatchNumber(number),
            round: Round(round),
            winner_rank: None,
            loser_rank: None,
        }
    }

    pub const fn with_winner_rank(mut self, rank: u16) -> Self {
        self.winner_rank = Some(Rank(rank));
        self
    }

    pub const fn with_loser_rank(mut self, rank: u16) -> Self {
        self.loser_rank = Some(Rank(rank));
        self
    }
}

/// Origin of a slot's occupant.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum SlotSource {
    /// Initial seed rank (round 1 only).
    Seed(Rank),
    /// Winner of an earlier match (round > 1).
    WinnerOf(BracketMatchNumber),
    /// Loser of an earlier match (round > 1).
    LoserOf(BracketMatchNumber),
}

impl SlotSource {
    pub const fn role(&self) -> Option<PairRole> {
        match self {
            Self::Seed(_) => None,
            Self::WinnerOf(_) => Some(PairRole::Winner),
            Self::LoserOf(_) => Some(PairRole::Loser),
        }
    }
}

/// Declares one slot of one match and where its occupant comes from.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SlotTag {
    pub number: BracketMatchNumber,
    pub pos: SlotPos,
    pub source: SlotSource,
}

impl SlotTag {
    pub const fn seed(number: u16, pos: SlotPos, rank: u16) -> Self {
        Self {
            number: BracketMatchNumber(number),
            pos,
            source: SlotSource::Seed(Rank(rank)),
        }
    }

    pub const fn winner_of(number: u16, pos: SlotPos, src: u16) -> Self {
        Self {
            number: BracketMatchNumber(number),
            pos,
            source: SlotSource::WinnerOf(BracketMatchNumber(src)),
        }
    }

    pub const fn loser_of(number: u16, pos: SlotPos, src: u16) -> Self {
        Self {
            number: BracketMatchNumber(number),
            pos,
            source: SlotSource::LoserOf(BracketMatchNumber(src)),
        }
    }

    /// Decodes the external signed-source convention for rounds past the
    /// first: positive = winner of that match, negative = loser of it.
    pub fn from_signed(number: u16, pos: SlotPos, signed_src: i32) -> BracketResult<Self> {
        let number = BracketMatchNumber(number);
        if signed_src == 0 {
            return Err(BracketError::ZeroSourceRef { number, pos });
        }
        let src = BracketMatchNumber(signed_src.unsigned_abs().min(u32::from(u16::MAX)) as u16);
        let source = if signed_src > 0 {
            SlotSource::WinnerOf(src)
        } else {
            SlotSource::LoserOf(src)
        };
        Ok(Self {
            number,
            pos,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_tag_builder() {
        let tag = MatchTag::new(7, 3).with_winner_rank(1).with_loser_rank(2);
        assert_eq!(tag.number, BracketMatchNumber(7));
        assert_eq!(tag.round, Round(3));
        assert_eq!(tag.winner_rank, Some(Rank(1)));
        assert_eq!(tag.loser_rank, Some(Rank(2)));

        let open = MatchTag::new(1, 1);
        assert!(open.winner_rank.is_none());
        assert!(open.loser_rank.is_none());
    }

    #[test]
    fn test_from_signed_decodes_role() {
        let winner = SlotTag::from_signed(5, SlotPos::P1, 3).unwrap();
        assert_eq!(winner.source, SlotSource::WinnerOf(BracketMatchNumber(3)));
        assert_eq!(winner.source.role(), Some(PairRole::Winner));

        let loser = SlotTag::from_signed(5, SlotPos::P2, -3).unwrap();
        assert_eq!(loser.source, SlotSource::LoserOf(BracketMatchNumber(3)));
        assert_eq!(loser.source.role(), Some(PairRole::Loser));
    }

    #[test]
    fn test_from_signed_rejects_zero() {
        let err = SlotTag::from_signed(5, SlotPos::P1, 0).unwrap_err();
        assert_eq!(
            err,
            BracketError::ZeroSourceRef {
                number: BracketMatchNumber(5),
                pos: SlotPos::P1,
            }
        );
    }

    #[test]
    fn test_seed_source_has_no_role() {
        let tag = SlotTag::seed(1, SlotPos::P1, 4);
        assert_eq!(tag.source, SlotSource::Seed(Rank(4)));
        assert!(tag.source.role().is_none());
    }

    #[test]
    fn test_tags_round_trip_as_json() {
        let tag = SlotTag::winner_of(6, SlotPos::P2, 4);
        let json = serde_json::to_string(&tag).unwrap();
        let back: SlotTag = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tag);
    }
}
