//! Programmatic single-elimination bracket templates.
//!
//! Produces the same flat tag sets an external template source would
//! deliver, for the common case of a power-of-two field with canonical seed
//! placement: seed 1 can only meet seed 2 in the final, and in general the
//! top `2^r` seeds cannot collide before round `r` is done.

use super::entities::{BracketMatchNumber, Rank, SlotPos};
use super::graph::{BracketError, BracketResult};
use super::template::{MatchTag, SlotTag};

/// Builds the template for a single-elimination bracket of `field_size`
/// entrants (a power of two, at least 2).
///
/// Matches are numbered consecutively from 1 in round order. Losers of
/// round `r` share the rank of the bucket they drop into (`field/2^r + 1`),
/// so quarterfinal losers of an 8-field all finish fifth. With
/// `third_place_playoff` the semifinal losers instead meet once more for
/// ranks 3 and 4; that playoff is scheduled alongside the final.
pub fn single_elimination(
    field_size: u16,
    third_place_playoff: bool,
) -> BracketResult<(Vec<MatchTag>, Vec<SlotTag>)> {
    if field_size < 2 || !field_size.is_power_of_two() {
        return Err(BracketError::InvalidFieldSize(field_size));
    }
    if third_place_playoff && field_size < 4 {
        return Err(BracketError::InvalidFieldSize(field_size));
    }

    let rounds = field_size.trailing_zeros() as u16;
    let mut matches = Vec::new();
    let mut slots = Vec::new();

    // First match number of each round, for wiring links forward.
    let mut round_start = vec![0u16; rounds as usize + 2];
    let mut next_number = 1u16;
    for round in 1..=rounds {
        round_start[round as usize] = next_number;
        next_number += field_size >> round;
    }

    let placement = seed_order(field_size);

    for round in 1..=rounds {
        let matches_in_round = field_size >> round;
        let is_final_round = round == rounds;
        let semifinal_into_playoff = third_place_playoff && round == rounds - 1;

        for j in 0..matches_in_round {
            let number = round_start[round as usize] + j;
            let mut tag = MatchTag::new(number, round);

            if is_final_round {
                tag = tag.with_winner_rank(1).with_loser_rank(2);
            } else if !semifinal_into_playoff {
                // Losers drop into a shared placement bucket.
                tag = tag.with_loser_rank(field_size / (1 << round) + 1);
            }
            matches.push(tag);

            if round == 1 {
                let base = (j as usize) * 2;
                slots.push(SlotTag::seed(number, SlotPos::P1, placement[base].0));
                slots.push(SlotTag::seed(number, SlotPos::P2, placement[base + 1].0));
            }

            if !is_final_round {
                // Winner advances into the next round, pairs of matches
                // folding into one.
                let dst = round_start[round as usize + 1] + j / 2;
                let pos = if j % 2 == 0 { SlotPos::P1 } else { SlotPos::P2 };
                slots.push(SlotTag::winner_of(dst, pos, number));
            }
        }
    }

    if third_place_playoff {
        // The playoff takes over the final's number; the final moves one up
        // and stays the highest-numbered match of the bracket.
        let semifinal_start = round_start[rounds as usize - 1];
        let playoff = next_number - 1;
        let final_number = next_number;

        if let Some(last) = matches.last_mut() {
            last.number = BracketMatchNumber(final_number);
        }
        for slot in &mut slots {
            if slot.number.0 == playoff {
                slot.number = BracketMatchNumber(final_number);
            }
        }

        matches.push(
            MatchTag::new(playoff, rounds)
                .with_winner_rank(3)
                .with_loser_rank(4),
        );
        slots.push(SlotTag::loser_of(playoff, SlotPos::P1, semifinal_start));
        slots.push(SlotTag::loser_of(playoff, SlotPos::P2, semifinal_start + 1));
    }

    Ok((matches, slots))
}

/// Canonical seed placement for the round-1 slots of a power-of-two field,
/// produced by repeatedly folding the ordered seed list: `[1, 2]` becomes
/// `[1, 4, 2, 3]`, then `[1, 8, 4, 5, 2, 7, 3, 6]`, and so on.
fn seed_order(field_size: u16) -> Vec<Rank> {
    let mut order: Vec<u16> = vec![1];
    while (order.len() as u16) < field_size {
        let grown = order.len() as u16 * 2;
        let mut next = Vec::with_capacity(grown as usize);
        for &seed in &order {
            next.push(seed);
            next.push(grown + 1 - seed);
        }
        order = next;
    }
    order.into_iter().map(Rank).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::entities::{
        BracketMatchNumber, BranchState, IncomingBracketLink, PairRole,
    };
    use crate::bracket::graph::BracketGraph;

    #[test]
    fn test_seed_order_folds_canonically() {
        let order: Vec<u16> = seed_order(8).iter().map(|rank| rank.0).collect();
        assert_eq!(order, vec![1, 8, 4, 5, 2, 7, 3, 6]);

        let order: Vec<u16> = seed_order(2).iter().map(|rank| rank.0).collect();
        assert_eq!(order, vec![1, 2]);
    }

    #[test]
    fn test_rejects_invalid_field_sizes() {
        for bad in [0, 1, 3, 6, 12] {
            assert_eq!(
                single_elimination(bad, false).unwrap_err(),
                BracketError::InvalidFieldSize(bad)
            );
        }
        assert_eq!(
            single_elimination(2, true).unwrap_err(),
            BracketError::InvalidFieldSize(2)
        );
    }

    #[test]
    fn test_eight_field_template_builds_valid_graph() {
        let (matches, slots) = single_elimination(8, false).unwrap();
        assert_eq!(matches.len(), 7);

        let graph = BracketGraph::from_template(&matches, &slots).unwrap();
        assert_eq!(graph.num_rounds(), 3);

        // Quarterfinal losers all finish fifth, semifinal losers third.
        for number in 1..=4 {
            let node = graph.node(BracketMatchNumber(number)).unwrap();
            assert_eq!(node.loser_rank(), Some(Rank(5)));
        }
        for number in 5..=6 {
            let node = graph.node(BracketMatchNumber(number)).unwrap();
            assert_eq!(node.loser_rank(), Some(Rank(3)));
        }
        let the_final = graph.node(BracketMatchNumber(7)).unwrap();
        assert_eq!(the_final.winner_rank(), Some(Rank(1)));
        assert_eq!(the_final.loser_rank(), Some(Rank(2)));

        // Top two seeds start on opposite halves.
        let m1 = graph.node(BracketMatchNumber(1)).unwrap();
        assert_eq!(m1.initial_rank(SlotPos::P1), Some(Rank(1)));
        assert_eq!(m1.initial_rank(SlotPos::P2), Some(Rank(8)));
        let m3 = graph.node(BracketMatchNumber(3)).unwrap();
        assert_eq!(m3.initial_rank(SlotPos::P1), Some(Rank(2)));
        assert_eq!(m3.initial_rank(SlotPos::P2), Some(Rank(7)));
    }

    #[test]
    fn test_third_place_playoff_wiring() {
        let (matches, slots) = single_elimination(8, true).unwrap();
        assert_eq!(matches.len(), 8);

        let graph = BracketGraph::from_template(&matches, &slots).unwrap();
        let playoff = graph.node(BracketMatchNumber(7)).unwrap();
        assert_eq!(playoff.winner_rank(), Some(Rank(3)));
        assert_eq!(playoff.loser_rank(), Some(Rank(4)));
        assert_eq!(
            playoff.incoming_link(SlotPos::P1),
            Some(&IncomingBracketLink {
                src_match: BracketMatchNumber(5),
                role: PairRole::Loser,
            })
        );
        assert_eq!(
            playoff.incoming_link(SlotPos::P2),
            Some(&IncomingBracketLink {
                src_match: BracketMatchNumber(6),
                role: PairRole::Loser,
            })
        );

        let the_final = graph.node(BracketMatchNumber(8)).unwrap();
        assert_eq!(the_final.winner_rank(), Some(Rank(1)));
        assert_eq!(
            the_final.incoming_link(SlotPos::P1),
            Some(&IncomingBracketLink {
                src_match: BracketMatchNumber(5),
                role: PairRole::Winner,
            })
        );
    }

    #[test]
    fn test_two_field_is_a_single_final() {
        let (matches, slots) = single_elimination(2, false).unwrap();
        assert_eq!(matches.len(), 1);

        let mut graph = BracketGraph::from_template(&matches, &slots).unwrap();
        graph.apply_seeding(&[10, 20]).unwrap();
        let the_final = graph.node(BracketMatchNumber(1)).unwrap();
        assert_eq!(
            the_final.states(),
            (BranchState::Assigned, BranchState::Assigned)
        );
    }
}
