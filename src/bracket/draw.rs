//! Seeding draw helpers.

use rand::Rng;
use rand::seq::SliceRandom;

use super::entities::PairId;

/// Produces a seeding order from a ranked entrant list: the first
/// `protected` entries keep their ranked position, the remainder are drawn
/// at random. This is the usual procedure when only the top seeds are set
/// and everyone else enters the bracket by lot.
pub fn draw_with_protected_seeds<R: Rng + ?Sized>(
    ranked: &[PairId],
    protected: usize,
    rng: &mut R,
) -> Vec<PairId> {
    let mut seeding = ranked.to_vec();
    if protected < seeding.len() {
        seeding[protected..].shuffle(rng);
    }
    seeding
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_protected_prefix_is_untouched() {
        let ranked: Vec<PairId> = (1..=16).collect();
        let mut rng = StdRng::seed_from_u64(7);
        let drawn = draw_with_protected_seeds(&ranked, 4, &mut rng);

        assert_eq!(&drawn[..4], &[1, 2, 3, 4]);
        assert_eq!(drawn.len(), 16);
    }

    #[test]
    fn test_draw_is_a_permutation() {
        let ranked: Vec<PairId> = (1..=16).collect();
        let mut rng = StdRng::seed_from_u64(7);
        let mut drawn = draw_with_protected_seeds(&ranked, 0, &mut rng);

        drawn.sort_unstable();
        assert_eq!(drawn, ranked);
    }

    #[test]
    fn test_protected_beyond_len_is_identity() {
        let ranked: Vec<PairId> = vec![5, 6, 7];
        let mut rng = StdRng::seed_from_u64(7);
        let drawn = draw_with_protected_seeds(&ranked, 10, &mut rng);
        assert_eq!(drawn, ranked);
    }
}
