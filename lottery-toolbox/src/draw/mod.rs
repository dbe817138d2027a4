mod seed;

use prize_pool_lib::PrizeEntry;
use rand::Rng;

pub use seed::{parse_seed, seeded_rng, Seed, SeedError};

/// Pick one prize with probability proportional to its weight.
///
/// Only drawable entries (enabled, positive weight, non blank name) take
/// part. `random` must yield values in `[0, 1)` and is not called at all when
/// there is nothing to draw, in which case `None` is returned.
///
/// The range `[0, total)` is split into consecutive intervals sized by the
/// candidates' weights, in pool order, and the interval holding
/// `random() * total` wins. Rounding may leave a tiny positive remainder after
/// the last candidate; the last candidate wins in that case.
pub fn pick_prize_with<F>(pool: &[PrizeEntry], mut random: F) -> Option<&PrizeEntry>
where
    F: FnMut() -> f64,
{
    let candidates = pool
        .iter()
        .filter(|entry| entry.is_drawable())
        .collect::<Vec<_>>();
    let last = *candidates.last()?;

    let total_weight = candidates.iter().map(|entry| entry.weight).sum::<f64>();
    let mut remaining = random() * total_weight;

    for candidate in candidates {
        remaining -= candidate.weight;
        if remaining <= 0.0 {
            return Some(candidate);
        }
    }
    Some(last)
}

/// [`pick_prize_with`] drawing uniform values from `rng`.
pub fn pick_prize<'pool, R: Rng>(
    pool: &'pool [PrizeEntry],
    rng: &mut R,
) -> Option<&'pool PrizeEntry> {
    pick_prize_with(pool, || rng.gen::<f64>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use prize_pool_lib::arbitrary;
    use prize_pool_lib::PrizePool;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use test_strategy::proptest;

    fn prize(id: &str, weight: f64) -> PrizeEntry {
        PrizeEntry {
            id: id.to_string(),
            name: id.to_uppercase(),
            detail: format!("{} detail", id),
            weight,
            enabled: true,
        }
    }

    #[test]
    fn worked_example() {
        let pool = [prize("a", 1.0), prize("b", 3.0)];
        assert_eq!(pick_prize_with(&pool, || 0.1).unwrap().name, "A");
        assert_eq!(pick_prize_with(&pool, || 0.9).unwrap().name, "B");
    }

    #[test]
    fn interval_boundaries() {
        let pool = [prize("a", 1.0), prize("b", 1.0), prize("c", 2.0)];
        assert_eq!(pick_prize_with(&pool, || 0.0).unwrap().id, "a");
        // exactly on the end of the first interval still belongs to it
        assert_eq!(pick_prize_with(&pool, || 0.25).unwrap().id, "a");
        assert_eq!(pick_prize_with(&pool, || 0.26).unwrap().id, "b");
        assert_eq!(pick_prize_with(&pool, || 0.999_999).unwrap().id, "c");
    }

    #[test]
    fn non_candidates_are_skipped() {
        let mut disabled = prize("x", 50.0);
        disabled.enabled = false;
        let mut unnamed = prize("y", 50.0);
        unnamed.name = "  ".to_string();
        let pool = [disabled, prize("zero", 0.0), unnamed, prize("b", 1.0)];
        for r in [0.0, 0.5, 0.999] {
            assert_eq!(pick_prize_with(&pool, || r).unwrap().id, "b");
        }
    }

    #[test]
    fn undrawable_pool_never_consults_randomness() {
        let mut disabled = prize("x", 5.0);
        disabled.enabled = false;
        let pool = [disabled, prize("zero", 0.0)];
        let mut calls = 0;
        assert!(pick_prize_with(&pool, || {
            calls += 1;
            0.5
        })
        .is_none());
        assert_eq!(calls, 0);
        assert!(pick_prize_with(&[], || 0.5).is_none());
    }

    #[test]
    fn exhausted_walk_falls_back_to_last_candidate() {
        // a source returning 1.0 is out of contract but reproduces the
        // rounding leftover: the walk ends with a positive remainder
        let pool = [prize("a", 0.1), prize("b", 0.2)];
        assert_eq!(pick_prize_with(&pool, || 1.000_001).unwrap().id, "b");
    }

    #[test]
    fn normalized_huge_weights_still_split_into_intervals() {
        let pool = PrizePool::from(vec![
            prize("a", 1e308),
            prize("b", 1e308),
            prize("c", 1e308),
        ])
        .normalized();
        assert!(pool.total_weight().is_finite());
        assert_eq!(pick_prize_with(pool.entries(), || 0.0).unwrap().id, "a");
        assert_eq!(pick_prize_with(pool.entries(), || 0.1).unwrap().id, "a");
        assert_eq!(pick_prize_with(pool.entries(), || 0.5).unwrap().id, "b");
        assert_eq!(pick_prize_with(pool.entries(), || 0.9).unwrap().id, "c");
    }

    #[test]
    fn equal_weights_split_evenly() {
        let pool = [prize("a", 5.0), prize("b", 5.0)];
        let mut rng = ChaCha8Rng::from_seed([7; 32]);
        let draws = 20_000;
        let a_wins = (0..draws)
            .filter(|_| pick_prize(&pool, &mut rng).unwrap().id == "a")
            .count();
        let ratio = a_wins as f64 / draws as f64;
        assert!((ratio - 0.5).abs() < 0.02, "ratio was {}", ratio);
    }

    #[proptest]
    fn single_candidate_always_wins(
        #[strategy(arbitrary::candidate())] candidate: PrizeEntry,
        #[strategy(0.0f64..1.0)] r: f64,
    ) {
        let mut disabled = candidate.clone();
        disabled.enabled = false;
        let pool = [disabled, candidate.clone()];
        assert_eq!(pick_prize_with(&pool, || r), Some(&candidate));
    }

    #[proptest]
    fn drawable_pools_always_yield_a_candidate(
        #[strategy(arbitrary::drawable_pool())] pool: PrizePool,
        #[strategy(0.0f64..1.0)] r: f64,
    ) {
        let picked = pick_prize_with(pool.entries(), || r).unwrap();
        assert!(picked.is_drawable());
    }

    #[proptest]
    fn undrawable_pools_yield_nothing(#[strategy(arbitrary::prize_pool())] pool: PrizePool) {
        let disabled = pool
            .into_inner()
            .into_iter()
            .map(|entry| PrizeEntry {
                enabled: false,
                ..entry
            })
            .collect::<Vec<_>>();
        assert!(pick_prize_with(&disabled, || 0.5).is_none());
    }

    #[proptest]
    fn same_seed_same_sequence(
        #[strategy(arbitrary::drawable_pool())] pool: PrizePool,
        seed: [u8; 32],
    ) {
        let mut first = ChaCha8Rng::from_seed(seed);
        let mut second = ChaCha8Rng::from_seed(seed);
        for _ in 0..16 {
            assert_eq!(
                pick_prize(pool.entries(), &mut first),
                pick_prize(pool.entries(), &mut second)
            );
        }
    }
}
