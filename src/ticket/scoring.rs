//! Index score computation
//!
//! Ordinary dimensions score a player with their submitted value as-is. The
//! `game_type` dimension is special: create-time scores are randomized inside
//! a per-type bucket so that an equality query returns a bounded random
//! subset of the cohort instead of the whole of it. The query-time bucket
//! bounds below must stay mirrored with the randomization width.

use rand::Rng;

/// Name of the bucketed dimension (and of its parameter index).
pub const GAME_TYPE: &str = "game_type";

/// Width of the random offset applied to `game_type` scores.
const JITTER_WIDTH: u32 = 200;

/// Inclusive score bounds an equality query uses for a `game_type` value.
pub fn bucket_bounds(value: f64) -> (f64, f64) {
    if value == 0.0 {
        (0.0, 200.0)
    } else {
        (201.0, 402.0)
    }
}

/// Create-time score for a player's value on a dimension.
pub fn index_score(param_type: &str, value: f64) -> f64 {
    if param_type != GAME_TYPE {
        return value;
    }

    let jitter = rand::thread_rng().gen_range(0..JITTER_WIDTH) as f64;
    if value == 0.0 {
        jitter
    } else {
        value + f64::from(JITTER_WIDTH) + jitter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinary_dimensions_score_identity() {
        assert_eq!(index_score("region", 7.5), 7.5);
        assert_eq!(index_score("league", -2.0), -2.0);
    }

    #[test]
    fn game_type_scores_land_inside_their_query_bucket() {
        for _ in 0..500 {
            let (min, max) = bucket_bounds(0.0);
            let score = index_score(GAME_TYPE, 0.0);
            assert!(score >= min && score <= max, "normal score {score} escaped bucket");

            let (min, max) = bucket_bounds(1.0);
            let score = index_score(GAME_TYPE, 1.0);
            assert!(score >= min && score <= max, "staked score {score} escaped bucket");
        }
    }

    #[test]
    fn buckets_do_not_overlap() {
        let (_, normal_max) = bucket_bounds(0.0);
        let (staked_min, _) = bucket_bounds(1.0);
        assert!(staked_min > normal_max);
    }
}
