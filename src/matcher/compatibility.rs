//! Pairwise player compatibility predicate

use crate::types::Player;
use crate::utils::rating_difference;

/// Whether two players may share a match at the given rating tolerance
///
/// Region and mode must match exactly and the rating gap must be within
/// `max_diff`; all three conditions are conjunctive and there is no partial
/// scoring. Symmetric in its player arguments.
pub fn compatible(a: &Player, b: &Player, max_diff: i32) -> bool {
    if a.region != b.region {
        return false;
    }

    if a.mode != b.mode {
        return false;
    }

    rating_difference(a.rating, b.rating) <= i64::from(max_diff)
}
