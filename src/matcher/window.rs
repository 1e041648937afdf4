//! Wait-time based rating window policy
//!
//! The acceptable rating half-width widens in fixed 30-second steps while a
//! player waits, then jumps to a hard saturation value once the maximum
//! search time is exceeded.

use crate::config::MatchingSettings;
use std::time::Duration;

/// Length of one expansion slice
pub const SLICE_SECONDS: u64 = 30;

/// Acceptable rating half-width for a player who has waited `wait_time`
///
/// Below the max search time the window grows linearly and uncapped:
/// `base + floor(wait / 30s) * expansion`. Past the max search time it is a
/// fixed saturation value, discontinuous with the ramp below it. Monotonic
/// non-decreasing apart from that explicit jump.
pub fn rating_window(settings: &MatchingSettings, wait_time: Duration) -> i32 {
    if wait_time > settings.max_search_time() {
        return settings.saturation_window;
    }

    let slices = wait_time.as_secs() / SLICE_SECONDS;
    settings
        .base_rating_diff
        .saturating_add((slices as i32).saturating_mul(settings.expansion_per_slice))
}
