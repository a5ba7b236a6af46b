//! Integer saturation

/// Bound `value` to `[low, high]`
///
/// `low <= high` is a precondition; callers validate their bounds before
/// getting here (see [`DutyBounds`](super::DutyBounds)).
pub const fn clamp(value: i32, low: i32, high: i32) -> i32 {
    debug_assert!(low <= high);

    if value > high {
        high
    } else if value < low {
        low
    } else {
        value
    }
}
