//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Linearly interpolate between `from` and `to` by `weight`.
///
/// Computed as `weight * to + (1 - weight) * from`, so a weight of exactly 1
/// returns `to` exactly and a weight of exactly 0 returns `from` exactly.
pub fn lerp<T>(from: T, to: T, weight: T) -> T
where
    T: Float,
{
    weight * to + (T::one() - weight) * from
}

/// Return true if `value` lies in the closed interval `[min, max]`.
///
/// `NaN` is never within any interval.
pub fn within_closed<T>(value: T, min: T, max: T) -> bool
where
    T: Float,
{
    value >= min && value <= max
}
