//! Startup smoothing ramp

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use util::maths::lerp;

use super::JointVector;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Ramps the command from the measured joint positions to the IK solution over `max_count`
/// cycles.
///
/// The count only ever increases and saturates at `max_count`, so the weight is non-decreasing
/// and stays at exactly 1 once reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ramp {
    count: u64,
    max_count: u64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Ramp {
    /// Create a new ramp. A `max_count` of zero is treated as one.
    pub fn new(max_count: u64) -> Self {
        Self {
            count: 0,
            max_count: max_count.max(1),
        }
    }

    /// Advance the ramp by one cycle, returning the new weight.
    pub fn advance(&mut self) -> f64 {
        self.count = (self.count + 1).min(self.max_count);
        self.weight()
    }

    /// Current weight of the IK solution in the command, in `[0, 1]`.
    pub fn weight(&self) -> f64 {
        self.count as f64 / self.max_count as f64
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn max_count(&self) -> u64 {
        self.max_count
    }

    pub fn is_complete(&self) -> bool {
        self.count == self.max_count
    }

    /// Blend between the measured and solved joint positions with the current weight.
    pub fn blend(&self, measured: &JointVector, solved: &JointVector) -> JointVector {
        let w = self.weight();
        let mut out = *measured;
        for (o, s) in out.iter_mut().zip(solved.iter()) {
            *o = lerp(*o, *s, w);
        }
        out
    }
}

impl Default for Ramp {
    fn default() -> Self {
        Self::new(1)
    }
}
