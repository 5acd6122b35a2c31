//! # Human Input Tracker
//!
//! Holds the latest sample from the human input device as a Cartesian offset.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::arm::HumanInput;
use nalgebra::Vector3;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Tracks the most recent human input.
///
/// Each update replaces the previous offset entirely. Before the first update the offset is zero.
#[derive(Debug, Clone)]
pub struct HumanInputTracker {
    scale: f64,

    offset_m: Vector3<f64>,

    last_sample: Option<HumanInput>,

    cycles_since_sample: Option<u64>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl HumanInputTracker {
    /// Create a tracker converting device units with the given mapping ratio.
    ///
    /// Device positions are multiplied by `mapping_ratio / 100`.
    pub fn new(mapping_ratio: f64) -> Self {
        Self {
            scale: mapping_ratio / 100.0,
            offset_m: Vector3::zeros(),
            last_sample: None,
            cycles_since_sample: None,
        }
    }

    /// Replace the tracked offset with a new sample.
    pub fn update(&mut self, sample: HumanInput) {
        self.offset_m = Vector3::from(sample.position()) * self.scale;
        self.last_sample = Some(sample);
        self.cycles_since_sample = Some(0);
    }

    /// Record that a control cycle passed, used to track staleness.
    pub fn tick(&mut self) {
        if let Some(ref mut c) = self.cycles_since_sample {
            *c = c.saturating_add(1);
        }
    }

    /// The current offset.
    ///
    /// Units: meters
    pub fn offset_m(&self) -> Vector3<f64> {
        self.offset_m
    }

    pub fn last_sample(&self) -> Option<&HumanInput> {
        self.last_sample.as_ref()
    }

    /// Number of cycles since the last sample, `None` if no sample was ever received.
    pub fn cycles_since_sample(&self) -> Option<u64> {
        self.cycles_since_sample
    }

    /// Returns true if no sample has arrived in more than `max_cycles` cycles.
    ///
    /// A tracker which never received a sample is stale.
    pub fn is_stale(&self, max_cycles: u64) -> bool {
        match self.cycles_since_sample {
            Some(c) => c > max_cycles,
            None => true,
        }
    }
}

impl Default for HumanInputTracker {
    /// A tracker using device units directly as meters.
    fn default() -> Self {
        Self::new(100.0)
    }
}
