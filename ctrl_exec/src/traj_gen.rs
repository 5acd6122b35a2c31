//! # Autonomous Trajectory Generator
//!
//! Produces the autonomous contribution to the Cartesian target as a pure function of the time
//! elapsed since the loop armed.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// An autonomous trajectory, expressed as an offset from the origin in the arm base frame.
///
/// Generators hold no state so any `t` may be evaluated in any order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TrajGen {
    /// Zero offset on every axis.
    Hold,

    /// Offset growing linearly on every axis, `rate_ms * t`.
    Linear {
        /// Units: meters/second
        rate_ms: f64,
    },

    /// Sinusoidal offset `amplitude_m * sin(2 pi frequency_hz t + phase_rad)` on each axis.
    Sinusoid {
        /// Units: meters
        amplitude_m: [f64; 3],

        /// Units: hertz
        frequency_hz: f64,

        /// Units: radians
        #[serde(default)]
        phase_rad: f64,
    },
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for TrajGen {
    fn default() -> Self {
        TrajGen::Hold
    }
}

impl TrajGen {
    /// The offset at time `t_s` seconds after arming.
    pub fn offset_m(&self, t_s: f64) -> Vector3<f64> {
        match *self {
            TrajGen::Hold => Vector3::zeros(),
            TrajGen::Linear { rate_ms } => Vector3::repeat(rate_ms * t_s),
            TrajGen::Sinusoid {
                amplitude_m,
                frequency_hz,
                phase_rad,
            } => Vector3::from(amplitude_m) * (TAU * frequency_hz * t_s + phase_rad).sin(),
        }
    }
}
