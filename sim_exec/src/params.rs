//! # Simulated Arm Executable Parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SimExecParams {
    /// Endpoint the joint states are published on
    pub joint_state_endpoint: String,

    /// Endpoint the joint commands are received from
    pub joint_cmd_endpoint: String,

    /// Simulation and publishing frequency.
    ///
    /// Units: hertz
    pub frequency_hz: f64,

    /// Names of the simulated joints
    pub joint_names: Vec<String>,

    /// Joint positions at startup.
    ///
    /// Units: radians
    pub initial_positions: Vec<f64>,

    /// Shortest time constant of the joint response. Commands with a longer time from start are
    /// tracked more slowly.
    ///
    /// Units: seconds
    pub min_time_constant_s: f64,

    /// Maximum joint rate.
    ///
    /// Units: radians/second
    pub max_rate_rads: f64,
}
