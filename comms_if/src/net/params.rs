//! Network parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Endpoints used by the shared control executables.
///
/// Publishers bind to their endpoint, subscribers connect to it.
#[derive(Debug, Clone, Deserialize)]
pub struct NetParams {
    /// Joint feedback published by the arm (or `sim_exec`).
    pub joint_state_endpoint: String,

    /// Human input samples published by the haptic device driver.
    pub human_input_endpoint: String,

    /// Joint commands published by `ctrl_exec`.
    pub joint_cmd_endpoint: String,

    /// Tool centre point position reports published by `ctrl_exec`.
    pub tcp_pos_endpoint: String,

    /// Telemetry published by `ctrl_exec`.
    pub tm_endpoint: String,
}
