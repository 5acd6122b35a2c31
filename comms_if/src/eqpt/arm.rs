//! # Arm Equipment Messages
//!
//! All messages are sent as JSON strings over zmq PUB/SUB sockets.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Joint feedback published by the arm.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct JointState {
    /// Time at which the state was measured.
    pub timestamp: DateTime<Utc>,

    /// Name of each joint, in the same order as `positions`. May be empty.
    #[serde(default)]
    pub names: Vec<String>,

    /// Measured position of each joint.
    ///
    /// Units: radians (revolute joints), meters (prismatic joints)
    pub positions: Vec<f64>,
}

/// A sample from the human input device (the haptic handle).
///
/// The position is in device units, roughly centimeters of handle travel
/// from the device's centre.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct HumanInput {
    pub timestamp: DateTime<Utc>,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// A joint command for the arm's trajectory controller.
///
/// The command is a single trajectory waypoint which the arm should reach
/// `time_from_start_s` seconds after receiving it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct JointCmd {
    /// Names of the commanded joints, in chain order.
    pub joint_names: Vec<String>,

    /// Demanded position of each joint.
    ///
    /// Units: radians (revolute joints), meters (prismatic joints)
    pub positions: Vec<f64>,

    /// Duration from receipt until the waypoint should be reached.
    ///
    /// Units: seconds
    pub time_from_start_s: f64,
}

/// The Cartesian position of the tool centre point demanded by the controller.
///
/// Frame: arm base
/// Units: meters
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct TcpPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl JointState {
    /// Create a new joint state measured now.
    pub fn now(positions: Vec<f64>) -> Self {
        Self {
            timestamp: Utc::now(),
            names: Vec::new(),
            positions,
        }
    }
}

impl HumanInput {
    /// Create a new human input sample taken now.
    pub fn now(x: f64, y: f64, z: f64) -> Self {
        Self {
            timestamp: Utc::now(),
            x,
            y,
            z,
        }
    }

    /// The position of the handle as an array.
    pub fn position(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f64; 3]> for TcpPosition {
    fn from(p: [f64; 3]) -> Self {
        Self {
            x: p[0],
            y: p[1],
            z: p[2],
        }
    }
}
