//! # Kinematics
//!
//! Serial kinematic chains built from a robot description, with forward kinematics, the geometric
//! Jacobian and a numerical inverse kinematics solver.
//!
//! The robot description follows URDF joint semantics: each joint places its child link at
//! `origin * motion(q)` in the parent link's frame, where `origin` is the fixed xyz/rpy transform
//! and `motion(q)` a rotation about (revolute) or translation along (prismatic) the joint axis.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod chain;
mod ik;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

pub use chain::*;
pub use ik::*;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A structural description of a robot, a tree of links connected by joints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotDescription {
    /// Name of the robot
    pub name: String,

    /// All joints of the robot, in any order.
    pub joints: Vec<JointSpec>,
}

/// A single joint in the robot description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JointSpec {
    pub name: String,

    #[serde(rename = "type")]
    pub joint_type: JointType,

    /// Name of the parent link
    pub parent: String,

    /// Name of the child link
    pub child: String,

    /// Translation of the joint frame in the parent link frame.
    ///
    /// Units: meters
    #[serde(default)]
    pub origin_xyz: [f64; 3],

    /// Fixed-axis roll, pitch, yaw of the joint frame in the parent link frame.
    ///
    /// Units: radians
    #[serde(default)]
    pub origin_rpy: [f64; 3],

    /// Joint axis in the joint frame. Ignored for fixed joints.
    #[serde(default = "default_axis")]
    pub axis: [f64; 3],

    /// Position limits of the joint, if any.
    #[serde(default)]
    pub limit: Option<JointLimit>,
}

/// Position limits of a single joint.
///
/// Units: radians (revolute), meters (prismatic)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointLimit {
    pub lower: f64,
    pub upper: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointType {
    Revolute,

    /// A revolute joint without limits
    Continuous,

    Prismatic,

    Fixed,
}

#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("No chain of joints connects {base} to {tip}")]
    NoChain { base: String, tip: String },

    #[error("Link {0} is the child of more than one joint")]
    DuplicateChild(String),

    #[error("Joint {0} has a zero length axis")]
    ZeroAxis(String),

    #[error("Expected {expected} joint values but got {actual}")]
    JointCountMismatch { expected: usize, actual: usize },

    #[error("Could not compute the Jacobian pseudo-inverse: {0}")]
    PseudoInverse(&'static str),
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn default_axis() -> [f64; 3] {
    [0.0, 0.0, 1.0]
}
