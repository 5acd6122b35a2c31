//! # Shared Control
//!
//! The shared control loop blends the human input offset with the autonomous trajectory offset,
//! resolves the blended target to joint positions, ramps the command in from the arm's starting
//! configuration and halts if any commanded joint leaves its limits.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod limits;
mod orientation;
mod params;
mod ramp;
mod state;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

pub use limits::*;
pub use orientation::*;
pub use params::*;
pub use ramp::*;
pub use state::*;

use crate::kinematics::ChainError;
use util::{archive::ArchiveError, params::LoadError};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// The number of controlled joints on the arm.
pub const NUM_JOINTS: usize = 7;

// ------------------------------------------------------------------------------------------------
// TYPES
// ------------------------------------------------------------------------------------------------

/// One value per controlled joint, in chain order.
pub type JointVector = [f64; NUM_JOINTS];

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors that can occur during ShareCtrl processing.
#[derive(Debug, thiserror::Error)]
pub enum ShareCtrlError {
    #[error("Joint {joint} command {value:.4} is outside its limits [{lower:.4}, {upper:.4}]")]
    LimitViolation {
        joint: usize,
        value: f64,
        lower: f64,
        upper: f64,
    },

    #[error("ShareCtrl has halted and will not issue further commands")]
    Halted,

    #[error("ShareCtrl has not been initialised")]
    NotInitialised,

    #[error("Kinematics error: {0}")]
    Kinematics(#[from] ChainError),
}

/// Errors that can occur while initialising ShareCtrl.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("Could not load parameters: {0}")]
    ParamLoad(#[from] LoadError),

    #[error("Invalid parameter: {0}")]
    InvalidParams(String),

    #[error("Could not build the kinematic chain: {0}")]
    Chain(#[from] ChainError),

    #[error("The chain has {actual} joints but {expected} are controlled")]
    WrongJointCount { actual: usize, expected: usize },

    #[error("No joint limits are set and the robot description does not limit every joint")]
    NoJointLimits,

    #[error("Could not open the archive: {0}")]
    Archive(#[from] ArchiveError),
}
