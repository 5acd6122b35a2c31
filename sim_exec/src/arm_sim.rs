//! # Arm Simulation
//!
//! A kinematic arm model: each joint tracks its commanded position with a rate limited first order
//! response.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::arm::{JointCmd, JointState};

use crate::params::SimExecParams;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct ArmSim {
    joint_names: Vec<String>,

    positions: Vec<f64>,

    target: Option<Vec<f64>>,

    time_constant_s: f64,

    min_time_constant_s: f64,

    max_rate_rads: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ArmSimError {
    #[error("Expected {expected} initial positions but got {actual}")]
    WrongNumInitialPositions { expected: usize, actual: usize },

    #[error("Command has {actual} positions but the arm has {expected} joints")]
    WrongNumCmdPositions { expected: usize, actual: usize },

    #[error("Command contains non-finite positions")]
    NonFiniteCmd,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ArmSim {
    pub fn new(params: &SimExecParams) -> Result<Self, ArmSimError> {
        if params.initial_positions.len() != params.joint_names.len() {
            return Err(ArmSimError::WrongNumInitialPositions {
                expected: params.joint_names.len(),
                actual: params.initial_positions.len(),
            });
        }

        Ok(Self {
            joint_names: params.joint_names.clone(),
            positions: params.initial_positions.clone(),
            target: None,
            time_constant_s: params.min_time_constant_s,
            min_time_constant_s: params.min_time_constant_s,
            max_rate_rads: params.max_rate_rads,
        })
    }

    /// Set a new command to track.
    ///
    /// The command should be reached in about `time_from_start_s`, treated as three time
    /// constants.
    pub fn set_cmd(&mut self, cmd: &JointCmd) -> Result<(), ArmSimError> {
        if cmd.positions.len() != self.positions.len() {
            return Err(ArmSimError::WrongNumCmdPositions {
                expected: self.positions.len(),
                actual: cmd.positions.len(),
            });
        }
        if cmd.positions.iter().any(|p| !p.is_finite()) {
            return Err(ArmSimError::NonFiniteCmd);
        }

        self.target = Some(cmd.positions.clone());
        self.time_constant_s = (cmd.time_from_start_s / 3.0).max(self.min_time_constant_s);

        Ok(())
    }

    /// Advance the simulation by `dt_s` seconds.
    pub fn step(&mut self, dt_s: f64) {
        let target = match self.target {
            Some(ref t) => t,
            None => return,
        };

        let alpha = match self.time_constant_s > 0.0 {
            true => 1.0 - (-dt_s / self.time_constant_s).exp(),
            false => 1.0,
        };
        let max_step = self.max_rate_rads * dt_s;

        for (p, t) in self.positions.iter_mut().zip(target.iter()) {
            *p += (alpha * (t - *p)).clamp(-max_step, max_step);
        }
    }

    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    /// The current joint state, timestamped now.
    pub fn joint_state(&self) -> JointState {
        let mut js = JointState::now(self.positions.clone());
        js.names = self.joint_names.clone();
        js
    }
}
