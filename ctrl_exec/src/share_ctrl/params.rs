//! Parameters structure for ShareCtrl

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::{InitError, JointLimits};
use crate::{kinematics::IkParams, traj_gen::TrajGen};

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Parameters for shared control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Params {
    // ---- KINEMATICS ----
    /// Robot description file, relative to the parameters directory.
    pub robot_description_file: String,

    /// Name of the link the chain starts from.
    pub base_frame: String,

    /// Name of the link whose pose is controlled.
    pub tip_frame: String,

    /// Inverse kinematics solver settings.
    #[serde(default)]
    pub ik: IkParams,

    // ---- LIMITS ----
    /// Joint limit table. If not given the limits in the robot description are used.
    #[serde(default)]
    pub joint_limits: Option<JointLimits>,

    // ---- TIMING ----
    /// Units: hertz
    pub control_frequency_hz: f64,

    /// Frequency of the TCP position report.
    ///
    /// Units: hertz
    pub report_frequency_hz: f64,

    /// Number of control cycles over which the command ramps from the measured configuration to
    /// the IK solution.
    pub ramp_max_count: u64,

    /// Commands are tagged to be reached this many control periods after receipt.
    pub latency_factor: f64,

    // ---- BLENDING ----
    /// Cartesian point both offsets are applied to, in the arm base frame.
    ///
    /// Units: meters
    pub origin_m: [f64; 3],

    /// Share of the human input on each axis, each in `[0, 1]`. The autonomous trajectory gets
    /// the remaining share.
    pub human_weights: [f64; 3],

    /// Human input device units are multiplied by `mapping_ratio / 100` to give meters.
    pub mapping_ratio: f64,

    /// The autonomous trajectory.
    #[serde(default)]
    pub traj: TrajGen,

    // ---- FAULT POLICY ----
    /// If true no command is issued on cycles where IK did not converge.
    #[serde(default)]
    pub skip_unconverged: bool,

    /// Age after which the human input is reported as stale. If not given human input never
    /// goes stale.
    ///
    /// Units: seconds
    #[serde(default)]
    pub human_input_timeout_s: Option<f64>,

    /// If true a stale human input is ignored and the autonomous trajectory has full control.
    #[serde(default)]
    pub degrade_on_stale_input: bool,

    /// Age after which joint feedback is reported as stale. Only reported, the loop keeps using
    /// the last feedback.
    ///
    /// Units: seconds
    #[serde(default)]
    pub feedback_timeout_s: Option<f64>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            robot_description_file: "panda.toml".into(),
            base_frame: "panda_link0".into(),
            tip_frame: "panda_grasptarget".into(),
            ik: IkParams::default(),
            joint_limits: None,
            control_frequency_hz: 20.0,
            report_frequency_hz: 200.0,
            ramp_max_count: 200,
            latency_factor: 2.0,
            origin_m: [0.4559, 0.0, 0.3346],
            human_weights: [1.0; 3],
            mapping_ratio: 1.5,
            traj: TrajGen::Linear { rate_ms: 1.0 },
            skip_unconverged: false,
            human_input_timeout_s: None,
            degrade_on_stale_input: false,
            feedback_timeout_s: None,
        }
    }
}

impl Params {
    /// Check the parameters are usable.
    pub fn validate(&self) -> Result<(), InitError> {
        let invalid = |msg: String| Err(InitError::InvalidParams(msg));

        if !(self.control_frequency_hz > 0.0) {
            return invalid(format!(
                "control_frequency_hz must be positive, got {}",
                self.control_frequency_hz
            ));
        }
        if !(self.report_frequency_hz > 0.0) {
            return invalid(format!(
                "report_frequency_hz must be positive, got {}",
                self.report_frequency_hz
            ));
        }
        if self.ramp_max_count == 0 {
            return invalid("ramp_max_count must be at least 1".into());
        }
        if !(self.latency_factor >= 0.0) {
            return invalid(format!(
                "latency_factor must not be negative, got {}",
                self.latency_factor
            ));
        }
        if let Some(i) = self
            .human_weights
            .iter()
            .position(|w| !(0.0..=1.0).contains(w))
        {
            return invalid(format!(
                "human_weights[{}] must be in [0, 1], got {}",
                i, self.human_weights[i]
            ));
        }
        if let Some(i) = self.joint_limits.as_ref().and_then(|l| l.first_unordered()) {
            return invalid(format!("joint_limits lower bound above upper bound for joint {}", i));
        }
        for (name, timeout) in [
            ("human_input_timeout_s", self.human_input_timeout_s),
            ("feedback_timeout_s", self.feedback_timeout_s),
        ] {
            if let Some(t) = timeout {
                if !(t > 0.0) {
                    return invalid(format!("{} must be positive, got {}", name, t));
                }
            }
        }
        if !(self.ik.eps > 0.0) || !(self.ik.vel_eps >= 0.0) {
            return invalid("ik.eps must be positive and ik.vel_eps not negative".into());
        }

        Ok(())
    }

    /// Units: seconds
    pub fn control_period_s(&self) -> f64 {
        1.0 / self.control_frequency_hz
    }

    /// Time after receipt at which a command should be reached.
    ///
    /// Units: seconds
    pub fn time_from_start_s(&self) -> f64 {
        self.latency_factor * self.control_period_s()
    }

    /// Number of control cycles spanning the given duration, rounded up.
    pub fn cycles_in(&self, duration_s: f64) -> u64 {
        (duration_s * self.control_frequency_hz).ceil() as u64
    }
}
