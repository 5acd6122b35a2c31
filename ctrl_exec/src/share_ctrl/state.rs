//! Implementations for the ShareCtrl state structure

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::{debug, error, info, trace, warn};
use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use std::convert::TryInto;

// Internal
use super::{
    InitError, JointLimits, JointVector, Params, Ramp, ShareCtrlError, TargetOrientation,
    NUM_JOINTS,
};
use crate::{
    human_input::HumanInputTracker,
    kinematics::{Chain, ChainError, IkSolution, RobotDescription},
};
use comms_if::eqpt::arm::{HumanInput, JointCmd, JointState};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    module::State,
    params,
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Shared control module state
#[derive(Default)]
pub struct ShareCtrl {
    pub(crate) params: Params,

    chain: Option<Chain>,

    limits: JointLimits,

    ramp: Ramp,

    orientation: TargetOrientation,

    human: HumanInputTracker,

    state: CtrlState,

    /// Latest joint feedback.
    curr_joints: Option<JointVector>,

    /// Control cycles since the last joint feedback.
    feedback_age_cycles: u64,

    /// Number of armed cycles processed, sets the trajectory time.
    armed_cycles: u64,

    /// Number of calls to `proc`.
    num_cycles: u64,

    /// Last blended Cartesian target.
    target_m: Vector3<f64>,

    human_stale_cycles: Option<u64>,

    feedback_stale_cycles: Option<u64>,

    pub(crate) report: StatusReport,

    arch: Archiver,

    /// Values to archive for this cycle, set on armed cycles only.
    arch_row: Option<Vec<f64>>,
}

/// Input data to shared control.
#[derive(Debug, Default, Clone)]
pub struct InputData {
    /// New joint feedback, or `None` if none arrived since the last cycle.
    pub joint_state: Option<JointState>,

    /// New human input sample, or `None` if none arrived since the last cycle.
    pub human_input: Option<HumanInput>,
}

/// Status report for ShareCtrl processing.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StatusReport {
    pub state: CtrlState,

    /// Index of this cycle since start
    pub cycle: u64,

    /// Trajectory time of this cycle. Zero until armed.
    ///
    /// Units: seconds
    pub traj_time_s: f64,

    /// Weight of the IK solution in the command
    pub ramp_weight: f64,

    /// Blended Cartesian target of this cycle.
    ///
    /// Units: meters
    pub target_m: [f64; 3],

    pub ik_converged: bool,

    pub ik_iterations: usize,

    pub ik_residual: f64,

    /// True if the command was withheld because IK did not converge.
    pub cmd_skipped: bool,

    pub human_input_stale: bool,

    pub feedback_stale: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// State of the shared control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CtrlState {
    /// No joint feedback received yet.
    Unarmed,

    /// Feedback received, commands are issued every cycle.
    Armed,

    /// A command left the joint limits. Terminal.
    Halted,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Default for CtrlState {
    fn default() -> Self {
        CtrlState::Unarmed
    }
}

impl State for ShareCtrl {
    type InitData = &'static str;
    type InitError = InitError;

    type InputData = InputData;
    type OutputData = Option<JointCmd>;
    type StatusReport = StatusReport;
    type ProcError = ShareCtrlError;

    /// Initialise the ShareCtrl module.
    ///
    /// Expected init data is the path to the parameter file. The robot description named in the
    /// parameters is loaded from the same directory.
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError> {
        let params: Params = params::load(init_data)?;
        let desc: RobotDescription = params::load(&params.robot_description_file)?;
        let chain = Chain::from_description(&desc, &params.base_frame, &params.tip_frame)?;

        info!(
            "Loaded {} chain {} -> {} with joints {:?}",
            desc.name,
            chain.base(),
            chain.tip(),
            chain.joint_names()
        );

        *self = Self::new(params, chain)?;

        self.arch = Archiver::from_path(session, "share_ctrl/share_ctrl.csv", &archive_headers())?;

        Ok(())
    }

    /// Perform one control cycle.
    ///
    /// Returns the command to send, if any. A limit violation halts the loop and returns
    /// [`ShareCtrlError::LimitViolation`], every later call returns [`ShareCtrlError::Halted`].
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        if self.state == CtrlState::Halted {
            return Err(ShareCtrlError::Halted);
        }

        let chain = self.chain.as_ref().ok_or(ShareCtrlError::NotInitialised)?;

        self.report = StatusReport {
            state: self.state,
            cycle: self.num_cycles,
            target_m: self.target_m.into(),
            ..Default::default()
        };
        self.arch_row = None;
        self.num_cycles += 1;

        // ---- INPUTS ----

        self.human.tick();
        if let Some(sample) = input_data.human_input {
            trace!("Human input: {:?}", sample.position());
            self.human.update(sample);
        }

        self.feedback_age_cycles = self.feedback_age_cycles.saturating_add(1);
        if let Some(ref js) = input_data.joint_state {
            match joint_vector(&js.positions) {
                Some(q) => {
                    self.curr_joints = Some(q);
                    self.feedback_age_cycles = 0;
                }
                None => warn!(
                    "Rejecting joint feedback with {} positions, expected {}",
                    js.positions.len(),
                    NUM_JOINTS
                ),
            }
        }

        let curr = match self.curr_joints {
            Some(q) => q,
            None => return Ok((None, self.report)),
        };

        if self.state == CtrlState::Unarmed {
            info!("First joint feedback received, ShareCtrl armed");
            self.state = CtrlState::Armed;
            self.report.state = CtrlState::Armed;
        }

        self.report.human_input_stale = match self.human_stale_cycles {
            Some(n) => self.human.is_stale(n),
            None => false,
        };
        self.report.feedback_stale = match self.feedback_stale_cycles {
            Some(n) => self.feedback_age_cycles > n,
            None => false,
        };

        // ---- TARGET ----

        let t_s = self.armed_cycles as f64 / self.params.control_frequency_hz;
        self.armed_cycles += 1;

        let weights = match self.report.human_input_stale && self.params.degrade_on_stale_input {
            true => [0.0; 3],
            false => self.params.human_weights,
        };

        let robot_offset_m = self.params.traj.offset_m(t_s);
        let target_m = blend_target(
            &Vector3::from(self.params.origin_m),
            &weights,
            &self.human.offset_m(),
            &robot_offset_m,
        );
        self.target_m = target_m;

        let orientation = self
            .orientation
            .get_or_try_freeze(|| chain.forward_kinematics(&curr).map(|p| p.rotation))?;

        // ---- IK ----

        let target = Isometry3::from_parts(Translation3::from(target_m), orientation);
        let ik = chain.solve_ik(&self.params.ik, &target, &curr)?;

        if !ik.converged {
            warn!(
                "IK did not converge for target {:?} after {} iterations (residual {:.3e})",
                target_m.as_slice(),
                ik.iterations,
                ik.residual
            );
        }

        let ik_joints: JointVector = ik
            .joints
            .as_slice()
            .try_into()
            .map_err(|_| ChainError::JointCountMismatch {
                expected: NUM_JOINTS,
                actual: ik.joints.len(),
            })?;

        // ---- RAMP AND LIMITS ----

        let ramp_weight = self.ramp.advance();
        let cmd_joints = self.ramp.blend(&curr, &ik_joints);

        self.report.traj_time_s = t_s;
        self.report.ramp_weight = ramp_weight;
        self.report.target_m = target_m.into();
        self.report.ik_converged = ik.converged;
        self.report.ik_iterations = ik.iterations;
        self.report.ik_residual = ik.residual;

        self.arch_row = Some(archive_row(&self.report, &curr, &ik, &cmd_joints));

        if let Some(v) = self.limits.first_violation(&cmd_joints) {
            error!(
                "Joint {} command {:.4} outside limits [{:.4}, {:.4}], halting",
                v.joint, v.value, v.lower, v.upper
            );
            self.state = CtrlState::Halted;
            self.report.state = CtrlState::Halted;

            return Err(ShareCtrlError::LimitViolation {
                joint: v.joint,
                value: v.value,
                lower: v.lower,
                upper: v.upper,
            });
        }

        // ---- OUTPUT ----

        if self.params.skip_unconverged && !ik.converged {
            self.report.cmd_skipped = true;
            return Ok((None, self.report));
        }

        debug!("ShareCtrl cmd (w = {:.3}): {:?}", ramp_weight, cmd_joints);

        Ok((
            Some(JointCmd {
                joint_names: chain.joint_names().to_vec(),
                positions: cmd_joints.to_vec(),
                time_from_start_s: self.params.time_from_start_s(),
            }),
            self.report,
        ))
    }
}

impl Archived for ShareCtrl {
    /// Write the archive row of the last cycle, if it was armed.
    fn write(&mut self) -> Result<(), ArchiveError> {
        match self.arch_row.take() {
            Some(row) => self.arch.write_row(&row),
            None => Ok(()),
        }
    }
}

impl ShareCtrl {
    /// Create a new controller from parameters and a chain, without archiving.
    pub fn new(params: Params, chain: Chain) -> Result<Self, InitError> {
        params.validate()?;

        if chain.num_joints() != NUM_JOINTS {
            return Err(InitError::WrongJointCount {
                actual: chain.num_joints(),
                expected: NUM_JOINTS,
            });
        }

        let limits = match params.joint_limits {
            Some(l) => l,
            None => chain
                .joint_limits()
                .and_then(|l| JointLimits::from_joint_limits(&l))
                .ok_or(InitError::NoJointLimits)?,
        };

        let human_stale_cycles = params.human_input_timeout_s.map(|t| params.cycles_in(t));
        let feedback_stale_cycles = params.feedback_timeout_s.map(|t| params.cycles_in(t));

        Ok(Self {
            ramp: Ramp::new(params.ramp_max_count),
            human: HumanInputTracker::new(params.mapping_ratio),
            target_m: Vector3::from(params.origin_m),
            chain: Some(chain),
            limits,
            human_stale_cycles,
            feedback_stale_cycles,
            params,
            ..Default::default()
        })
    }

    pub fn state(&self) -> CtrlState {
        self.state
    }

    /// The report of the last cycle
    pub fn report(&self) -> &StatusReport {
        &self.report
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn chain(&self) -> Option<&Chain> {
        self.chain.as_ref()
    }

    pub fn limits(&self) -> &JointLimits {
        &self.limits
    }

    /// The tool orientation used for every IK target, once captured.
    pub fn frozen_orientation(&self) -> Option<UnitQuaternion<f64>> {
        self.orientation.get()
    }

    /// Position of the last blended target, the origin before the first armed cycle.
    ///
    /// Units: meters
    pub fn tcp_position(&self) -> [f64; 3] {
        self.target_m.into()
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Blend the human and autonomous offsets per axis about the origin.
///
/// A weight of 1 gives the human full control of that axis, 0 gives the trajectory full control.
pub fn blend_target(
    origin_m: &Vector3<f64>,
    human_weights: &[f64; 3],
    human_offset_m: &Vector3<f64>,
    robot_offset_m: &Vector3<f64>,
) -> Vector3<f64> {
    Vector3::from_fn(|a, _| {
        origin_m[a]
            + human_weights[a] * human_offset_m[a]
            + (1.0 - human_weights[a]) * robot_offset_m[a]
    })
}

/// The first `NUM_JOINTS` feedback positions, `None` if there are fewer.
fn joint_vector(positions: &[f64]) -> Option<JointVector> {
    positions.get(..NUM_JOINTS)?.try_into().ok()
}

fn archive_headers() -> Vec<String> {
    let mut headers: Vec<String> = vec![
        "ramp_weight",
        "target_x_m",
        "target_y_m",
        "target_z_m",
        "ik_converged",
        "ik_iterations",
        "ik_residual",
    ]
    .into_iter()
    .map(String::from)
    .collect();

    for prefix in ["feedback", "ik", "cmd"] {
        headers.extend((0..NUM_JOINTS).map(|i| format!("{}_{}", prefix, i)));
    }

    headers
}

fn archive_row(
    report: &StatusReport,
    curr: &JointVector,
    ik: &IkSolution,
    cmd: &JointVector,
) -> Vec<f64> {
    let mut row = vec![
        report.ramp_weight,
        report.target_m[0],
        report.target_m[1],
        report.target_m[2],
        report.ik_converged as u8 as f64,
        report.ik_iterations as f64,
        report.ik_residual,
    ];
    row.extend_from_slice(curr);
    row.extend_from_slice(&ik.joints);
    row.extend_from_slice(cmd);
    row
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        kinematics::test_utils::*,
        traj_gen::TrajGen,
    };
    use approx::assert_relative_eq;

    fn panda_limits() -> JointLimits {
        JointLimits {
            lower: [-2.8973, -1.7628, -2.8973, -3.0718, -2.8973, -0.0175, -2.8973],
            upper: [2.8973, 1.7628, 2.8973, -0.0698, 2.8973, 3.7525, 2.8973],
        }
    }

    fn test_params() -> Params {
        Params {
            joint_limits: Some(panda_limits()),
            origin_m: [0.3, 0.0, 0.48],
            human_weights: [1.0; 3],
            ramp_max_count: 1,
            traj: TrajGen::Hold,
            ..Default::default()
        }
    }

    fn feedback(q: &JointVector) -> InputData {
        InputData {
            joint_state: Some(JointState::now(q.to_vec())),
            human_input: None,
        }
    }

    fn home_target(position: [f64; 3]) -> Isometry3<f64> {
        let home = panda_chain().forward_kinematics(&PANDA_HOME).unwrap();
        Isometry3::from_parts(Translation3::from(Vector3::from(position)), home.rotation)
    }

    #[test]
    fn test_unarmed_until_feedback() {
        let mut ctrl = ShareCtrl::new(test_params(), panda_chain()).unwrap();

        let (out, rpt) = ctrl
            .proc(&InputData {
                joint_state: None,
                human_input: Some(HumanInput::now(1.0, 1.0, 1.0)),
            })
            .unwrap();

        assert!(out.is_none());
        assert_eq!(rpt.state, CtrlState::Unarmed);
        assert_eq!(ctrl.state(), CtrlState::Unarmed);
        assert_eq!(ctrl.tcp_position(), [0.3, 0.0, 0.48]);
        assert!(ctrl.frozen_orientation().is_none());

        // Short feedback is rejected and does not arm
        let (out, _) = ctrl
            .proc(&InputData {
                joint_state: Some(JointState::now(vec![0.0; 6])),
                human_input: None,
            })
            .unwrap();
        assert!(out.is_none());
        assert_eq!(ctrl.state(), CtrlState::Unarmed);

        let (out, rpt) = ctrl.proc(&feedback(&PANDA_HOME)).unwrap();
        assert!(out.is_some());
        assert_eq!(rpt.state, CtrlState::Armed);
    }

    #[test]
    fn test_first_tick_is_ik_solution() {
        let params = test_params();
        let mut ctrl = ShareCtrl::new(params.clone(), panda_chain()).unwrap();

        let (out, rpt) = ctrl.proc(&feedback(&PANDA_HOME)).unwrap();
        let cmd = out.unwrap();

        let expected = panda_chain()
            .solve_ik(&params.ik, &home_target([0.3, 0.0, 0.48]), &PANDA_HOME)
            .unwrap();

        assert!(expected.converged);
        assert_eq!(rpt.ramp_weight, 1.0);
        assert_eq!(rpt.target_m, [0.3, 0.0, 0.48]);
        assert_eq!(rpt.traj_time_s, 0.0);
        assert!(rpt.ik_converged);
        assert_eq!(cmd.positions, expected.joints);
        assert_eq!(cmd.joint_names, panda_chain().joint_names().to_vec());
        assert_relative_eq!(cmd.time_from_start_s, 0.1);
    }

    #[test]
    fn test_extra_feedback_positions_ignored() {
        let mut ctrl = ShareCtrl::new(test_params(), panda_chain()).unwrap();

        let mut positions = PANDA_HOME.to_vec();
        positions.extend_from_slice(&[0.04, 0.04]);

        let (out, _) = ctrl
            .proc(&InputData {
                joint_state: Some(JointState::now(positions)),
                human_input: None,
            })
            .unwrap();

        assert_eq!(out.unwrap().positions.len(), NUM_JOINTS);
    }

    #[test]
    fn test_autonomous_only_ignores_human() {
        let params = Params {
            human_weights: [0.0; 3],
            traj: TrajGen::Linear { rate_ms: 0.1 },
            ..test_params()
        };

        let mut still = ShareCtrl::new(params.clone(), panda_chain()).unwrap();
        let mut moving = ShareCtrl::new(params, panda_chain()).unwrap();

        for k in 0..4 {
            let (a, rpt) = still.proc(&feedback(&PANDA_HOME)).unwrap();

            let mut input = feedback(&PANDA_HOME);
            input.human_input = Some(HumanInput::now(10.0 * k as f64, -5.0, 3.0));
            let (b, _) = moving.proc(&input).unwrap();

            assert_eq!(a, b);

            let t = k as f64 / 20.0;
            assert_relative_eq!(rpt.traj_time_s, t);
            assert_relative_eq!(
                Vector3::from(rpt.target_m),
                Vector3::new(0.3, 0.0, 0.48) + Vector3::repeat(0.1 * t),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_human_only() {
        let mut ctrl = ShareCtrl::new(
            Params {
                traj: TrajGen::Linear { rate_ms: 1.0 },
                ..test_params()
            },
            panda_chain(),
        )
        .unwrap();

        let mut input = feedback(&PANDA_HOME);
        input.human_input = Some(HumanInput::now(2.0, -2.0, 1.0));
        ctrl.proc(&input).unwrap();
        let (_, rpt) = ctrl.proc(&feedback(&PANDA_HOME)).unwrap();

        // The last sample is held and the trajectory has no share
        assert_relative_eq!(
            Vector3::from(rpt.target_m),
            Vector3::new(0.33, -0.03, 0.495),
            epsilon = 1e-12
        );
        assert_eq!(ctrl.tcp_position(), rpt.target_m);
    }

    #[test]
    fn test_ramp_interpolates() {
        let params = Params {
            ramp_max_count: 10,
            ..test_params()
        };
        let mut ctrl = ShareCtrl::new(params.clone(), panda_chain()).unwrap();

        let ik = panda_chain()
            .solve_ik(&params.ik, &home_target([0.3, 0.0, 0.48]), &PANDA_HOME)
            .unwrap();

        let mut prev_w = 0.0;
        for k in 1..=12 {
            let (out, rpt) = ctrl.proc(&feedback(&PANDA_HOME)).unwrap();
            let cmd = out.unwrap();
            let w = rpt.ramp_weight;

            if k <= 10 {
                assert!(w > prev_w);
                assert_relative_eq!(w, k as f64 / 10.0, epsilon = 1e-12);
            } else {
                assert_eq!(w, 1.0);
            }
            prev_w = w;

            for i in 0..NUM_JOINTS {
                assert_relative_eq!(
                    cmd.positions[i],
                    w * ik.joints[i] + (1.0 - w) * PANDA_HOME[i],
                    epsilon = 1e-12
                );
            }
        }
    }

    #[test]
    fn test_orientation_frozen_at_first_feedback() {
        let chain = panda_chain();
        let mut ctrl = ShareCtrl::new(test_params(), chain.clone()).unwrap();

        let home_rot = chain.forward_kinematics(&PANDA_HOME).unwrap().rotation;
        ctrl.proc(&feedback(&PANDA_HOME)).unwrap();
        assert_eq!(ctrl.frozen_orientation(), Some(home_rot));

        // Feedback with the wrist turned does not change the target orientation
        let mut turned = PANDA_HOME;
        turned[6] += 0.3;
        let (out, _) = ctrl.proc(&feedback(&turned)).unwrap();
        assert_eq!(ctrl.frozen_orientation(), Some(home_rot));

        let pose = chain.forward_kinematics(&out.unwrap().positions).unwrap();
        assert!(pose.rotation.angle_to(&home_rot) < 1e-5);
    }

    /// Parameters under which the command equals the home configuration exactly.
    fn hold_home_params(limits: JointLimits) -> Params {
        let home = panda_chain().forward_kinematics(&PANDA_HOME).unwrap();

        Params {
            origin_m: home.translation.vector.into(),
            joint_limits: Some(limits),
            ..test_params()
        }
    }

    #[test]
    fn test_command_on_bounds_stays_armed() {
        let limits = JointLimits {
            lower: PANDA_HOME,
            upper: PANDA_HOME,
        };
        let mut ctrl = ShareCtrl::new(hold_home_params(limits), panda_chain()).unwrap();

        for _ in 0..3 {
            let (out, rpt) = ctrl.proc(&feedback(&PANDA_HOME)).unwrap();
            assert_eq!(out.unwrap().positions, PANDA_HOME.to_vec());
            assert_eq!(rpt.state, CtrlState::Armed);
        }
    }

    #[test]
    fn test_limit_violation_halts() {
        let mut limits = panda_limits();
        limits.upper[3] = PANDA_HOME[3] - 1.0;
        limits.lower[3] = PANDA_HOME[3] - 2.0;
        let mut ctrl = ShareCtrl::new(hold_home_params(limits), panda_chain()).unwrap();

        match ctrl.proc(&feedback(&PANDA_HOME)) {
            Err(ShareCtrlError::LimitViolation { joint, value, upper, .. }) => {
                assert_eq!(joint, 3);
                assert_eq!(value, PANDA_HOME[3]);
                assert_eq!(upper, PANDA_HOME[3] - 1.0);
            }
            r => panic!("Expected a limit violation, got {:?}", r),
        }
        assert_eq!(ctrl.state(), CtrlState::Halted);
        assert_eq!(ctrl.report().state, CtrlState::Halted);

        // Nothing is issued once halted
        for _ in 0..3 {
            assert!(matches!(
                ctrl.proc(&feedback(&PANDA_HOME)),
                Err(ShareCtrlError::Halted)
            ));
        }
    }

    #[test]
    fn test_skip_unconverged() {
        let params = Params {
            ik: crate::kinematics::IkParams {
                max_iterations: 0,
                ..Default::default()
            },
            skip_unconverged: true,
            ..test_params()
        };
        let mut ctrl = ShareCtrl::new(params, panda_chain()).unwrap();

        let (out, rpt) = ctrl.proc(&feedback(&PANDA_HOME)).unwrap();
        assert!(out.is_none());
        assert!(rpt.cmd_skipped);
        assert!(!rpt.ik_converged);

        // The ramp still advanced
        assert_eq!(rpt.ramp_weight, 1.0);
        assert_eq!(ctrl.state(), CtrlState::Armed);
    }

    #[test]
    fn test_stale_human_input_degrades() {
        let params = Params {
            human_input_timeout_s: Some(0.1),
            degrade_on_stale_input: true,
            feedback_timeout_s: Some(0.1),
            ..test_params()
        };
        let mut ctrl = ShareCtrl::new(params, panda_chain()).unwrap();

        let mut input = feedback(&PANDA_HOME);
        input.human_input = Some(HumanInput::now(2.0, 0.0, 0.0));
        let (_, rpt) = ctrl.proc(&input).unwrap();
        assert!(!rpt.human_input_stale);
        assert!(!rpt.feedback_stale);
        assert_relative_eq!(rpt.target_m[0], 0.33, epsilon = 1e-12);

        let mut rpt = rpt;
        for _ in 0..5 {
            rpt = ctrl.proc(&InputData::default()).unwrap().1;
        }

        // Without new samples both inputs go stale, the loop keeps running on the last feedback
        assert!(rpt.human_input_stale);
        assert!(rpt.feedback_stale);
        assert_eq!(rpt.state, CtrlState::Armed);
        assert_relative_eq!(rpt.target_m[0], 0.3, epsilon = 1e-12);
    }

    #[test]
    fn test_new_errors() {
        let params = Params {
            joint_limits: None,
            ..test_params()
        };

        // Limits fall back to the robot description
        let ctrl = ShareCtrl::new(params.clone(), panda_chain()).unwrap();
        assert_eq!(ctrl.limits(), &panda_limits());

        let mut desc = panda_description();
        for j in desc.joints.iter_mut() {
            j.limit = None;
        }
        let unlimited =
            Chain::from_description(&desc, "panda_link0", "panda_grasptarget").unwrap();
        assert!(matches!(
            ShareCtrl::new(params.clone(), unlimited),
            Err(InitError::NoJointLimits)
        ));

        let short = Chain::from_description(&panda_description(), "panda_link0", "panda_link4")
            .unwrap();
        assert!(matches!(
            ShareCtrl::new(params, short),
            Err(InitError::WrongJointCount {
                actual: 4,
                expected: 7
            })
        ));

        let mut ctrl = ShareCtrl::default();
        assert!(matches!(
            ctrl.proc(&InputData::default()),
            Err(ShareCtrlError::NotInitialised)
        ));
    }

    #[test]
    fn test_archive_row() {
        let mut ctrl = ShareCtrl::new(test_params(), panda_chain()).unwrap();

        // Nothing to archive before arming
        ctrl.proc(&InputData::default()).unwrap();
        assert!(ctrl.arch_row.is_none());
        assert!(ctrl.write().is_ok());

        ctrl.proc(&feedback(&PANDA_HOME)).unwrap();
        let row = ctrl.arch_row.as_ref().unwrap();
        assert_eq!(row.len(), archive_headers().len());
        assert_eq!(row[0], 1.0);

        // The archive was never opened
        assert!(matches!(ctrl.write(), Err(ArchiveError::NotOpen)));
    }

    #[test]
    fn test_blend_target() {
        let origin = Vector3::new(0.3, 0.0, 0.48);
        let human = Vector3::new(0.1, 0.2, 0.3);
        let robot = Vector3::new(-0.1, -0.2, -0.3);

        let t = blend_target(&origin, &[1.0, 0.0, 0.5], &human, &robot);
        assert_relative_eq!(t, Vector3::new(0.4, -0.2, 0.48), epsilon = 1e-12);
    }
}
