//! Runs the shared control loop with the parameter files shipped in `params/`.

use approx::assert_relative_eq;
use comms_if::eqpt::arm::JointState;
use ctrl_lib::{
    kinematics::{Chain, RobotDescription},
    share_ctrl::{CtrlState, InputData, Params, ShareCtrl},
};
use nalgebra::Vector3;
use std::convert::TryInto;
use std::path::{Path, PathBuf};
use util::{archive::Archived, module::State, session::Session};

const PANDA_HOME: [f64; 7] = [
    0.0,
    -std::f64::consts::FRAC_PI_4,
    0.0,
    -3.0 * std::f64::consts::FRAC_PI_4,
    0.0,
    std::f64::consts::FRAC_PI_2,
    std::f64::consts::FRAC_PI_4,
];

fn sw_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..")
}

fn shipped_ctrl() -> ShareCtrl {
    let params: Params =
        util::params::load_from_path(sw_root().join("params/share_ctrl.toml")).unwrap();
    let desc: RobotDescription = util::params::load_from_path(
        sw_root().join("params").join(&params.robot_description_file),
    )
    .unwrap();
    let chain = Chain::from_description(&desc, &params.base_frame, &params.tip_frame).unwrap();

    ShareCtrl::new(params, chain).unwrap()
}

fn feedback(q: &[f64]) -> InputData {
    InputData {
        joint_state: Some(JointState::now(q.to_vec())),
        human_input: None,
    }
}

#[test]
fn test_ramp_to_origin_from_home() {
    let mut ctrl = shipped_ctrl();
    let ramp_max_count = ctrl.params().ramp_max_count;
    let origin = Vector3::from(ctrl.params().origin_m);

    let mut last_cmd = None;
    for i in 0..ramp_max_count {
        let (cmd, rpt) = ctrl.proc(&feedback(&PANDA_HOME)).unwrap();
        let cmd = cmd.unwrap();

        assert_eq!(rpt.state, CtrlState::Armed);
        assert!(rpt.ik_converged);
        assert_relative_eq!(rpt.ramp_weight, (i + 1) as f64 / ramp_max_count as f64);
        assert_relative_eq!(
            cmd.time_from_start_s,
            ctrl.params().latency_factor / ctrl.params().control_frequency_hz
        );
        let q: [f64; 7] = cmd.positions.as_slice().try_into().unwrap();
        assert!(ctrl.limits().within_limits(&q));

        // Full human weighting with no human input holds the target at the origin
        assert_relative_eq!(Vector3::from(rpt.target_m), origin);

        last_cmd = Some(cmd);
    }

    // At the end of the ramp the command is the IK solution itself
    let cmd = last_cmd.unwrap();
    let chain = ctrl.chain().unwrap();
    let pose = chain.forward_kinematics(&cmd.positions).unwrap();
    assert_relative_eq!(pose.translation.vector, origin, epsilon = 1e-5);

    let home = chain.forward_kinematics(&PANDA_HOME).unwrap();
    assert_relative_eq!(pose.rotation, home.rotation, epsilon = 1e-5);
    assert_relative_eq!(ctrl.frozen_orientation().unwrap(), home.rotation);
}

#[test]
fn test_closed_loop_tracks_target() {
    let mut ctrl = shipped_ctrl();
    let ramp_max_count = ctrl.params().ramp_max_count;

    // Feed the commands straight back as feedback, as an ideal arm would
    let mut q = PANDA_HOME.to_vec();
    for _ in 0..ramp_max_count + 20 {
        let (cmd, rpt) = ctrl.proc(&feedback(&q)).unwrap();
        assert_eq!(rpt.state, CtrlState::Armed);
        q = cmd.unwrap().positions;
    }

    let pose = ctrl.chain().unwrap().forward_kinematics(&q).unwrap();
    assert_relative_eq!(
        pose.translation.vector,
        Vector3::from(ctrl.params().origin_m),
        epsilon = 1e-5
    );
}

#[test]
fn test_init_from_params_dir() {
    std::env::set_var(util::host::SW_ROOT_ENV_VAR, sw_root());

    let sessions = tempfile::tempdir().unwrap();
    let session = Session::new_in(sessions.path(), "ctrl_exec_test").unwrap();

    let mut ctrl = ShareCtrl::default();
    ctrl.init("share_ctrl.toml", &session).unwrap();
    assert_eq!(ctrl.chain().unwrap().num_joints(), 7);

    // Unarmed cycles are not archived
    ctrl.proc(&InputData::default()).unwrap();
    ctrl.write().unwrap();

    for _ in 0..3 {
        ctrl.proc(&feedback(&PANDA_HOME)).unwrap();
        ctrl.write().unwrap();
    }

    let arch_path = session.arch_root.join("share_ctrl/share_ctrl.csv");
    session.exit();

    let contents = std::fs::read_to_string(arch_path).unwrap();
    let mut lines = contents.lines();
    assert!(lines.next().unwrap().starts_with("time_s,ramp_weight,"));
    assert_eq!(lines.count(), 3);
}
