//! Main shared control executable entry point.
//!
//! # Architecture
//!
//! The executable runs a single-threaded cooperative loop driven by two fixed-rate timers:
//!
//!     - Control timer:
//!         - Take the latest joint feedback and human input
//!         - Shared control processing
//!         - Send the joint command
//!         - Archive and send telemetry
//!     - Report timer:
//!         - Send the TCP position report
//!
//! Joint feedback and human input are received by background subscriber threads which keep only
//! the latest sample. A joint limit violation stops the loop and exits with an error.
//!
//! # Modules
//!
//! All modules (e.g. `share_ctrl`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, error, info, warn};
use std::time::Instant;

// Internal
use comms_if::{
    eqpt::arm::{HumanInput, JointState, TcpPosition},
    net::{zmq, NetParams, SubClient},
};
use ctrl_lib::{
    cmd_server::CmdServer,
    data_store::DataStore,
    share_ctrl::{CtrlState, ShareCtrlError},
    tm_server::TmServer,
};
use util::{
    archive::Archived,
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
    time::{sleep_until_next, PeriodicTimer},
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("ctrl_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Shared Control Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let net_params: NetParams =
        util::params::load("net.toml").wrap_err("Could not load net params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    ds.share_ctrl
        .init("share_ctrl.toml", &session)
        .wrap_err("Failed to initialise ShareCtrl")?;
    info!("ShareCtrl init complete");

    info!("Module initialisation complete\n");

    // ---- INITIALISE NETWORK ----

    info!("Initialising network");

    let zmq_ctx = zmq::Context::new();

    let joint_state_client: SubClient<JointState> =
        SubClient::new(&zmq_ctx, &net_params.joint_state_endpoint)
            .wrap_err("Failed to initialise the joint state client")?;
    info!("Joint state client initialised");

    let human_input_client: SubClient<HumanInput> =
        SubClient::new(&zmq_ctx, &net_params.human_input_endpoint)
            .wrap_err("Failed to initialise the human input client")?;
    info!("Human input client initialised");

    let cmd_server =
        CmdServer::new(&zmq_ctx, &net_params).wrap_err("Failed to initialise CmdServer")?;
    info!("CmdServer initialised");

    let tm_server =
        TmServer::new(&zmq_ctx, &net_params).wrap_err("Failed to initialise TmServer")?;
    info!("TmServer initialised");

    info!("Network initialisation complete");

    // ---- MAIN LOOP ----

    let start = Instant::now();
    let mut ctrl_timer =
        PeriodicTimer::from_frequency(ds.share_ctrl.params().control_frequency_hz, start);
    let mut report_timer =
        PeriodicTimer::from_frequency(ds.share_ctrl.params().report_frequency_hz, start);

    info!(
        "Begining main loop, control at {:.1} Hz, report at {:.1} Hz\n",
        ds.share_ctrl.params().control_frequency_hz,
        ds.share_ctrl.params().report_frequency_hz
    );

    let mut halt_cause: Option<ShareCtrlError> = None;

    loop {
        let now = Instant::now();

        // ---- POSITION REPORT ----

        if report_timer.poll(now) {
            let position = TcpPosition::from(ds.share_ctrl.tcp_position());
            if let Err(e) = tm_server.send_tcp_position(position) {
                warn!("Could not send TCP position: {}", e);
            }
        }

        // ---- CONTROL CYCLE ----

        if ctrl_timer.poll(now) {
            ds.cycle_start();

            if ctrl_timer.num_overruns() > ds.num_cycle_overruns {
                warn!("Control cycle {} started more than a period late", ds.num_cycles);
                ds.num_cycle_overruns = ctrl_timer.num_overruns();
            }

            // ---- DATA INPUT ----

            ds.joint_state_connected = joint_state_client.connected();
            ds.human_input_connected = human_input_client.connected();
            ds.share_ctrl_input.joint_state = joint_state_client.take_latest();
            ds.share_ctrl_input.human_input = human_input_client.take_latest();

            // ---- CONTROL ALGORITHM PROCESSING ----

            match ds.share_ctrl.proc(&ds.share_ctrl_input) {
                Ok((o, r)) => {
                    ds.share_ctrl_output = o;
                    ds.share_ctrl_status_rpt = r;
                }
                Err(e @ ShareCtrlError::LimitViolation { .. }) | Err(e @ ShareCtrlError::Halted) => {
                    error!("ShareCtrl halted: {}", e);
                    ds.share_ctrl_status_rpt = *ds.share_ctrl.report();
                    halt_cause = Some(e);
                }
                Err(e) => {
                    // Kinematics errors only affect this cycle, nothing is sent
                    warn!("Error during ShareCtrl processing: {}", e);
                    ds.share_ctrl_status_rpt = *ds.share_ctrl.report();
                }
            }

            // ---- OUTPUT ----

            if let Some(ref cmd) = ds.share_ctrl_output {
                if let Err(e) = cmd_server.send(cmd) {
                    warn!("Could not send joint command: {}", e);
                }
            }

            // ---- WRITE ARCHIVES ----

            if let Err(e) = ds.share_ctrl.write() {
                warn!("Could not write ShareCtrl archive: {}", e);
            }

            // ---- TELEMETRY ----

            if let Err(e) = tm_server.send_tm(&ds) {
                warn!("TmServer error: {}", e);
            }

            debug!(
                "Cycle {}: {:?}, w = {:.3}",
                ds.num_cycles, ds.share_ctrl_status_rpt.state, ds.share_ctrl_status_rpt.ramp_weight
            );

            ds.num_cycles += 1;

            if halt_cause.is_some() || ds.share_ctrl.state() == CtrlState::Halted {
                break;
            }
        }

        // ---- CYCLE MANAGEMENT ----

        sleep_until_next(&[&ctrl_timer, &report_timer]);
    }

    // ---- SHUTDOWN ----

    info!("Stopping after {} control cycles", ds.num_cycles);

    session.save("final_status.json", *ds.share_ctrl.report());

    // Close the sockets before the context is dropped
    drop(joint_state_client);
    drop(human_input_client);
    drop(cmd_server);
    drop(tm_server);

    session.exit();

    info!("End of execution");

    match halt_cause {
        Some(e) => Err(e).wrap_err("Shared control halted on a joint limit violation"),
        None => Ok(()),
    }
}
