//! # Simulated Arm Executable
//!
//! Stands in for the arm when bench testing `ctrl_exec`: joint commands are tracked by a simple
//! arm model and the resulting joint states are published at a fixed rate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Arm model
mod arm_sim;

/// Simulation server abstraction.
mod sim_server;

/// Parameters for the simulation executable.
mod params;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Result};
use log::{info, trace, warn};
use std::time::Instant;

// Internal
use arm_sim::ArmSim;
use comms_if::net::zmq;
use params::SimExecParams;
use sim_server::SimServer;
use util::{
    logger::{logger_init, LevelFilter},
    session::Session,
    time::{sleep_until_next, PeriodicTimer},
};

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("sim_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Info, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Simulated Arm Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    info!("Initialising...");

    // ---- LOAD PARAMETERS ----

    let params: SimExecParams =
        util::params::load("sim_exec.toml").wrap_err("Could not load sim_exec params")?;

    info!("Parameters loaded");

    // ---- INITIALISATION ----

    let mut arm = ArmSim::new(&params).wrap_err("Failed to initialise the arm model")?;

    let ctx = zmq::Context::new();
    let server = SimServer::new(&ctx, &params).wrap_err("Failed to initialise server")?;

    info!("Server initialised");

    // ---- MAIN LOOP ----

    let mut timer = PeriodicTimer::from_frequency(params.frequency_hz, Instant::now());
    let dt_s = timer.period().as_secs_f64();
    let mut connected = false;

    info!("Initialisation complete, entering main loop");

    loop {
        if timer.poll(Instant::now()) {
            if server.connected() != connected {
                connected = !connected;
                match connected {
                    true => info!("Controller connected"),
                    false => warn!("Controller disconnected"),
                }
            }

            if let Some(cmd) = server.take_cmd() {
                trace!("Command: {:?}", cmd.positions);
                if let Err(e) = arm.set_cmd(&cmd) {
                    warn!("Rejected command: {}", e);
                }
            }

            arm.step(dt_s);

            if let Err(e) = server.send_state(&arm.joint_state()) {
                warn!("Could not publish joint state: {}", e);
            }
        }

        sleep_until_next(&[&timer]);
    }
}
