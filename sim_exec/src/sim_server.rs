//! # Simulation Server Module
//!
//! This module abstracts over the networking side of the simulated arm. Joint commands are
//! received from `ctrl_exec` and joint states are published back to it.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    eqpt::arm::{JointCmd, JointState},
    net::{zmq, MonitoredSocket, MonitoredSocketError, SocketOptions, SubClient, SubClientError},
};

use crate::params::SimExecParams;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// An abstraction over the networking part of the simulated arm.
pub struct SimServer {
    /// PUB socket which sends joint states
    state_socket: MonitoredSocket,

    /// Subscriber to the joint commands
    cmd_client: SubClient<JointCmd>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors which can occur in the [`SimServer`]
#[derive(thiserror::Error, Debug)]
pub enum SimServerError {
    #[error("Socket error: {0}")]
    SocketError(#[from] MonitoredSocketError),

    #[error("Command client error: {0}")]
    ClientError(#[from] SubClientError),

    #[error("Could not serialize the joint state: {0}")]
    SerializationError(serde_json::Error),

    #[error("Could not send data to the client: {0}")]
    SendError(zmq::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimServer {
    /// Create a new instance of the simulation server.
    ///
    /// This function will not wait for a connection from the client before returning.
    pub fn new(ctx: &zmq::Context, params: &SimExecParams) -> Result<Self, SimServerError> {
        let state_socket_options = SocketOptions {
            bind: true,
            block_on_first_connect: false,
            linger: 1,
            send_timeout: 10,
            ..Default::default()
        };

        let state_socket = MonitoredSocket::new(
            ctx,
            zmq::PUB,
            state_socket_options,
            &params.joint_state_endpoint,
        )?;

        let cmd_client = SubClient::new(ctx, &params.joint_cmd_endpoint)?;

        Ok(Self {
            state_socket,
            cmd_client,
        })
    }

    /// The latest command received since the last call, if any.
    pub fn take_cmd(&self) -> Option<JointCmd> {
        self.cmd_client.take_latest()
    }

    /// Publish the joint state.
    pub fn send_state(&self, state: &JointState) -> Result<(), SimServerError> {
        let state_str =
            serde_json::to_string(state).map_err(SimServerError::SerializationError)?;

        self.state_socket
            .send(&state_str, 0)
            .map_err(SimServerError::SendError)
    }

    /// Returns true if the controller is connected to both sockets.
    pub fn connected(&self) -> bool {
        self.state_socket.connected() && self.cmd_client.connected()
    }
}
