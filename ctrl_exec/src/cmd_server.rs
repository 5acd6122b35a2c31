//! # Command Server
//!
//! Publishes joint commands to the arm's trajectory controller.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    eqpt::arm::JointCmd,
    net::{zmq, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Joint command publisher
pub struct CmdServer {
    socket: MonitoredSocket,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CmdServerError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not send the command: {0}")]
    SendError(zmq::Error),

    #[error("Could not serialize the command: {0}")]
    SerializationError(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CmdServer {
    /// Create a new instance of the command server.
    ///
    /// This function will not block until a subscriber connects.
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, CmdServerError> {
        let socket_options = SocketOptions {
            block_on_first_connect: false,
            bind: true,
            linger: 1,
            send_timeout: 10,
            ..Default::default()
        };

        let socket = MonitoredSocket::new(
            ctx,
            zmq::PUB,
            socket_options,
            &params.joint_cmd_endpoint,
        )
        .map_err(CmdServerError::SocketError)?;

        Ok(Self { socket })
    }

    /// Publish a command.
    pub fn send(&self, cmd: &JointCmd) -> Result<(), CmdServerError> {
        let cmd_string = serde_json::to_string(cmd).map_err(CmdServerError::SerializationError)?;

        self.socket
            .send(&cmd_string, 0)
            .map_err(CmdServerError::SendError)
    }

    /// Returns true if a subscriber is connected.
    pub fn connected(&self) -> bool {
        self.socket.connected()
    }
}
