//! # TM Server
//!
//! Publishes the TCP position report and the per-cycle telemetry packet.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use comms_if::{
    eqpt::arm::{JointCmd, TcpPosition},
    net::{zmq, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions},
};

use crate::{data_store::DataStore, share_ctrl};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Telemetry server
pub struct TmServer {
    tm_socket: MonitoredSocket,
    tcp_pos_socket: MonitoredSocket,
}

/// Telemetry packet that is output by the server.
#[derive(Debug, Serialize, Deserialize)]
pub struct TmPacket {
    pub sim_time_s: f64,

    pub num_cycles: u64,

    pub joint_state_connected: bool,

    pub human_input_connected: bool,

    pub share_ctrl_output: Option<JointCmd>,

    pub share_ctrl_status_rpt: share_ctrl::StatusReport,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TmServerError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not send telemetry: {0}")]
    SendError(zmq::Error),

    #[error("Could not serialize the telemetry: {0}")]
    SerializationError(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TmServer {
    /// Create a new instance of the TM Server.
    ///
    /// This function will not block until the server connects.
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, TmServerError> {
        let socket_options = || SocketOptions {
            block_on_first_connect: false,
            bind: true,
            linger: 1,
            send_timeout: 10,
            ..Default::default()
        };

        let tm_socket = MonitoredSocket::new(ctx, zmq::PUB, socket_options(), &params.tm_endpoint)
            .map_err(TmServerError::SocketError)?;

        let tcp_pos_socket = MonitoredSocket::new(
            ctx,
            zmq::PUB,
            socket_options(),
            &params.tcp_pos_endpoint,
        )
        .map_err(TmServerError::SocketError)?;

        Ok(Self {
            tm_socket,
            tcp_pos_socket,
        })
    }

    /// Send the telemetry packet for this cycle.
    pub fn send_tm(&self, ds: &DataStore) -> Result<(), TmServerError> {
        send_json(&self.tm_socket, &TmPacket::from_datastore(ds))
    }

    /// Send a TCP position report.
    pub fn send_tcp_position(&self, position: TcpPosition) -> Result<(), TmServerError> {
        send_json(&self.tcp_pos_socket, &position)
    }
}

impl TmPacket {
    pub fn from_datastore(ds: &DataStore) -> Self {
        Self {
            sim_time_s: ds.sim_time_s,
            num_cycles: ds.num_cycles,
            joint_state_connected: ds.joint_state_connected,
            human_input_connected: ds.human_input_connected,
            share_ctrl_output: ds.share_ctrl_output.clone(),
            share_ctrl_status_rpt: ds.share_ctrl_status_rpt,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn send_json<T: Serialize>(socket: &MonitoredSocket, data: &T) -> Result<(), TmServerError> {
    let data_string = serde_json::to_string(data).map_err(TmServerError::SerializationError)?;

    socket
        .send(&data_string, 0)
        .map_err(TmServerError::SendError)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_packet_from_datastore() {
        let mut ds = DataStore::default();
        ds.num_cycles = 12;
        ds.human_input_connected = true;
        ds.share_ctrl_status_rpt.ramp_weight = 0.5;

        let packet = TmPacket::from_datastore(&ds);
        assert_eq!(packet.num_cycles, 12);
        assert!(packet.human_input_connected);
        assert!(!packet.joint_state_connected);
        assert!(packet.share_ctrl_output.is_none());

        let json = serde_json::to_string(&packet).unwrap();
        let back: TmPacket = serde_json::from_str(&json).unwrap();
        assert_eq!(back.share_ctrl_status_rpt.ramp_weight, 0.5);
    }
}
