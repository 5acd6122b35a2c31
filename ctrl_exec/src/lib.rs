//! # Shared control library.
//!
//! This library allows other crates in the workspace, and the tests and benchmarks, to access
//! items defined inside the shared control crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Command server - publishes joint commands to the arm
pub mod cmd_server;

/// Global data store for the executable
pub mod data_store;

/// Human input tracker - holds the latest human input offset
pub mod human_input;

/// Kinematic chains, forward and inverse kinematics
pub mod kinematics;

/// Shared control module - blends human and autonomous targets into joint commands
pub mod share_ctrl;

/// Telemetry server - publishes the TCP position report and telemetry
pub mod tm_server;

/// Autonomous trajectory generator
pub mod traj_gen;
