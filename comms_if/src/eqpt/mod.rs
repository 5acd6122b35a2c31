//! # Equipment Interface
//!
//! This module defines the interface structures which are exchanged with the arm, the human input
//! device and any monitoring clients.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod arm;
