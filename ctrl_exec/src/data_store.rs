//! # Data Store

use comms_if::eqpt::arm::JointCmd;

use crate::share_ctrl;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of control cycles already executed
    pub num_cycles: u64,

    /// Session elapsed time at the start of the cycle
    pub sim_time_s: f64,

    // Network status
    pub joint_state_connected: bool,
    pub human_input_connected: bool,

    // ShareCtrl
    pub share_ctrl: share_ctrl::ShareCtrl,
    pub share_ctrl_input: share_ctrl::InputData,
    pub share_ctrl_output: Option<JointCmd>,
    pub share_ctrl_status_rpt: share_ctrl::StatusReport,

    // Monitoring Counters
    /// Number of control cycles started a whole period or more late
    pub num_cycle_overruns: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Perform actions required at the start of a control cycle.
    ///
    /// Clears the inputs and outputs of the previous cycle.
    pub fn cycle_start(&mut self) {
        self.share_ctrl_input = share_ctrl::InputData::default();
        self.share_ctrl_output = None;
        self.share_ctrl_status_rpt = share_ctrl::StatusReport::default();

        self.sim_time_s = util::session::get_elapsed_seconds();
    }
}
