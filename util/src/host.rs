//! Host platform utility functions

use std::{env, path::PathBuf};

/// Environment variable which points at the root of the software checkout.
///
/// Parameter files are read from `$SHARED_CTRL_SW_ROOT/params` and sessions
/// are created under `$SHARED_CTRL_SW_ROOT/sessions`.
pub const SW_ROOT_ENV_VAR: &str = "SHARED_CTRL_SW_ROOT";

/// Get the software root directory from the environment.
pub fn get_sw_root() -> Result<PathBuf, env::VarError> {
    env::var(SW_ROOT_ENV_VAR).map(PathBuf::from)
}
