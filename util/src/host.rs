//! Host platform utility functions

use std::env;
use std::path::PathBuf;

use uname;

/// Retrieve uname information.
pub fn get_uname() -> std::io::Result<uname::Info> {
    uname::uname()
}

/// Get the software root directory from the `DEIMOS_ARM_SW_ROOT` environment
/// variable.
pub fn get_arm_sw_root() -> Result<PathBuf, env::VarError> {
    Ok(PathBuf::from(env::var("DEIMOS_ARM_SW_ROOT")?))
}
