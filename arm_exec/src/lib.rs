//! Library part of the arm controller executable.
//!
//! Everything except the executable entry point lives here so that the
//! integration tests can drive the controller against the simulated arm.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod joint_ctrl;
pub mod joint_iface;
pub mod params;
pub mod teleop_client;
