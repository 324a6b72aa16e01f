//! Parameters for the arm executable itself.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use crate::joint_ctrl::NUM_JOINTS;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters controlling the executable's cyclic loop and startup checks.
#[derive(Debug, Clone, Deserialize)]
pub struct ArmExecParams {
    /// Period of the control cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Names of the arm's joints in joint index order.
    pub joint_names: Vec<String>,

    /// If true the executable refuses to start unless the arm is near the
    /// expected start pose.
    pub start_pose_check: bool,

    /// Expected start pose of the arm.
    ///
    /// Units: radians
    pub start_pose_rad: [f64; NUM_JOINTS],

    /// Per joint tolerance on the start pose check.
    ///
    /// Units: radians
    pub start_pose_tol_rad: f64,
}
