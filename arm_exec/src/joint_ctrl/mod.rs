//! Joint position control module
//!
//! This module shapes the motion of each of the arm's seven joints towards
//! the latest teleop goal. Every control cycle it decides, per joint, whether
//! to accelerate towards the commanded speed, decelerate in anticipation of
//! the goal, or cruise, and integrates the resulting velocity into the
//! position command sent to the actuator. The joints are independent, there
//! is no cross-joint coupling in the control law itself (only in the tuning
//! of the acceleration limits).

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod goal;
mod params;
mod profiler;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use goal::*;
pub use params::*;
pub use profiler::*;
pub use state::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// The number of joints on the arm.
pub const NUM_JOINTS: usize = 7;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during JointCtrl initialisation.
#[derive(Debug, thiserror::Error)]
pub enum JointCtrlInitError {
    #[error("Could not load the JointCtrl parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Acceleration limit for joint {0} must be positive, got {1} rad/s^2")]
    BadAccelLimit(usize, f64),
}

/// Possible errors that can occur during JointCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum JointCtrlError {
    #[error("proc() was called before starting(), no seed position command")]
    NotStarted,
}
