//! Parameters structure for JointCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;
use super::NUM_JOINTS;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Joint control.
#[derive(Debug, Default, Deserialize)]
pub struct Params {

    // ---- ACCELERATION LIMITS ----

    /// Baseline acceleration limit of each joint, from the manufacturer's
    /// rated limits.
    ///
    /// Units: radians/second^2
    pub accel_baseline_rads2: [f64; NUM_JOINTS],

    /// Smoothing divisor applied to each joint's baseline to get the limit
    /// actually used by the controller. A joint whose divisor equals its
    /// baseline runs at 1 rad/s^2. Joints 2 and 4 are left effectively
    /// unscaled since cross-coupling from the neighbouring joints already
    /// slows them down.
    pub accel_smoothing_div: [f64; NUM_JOINTS],

    // ---- PROFILE THRESHOLDS ----

    /// A joint closer than this to its goal holds its last command. Values
    /// below 0.001 have caused oscillation around the goal, be careful when
    /// lowering this.
    ///
    /// Units: radians
    pub position_epsilon_rad: f64,

    /// Elapsed time under which every joint is forced active, so the first
    /// cycle after starting never misclassifies a joint as arrived.
    ///
    /// Units: seconds
    pub first_cycle_time_s: f64,

    /// Minimum measured speed for the deceleration phase to engage.
    ///
    /// Units: degrees/second
    pub min_moving_speed_degs: f64,

    /// Tolerance between the goal speed and the measured speed magnitude,
    /// within which the joint is considered at cruise speed.
    ///
    /// Units: degrees/second
    pub speed_tolerance_degs: f64,

    /// Divisor applied to the kinematic stopping distance estimate. This is
    /// an empirically tuned margin, not derived from the kinematics.
    pub stop_distance_margin: f64,
}
