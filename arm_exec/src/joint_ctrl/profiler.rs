//! Per-joint trapezoidal velocity profile
//!
//! One call to [`profile_step`] advances a single joint's commanded velocity
//! by one control cycle. The profile has three moving phases, evaluated in
//! priority order: decelerate when continuing at the measured velocity would
//! overshoot the goal, accelerate while the measured speed is away from the
//! goal speed, and cruise once it has closed the gap. A joint within the
//! position epsilon of its goal holds instead.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Profile thresholds, converted into radians once at module initialisation.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProfileThresholds {
    /// A joint closer than this to its goal holds its command [rad].
    pub position_epsilon_rad: f64,

    /// Elapsed time under which every joint is forced active [s].
    pub first_cycle_time_s: f64,

    /// Minimum measured speed for deceleration to engage [rad/s].
    pub min_moving_speed_rads: f64,

    /// Tolerance on the gap between goal and measured speed [rad/s].
    pub speed_tolerance_rads: f64,

    /// Empirical margin divisor on the stopping distance estimate.
    pub stop_distance_margin: f64,
}

/// One joint's view of the world for a single profile step.
#[derive(Clone, Copy, Debug)]
pub struct JointInput {
    /// Measured angular position [rad].
    pub meas_pos_rad: f64,

    /// Measured angular velocity [rad/s].
    pub meas_vel_rads: f64,

    /// Goal angular position [rad].
    pub goal_pos_rad: f64,

    /// Goal approach speed magnitude [rad/s].
    pub goal_speed_rads: f64,

    /// This joint's acceleration limit [rad/s^2].
    pub accel_limit_rads2: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The phase a joint's velocity profile was in after a profile step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ProfilePhase {
    /// Within the position epsilon of the goal, command held.
    Hold,

    /// Ramping the commanded velocity towards the goal speed.
    Accelerate,

    /// Ramping the commanded velocity down in anticipation of the goal.
    Decelerate,

    /// Commanded velocity pinned at the goal speed.
    Cruise,
}

impl Default for ProfilePhase {
    fn default() -> Self {
        ProfilePhase::Hold
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Advance one joint's commanded velocity by one control cycle.
///
/// `cmd_vel_rads` is the joint's ramp state, it persists between cycles and
/// is only modified here. Returns the phase the joint was in this cycle, the
/// caller integrates the command for any phase other than [`ProfilePhase::Hold`].
pub fn profile_step(
    input: &JointInput,
    cmd_vel_rads: &mut f64,
    dt_s: f64,
    elapsed_s: f64,
    thresholds: &ProfileThresholds,
) -> ProfilePhase {
    // Distance between the goal and the joint's current position
    let error_rad = input.goal_pos_rad - input.meas_pos_rad;

    // Joints turn both ways, so the direction multiplies all the ramp terms.
    // Exactly zero error resolves to +1 by convention. A joint at zero error
    // is inactive anyway, so the tie-break only shows transiently at the
    // instant the goal is crossed.
    let direction = if error_rad < 0.0 { -1.0 } else { 1.0 };

    // A joint within the position epsilon of its goal holds its command. The
    // elapsed-time check forces every joint active on the very first cycle,
    // without it a zero-distance read at startup classifies the joint as
    // arrived and the first commanded move stutters. DO NOT DELETE!
    if error_rad.abs() <= thresholds.position_epsilon_rad
        && elapsed_s > thresholds.first_cycle_time_s
    {
        return ProfilePhase::Hold;
    }

    // Distance the joint would cover if it began braking now at the
    // configured limit
    let stop_time_s = input.meas_vel_rads / input.accel_limit_rads2;
    let stop_distance_rad =
        input.accel_limit_rads2 * stop_time_s * stop_time_s / thresholds.stop_distance_margin;

    // Continuing at the measured velocity, would the joint run past the goal
    // within its stopping distance?
    let overshooting = if direction < 0.0 {
        input.meas_pos_rad < input.goal_pos_rad + stop_distance_rad
    }
    else {
        input.meas_pos_rad > input.goal_pos_rad - stop_distance_rad
    };

    if overshooting && input.meas_vel_rads.abs() > thresholds.min_moving_speed_rads {
        // Ramp the signed commanded velocity down towards zero
        *cmd_vel_rads -= direction * input.accel_limit_rads2 * dt_s;
        ProfilePhase::Decelerate
    }
    else if (input.goal_speed_rads - input.meas_vel_rads.abs()).abs()
        > thresholds.speed_tolerance_rads
    {
        // Measured speed is away from the goal speed, keep ramping
        *cmd_vel_rads += direction * input.accel_limit_rads2 * dt_s;
        ProfilePhase::Accelerate
    }
    else {
        // Close enough, pin the command at the goal speed
        *cmd_vel_rads = direction * input.goal_speed_rads;
        ProfilePhase::Cruise
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    /// Thresholds matching the shipped joint_ctrl.toml values.
    fn thresholds() -> ProfileThresholds {
        ProfileThresholds {
            position_epsilon_rad: 0.001,
            first_cycle_time_s: 0.001,
            min_moving_speed_rads: util::maths::deg_to_rad(0.1),
            speed_tolerance_rads: util::maths::deg_to_rad(1.0),
            stop_distance_margin: 1.5,
        }
    }

    fn input() -> JointInput {
        JointInput {
            meas_pos_rad: 0.0,
            meas_vel_rads: 0.0,
            goal_pos_rad: 1.0,
            goal_speed_rads: 0.5,
            accel_limit_rads2: 1.0,
        }
    }

    #[test]
    fn test_hold_within_epsilon() {
        // At the goal and past the first cycle the joint must hold, with the
        // ramp state untouched
        let mut input = input();
        input.meas_pos_rad = 1.0;

        let mut cmd_vel = 0.123;
        let phase = profile_step(&input, &mut cmd_vel, 0.01, 5.0, &thresholds());

        assert_eq!(phase, ProfilePhase::Hold);
        assert_eq!(cmd_vel, 0.123);
    }

    #[test]
    fn test_first_cycle_forces_active() {
        // Zero error but elapsed time within the first-cycle window, the
        // joint must not be classified as arrived
        let mut input = input();
        input.meas_pos_rad = 1.0;
        input.goal_speed_rads = 0.0;

        let mut cmd_vel = 0.0;
        let phase = profile_step(&input, &mut cmd_vel, 0.001, 0.001, &thresholds());

        assert_ne!(phase, ProfilePhase::Hold);
    }

    #[test]
    fn test_zero_error_direction_tie_break() {
        // With exactly zero error the direction resolves positive, so a
        // first-cycle accelerate ramps the command up, not down
        let mut input = input();
        input.meas_pos_rad = 1.0;

        let mut cmd_vel = 0.0;
        let phase = profile_step(&input, &mut cmd_vel, 0.001, 0.0, &thresholds());

        assert_eq!(phase, ProfilePhase::Accelerate);
        assert!(cmd_vel > 0.0);
    }

    #[test]
    fn test_accelerate_towards_goal_speed() {
        let mut cmd_vel = 0.0;
        let phase = profile_step(&input(), &mut cmd_vel, 0.01, 1.0, &thresholds());

        assert_eq!(phase, ProfilePhase::Accelerate);
        // One cycle of ramp at the acceleration limit
        assert!((cmd_vel - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_cruise_when_at_goal_speed() {
        let mut input = input();
        input.meas_pos_rad = 0.2;
        input.meas_vel_rads = 0.5;

        let mut cmd_vel = 0.5;
        let phase = profile_step(&input, &mut cmd_vel, 0.01, 1.0, &thresholds());

        assert_eq!(phase, ProfilePhase::Cruise);
        assert_eq!(cmd_vel, 0.5);
    }

    #[test]
    fn test_decelerate_when_overshooting() {
        // Close to the goal and moving fast, the stopping distance covers the
        // remaining error so the joint must brake
        let mut input = input();
        input.meas_pos_rad = 0.95;
        input.meas_vel_rads = 0.5;

        let mut cmd_vel = 0.5;
        let phase = profile_step(&input, &mut cmd_vel, 0.01, 1.0, &thresholds());

        assert_eq!(phase, ProfilePhase::Decelerate);
        assert!((cmd_vel - 0.49).abs() < 1e-12);
    }

    #[test]
    fn test_decelerate_requires_overshoot_condition() {
        // Moving fast but far from the goal, the overshoot test fails so the
        // joint must not brake
        let mut input = input();
        input.meas_pos_rad = 0.1;
        input.meas_vel_rads = 0.5;

        let mut cmd_vel = 0.5;
        let phase = profile_step(&input, &mut cmd_vel, 0.01, 1.0, &thresholds());

        assert_ne!(phase, ProfilePhase::Decelerate);
    }

    #[test]
    fn test_decelerate_requires_min_moving_speed() {
        // Within the stopping distance but barely moving, deceleration must
        // not engage, the joint ramps up instead. A small acceleration limit
        // makes the stopping distance cover the error at a sub-threshold speed
        let mut input = input();
        input.meas_pos_rad = 0.998;
        input.meas_vel_rads = 0.0015;
        input.accel_limit_rads2 = 0.0005;

        let mut cmd_vel = 0.0015;
        let phase = profile_step(&input, &mut cmd_vel, 0.01, 1.0, &thresholds());

        assert_eq!(phase, ProfilePhase::Accelerate);
    }

    #[test]
    fn test_decelerate_negative_direction() {
        // Mirror of the overshoot test for motion in the negative direction
        let mut input = input();
        input.meas_pos_rad = -0.95;
        input.goal_pos_rad = -1.0;
        input.meas_vel_rads = -0.5;

        let mut cmd_vel = -0.5;
        let phase = profile_step(&input, &mut cmd_vel, 0.01, 1.0, &thresholds());

        assert_eq!(phase, ProfilePhase::Decelerate);
        // Ramps towards zero from below
        assert!((cmd_vel - -0.49).abs() < 1e-12);
    }

    #[test]
    fn test_ramp_bounded_by_accel_limit() {
        // Over a ramp from rest the commanded velocity never grows by more
        // than accel * dt in one cycle
        let thresholds = thresholds();
        let dt_s = 0.01;
        let mut input = input();
        let mut cmd_vel = 0.0;

        for cycle in 1..200 {
            let prev = cmd_vel;
            let phase = profile_step(&input, &mut cmd_vel, dt_s, cycle as f64 * dt_s, &thresholds);

            assert!(
                (cmd_vel.abs() - prev.abs()) <= input.accel_limit_rads2 * dt_s + 1e-12,
                "accel bound broken in phase {:?} at cycle {}",
                phase,
                cycle
            );

            // Follow the command perfectly so the profile sees its own ramp
            input.meas_vel_rads = cmd_vel;
            input.meas_pos_rad += cmd_vel * dt_s;
        }
    }
}
