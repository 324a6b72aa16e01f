//! Implementations for the JointCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Serialize;

// Internal
use super::{
    profile_step, Goal, JointCtrlError, JointCtrlInitError, JointInput, Params, ProfilePhase,
    ProfileThresholds, NUM_JOINTS,
};
use util::{maths, module::State, params, session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Joint position control module state
#[derive(Default)]
pub struct JointCtrl {

    pub(crate) params: Params,

    /// Profile thresholds in radians, built from params at init.
    thresholds: ProfileThresholds,

    /// Per-joint acceleration limits, baseline over smoothing divisor. Fixed
    /// for the lifetime of the controller.
    accel_limit_rads2: [f64; NUM_JOINTS],

    /// Per-joint commanded velocity, the profiler's ramp state.
    cmd_vel_rads: [f64; NUM_JOINTS],

    /// Per-joint integrated position command. Only ever moved by integration,
    /// never snapped to the goal.
    cmd_pos_rad: [f64; NUM_JOINTS],

    /// Time elapsed since the controller (re)started.
    elapsed_s: f64,

    /// Whether starting() has seeded the position commands yet.
    started: bool,

    pub(crate) report: StatusReport,
}

/// Input data to Joint Control.
#[derive(Clone, Copy, Default, Debug)]
pub struct InputData {
    /// Measured angular position of each joint, fresh this cycle.
    ///
    /// Units: radians
    pub meas_pos_rad: [f64; NUM_JOINTS],

    /// Measured angular velocity of each joint, fresh this cycle.
    ///
    /// Units: radians/second
    pub meas_vel_rads: [f64; NUM_JOINTS],

    /// Period of this control cycle.
    ///
    /// Units: seconds
    pub dt_s: f64,

    /// The goal snapshot for this cycle.
    pub goal: Goal,
}

/// Output command from JointCtrl that the joint actuators must execute.
#[derive(Clone, Copy, Serialize, Debug)]
pub struct OutputData {
    /// Commanded angular position of each joint.
    ///
    /// Units: radians
    pub cmd_pos_rad: [f64; NUM_JOINTS],

    /// Whether each joint was active this cycle. Inactive joints hold their
    /// last command and must not be written to.
    pub active: [bool; NUM_JOINTS],
}

impl Default for OutputData {
    fn default() -> Self {
        OutputData {
            cmd_pos_rad: [0.0; NUM_JOINTS],
            active: [false; NUM_JOINTS],
        }
    }
}

/// Status report for JointCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// The profile phase each joint was in this cycle.
    pub phase: [ProfilePhase; NUM_JOINTS],
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for JointCtrl {
    type InitData = &'static str;
    type InitError = JointCtrlInitError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = JointCtrlError;

    /// Initialise the JointCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, _session: &Session)
        -> Result<(), Self::InitError>
    {
        // Load the parameters
        let params = params::load(init_data)
            .map_err(JointCtrlInitError::ParamLoadError)?;

        self.set_params(params)
    }

    /// Perform cyclic processing of Joint Control.
    ///
    /// Runs the velocity profile and position integration for all joints, in
    /// joint index order.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        if !self.started {
            return Err(JointCtrlError::NotStarted);
        }

        // Clear the status report
        self.report = StatusReport::default();

        // Advance the controller clock
        self.elapsed_s += input_data.dt_s;

        let mut output = OutputData {
            cmd_pos_rad: self.cmd_pos_rad,
            active: [false; NUM_JOINTS],
        };

        for joint_id in 0..NUM_JOINTS {
            let joint_input = JointInput {
                meas_pos_rad: input_data.meas_pos_rad[joint_id],
                meas_vel_rads: input_data.meas_vel_rads[joint_id],
                goal_pos_rad: input_data.goal.pos_rad[joint_id],
                goal_speed_rads: input_data.goal.speed_rads[joint_id],
                accel_limit_rads2: self.accel_limit_rads2[joint_id],
            };

            let phase = profile_step(
                &joint_input,
                &mut self.cmd_vel_rads[joint_id],
                input_data.dt_s,
                self.elapsed_s,
                &self.thresholds,
            );

            self.report.phase[joint_id] = phase;

            // Holding joints keep their last command exactly, re-deriving it
            // from the measured position would drift under load
            if phase != ProfilePhase::Hold {
                self.cmd_pos_rad[joint_id] += self.cmd_vel_rads[joint_id] * input_data.dt_s;

                output.cmd_pos_rad[joint_id] = self.cmd_pos_rad[joint_id];
                output.active[joint_id] = true;
            }
        }

        trace!(
            "JointCtrl output:\n    cmd: {:?}\n    phase: {:?}",
            output.cmd_pos_rad,
            self.report.phase
        );

        Ok((output, self.report))
    }
}

impl JointCtrl {

    /// Set the module's parameters directly, computing the acceleration
    /// limits and radian-valued thresholds.
    ///
    /// `init` goes through here after loading the parameter file, tests can
    /// call it with a hand-built `Params`.
    pub fn set_params(&mut self, params: Params) -> Result<(), JointCtrlInitError> {
        for joint_id in 0..NUM_JOINTS {
            let limit =
                params.accel_baseline_rads2[joint_id] / params.accel_smoothing_div[joint_id];

            if !(limit > 0.0) || !limit.is_finite() {
                return Err(JointCtrlInitError::BadAccelLimit(joint_id, limit));
            }

            self.accel_limit_rads2[joint_id] = limit;
        }

        self.thresholds = ProfileThresholds {
            position_epsilon_rad: params.position_epsilon_rad,
            first_cycle_time_s: params.first_cycle_time_s,
            min_moving_speed_rads: maths::deg_to_rad(params.min_moving_speed_degs),
            speed_tolerance_rads: maths::deg_to_rad(params.speed_tolerance_degs),
            stop_distance_margin: params.stop_distance_margin,
        };

        self.params = params;

        Ok(())
    }

    /// Seed the controller at (re)start.
    ///
    /// The position commands are seeded from the measured positions, not from
    /// any goal, so the first command after a start can never jump the arm.
    /// Commanded velocities are zeroed so nothing moves before a goal
    /// arrives, and the controller clock restarts.
    pub fn starting(&mut self, meas_pos_rad: &[f64; NUM_JOINTS]) {
        self.cmd_pos_rad = *meas_pos_rad;
        self.cmd_vel_rads = [0.0; NUM_JOINTS];
        self.elapsed_s = 0.0;
        self.started = true;
    }

    /// Get the per-joint acceleration limits in use.
    pub fn accel_limits_rads2(&self) -> &[f64; NUM_JOINTS] {
        &self.accel_limit_rads2
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    /// Parameters matching the shipped joint_ctrl.toml.
    pub(crate) fn test_params() -> Params {
        Params {
            accel_baseline_rads2: [15.0, 10.0, 10.0, 12.5, 15.0, 20.0, 20.0],
            accel_smoothing_div: [15.0, 10.0, 15.0, 12.5, 15.0, 15.0, 15.0],
            position_epsilon_rad: 0.001,
            first_cycle_time_s: 0.001,
            min_moving_speed_degs: 0.1,
            speed_tolerance_degs: 1.0,
            stop_distance_margin: 1.5,
        }
    }

    fn module() -> JointCtrl {
        let mut ctrl = JointCtrl::default();
        ctrl.set_params(test_params()).unwrap();
        ctrl
    }

    #[test]
    fn test_accel_limit_table() {
        let ctrl = module();
        let limits = ctrl.accel_limits_rads2();

        // Joints divided by the smoothing divisor come out at 1 rad/s^2,
        // except the faster wrist joints
        assert!((limits[0] - 1.0).abs() < 1e-12);
        assert!((limits[1] - 1.0).abs() < 1e-12);
        assert!((limits[2] - 10.0 / 15.0).abs() < 1e-12);
        assert!((limits[3] - 1.0).abs() < 1e-12);
        assert!((limits[4] - 1.0).abs() < 1e-12);
        assert!((limits[5] - 20.0 / 15.0).abs() < 1e-12);
        assert!((limits[6] - 20.0 / 15.0).abs() < 1e-12);
    }

    #[test]
    fn test_bad_accel_limit_rejected() {
        let mut params = test_params();
        params.accel_baseline_rads2[3] = 0.0;

        let mut ctrl = JointCtrl::default();
        match ctrl.set_params(params) {
            Err(JointCtrlInitError::BadAccelLimit(3, _)) => (),
            other => panic!("expected BadAccelLimit(3, _), got {:?}", other.err()),
        }
    }

    #[test]
    fn test_proc_before_starting_is_an_error() {
        let mut ctrl = module();
        assert!(ctrl.proc(&InputData::default()).is_err());
    }

    #[test]
    fn test_inactive_joints_hold_exactly() {
        let mut ctrl = module();

        let meas_pos = [0.5; NUM_JOINTS];
        ctrl.starting(&meas_pos);

        // Goal equal to the measured positions, all joints inactive once the
        // first-cycle window has passed
        let mut input = InputData::default();
        input.meas_pos_rad = meas_pos;
        input.dt_s = 0.001;
        input.goal.pos_rad = meas_pos;

        // First cycle is forced active, run it then check the following ones
        ctrl.proc(&input).unwrap();

        for _ in 0..10 {
            let (output, report) = ctrl.proc(&input).unwrap();

            for joint_id in 0..NUM_JOINTS {
                assert_eq!(report.phase[joint_id], ProfilePhase::Hold);
                assert!(!output.active[joint_id]);
                assert_eq!(output.cmd_pos_rad[joint_id], 0.5);
            }
        }
    }

    #[test]
    fn test_starting_seeds_from_measured_not_goal() {
        let mut ctrl = module();

        let meas_pos = [0.25; NUM_JOINTS];
        ctrl.starting(&meas_pos);

        let mut input = InputData::default();
        input.meas_pos_rad = meas_pos;
        input.dt_s = 0.001;
        input.goal.pos_rad = [2.0; NUM_JOINTS];
        input.goal.speed_rads = [0.5; NUM_JOINTS];

        let (output, _) = ctrl.proc(&input).unwrap();

        // One cycle in, the command has moved at most accel * dt^2 away from
        // the measured seed, nowhere near the goal
        for joint_id in 0..NUM_JOINTS {
            assert!((output.cmd_pos_rad[joint_id] - 0.25).abs() < 1e-4);
        }
    }

    #[test]
    fn test_ramp_cruise_decelerate_arrival() {
        // The scenario from the module design: one joint from rest at 0 to a
        // goal of 1 rad at 0.5 rad/s cruise, 1 rad/s^2 limit, dt 0.01 s. The
        // plant follows the command perfectly.
        let mut ctrl = module();
        ctrl.starting(&[0.0; NUM_JOINTS]);

        let dt_s = 0.01;
        let mut input = InputData::default();
        input.dt_s = dt_s;
        input.goal.pos_rad[0] = 1.0;
        input.goal.speed_rads[0] = 0.5;

        let mut prev_vel: f64 = 0.0;
        let mut seen_cruise = false;
        let mut seen_decel = false;

        for _ in 0..2000 {
            let (output, report) = ctrl.proc(&input).unwrap();

            if output.active[0] {
                // Acceleration bound, in every phase
                let vel = (output.cmd_pos_rad[0] - input.meas_pos_rad[0]) / dt_s;
                assert!(
                    (vel.abs() - prev_vel.abs()) <= 1.0 * dt_s + 1e-9,
                    "acceleration bound broken in {:?}",
                    report.phase[0]
                );
                prev_vel = vel;

                // Perfect plant: the joint tracks the command
                input.meas_vel_rads[0] = vel;
                input.meas_pos_rad[0] = output.cmd_pos_rad[0];
            }
            else {
                input.meas_vel_rads[0] = 0.0;
                prev_vel = 0.0;
            }

            seen_cruise |= report.phase[0] == ProfilePhase::Cruise;
            seen_decel |= report.phase[0] == ProfilePhase::Decelerate;
        }

        // The profile must have cruised and braked on the way
        assert!(seen_cruise, "joint never reached cruise");
        assert!(seen_decel, "joint never decelerated");

        // Arrived: within the position epsilon and holding
        assert!(
            (1.0 - input.meas_pos_rad[0]).abs() <= 0.001 + 1e-6,
            "joint settled at {} rad",
            input.meas_pos_rad[0]
        );
        let (_, report) = ctrl.proc(&input).unwrap();
        assert_eq!(report.phase[0], ProfilePhase::Hold);
    }
}
