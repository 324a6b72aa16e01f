//! Simulated arm backing the joint interface.
//!
//! Each joint is a first order lag tracking its position command, which is
//! enough to exercise the controller without hardware. No gravity, no
//! coupling, no limits.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// Internal
use super::{JointHandle, JointIfaceError, JointInterface};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// First order lag time constant of each simulated joint.
///
/// Units: seconds
const JOINT_TIME_CONSTANT_S: f64 = 0.02;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The simulated arm.
pub struct SimArm {
    joints: HashMap<String, Arc<Mutex<SimJointState>>>,
}

/// Handle to one simulated joint.
pub struct SimJointHandle {
    state: Arc<Mutex<SimJointState>>,
}

struct SimJointState {
    pos_rad: f64,
    vel_rads: f64,
    cmd_pos_rad: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimArm {
    /// Create a new simulated arm with the given joints, at the given start
    /// positions. Commands start equal to the start positions so the arm is
    /// at rest.
    pub fn new(joint_names: &[String], start_pos_rad: &[f64]) -> Self {
        let joints = joint_names
            .iter()
            .zip(start_pos_rad.iter())
            .map(|(name, &pos_rad)| {
                (
                    name.clone(),
                    Arc::new(Mutex::new(SimJointState {
                        pos_rad,
                        vel_rads: 0.0,
                        cmd_pos_rad: pos_rad,
                    })),
                )
            })
            .collect();

        SimArm { joints }
    }

    /// Advance the simulation by one timestep.
    pub fn step(&mut self, dt_s: f64) {
        // alpha in (0, 1), higher means tighter tracking
        let alpha = dt_s / (JOINT_TIME_CONSTANT_S + dt_s);

        for joint in self.joints.values() {
            let mut state = joint.lock().unwrap();

            let new_pos_rad = state.pos_rad + alpha * (state.cmd_pos_rad - state.pos_rad);

            state.vel_rads = (new_pos_rad - state.pos_rad) / dt_s;
            state.pos_rad = new_pos_rad;
        }
    }
}

impl JointInterface for SimArm {
    type Handle = SimJointHandle;

    fn get_handle(&self, joint_name: &str) -> Result<Self::Handle, JointIfaceError> {
        match self.joints.get(joint_name) {
            Some(state) => Ok(SimJointHandle {
                state: state.clone(),
            }),
            None => Err(JointIfaceError::UnknownJoint(joint_name.to_owned())),
        }
    }
}

impl JointHandle for SimJointHandle {
    fn get_position(&self) -> f64 {
        self.state.lock().unwrap().pos_rad
    }

    fn get_velocity(&self) -> f64 {
        self.state.lock().unwrap().vel_rads
    }

    fn set_command(&mut self, pos_rad: f64) {
        self.state.lock().unwrap().cmd_pos_rad = pos_rad;
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_joint_tracks_command() {
        let names = vec![String::from("arm_joint1")];
        let mut arm = SimArm::new(&names, &[0.0]);

        let mut handle = arm.get_handle("arm_joint1").unwrap();
        handle.set_command(1.0);

        // A second of settling is many time constants
        for _ in 0..1000 {
            arm.step(0.001);
        }

        assert!((handle.get_position() - 1.0).abs() < 1e-6);
        assert!(handle.get_velocity().abs() < 1e-3);
    }

    #[test]
    fn test_unknown_joint_rejected() {
        let arm = SimArm::new(&[String::from("arm_joint1")], &[0.0]);

        assert!(matches!(
            arm.get_handle("arm_joint9"),
            Err(JointIfaceError::UnknownJoint(_))
        ));
    }
}
