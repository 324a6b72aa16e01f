//! # Joint interface
//!
//! Abstraction over the arm's joint actuators. The control loop reads the
//! measured state of each joint and writes position commands through a
//! [`JointHandle`], acquired by name from a [`JointInterface`]. In the `sim`
//! feature (default) the handles are backed by [`sim::SimArm`].

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

#[cfg(feature = "sim")]
pub mod sim;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use thiserror::Error;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Read and command access to a single joint.
pub trait JointHandle {
    /// Get the measured angular position of the joint in radians.
    fn get_position(&self) -> f64;

    /// Get the measured angular velocity of the joint in radians/second.
    fn get_velocity(&self) -> f64;

    /// Set the position command for the joint in radians.
    fn set_command(&mut self, pos_rad: f64);
}

/// A source of joint handles, the arm itself.
pub trait JointInterface {
    type Handle: JointHandle;

    /// Get the handle for the named joint.
    fn get_handle(&self, joint_name: &str) -> Result<Self::Handle, JointIfaceError>;
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum JointIfaceError {
    #[error("No joint named {0:?} in the arm")]
    UnknownJoint(String),

    #[error("Expected {0} joints but the parameters name {1}")]
    WrongJointCount(usize, usize),
}
