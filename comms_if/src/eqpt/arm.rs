//! # Arm Teleoperation Commands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// The number of joints on the arm.
pub const NUM_ARM_JOINTS: usize = 7;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A teleoperation command for the arm.
///
/// Carries one target per joint: the joint's name, the goal angular position,
/// and the speed at which the joint should approach that position. The three
/// lists are index-aligned, the sender is responsible for keeping them so.
///
/// The controller rejects the whole command if the lists do not line up, so a
/// malformed command can never partially apply.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ArmTeleopCmd {
    /// Names of the joints being commanded.
    pub names: Vec<String>,

    /// Goal angular position of each joint.
    ///
    /// Units: radians
    pub pos_rad: Vec<f64>,

    /// Speed at which each joint should approach its goal. Interpreted as a
    /// magnitude, the sign of the motion comes from the goal position alone.
    ///
    /// Units: radians/second
    pub speed_rads: Vec<f64>,
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl ArmTeleopCmd {
    /// Build a command for all joints using the default joint naming.
    pub fn all_joints(pos_rad: [f64; NUM_ARM_JOINTS], speed_rads: [f64; NUM_ARM_JOINTS]) -> Self {
        Self {
            names: default_joint_names(),
            pos_rad: pos_rad.to_vec(),
            speed_rads: speed_rads.to_vec(),
        }
    }

    /// True if the name, position, and speed lists are index-aligned.
    pub fn is_well_formed(&self) -> bool {
        self.names.len() == self.pos_rad.len() && self.names.len() == self.speed_rads.len()
    }
}

impl Default for ArmTeleopCmd {
    fn default() -> Self {
        Self::all_joints([0.0; NUM_ARM_JOINTS], [0.0; NUM_ARM_JOINTS])
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Get the default names of the arm joints: `arm_joint1` through `arm_joint7`.
pub fn default_joint_names() -> Vec<String> {
    (1..=NUM_ARM_JOINTS).map(|i| format!("arm_joint{}", i)).collect()
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
