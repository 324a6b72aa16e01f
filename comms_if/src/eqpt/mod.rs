//! # Equipment Interface
//!
//! This module defines the interface structures which are exchanged with the
//! arm equipment.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Arm teleoperation command definitions
pub mod arm;
