//! # Communications interface crate.
//!
//! Provides the common communications interfaces for the arm software: the
//! teleoperation command definitions and the network abstraction used to
//! carry them.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Command definitions for equipment (the arm itself)
pub mod eqpt;

/// Network module
pub mod net;
