//! Shared goal state between the teleop delivery path and the control cycle

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use super::NUM_JOINTS;
use std::sync::{Arc, Mutex};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The latest commanded target for all joints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Goal {
    /// Goal angular position of each joint.
    ///
    /// Units: radians
    pub pos_rad: [f64; NUM_JOINTS],

    /// Speed magnitude at which each joint approaches its goal. The direction
    /// of motion is derived from the goal position alone, never from here.
    ///
    /// Units: radians/second
    pub speed_rads: [f64; NUM_JOINTS],
}

/// Handle on the shared goal state.
///
/// Cloning produces another handle on the same goal, one handle lives with
/// the control loop and another can live with a delivery thread. An update
/// replaces all values at once with respect to [`GoalBuffer::snapshot`], so a
/// cycle never observes a mix of two commands. The inner mutex is only ever
/// held for the duration of a copy, neither side can stall the other on it.
#[derive(Clone, Default)]
pub struct GoalBuffer {
    inner: Arc<Mutex<Goal>>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors raised when applying a goal update.
#[derive(Debug, thiserror::Error)]
pub enum GoalError {
    #[error(
        "Malformed goal update: got {0} positions and {1} speeds, expected \
         {num} of each",
        num = NUM_JOINTS
    )]
    MalformedGoal(usize, usize),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GoalBuffer {
    /// Create a new goal buffer with all positions and speeds zeroed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the goal with a new one.
    ///
    /// Both slices must hold exactly one entry per joint, in joint index
    /// order. A malformed update is rejected whole and the previous goal is
    /// retained unchanged. Speeds are stored as magnitudes.
    pub fn apply(&self, pos_rad: &[f64], speed_rads: &[f64]) -> Result<(), GoalError> {
        if pos_rad.len() != NUM_JOINTS || speed_rads.len() != NUM_JOINTS {
            return Err(GoalError::MalformedGoal(pos_rad.len(), speed_rads.len()));
        }

        // Build the new goal outside the lock so the critical section is just
        // the copy
        let mut new_goal = Goal::default();
        for i in 0..NUM_JOINTS {
            new_goal.pos_rad[i] = pos_rad[i];
            new_goal.speed_rads[i] = speed_rads[i].abs();
        }

        let mut goal = self.inner.lock().unwrap();
        *goal = new_goal;

        Ok(())
    }

    /// Get a copy of the current goal.
    ///
    /// Called once at the start of each control cycle, so a command arriving
    /// mid-cycle takes effect from the next cycle with no torn reads across
    /// joints.
    pub fn snapshot(&self) -> Goal {
        *self.inner.lock().unwrap()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::thread;

    #[test]
    fn test_apply_and_snapshot() {
        let buffer = GoalBuffer::new();

        let pos = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7];
        let speeds = [0.5; NUM_JOINTS];
        buffer.apply(&pos, &speeds).unwrap();

        let goal = buffer.snapshot();
        assert_eq!(goal.pos_rad, pos);
        assert_eq!(goal.speed_rads, speeds);
    }

    #[test]
    fn test_speeds_stored_as_magnitudes() {
        let buffer = GoalBuffer::new();

        buffer.apply(&[0.0; NUM_JOINTS], &[-0.5; NUM_JOINTS]).unwrap();

        assert_eq!(buffer.snapshot().speed_rads, [0.5; NUM_JOINTS]);
    }

    #[test]
    fn test_malformed_update_rejected_whole() {
        let buffer = GoalBuffer::new();

        let pos = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7];
        buffer.apply(&pos, &[0.5; NUM_JOINTS]).unwrap();
        let before = buffer.snapshot();

        // 6 positions against 7 speeds must change nothing
        assert!(buffer.apply(&pos[..6], &[9.9; NUM_JOINTS]).is_err());
        assert_eq!(buffer.snapshot(), before);
    }

    #[test]
    fn test_apply_is_idempotent() {
        let buffer = GoalBuffer::new();

        let pos = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7];
        let speeds = [0.5; NUM_JOINTS];

        buffer.apply(&pos, &speeds).unwrap();
        let first = buffer.snapshot();
        buffer.apply(&pos, &speeds).unwrap();

        assert_eq!(buffer.snapshot(), first);
    }

    #[test]
    fn test_no_torn_snapshot_under_racing_writer() {
        let buffer = GoalBuffer::new();
        let goal_a = [1.0; NUM_JOINTS];
        let goal_b = [2.0; NUM_JOINTS];

        buffer.apply(&goal_a, &goal_a).unwrap();

        // A writer thread flips between the two goals as fast as it can
        let writer_buffer = buffer.clone();
        let writer = thread::spawn(move || {
            for i in 0..1000 {
                let goal = if i % 2 == 0 { goal_b } else { goal_a };
                writer_buffer.apply(&goal, &goal).unwrap();
            }
        });

        // Every snapshot must be entirely one goal or entirely the other
        for _ in 0..1000 {
            let goal = buffer.snapshot();
            assert!(
                goal.pos_rad == goal_a || goal.pos_rad == goal_b,
                "torn goal snapshot: {:?}",
                goal.pos_rad
            );
        }

        writer.join().unwrap();
    }
}
