//! # Teleoperation client
//!
//! Receives [`ArmTeleopCmd`]s from the operator over the network and resolves
//! them into goal updates for the controller. Commands are JSON over a zmq
//! SUB socket, the operator end PUBlishes them.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use thiserror::Error;

// Internal
use crate::joint_ctrl::NUM_JOINTS;
use comms_if::{
    eqpt::arm::ArmTeleopCmd,
    net::{MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Client which receives teleop commands from the operator.
pub struct TeleopClient {
    cmd_socket: MonitoredSocket,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum TeleopClientError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not recieve from the operator: {0}")]
    RecvError(zmq::Error),

    #[error("Could not deserialise a teleop command: {0}")]
    DeserializeError(serde_json::Error),

    #[error("Teleop command was not valid UTF-8")]
    NonUtf8Cmd,

    #[error("Teleop command arrays are misaligned or the wrong length")]
    MisalignedCmd,

    #[error("Teleop command names a joint not in the arm: {0:?}")]
    UnknownJoint(String),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TeleopClient {
    /// Create a new teleop client connected to the operator endpoint.
    ///
    /// Does not block waiting for the operator, the arm must be able to hold
    /// position with no operator present.
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, TeleopClientError> {
        let socket_options = SocketOptions {
            block_on_first_connect: false,
            recv_timeout: 10,
            ..Default::default()
        };

        let cmd_socket =
            MonitoredSocket::new(ctx, zmq::SUB, socket_options, &params.teleop_endpoint)
                .map_err(TeleopClientError::SocketError)?;

        // Subscribe to everything the operator sends
        cmd_socket.set_subscribe(&[]).map_err(|e| {
            TeleopClientError::SocketError(MonitoredSocketError::SocketOptionError(
                "set_subscribe".into(),
                e,
            ))
        })?;

        Ok(TeleopClient { cmd_socket })
    }

    /// Get the most recent pending teleop command, if any.
    ///
    /// Drains the socket so that a backlog of stale commands is skipped, the
    /// newest wins. Returns `Ok(None)` when no command is pending.
    pub fn get_cmd(&self) -> Result<Option<ArmTeleopCmd>, TeleopClientError> {
        let mut newest: Option<String> = None;

        loop {
            match self.cmd_socket.recv_string(zmq::DONTWAIT) {
                Ok(Ok(cmd_str)) => newest = Some(cmd_str),
                Ok(Err(_)) => return Err(TeleopClientError::NonUtf8Cmd),
                Err(zmq::Error::EAGAIN) => break,
                Err(e) => return Err(TeleopClientError::RecvError(e)),
            }
        }

        match newest {
            Some(cmd_str) => {
                trace!("Recieved teleop command: {}", cmd_str);

                serde_json::from_str(&cmd_str)
                    .map(Some)
                    .map_err(TeleopClientError::DeserializeError)
            }
            None => Ok(None),
        }
    }
}

/// Resolve a teleop command against the arm's joint names, producing the
/// position and speed arrays in joint index order.
///
/// The whole command is rejected if it is malformed or names an unknown
/// joint, a partial goal update must never be built from it.
pub fn resolve_cmd(
    cmd: &ArmTeleopCmd,
    joint_names: &[String],
) -> Result<([f64; NUM_JOINTS], [f64; NUM_JOINTS]), TeleopClientError> {
    if !cmd.is_well_formed() || cmd.names.len() != NUM_JOINTS {
        return Err(TeleopClientError::MisalignedCmd);
    }

    let mut pos_rad = [0.0; NUM_JOINTS];
    let mut speed_rads = [0.0; NUM_JOINTS];
    let mut resolved = [false; NUM_JOINTS];

    for (cmd_idx, name) in cmd.names.iter().enumerate() {
        match joint_names.iter().position(|n| n == name) {
            Some(joint_id) => {
                // A name appearing twice means some other joint has no
                // target, the slot it would fill must not default to zero
                if resolved[joint_id] {
                    return Err(TeleopClientError::MisalignedCmd);
                }

                pos_rad[joint_id] = cmd.pos_rad[cmd_idx];
                speed_rads[joint_id] = cmd.speed_rads[cmd_idx];
                resolved[joint_id] = true;
            }
            None => return Err(TeleopClientError::UnknownJoint(name.clone())),
        }
    }

    Ok((pos_rad, speed_rads))
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::eqpt::arm::default_joint_names;

    #[test]
    fn test_resolve_in_order_cmd() {
        let names = default_joint_names();
        let cmd = ArmTeleopCmd::all_joints(
            [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7],
            [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
        );

        let (pos_rad, speed_rads) = resolve_cmd(&cmd, &names).unwrap();

        assert_eq!(pos_rad, [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7]);
        assert_eq!(speed_rads, [1.0; 7]);
    }

    #[test]
    fn test_resolve_reordered_cmd() {
        let names = default_joint_names();

        // Joints listed in reverse, values must land by name not by index
        let cmd = ArmTeleopCmd {
            names: names.iter().rev().cloned().collect(),
            pos_rad: vec![0.7, 0.6, 0.5, 0.4, 0.3, 0.2, 0.1],
            speed_rads: vec![7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0],
        };

        let (pos_rad, speed_rads) = resolve_cmd(&cmd, &names).unwrap();

        assert_eq!(pos_rad, [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7]);
        assert_eq!(speed_rads, [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn test_resolve_rejects_misaligned_cmd() {
        let names = default_joint_names();

        let mut cmd = ArmTeleopCmd::all_joints([0.0; 7], [1.0; 7]);
        cmd.pos_rad.pop();

        assert!(matches!(
            resolve_cmd(&cmd, &names),
            Err(TeleopClientError::MisalignedCmd)
        ));
    }

    #[test]
    fn test_resolve_rejects_duplicate_joint() {
        let names = default_joint_names();

        // arm_joint2 listed twice, leaving arm_joint3 with no target. The
        // lengths all line up so only the duplicate check can catch this,
        // without it joint 3 would be silently commanded to zero
        let mut cmd = ArmTeleopCmd::all_joints(
            [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7],
            [1.0; 7],
        );
        cmd.names[2] = String::from("arm_joint2");

        assert!(matches!(
            resolve_cmd(&cmd, &names),
            Err(TeleopClientError::MisalignedCmd)
        ));
    }

    #[test]
    fn test_resolve_rejects_unknown_joint() {
        let names = default_joint_names();

        let mut cmd = ArmTeleopCmd::all_joints([0.0; 7], [1.0; 7]);
        cmd.names[4] = String::from("elbow");

        assert!(matches!(
            resolve_cmd(&cmd, &names),
            Err(TeleopClientError::UnknownJoint(_))
        ));
    }
}
