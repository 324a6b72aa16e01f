//! # Arm Executable
//!
//! Cyclic executable which drives the arm's seven joints towards teleop
//! goals using trapezoidal velocity profiling.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Result,
};
use log::{debug, info, warn, LevelFilter};
use std::thread;
use std::time::{Duration, Instant};

// Internal
use arm_lib::{
    joint_ctrl::{GoalBuffer, InputData, JointCtrl, NUM_JOINTS},
    joint_iface::{JointHandle, JointIfaceError, JointInterface},
    params::ArmExecParams,
    teleop_client::{resolve_cmd, TeleopClient},
};
use comms_if::net::NetParams;
use util::{
    host, logger::logger_init, module::State, params, raise_error, session::Session,
};

#[cfg(feature = "sim")]
use arm_lib::joint_iface::sim::SimArm;

// No hardware backend yet, the simulated arm is the only joint interface
#[cfg(not(feature = "sim"))]
compile_error!("arm_exec requires a joint interface backend, build with the `sim` feature");

// ---------------------------------------------------------------------------
// MAIN
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    // Colorised error reports
    color_eyre::install()?;

    // ---- SESSION AND LOGGING ----

    let session = Session::new("arm_exec", "sessions")
        .wrap_err("Failed to create the session")?;

    logger_init(LevelFilter::Trace, &session)
        .wrap_err("Failed to initialise the logger")?;

    info!("Deimos Arm Executable\n");
    info!(
        "Running on: {:#?}",
        host::get_uname().wrap_err("Failed to get host information")?
    );
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: ArmExecParams = params::load("arm_exec.toml")
        .wrap_err("Failed to load the executable parameters")?;
    let net_params: NetParams = params::load("net.toml")
        .wrap_err("Failed to load the network parameters")?;

    if exec_params.joint_names.len() != NUM_JOINTS {
        return Err(JointIfaceError::WrongJointCount(
            NUM_JOINTS,
            exec_params.joint_names.len(),
        ))
        .wrap_err("Cannot start with a partial arm");
    }

    if exec_params.cycle_period_s <= 0.0 {
        return Err(eyre!(
            "Cycle period must be positive, got {} s",
            exec_params.cycle_period_s
        ));
    }

    debug!("Parameters loaded");

    // ---- JOINT INTERFACE ----

    #[cfg(feature = "sim")]
    let mut arm = SimArm::new(&exec_params.joint_names, &exec_params.start_pose_rad);

    let mut handles = Vec::with_capacity(NUM_JOINTS);
    for name in &exec_params.joint_names {
        let handle = arm
            .get_handle(name)
            .wrap_err_with(|| format!("Could not get the handle for joint {:?}", name))?;
        handles.push(handle);
    }

    info!("Joint interface ready with {} joints", handles.len());

    // Measured pose of the arm at startup
    let mut meas_pos_rad = [0.0; NUM_JOINTS];
    let mut meas_vel_rads = [0.0; NUM_JOINTS];
    for (joint_id, handle) in handles.iter().enumerate() {
        meas_pos_rad[joint_id] = handle.get_position();
    }

    // ---- START POSE CHECK ----

    if exec_params.start_pose_check {
        for joint_id in 0..NUM_JOINTS {
            let error_rad =
                (meas_pos_rad[joint_id] - exec_params.start_pose_rad[joint_id]).abs();

            if error_rad > exec_params.start_pose_tol_rad {
                return Err(eyre!(
                    "Joint {} is {:.2} deg from the start pose (tolerance {:.2} deg), \
                        move the arm to the start pose before launching",
                    exec_params.joint_names[joint_id],
                    util::maths::rad_to_deg(error_rad),
                    util::maths::rad_to_deg(exec_params.start_pose_tol_rad)
                ));
            }
        }

        info!("Arm is at the start pose");
    }

    // ---- NETWORK ----

    let zmq_ctx = zmq::Context::new();

    let teleop_client = TeleopClient::new(&zmq_ctx, &net_params)
        .wrap_err("Failed to create the teleop client")?;

    info!("Teleop client listening on {}", net_params.teleop_endpoint);

    // ---- JOINT CONTROL ----

    let mut joint_ctrl = JointCtrl::default();

    joint_ctrl
        .init("joint_ctrl.toml", &session)
        .wrap_err("Failed to initialise JointCtrl")?;

    joint_ctrl.starting(&meas_pos_rad);

    // Goal starts as "stay where you are" until the operator says otherwise
    let goal_buffer = GoalBuffer::new();
    goal_buffer
        .apply(&meas_pos_rad, &[0.0; NUM_JOINTS])
        .wrap_err("Could not seed the goal buffer")?;

    info!("JointCtrl initialised, entering the control loop");

    // ---- MAIN LOOP ----

    let dt_s = exec_params.cycle_period_s;
    let cycle_period = Duration::from_secs_f64(dt_s);

    loop {
        let cycle_start = Instant::now();

        // Apply the newest pending teleop command, if any. A bad command is
        // dropped whole and the previous goal keeps driving the arm.
        match teleop_client.get_cmd() {
            Ok(Some(cmd)) => match resolve_cmd(&cmd, &exec_params.joint_names) {
                Ok((pos_rad, speed_rads)) => {
                    if let Err(e) = goal_buffer.apply(&pos_rad, &speed_rads) {
                        warn!("Rejected teleop command: {}", e);
                    }
                }
                Err(e) => warn!("Rejected teleop command: {}", e),
            },
            Ok(None) => (),
            Err(e) => warn!("Teleop receive failed: {}", e),
        }

        // Fresh measurements for this cycle
        for (joint_id, handle) in handles.iter().enumerate() {
            meas_pos_rad[joint_id] = handle.get_position();
            meas_vel_rads[joint_id] = handle.get_velocity();
        }

        let input_data = InputData {
            meas_pos_rad,
            meas_vel_rads,
            dt_s,
            goal: goal_buffer.snapshot(),
        };

        let (output, _report) = match joint_ctrl.proc(&input_data) {
            Ok(res) => res,
            Err(e) => {
                raise_error!("JointCtrl processing failed: {}", e);
            }
        };

        // Only active joints get a new command, inactive ones hold
        for (joint_id, handle) in handles.iter_mut().enumerate() {
            if output.active[joint_id] {
                handle.set_command(output.cmd_pos_rad[joint_id]);
            }
        }

        #[cfg(feature = "sim")]
        arm.step(dt_s);

        // Pace the loop to the cycle period
        match cycle_period.checked_sub(cycle_start.elapsed()) {
            Some(remaining) => thread::sleep(remaining),
            None => warn!(
                "Cycle overran, took {:.6} s of a {:.6} s budget",
                cycle_start.elapsed().as_secs_f64(),
                dt_s
            ),
        }
    }
}
