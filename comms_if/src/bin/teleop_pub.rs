//! Simple teleop command publisher
//!
//! Sends a fixed arm pose once a second, useful for bench testing the
//! controller without a real teleop station.

use comms_if::{
    eqpt::arm::ArmTeleopCmd,
    net::{MonitoredSocket, SocketOptions},
};

fn main() -> Result<(), Box<dyn std::error::Error>> {

    // Create zmq context
    let ctx = zmq::Context::new();

    // Create socket options
    let socket_options = SocketOptions {
        bind: true,
        block_on_first_connect: false,
        ..Default::default()
    };

    // Create the socket
    let socket = MonitoredSocket::new(
        &ctx,
        zmq::PUB,
        socket_options,
        "tcp://*:5020"
    )?;

    println!("Teleop publisher open on port 5020");

    // A gentle pose away from the all-zero start, approached at 0.2 rad/s
    let cmd = ArmTeleopCmd::all_joints(
        [0.3, -0.5, 0.0, -1.2, 0.0, 0.8, 0.4],
        [0.2; 7]
    );

    // Send the command to subscribers
    loop {
        let cmd_str = serde_json::to_string(&cmd)?;

        match socket.send(&cmd_str, 0) {
            Ok(_) => println!("Sent teleop command"),
            Err(e) => println!("Failed to send teleop command: {}", e)
        }

        std::thread::sleep(std::time::Duration::from_millis(1000));
    }
}
