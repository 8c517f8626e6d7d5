//! Poll an Icom rig for frequency and mode over CI-V.
//!
//! Demonstrates the cooperative polling model: the application owns the
//! loop, feeds received bytes to the session, and decides when to send
//! requests. Sets the rig to 14.195 MHz USB, then prints every frequency or
//! mode report for ten seconds.
//!
//! # Requirements
//!
//! - An IC-706MkIIG (or other CI-V rig) on a CI-V interface
//! - The serial port path adjusted for your system
//!
//! # Usage
//!
//! ```sh
//! cargo run -p civlink-icom --example poll_rig
//! ```

use std::thread;
use std::time::{Duration, Instant};

use civlink_core::{Mode, format_freq_mhz};
use civlink_icom::models::ic_706mk2g;
use civlink_icom::{Dispatch, SessionBuilder};

fn main() -> anyhow::Result<()> {
    // Adjust this to match your system's serial port.
    let serial_port = "/dev/ttyUSB0";

    println!("Connecting to IC-706MkIIG on {serial_port}...");
    let mut session = SessionBuilder::new(ic_706mk2g())
        .serial_port(serial_port)
        .open()?;

    session.write_frequency(14_195_000)?;
    session.write_mode(Mode::USB)?;

    let start = Instant::now();
    let mut last_request: Option<Instant> = None;
    while start.elapsed() < Duration::from_secs(10) {
        if last_request.is_none_or(|t| t.elapsed() >= Duration::from_millis(500)) {
            session.request_frequency()?;
            session.request_mode()?;
            last_request = Some(Instant::now());
        }

        match session.poll() {
            Ok(Dispatch::Frequency(hz)) => println!("Frequency: {}", format_freq_mhz(hz)),
            Ok(Dispatch::Mode(_)) => match session.mode() {
                Some(mode) => println!("Mode: {mode}"),
                None => println!("Mode: unknown"),
            },
            Ok(Dispatch::Idle) => thread::sleep(Duration::from_millis(1)),
            Ok(_) => {}
            Err(e) => eprintln!("CI-V receive error: {e}"),
        }
    }

    Ok(())
}
