//! Integration tests for the BLE configuration firmware.
//!
//! Run after flashing the firmware; connects over BLE by advertised name.

mod ble_client;
mod profile;

use std::time::Duration;

use clap::Parser;
use colored::Colorize;

use ble_client::ConfigClient;
use tests::{print_results, run_all_tests};

#[derive(Parser)]
#[command(name = "integration-tests")]
#[command(about = "Integration tests for the BLE configuration firmware")]
struct Args {
    /// Advertised device name
    #[arg(short, long, default_value = "ESP32_BLE_DEVICE")]
    name: String,

    /// BLE scan timeout in seconds
    #[arg(long, default_value = "10")]
    scan_timeout: u64,

    /// Skip the test that writes to flash and restarts the device
    #[arg(long)]
    no_save: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    println!("{}", "BLE Configuration Integration Tests".bold());
    println!("Device: \"{}\"", args.name);
    println!();

    println!("Scanning...");
    let scan_timeout = Duration::from_secs(args.scan_timeout);
    let mut client = ConfigClient::connect_by_name(&args.name, scan_timeout).await?;
    println!("{}", "Connected!".green());

    println!("\nRunning tests...\n");

    let results = run_all_tests(&mut client, scan_timeout, !args.no_save).await;
    print_results(&results);

    let _ = client.disconnect().await;

    // Exit with error code if any tests failed
    let failed = results.iter().filter(|r| !r.passed).count();
    if failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}
