//! 唤醒并以固定占空比转动一个执行器（直接走总线，不做厂商配置）
//!
//! ```bash
//! RUST_LOG=debug cargo run -p srx-sdk --example spin -- --device-id 2 --speed 0.1 --duration-ms 5000
//! ```

use anyhow::Context;
use clap::Parser;
use srx_sdk::prelude::*;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Spin one Talon SRX over CAN", long_about = None)]
struct Args {
    /// CAN interface
    #[arg(short, long, default_value = "can0")]
    interface: String,

    /// Controller device id on the bus
    #[arg(short, long, default_value_t = 2)]
    device_id: u8,

    /// Duty cycle in [-1.0, 1.0]
    #[arg(short, long, default_value_t = 0.1, allow_hyphen_values = true)]
    speed: f64,

    /// How long to keep the actuator moving
    #[arg(long, default_value_t = 5000)]
    duration_ms: u32,

    /// Watchdog feed period; must stay below the feed duration
    #[arg(long, default_value_t = 20)]
    period_ms: u64,
}

#[cfg(target_os = "linux")]
fn main() -> anyhow::Result<()> {
    srx_sdk::init_logging();
    let args = Args::parse();

    let device_id = DeviceId::new(args.device_id).context("invalid device id")?;
    let (mut motor, watchdog) = srx_sdk::connect_raw(&args.interface, device_id)
        .with_context(|| format!("Failed to open '{}'", args.interface))?;

    // 直接总线后端不能下发厂商配置，只唤醒并设置反转
    info!("Waking motor {}...", device_id);
    motor.wake().context("wake")?;
    motor.device_mut().set_inverted(true).context("set_inverted")?;

    // 每次喂狗 100ms，周期远小于它
    let feed_ms = 100;
    let calls = motor
        .run_for(
            args.speed,
            feed_ms,
            Duration::from_millis(u64::from(args.duration_ms)),
            Duration::from_millis(args.period_ms),
        )
        .context("run")?;
    info!("Ran at {} with {} feeds", args.speed, calls);

    motor.set_speed(0.0).context("stop")?;
    info!("Stopped; watchdog lapses in {:?}", watchdog.remaining());
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn main() {
    eprintln!("This example requires SocketCAN (Linux only)");
}
