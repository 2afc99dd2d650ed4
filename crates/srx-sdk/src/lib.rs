//! SRX SDK - 单个 Talon SRX 执行器的 CAN 总线绑定层
//!
//! # 架构设计
//!
//! 从底层到高层：
//!
//! - **协议层** (`protocol`): CAN 帧模型、唤醒帧常量、原始 Talon 帧布局
//! - **CAN 层** (`can`): 单帧发送器（原始 socket）与 SocketCAN 适配器
//! - **驱动层** (`driver`): 电机控制器门面、使能看门狗、直接总线后端
//!
//! # 快速开始
//!
//! 厂商 SDK 后端实现 [`MotorDevice`] 后，用 `MotorControllerBuilder` 绑定并调用
//! `initialize()`。没有厂商 SDK 时可以直接走总线，但只能输出，不能配置：
//!
//! ```no_run
//! use srx_sdk::prelude::*;
//! use std::time::Duration;
//! srx_sdk::init_logging();
//!
//! let device_id = DeviceId::new(5)?;
//! let (mut motor, _watchdog) = srx_sdk::connect_raw("can0", device_id)?;
//! motor.wake()?;
//! motor.device_mut().set_inverted(true)?;
//! motor.run_for(0.5, 100, Duration::from_secs(2), Duration::from_millis(50))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use srx_can as can;
pub use srx_driver as driver;
pub use srx_protocol as protocol;

pub mod prelude;

pub use can::{CanAdapter, CanError, FrameSender, OneShotSender, SrxFrame};
pub use driver::{
    ControllerState, DriverError, EnableWatchdog, MotorConfig, MotorController, MotorDevice,
};
pub use protocol::{DeviceId, ProtocolError};

#[cfg(target_os = "linux")]
pub use can::send_frame;

#[cfg(target_os = "linux")]
use parking_lot::Mutex;
#[cfg(target_os = "linux")]
use std::sync::Arc;
#[cfg(target_os = "linux")]
use tracing::info;

/// 打开 `interface` 并返回直接走总线（不经厂商 SDK）的控制器及其看门狗
///
/// 该后端无法下发厂商配置：`initialize()` 会在出厂复位一步返回
/// [`VendorError::Unsupported`](driver::VendorError::Unsupported)。请改用
/// `wake()`，反转通过 `device_mut().set_inverted()` 设置。
///
/// 看门狗为每个注册到它的设备发送使能帧；用 `MotorControllerBuilder::watchdog`
/// 把它交给其他控制器后，`build` 会自动注册那些设备。
#[cfg(target_os = "linux")]
pub fn connect_raw(
    interface: &str,
    device_id: DeviceId,
) -> Result<(RawBusController, Arc<EnableWatchdog>), DriverError> {
    let bus = Arc::new(Mutex::new(can::SocketCanAdapter::new(interface)?));
    let watchdog = EnableWatchdog::shared(driver::BusEnableFeeder::new(bus.clone()));
    let motor = driver::MotorControllerBuilder::new()
        .watchdog(watchdog.clone())
        .build(driver::RawSrx::new(bus, device_id))?;
    info!(
        "Connected to device {} on '{}' (raw bus, no vendor configuration)",
        device_id, interface
    );
    Ok((motor, watchdog))
}

/// 直接走 SocketCAN 的控制器
#[cfg(target_os = "linux")]
pub type RawBusController = MotorController<driver::RawSrx<can::SocketCanAdapter>>;

/// 初始化日志
///
/// 使用 `RUST_LOG` 过滤（默认 `info`），并把 `log` crate 的记录转发到 `tracing`。
/// 重复调用是安全的，只有第一次生效。
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_ok() {
        let _ = tracing_log::LogTracer::init();
    }
}
