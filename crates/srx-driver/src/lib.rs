//! 驱动层
//!
//! 单个电机执行器的门面与它依赖的可替换部件：
//!
//! - [`MotorController`]：初始化 / 设速 / 设速并喂狗 / 周期运行
//! - [`MotionModel`]：开环按距离移动
//! - [`MotorDevice`] / [`EnableFeeder`]：厂商设备能力接口
//! - [`EnableWatchdog`]：进程级使能看门狗（显式共享）
//! - [`SettleWait`]：初始化中的沉降等待策略
//! - [`RawSrx`] / [`BusEnableFeeder`]：不经过厂商 SDK、直接走总线的后端

mod builder;
pub mod config;
mod controller;
pub mod device;
mod error;
pub mod motion;
pub mod raw;
pub mod wait;
pub mod watchdog;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use builder::MotorControllerBuilder;
pub use config::{DutyPolicy, GainProfile, KickFrameConfig, MotorConfig};
pub use controller::{ControllerState, MotorController};
pub use device::{EnableFeeder, FeedbackDevice, GainKind, MotorDevice, VendorOp, VendorResult};
pub use error::{DriverError, VendorError};
pub use motion::{Direction, DistanceMove, LinearFit, MotionModel};
pub use raw::{BusEnableFeeder, RawSrx};
pub use wait::{NoWait, SettleWait, ThreadSleep};
pub use watchdog::EnableWatchdog;
