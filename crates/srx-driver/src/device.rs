//! 厂商电机控制器的能力接口
//!
//! 门面只通过这里的两个 trait 访问设备：
//!
//! - [`MotorDevice`]：单个设备的配置与执行（与设备 ID 一一对应）
//! - [`EnableFeeder`]：进程级使能看门狗的喂狗原语（所有设备共享）
//!
//! 真实实现可以包装厂商 SDK，也可以是直接走总线的 [`RawSrx`](crate::RawSrx)；
//! 测试中替换为 `mock` 模块里的记录型实现。

use crate::error::VendorError;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use srx_protocol::DeviceId;
use std::fmt;
use std::time::Duration;

pub type VendorResult = Result<(), VendorError>;

/// 反馈传感器类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum FeedbackDevice {
    QuadEncoder = 0,
    Analog = 2,
    Tachometer = 4,
    PulseWidthEncodedPosition = 8,
}

/// 闭环增益种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GainKind {
    P,
    I,
    D,
    F,
}


/// 厂商调用的种类，用于错误报告
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VendorOp {
    ConfigFactoryDefault,
    SetInverted,
    ConfigSelectedFeedbackSensor,
    SetSensorPhase,
    ConfigGain(GainKind),
    SetPercentOutput,
    FeedEnable,
}

impl fmt::Display for VendorOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VendorOp::ConfigFactoryDefault => f.write_str("config_factory_default"),
            VendorOp::SetInverted => f.write_str("set_inverted"),
            VendorOp::ConfigSelectedFeedbackSensor => f.write_str("config_selected_feedback_sensor"),
            VendorOp::SetSensorPhase => f.write_str("set_sensor_phase"),
            VendorOp::ConfigGain(kind) => write!(f, "config_k{:?}", kind),
            VendorOp::SetPercentOutput => f.write_str("set_percent_output"),
            VendorOp::FeedEnable => f.write_str("feed_enable"),
        }
    }
}

/// 单个电机控制器
///
/// 所有带 `timeout` 的调用都是"下发并等待确认"，超时应返回
/// [`VendorError::Timeout`]。
pub trait MotorDevice {
    /// 该句柄绑定的设备 ID（构造后不变）
    fn device_id(&self) -> DeviceId;

    /// 恢复出厂配置
    fn config_factory_default(&mut self, timeout: Duration) -> VendorResult;

    /// 输出方向反转
    fn set_inverted(&mut self, inverted: bool) -> VendorResult;

    /// 选择闭环 `pid_idx` 使用的反馈传感器
    fn config_selected_feedback_sensor(
        &mut self,
        sensor: FeedbackDevice,
        pid_idx: u8,
        timeout: Duration,
    ) -> VendorResult;

    /// 传感器相位：`true` 表示正输出时编码器计数增加
    fn set_sensor_phase(&mut self, phase: bool) -> VendorResult;

    /// 写入增益槽 `slot` 的某一项增益
    fn config_gain(&mut self, slot: u8, kind: GainKind, value: f64, timeout: Duration) -> VendorResult;

    /// 百分比输出模式，`duty` 原样下发
    fn set_percent_output(&mut self, duty: f64) -> VendorResult;
}

/// 进程级使能看门狗的喂狗原语
///
/// 厂商 SDK 中这是一个全局调用，与设备无关；这里单独建模，
/// 由 [`EnableWatchdog`](crate::EnableWatchdog) 持有。
pub trait EnableFeeder: Send + Sync {
    /// 允许输出持续 `duration`
    fn feed_enable(&self, duration: Duration) -> VendorResult;

    /// 共享此喂狗原语的设备；全局喂狗（厂商 SDK）忽略
    fn register(&self, _device: DeviceId) {}
}
