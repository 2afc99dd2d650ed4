//! 驱动层错误类型定义

use crate::device::VendorOp;
use srx_can::CanError;
use srx_protocol::{DeviceId, ProtocolError};
use std::time::Duration;
use thiserror::Error;

/// 厂商设备边界上的失败
#[derive(Error, Debug)]
pub enum VendorError {
    /// 命令在超时预算内未被确认
    #[error("command not acknowledged within {0:?}")]
    Timeout(Duration),

    /// 设备在总线上不可达
    #[error("device {0} not reachable on the bus")]
    NotReachable(DeviceId),

    /// 参数被设备拒绝
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// 当前后端无法把该调用下发到设备
    #[error("not supported by this backend: {0}")]
    Unsupported(&'static str),

    /// 厂商 SDK 返回的原始错误码
    #[error("vendor error code {0}")]
    Code(i32),

    /// 底层总线错误
    #[error("bus error: {0}")]
    Bus(#[from] CanError),
}

/// 驱动层错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// CAN 驱动错误（如唤醒帧发送失败）
    #[error("CAN driver error: {0}")]
    Can(#[from] CanError),

    /// 帧构建错误
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// 某个厂商调用失败
    #[error("{op} failed on device {device}: {source}")]
    Vendor {
        op: VendorOp,
        device: DeviceId,
        #[source]
        source: VendorError,
    },

    /// 无效输入（如超出范围的占空比）
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl DriverError {
    /// 失败的厂商操作（如有）
    pub fn vendor_op(&self) -> Option<VendorOp> {
        match self {
            DriverError::Vendor { op, .. } => Some(*op),
            _ => None,
        }
    }
}
