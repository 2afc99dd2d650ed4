//! # SRX CAN Adapter Layer
//!
//! CAN 硬件抽象层：
//!
//! - [`oneshot`]: 单帧发送器（打开 → 解析接口 → 绑定 → 写入 → 关闭）
//! - [`adapter`]: 持久连接的 SocketCAN 适配器（仅 Linux）
//! - `mock`: 测试用的 socket / 适配器替身（`mock` feature）

use thiserror::Error;

pub use srx_protocol::{ProtocolError, SrxFrame};

pub mod oneshot;
pub use oneshot::{CAN_FRAME_WIRE_SIZE, FrameSocket, OneShotSender, SocketProvider};

#[cfg(target_os = "linux")]
mod raw_socket;
#[cfg(target_os = "linux")]
pub use raw_socket::{RawCanProvider, RawCanSocket};
#[cfg(target_os = "linux")]
pub use oneshot::send_frame;

#[cfg(target_os = "linux")]
pub mod adapter;
#[cfg(target_os = "linux")]
pub use adapter::SocketCanAdapter;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

/// CAN 适配层统一错误类型
#[derive(Error, Debug)]
pub enum CanError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Device Error: {0}")]
    Device(#[from] CanDeviceError),
    #[error("Frame Error: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("Short write: {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },
    #[error("Device not started")]
    NotStarted,
}

/// 设备/后端错误的结构化分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanDeviceErrorKind {
    Unknown,
    NotFound,
    InvalidName,
    InvalidFrame,
    Backend,
}

/// 结构化设备错误
#[derive(Error, Debug, Clone)]
#[error("{kind:?}: {message}")]
pub struct CanDeviceError {
    pub kind: CanDeviceErrorKind,
    pub message: String,
}

impl CanDeviceError {
    pub fn new(kind: CanDeviceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<String> for CanDeviceError {
    fn from(message: String) -> Self {
        Self::new(CanDeviceErrorKind::Unknown, message)
    }
}

impl From<&str> for CanDeviceError {
    fn from(message: &str) -> Self {
        Self::new(CanDeviceErrorKind::Unknown, message)
    }
}

/// 持久连接的 CAN 适配器（只发送）
pub trait CanAdapter {
    fn send(&mut self, frame: SrxFrame) -> Result<(), CanError>;
}

/// 按接口名发送单帧
///
/// 初始化唤醒帧走这个接口，测试中可替换为记录型实现。
pub trait FrameSender {
    fn send_frame(&self, interface: &str, frame: &SrxFrame) -> Result<(), CanError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_error_display() {
        let err = CanError::ShortWrite {
            written: 8,
            expected: 16,
        };
        assert_eq!(err.to_string(), "Short write: 8 of 16 bytes");

        let err = CanError::Device(CanDeviceError::new(
            CanDeviceErrorKind::NotFound,
            "interface 'can9' not found",
        ));
        assert!(err.to_string().contains("NotFound"));
        assert!(err.to_string().contains("can9"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err: CanError = ProtocolError::InvalidCanId { id: 0x800 }.into();
        assert!(matches!(
            err,
            CanError::Protocol(ProtocolError::InvalidCanId { id: 0x800 })
        ));
    }

    #[test]
    fn test_device_error_from_str() {
        let err: CanDeviceError = "boom".into();
        assert_eq!(err.kind, CanDeviceErrorKind::Unknown);
        assert_eq!(err.message, "boom");
    }
}
