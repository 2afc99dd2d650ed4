//! SocketCAN 持久连接适配器
//!
//! 与 [`OneShotSender`](crate::OneShotSender) 不同，这里在构造时打开并绑定一次
//! socket，之后可重复发送；直接在总线上驱动控制器（高频 demand 帧）时使用。
//!
//! ## 限制
//!
//! - **仅限 Linux 平台**
//! - **接口配置**：波特率等由系统工具（`ip link`）完成，不在应用层设置

use crate::{CanAdapter, CanDeviceError, CanDeviceErrorKind, CanError, SrxFrame};
use socketcan::{BlockingCan, CanFrame, CanSocket, EmbeddedFrame, ExtendedId, Socket, StandardId};
use tracing::{debug, trace};

/// SocketCAN 适配器
///
/// ```no_run
/// use srx_can::{CanAdapter, SocketCanAdapter, SrxFrame};
///
/// let mut adapter = SocketCanAdapter::new("can0").unwrap();
/// adapter.send(SrxFrame::new_standard(0x123, &[1, 2, 3, 4]).unwrap()).unwrap();
/// ```
#[derive(Debug)]
pub struct SocketCanAdapter {
    socket: CanSocket,
    interface: String,
}

impl SocketCanAdapter {
    /// 打开并绑定 `interface`
    pub fn new(interface: impl Into<String>) -> Result<Self, CanError> {
        let interface = interface.into();
        let socket = CanSocket::open(&interface).map_err(|e| {
            CanDeviceError::new(
                CanDeviceErrorKind::Backend,
                format!("Failed to open CAN interface '{}': {}", interface, e),
            )
        })?;
        debug!("SocketCAN interface '{}' opened", interface);
        Ok(Self { socket, interface })
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }

    fn to_can_frame(frame: &SrxFrame) -> Result<CanFrame, CanError> {
        frame.validate()?;
        let can_frame = if frame.is_extended {
            ExtendedId::new(frame.id).and_then(|id| CanFrame::new(id, frame.data_slice()))
        } else {
            u16::try_from(frame.id)
                .ok()
                .and_then(StandardId::new)
                .and_then(|id| CanFrame::new(id, frame.data_slice()))
        };
        can_frame.ok_or_else(|| {
            CanDeviceError::new(
                CanDeviceErrorKind::InvalidFrame,
                format!("Failed to create CAN frame with ID 0x{:X}", frame.id),
            )
            .into()
        })
    }
}

impl CanAdapter for SocketCanAdapter {
    fn send(&mut self, frame: SrxFrame) -> Result<(), CanError> {
        let can_frame = Self::to_can_frame(&frame)?;

        // Fire-and-Forget
        self.socket.transmit(&can_frame).map_err(|e| {
            CanError::Io(std::io::Error::other(format!(
                "SocketCAN transmit error: {}",
                e
            )))
        })?;

        trace!(
            "Sent CAN frame on '{}': ID=0x{:X}, len={}",
            self.interface, frame.id, frame.len
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_can_frame_standard() {
        let frame = SrxFrame::new_standard(0x123, &[1, 2, 3]).unwrap();
        let can_frame = SocketCanAdapter::to_can_frame(&frame).unwrap();
        assert_eq!(can_frame.data(), &[1, 2, 3]);
        assert!(!can_frame.is_extended());
    }

    #[test]
    fn test_to_can_frame_extended() {
        let frame = SrxFrame::new_extended(0x0206_0000, &[0x0F, 0, 0, 0, 0, 0, 0, 0]).unwrap();
        let can_frame = SocketCanAdapter::to_can_frame(&frame).unwrap();
        assert!(can_frame.is_extended());
        assert_eq!(can_frame.dlc(), 8);
    }

    #[test]
    fn test_to_can_frame_rejects_hand_built_frames() {
        let ok = SrxFrame::new_standard(0x123, &[1, 2, 3]).unwrap();

        let wide = SrxFrame { id: 0x1_0123, ..ok };
        assert!(matches!(
            SocketCanAdapter::to_can_frame(&wide),
            Err(CanError::Protocol(_))
        ));

        let long = SrxFrame { len: 12, ..ok };
        assert!(matches!(
            SocketCanAdapter::to_can_frame(&long),
            Err(CanError::Protocol(_))
        ));
    }

    #[test]
    fn test_open_missing_interface_fails() {
        let err = SocketCanAdapter::new("can999").unwrap_err();
        assert!(matches!(
            err,
            CanError::Device(CanDeviceError {
                kind: CanDeviceErrorKind::Backend,
                ..
            })
        ));
    }
}
