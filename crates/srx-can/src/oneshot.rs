//! 单帧 CAN 发送器
//!
//! 每次调用独立打开一个原始 CAN socket，发送一帧后关闭，不保持连接：
//!
//! ```text
//! open(PF_CAN, SOCK_RAW, CAN_RAW)
//!   -> resolve(interface) -> ifindex
//!   -> bind(ifindex)
//!   -> write(struct can_frame)   // 必须完整写入 16 字节
//!   -> close                     // 任何退出路径都会执行（Drop）
//! ```
//!
//! 无重试、无超时、无排队。并发调用互不影响，也不保证相互顺序。

use crate::{CanError, FrameSender, SrxFrame};
use tracing::{error, trace};

/// Linux `struct can_frame` 的大小（4 字节 ID + 4 字节 DLC/填充 + 8 字节数据）
pub const CAN_FRAME_WIRE_SIZE: usize = 16;

/// 已打开的原始 CAN socket
///
/// 实现者必须在 `Drop` 中释放底层资源。
pub trait FrameSocket {
    /// 接口名 -> 内核接口索引
    fn resolve_interface(&mut self, interface: &str) -> Result<u32, CanError>;

    /// 绑定到接口
    fn bind(&mut self, ifindex: u32) -> Result<(), CanError>;

    /// 一次阻塞写入，返回实际写入的字节数
    fn write_frame(&mut self, frame: &SrxFrame) -> Result<usize, CanError>;
}

/// 原始 CAN socket 的来源
pub trait SocketProvider {
    type Socket: FrameSocket;

    fn open(&self) -> Result<Self::Socket, CanError>;
}

/// 单帧发送器
#[derive(Debug, Clone, Default)]
pub struct OneShotSender<P> {
    provider: P,
}

impl<P: SocketProvider> OneShotSender<P> {
    pub fn with_provider(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// 发送一帧
    ///
    /// 失败会以 `error!` 记录并返回；socket 在返回前已经关闭。
    pub fn send(&self, interface: &str, frame: &SrxFrame) -> Result<(), CanError> {
        let result = self.transmit(interface, frame);
        if let Err(e) = &result {
            error!(
                "Failed to send CAN frame ID=0x{:X} on '{}': {}",
                frame.id, interface, e
            );
        }
        result
    }

    fn transmit(&self, interface: &str, frame: &SrxFrame) -> Result<(), CanError> {
        frame.validate()?;

        // socket 离开作用域即关闭，覆盖下面每一个 `?`
        let mut socket = self.provider.open()?;
        let ifindex = socket.resolve_interface(interface)?;
        socket.bind(ifindex)?;

        let written = socket.write_frame(frame)?;
        if written != CAN_FRAME_WIRE_SIZE {
            return Err(CanError::ShortWrite {
                written,
                expected: CAN_FRAME_WIRE_SIZE,
            });
        }

        trace!(
            "Sent CAN frame on '{}' (ifindex {}): ID=0x{:X}, len={}",
            interface, ifindex, frame.id, frame.len
        );
        Ok(())
    }
}

impl<P: SocketProvider> FrameSender for OneShotSender<P> {
    fn send_frame(&self, interface: &str, frame: &SrxFrame) -> Result<(), CanError> {
        self.send(interface, frame)
    }
}

#[cfg(target_os = "linux")]
impl OneShotSender<crate::RawCanProvider> {
    /// 使用 Linux 原始 CAN socket
    pub fn new() -> Self {
        Self::with_provider(crate::RawCanProvider)
    }
}

/// 在 `interface` 上发送一个标准帧
///
/// 只发送 `payload` 的前 `dlc` 字节；`dlc > 8` 或 `dlc > payload.len()`
/// 直接返回 `CanError::Protocol`，不会打开 socket。
///
/// ```no_run
/// use srx_can::send_frame;
///
/// send_frame("vcan0", 0x123, &[0u8; 8], 8).unwrap();
/// ```
#[cfg(target_os = "linux")]
pub fn send_frame(interface: &str, id: u16, payload: &[u8], dlc: usize) -> Result<(), CanError> {
    let frame = SrxFrame::with_dlc(id, payload, dlc).inspect_err(|e| {
        error!("Rejected CAN frame ID=0x{:X} for '{}': {}", id, interface, e);
    })?;
    OneShotSender::new().send(interface, &frame)
}
