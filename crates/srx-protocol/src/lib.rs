//! # SRX Protocol
//!
//! 电机执行器 CAN 总线帧定义（无硬件依赖）
//!
//! ## 模块
//!
//! - `ids`: CAN ID 常量与设备 ID 定义
//! - `control`: Talon SRX 原始控制帧构建
//!
//! ## 字节序
//!
//! 原始 demand 帧中的 32 位需求值使用小端字节序（Intel LSB 在前）。

pub mod control;
pub mod ids;

pub use control::*;
pub use ids::*;

use thiserror::Error;

/// CAN 2.0 帧的统一抽象
///
/// `SrxFrame` 是协议层和 CAN 层之间的中间抽象：协议层只负责构建帧，
/// 真正写入 socket 的转换逻辑在 CAN 层（`srx-can`）实现。
///
/// # 与 Linux `struct can_frame` 的对应关系
///
/// ```text
/// can_id   <- id (| CAN_EFF_FLAG 若 is_extended)
/// can_dlc  <- len
/// data[8]  <- data（仅前 len 字节有效）
/// ```
///
/// # 限制
///
/// - **仅支持 CAN 2.0**：最多 8 字节数据
/// - 超过 8 字节的负载会被拒绝，不会被静默截断
/// - 字段是公开的，手工构造的帧在发送前必须经过 [`SrxFrame::validate`]；
///   CAN 层的每条发送路径都会做这一检查
///
/// ```rust
/// use srx_protocol::SrxFrame;
///
/// let frame = SrxFrame::new_standard(0x123, &[1, 2, 3, 4]).unwrap();
/// assert_eq!(frame.id(), 0x123);
/// assert_eq!(frame.data_slice(), &[1, 2, 3, 4]);
///
/// assert!(SrxFrame::new_standard(0x123, &[0; 9]).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SrxFrame {
    /// CAN ID（标准帧或扩展帧）
    pub id: u32,

    /// 帧数据（固定 8 字节，未使用部分为 0）
    pub data: [u8; CAN_MAX_DLEN],

    /// 有效数据长度 (0-8)
    pub len: u8,

    /// 是否为扩展帧（29-bit ID）
    pub is_extended: bool,
}

impl SrxFrame {
    /// 创建标准帧（11-bit ID），DLC 取 `data.len()`
    pub fn new_standard(id: u16, data: &[u8]) -> Result<Self, ProtocolError> {
        Self::with_dlc(id, data, data.len())
    }

    /// 创建扩展帧（29-bit ID）
    pub fn new_extended(id: u32, data: &[u8]) -> Result<Self, ProtocolError> {
        if id > EXTENDED_ID_MAX {
            return Err(ProtocolError::InvalidCanId { id });
        }
        Self::build(id, data, data.len(), true)
    }

    /// 用显式 DLC 创建标准帧
    ///
    /// 只复制 `payload` 的前 `dlc` 字节。`dlc` 必须同时满足 `dlc <= 8`
    /// 与 `dlc <= payload.len()`。
    pub fn with_dlc(id: u16, payload: &[u8], dlc: usize) -> Result<Self, ProtocolError> {
        if u32::from(id) > STANDARD_ID_MAX {
            return Err(ProtocolError::InvalidCanId { id: id.into() });
        }
        Self::build(id.into(), payload, dlc, false)
    }

    fn build(id: u32, payload: &[u8], dlc: usize, is_extended: bool) -> Result<Self, ProtocolError> {
        if dlc > CAN_MAX_DLEN {
            return Err(ProtocolError::InvalidLength {
                expected: CAN_MAX_DLEN,
                actual: dlc,
            });
        }
        if dlc > payload.len() {
            return Err(ProtocolError::InvalidLength {
                expected: dlc,
                actual: payload.len(),
            });
        }

        let mut data = [0u8; CAN_MAX_DLEN];
        data[..dlc].copy_from_slice(&payload[..dlc]);

        Ok(Self {
            id,
            data,
            len: dlc as u8,
            is_extended,
        })
    }

    /// 检查手工构造的帧：`len <= 8`，ID 在标准帧/扩展帧范围内
    ///
    /// ```rust
    /// use srx_protocol::SrxFrame;
    ///
    /// let mut frame = SrxFrame::new_standard(0x123, &[0; 8]).unwrap();
    /// assert!(frame.validate().is_ok());
    ///
    /// frame.len = 12;
    /// assert!(frame.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if usize::from(self.len) > CAN_MAX_DLEN {
            return Err(ProtocolError::InvalidLength {
                expected: CAN_MAX_DLEN,
                actual: self.len.into(),
            });
        }
        let max = if self.is_extended {
            EXTENDED_ID_MAX
        } else {
            STANDARD_ID_MAX
        };
        if self.id > max {
            return Err(ProtocolError::InvalidCanId { id: self.id });
        }
        Ok(())
    }

    /// 获取数据切片（只包含有效数据，`len` 越界时截到 8 字节）
    pub fn data_slice(&self) -> &[u8] {
        let len = usize::from(self.len).min(CAN_MAX_DLEN);
        &self.data[..len]
    }

    /// 获取 CAN ID
    pub fn id(&self) -> u32 {
        self.id
    }

    /// 数据长度码
    pub fn dlc(&self) -> u8 {
        self.len
    }
}

/// 协议错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Invalid frame length: expected at most {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Invalid CAN ID: 0x{id:X}")]
    InvalidCanId { id: u32 },

    #[error("Invalid device ID: {id} (max {max})")]
    InvalidDeviceId { id: u8, max: u8 },
}
