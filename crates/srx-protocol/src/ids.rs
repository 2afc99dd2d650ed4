//! CAN ID 常量定义

use crate::ProtocolError;
use std::fmt;

/// CAN 2.0 最大数据长度
pub const CAN_MAX_DLEN: usize = 8;

/// 11-bit 标准帧 ID 上限
pub const STANDARD_ID_MAX: u32 = 0x7FF;

/// 29-bit 扩展帧 ID 上限
pub const EXTENDED_ID_MAX: u32 = 0x1FFF_FFFF;

/// 初始化唤醒帧（kick）的 CAN ID
///
/// 项目内约定，不是标准握手；总线上的外设需要识别这个 ID。
pub const KICK_FRAME_ID: u16 = 0x123;

/// 初始化唤醒帧的负载（8 字节全 0）
pub const KICK_PAYLOAD: [u8; CAN_MAX_DLEN] = [0; CAN_MAX_DLEN];

/// 唤醒帧默认发送接口
pub const KICK_INTERFACE: &str = "can0";

/// Talon SRX 控制/使能帧基址（扩展帧）
pub const SRX_CONTROL_BASE: u32 = 0x0204_0000;

/// Talon SRX demand 帧基址（扩展帧）
pub const SRX_DEMAND_BASE: u32 = 0x0400_0000;

/// 设备 ID 上限（Talon SRX 可配置范围 0..=62）
pub const DEVICE_ID_MAX: u8 = 62;

/// 总线上单个电机控制器的设备 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceId(u8);

impl DeviceId {
    pub fn new(id: u8) -> Result<Self, ProtocolError> {
        if id > DEVICE_ID_MAX {
            return Err(ProtocolError::InvalidDeviceId {
                id,
                max: DEVICE_ID_MAX,
            });
        }
        Ok(Self(id))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// 该设备控制/使能帧的扩展 ID
    pub fn control_frame_id(self) -> u32 {
        SRX_CONTROL_BASE | (u32::from(self.0) << 16)
    }

    /// 该设备 demand 帧的扩展 ID
    pub fn demand_frame_id(self) -> u32 {
        SRX_DEMAND_BASE | (u32::from(self.0) << 16)
    }
}

impl TryFrom<u8> for DeviceId {
    type Error = ProtocolError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
