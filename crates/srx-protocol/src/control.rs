//! Talon SRX 原始控制帧构建
//!
//! 不经过厂商 SDK、直接在总线上驱动 Talon SRX 时使用的两类扩展帧：
//!
//! | 帧 | ID | 负载 |
//! |---|---|---|
//! | 控制/使能 | `0x0204_0000 \| (device << 16)` | `[0x0F, 0, 0, 0, 0, 0, 0, 0]` |
//! | demand | `0x0400_0000 \| (device << 16)` | `[mode, demand(i32 LE), 0, 0, 0]` |

use crate::{CAN_MAX_DLEN, DeviceId, SrxFrame};
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// 控制/使能帧负载
pub const ENABLE_CONTROL_PAYLOAD: [u8; CAN_MAX_DLEN] = [0x0F, 0, 0, 0, 0, 0, 0, 0];

/// 百分比输出满量程（10-bit）
pub const PERCENT_OUTPUT_FULL_SCALE: i32 = 1023;

/// 编码器每转 tick 数
pub const ENCODER_TICKS_PER_REV: i32 = 4096;

/// demand 帧的控制模式字节
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum DemandMode {
    /// 未经硬件验证
    PercentOutput = 0x00,
    Position = 0x01,
}

/// 构建控制/使能帧
pub fn enable_control_frame(device: DeviceId) -> SrxFrame {
    SrxFrame {
        id: device.control_frame_id(),
        data: ENABLE_CONTROL_PAYLOAD,
        len: CAN_MAX_DLEN as u8,
        is_extended: true,
    }
}

/// 构建 demand 帧
pub fn demand_frame(device: DeviceId, mode: DemandMode, demand: i32) -> SrxFrame {
    let mut data = [0u8; CAN_MAX_DLEN];
    data[0] = mode.into();
    data[1..5].copy_from_slice(&demand.to_le_bytes());

    SrxFrame {
        id: device.demand_frame_id(),
        data,
        len: CAN_MAX_DLEN as u8,
        is_extended: true,
    }
}

/// 占空比 [-1.0, 1.0] 转 10-bit demand
///
/// 超出范围的值饱和到满量程，NaN 映射为 0。
/// 该刻度与模式 0x00 未经硬件验证，只有位置模式（0x01）在实机上使用过。
pub fn percent_to_demand(duty: f64) -> i32 {
    if duty.is_nan() {
        return 0;
    }
    let scaled = (duty.clamp(-1.0, 1.0) * f64::from(PERCENT_OUTPUT_FULL_SCALE)).round();
    scaled as i32
}

/// 圈数转编码器 tick（向零截断）
pub fn revolutions_to_ticks(revolutions: f64) -> i32 {
    (revolutions * f64::from(ENCODER_TICKS_PER_REV)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(id: u8) -> DeviceId {
        DeviceId::new(id).unwrap()
    }

    #[test]
    fn test_enable_control_frame_layout() {
        let frame = enable_control_frame(device(2));
        assert_eq!(frame.id, 0x0206_0000);
        assert!(frame.is_extended);
        assert_eq!(frame.data_slice(), &[0x0F, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_position_demand_frame_layout() {
        let frame = demand_frame(device(2), DemandMode::Position, 4096);
        assert_eq!(frame.id, 0x0402_0000);
        assert_eq!(frame.data, [0x01, 0x00, 0x10, 0x00, 0x00, 0, 0, 0]);
    }

    #[test]
    fn test_negative_demand_little_endian() {
        let frame = demand_frame(device(1), DemandMode::PercentOutput, -1);
        assert_eq!(frame.data, [0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0, 0, 0]);
    }

    #[test]
    fn test_percent_to_demand() {
        assert_eq!(percent_to_demand(0.0), 0);
        assert_eq!(percent_to_demand(1.0), 1023);
        assert_eq!(percent_to_demand(-1.0), -1023);
        assert_eq!(percent_to_demand(0.5), 512);
        assert_eq!(percent_to_demand(3.0), 1023);
        assert_eq!(percent_to_demand(f64::NAN), 0);
    }

    #[test]
    fn test_revolutions_to_ticks_truncates() {
        assert_eq!(revolutions_to_ticks(1.0), 4096);
        assert_eq!(revolutions_to_ticks(0.5), 2048);
        assert_eq!(revolutions_to_ticks(-0.0001), 0);
        assert_eq!(revolutions_to_ticks(-2.0), -8192);
    }

    #[test]
    fn test_demand_mode_from_byte() {
        assert_eq!(DemandMode::try_from(0x01).unwrap(), DemandMode::Position);
        assert!(DemandMode::try_from(0x07).is_err());
    }
}
