//! 控制器配置
//!
//! 默认值就是初始化时下发的固定配置：
//!
//! | 项 | 默认 |
//! |---|---|
//! | 唤醒帧 | `can0`, ID `0x123`, 8 字节 0 |
//! | 沉降等待 | 5 s |
//! | 命令确认超时 | 100 ms |
//! | 反转 | `true` |
//! | 反馈传感器 | `QuadEncoder`，PID 环 0，相位 `true` |
//! | 增益槽 0 | kP = 10.0, kD = 0.0, kF = 0.0 |

use crate::device::FeedbackDevice;
use crate::error::DriverError;
use srx_protocol::{KICK_FRAME_ID, KICK_INTERFACE, KICK_PAYLOAD};
use std::time::Duration;

/// 初始化唤醒帧
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KickFrameConfig {
    pub interface: String,
    pub id: u16,
    pub payload: [u8; 8],
    pub dlc: usize,
}

impl Default for KickFrameConfig {
    fn default() -> Self {
        Self {
            interface: KICK_INTERFACE.to_string(),
            id: KICK_FRAME_ID,
            payload: KICK_PAYLOAD,
            dlc: KICK_PAYLOAD.len(),
        }
    }
}

/// 一个增益槽的 P/D/F（不配置 I）
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GainProfile {
    pub slot: u8,
    pub kp: f64,
    pub kd: f64,
    pub kf: f64,
}

impl Default for GainProfile {
    fn default() -> Self {
        Self {
            slot: 0,
            kp: 10.0,
            kd: 0.0,
            kf: 0.0,
        }
    }
}

/// 占空比越界时的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DutyPolicy {
    /// 越界直接返回 `DriverError::InvalidInput`
    #[default]
    Reject,
    /// 饱和到 `[-1.0, 1.0]`
    Clamp,
}

impl DutyPolicy {
    /// 检查/修正占空比；NaN 与无穷在两种策略下都被拒绝
    pub fn apply(self, duty: f64) -> Result<f64, DriverError> {
        if !duty.is_finite() {
            return Err(DriverError::InvalidInput(format!(
                "duty cycle must be finite, got {}",
                duty
            )));
        }
        if (-1.0..=1.0).contains(&duty) {
            return Ok(duty);
        }
        match self {
            DutyPolicy::Reject => Err(DriverError::InvalidInput(format!(
                "duty cycle {} outside [-1.0, 1.0]",
                duty
            ))),
            DutyPolicy::Clamp => Ok(duty.clamp(-1.0, 1.0)),
        }
    }
}

/// 电机控制器配置
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotorConfig {
    pub kick: KickFrameConfig,
    /// 唤醒帧发出后的等待时间
    pub settle_delay: Duration,
    /// 所有配置调用共享的确认超时
    pub command_timeout: Duration,
    pub inverted: bool,
    pub feedback_device: FeedbackDevice,
    pub pid_idx: u8,
    pub sensor_phase: bool,
    pub gains: GainProfile,
    pub duty_policy: DutyPolicy,
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self {
            kick: KickFrameConfig::default(),
            settle_delay: Duration::from_secs(5),
            command_timeout: Duration::from_millis(100),
            inverted: true,
            feedback_device: FeedbackDevice::QuadEncoder,
            pid_idx: 0,
            sensor_phase: true,
            gains: GainProfile::default(),
            duty_policy: DutyPolicy::Reject,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_matches_fixed_configuration() {
        let config = MotorConfig::default();
        assert_eq!(config.kick.interface, "can0");
        assert_eq!(config.kick.id, 0x123);
        assert_eq!(config.kick.payload, [0u8; 8]);
        assert_eq!(config.kick.dlc, 8);
        assert_eq!(config.settle_delay, Duration::from_secs(5));
        assert_eq!(config.command_timeout, Duration::from_millis(100));
        assert!(config.inverted);
        assert!(config.sensor_phase);
        assert_eq!(config.feedback_device, FeedbackDevice::QuadEncoder);
        assert_eq!(config.gains.kp, 10.0);
        assert_eq!(config.gains.kd, 0.0);
        assert_eq!(config.gains.kf, 0.0);
    }

    #[test]
    fn test_reject_policy() {
        let policy = DutyPolicy::Reject;
        for duty in [-1.0, 0.0, 1.0] {
            assert_eq!(policy.apply(duty).unwrap(), duty);
        }
        assert!(policy.apply(1.0001).is_err());
        assert!(policy.apply(-2.0).is_err());
    }

    #[test]
    fn test_clamp_policy_boundaries_exact() {
        let policy = DutyPolicy::Clamp;
        assert_eq!(policy.apply(1.5).unwrap(), 1.0);
        assert_eq!(policy.apply(-7.0).unwrap(), -1.0);
        assert_eq!(policy.apply(0.25).unwrap(), 0.25);
    }

    #[test]
    fn test_non_finite_always_rejected() {
        for policy in [DutyPolicy::Reject, DutyPolicy::Clamp] {
            assert!(policy.apply(f64::NAN).is_err());
            assert!(policy.apply(f64::INFINITY).is_err());
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_serde_json() {
        let config = MotorConfig {
            inverted: false,
            duty_policy: DutyPolicy::Clamp,
            ..MotorConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: MotorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    proptest! {
        #[test]
        fn prop_in_range_passes_unchanged(duty in -1.0f64..=1.0) {
            prop_assert_eq!(DutyPolicy::Reject.apply(duty).unwrap(), duty);
            prop_assert_eq!(DutyPolicy::Clamp.apply(duty).unwrap(), duty);
        }

        #[test]
        fn prop_clamp_stays_in_range(duty in -1e6f64..1e6) {
            let out = DutyPolicy::Clamp.apply(duty).unwrap();
            prop_assert!((-1.0..=1.0).contains(&out));
        }
    }
}
