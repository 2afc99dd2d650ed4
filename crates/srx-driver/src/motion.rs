//! 开环按距离移动
//!
//! 没有位置反馈时，用标定得到的线性模型（位移 = 斜率 × 时间 + 截距）
//! 把目标距离换算为运行时长，再以固定周期调用 `run()`。
//!
//! ```text
//! distance_mm ──MotionModel──> 时长 ──run_for()──> run(±duty, feed_ms) × N
//! ```

use crate::controller::MotorController;
use crate::device::MotorDevice;
use crate::error::DriverError;
use std::fmt;
use std::time::Duration;
use tracing::{info, warn};

/// 运动方向（左为负占空比）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    fn apply(self, duty: f64) -> f64 {
        match self {
            Direction::Left => -duty.abs(),
            Direction::Right => duty.abs(),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Left => f.write_str("left"),
            Direction::Right => f.write_str("right"),
        }
    }
}

/// 单方向的线性标定结果
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinearFit {
    /// mm/s
    pub slope: f64,
    /// mm
    pub intercept: f64,
}

impl LinearFit {
    pub fn position_at(&self, seconds: f64) -> f64 {
        self.slope * seconds + self.intercept
    }

    /// 走完 `distance_mm` 需要的秒数（可能为负，表示模型认为无需运动）
    pub fn time_to_travel(&self, distance_mm: f64) -> Result<f64, DriverError> {
        if self.slope == 0.0 {
            return Err(DriverError::InvalidInput(
                "motion model slope is zero; cannot compute time".to_string(),
            ));
        }
        Ok((distance_mm - self.intercept) / self.slope)
    }
}

/// 左右两个方向的运动模型
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotionModel {
    pub left: LinearFit,
    pub right: LinearFit,
}

impl Default for MotionModel {
    /// 台架标定值
    fn default() -> Self {
        Self {
            left: LinearFit {
                slope: 2.523876556578235,
                intercept: 12.749577693557118,
            },
            right: LinearFit {
                slope: -0.9399657947686118,
                intercept: 35.807557344064385,
            },
        }
    }
}

impl MotionModel {
    pub fn fit(&self, direction: Direction) -> &LinearFit {
        match direction {
            Direction::Left => &self.left,
            Direction::Right => &self.right,
        }
    }

    pub fn estimate_position(&self, direction: Direction, seconds: f64) -> f64 {
        self.fit(direction).position_at(seconds)
    }

    pub fn estimate_time_to_travel(
        &self,
        direction: Direction,
        distance_mm: f64,
    ) -> Result<f64, DriverError> {
        self.fit(direction).time_to_travel(distance_mm)
    }
}

/// 按距离移动时的执行参数
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DistanceMove {
    /// 占空比幅值，符号由方向决定
    pub duty: f64,
    /// 每次 `run()` 的喂狗时长
    pub feed_ms: u32,
    /// `run()` 调用周期
    pub period: Duration,
}

impl Default for DistanceMove {
    fn default() -> Self {
        Self {
            duty: 1.0,
            feed_ms: 50,
            period: Duration::from_millis(50),
        }
    }
}

impl<D: MotorDevice> MotorController<D> {
    /// 按模型估算的时长朝 `direction` 移动约 `distance_mm`
    ///
    /// 模型给出负时长时不运动。返回 `run()` 的调用次数。
    pub fn move_distance(
        &mut self,
        model: &MotionModel,
        direction: Direction,
        distance_mm: f64,
        params: &DistanceMove,
    ) -> Result<u64, DriverError> {
        let seconds = model.estimate_time_to_travel(direction, distance_mm)?;
        if !seconds.is_finite() {
            return Err(DriverError::InvalidInput(format!(
                "cannot move {} mm {}: estimated time {}",
                distance_mm, direction, seconds
            )));
        }
        if seconds < 0.0 {
            warn!(
                "Model predicts {:.2}s to move {} mm {}; not moving",
                seconds, distance_mm, direction
            );
        }
        let duration = Duration::try_from_secs_f64(seconds.max(0.0))
            .map_err(|e| DriverError::InvalidInput(format!("move duration: {}", e)))?;

        info!(
            "Moving {} for {:.2}s to cover ~{} mm",
            direction,
            duration.as_secs_f64(),
            distance_mm
        );
        self.run_for(
            direction.apply(params.duty),
            params.feed_ms,
            duration,
            params.period,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::MotorControllerBuilder;
    use crate::mock::{Event, EventLog, MockEnableFeeder, MockFrameSender, MockMotorDevice, RecordingWait};
    use crate::watchdog::EnableWatchdog;
    use srx_protocol::DeviceId;

    fn controller(log: &EventLog) -> MotorController<MockMotorDevice> {
        MotorControllerBuilder::new()
            .frame_sender(MockFrameSender::new(log.clone()))
            .settle_wait(RecordingWait::new(log.clone()))
            .watchdog(EnableWatchdog::shared(MockEnableFeeder::new(log.clone())))
            .build(MockMotorDevice::new(DeviceId::new(2).unwrap(), log.clone()))
            .unwrap()
    }

    fn duties(log: &EventLog) -> Vec<f64> {
        log.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::SetPercentOutput(d) => Some(d),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_default_model_estimates() {
        let model = MotionModel::default();
        let t = model.estimate_time_to_travel(Direction::Left, 12.749577693557118 + 2.523876556578235).unwrap();
        assert!((t - 1.0).abs() < 1e-9);
        assert!((model.estimate_position(Direction::Right, 0.0) - 35.807557344064385).abs() < 1e-9);
    }

    #[test]
    fn test_zero_slope_rejected() {
        let fit = LinearFit {
            slope: 0.0,
            intercept: 1.0,
        };
        assert!(matches!(fit.time_to_travel(10.0), Err(DriverError::InvalidInput(_))));
    }

    #[test]
    fn test_move_left_uses_negative_duty() {
        let log = EventLog::new();
        let mut ctrl = controller(&log);
        let model = MotionModel {
            left: LinearFit {
                slope: 10.0,
                intercept: 0.0,
            },
            ..MotionModel::default()
        };

        // 5 mm / 10 mm/s = 0.5s，周期 50ms -> 10 次
        let calls = ctrl
            .move_distance(&model, Direction::Left, 5.0, &DistanceMove::default())
            .unwrap();

        assert_eq!(calls, 10);
        assert!(duties(&log).iter().all(|d| *d == -1.0));
    }

    #[test]
    fn test_move_right_uses_positive_duty() {
        let log = EventLog::new();
        let mut ctrl = controller(&log);
        let model = MotionModel {
            right: LinearFit {
                slope: 20.0,
                intercept: 0.0,
            },
            ..MotionModel::default()
        };
        let params = DistanceMove {
            duty: -0.4,
            ..DistanceMove::default()
        };

        let calls = ctrl.move_distance(&model, Direction::Right, 2.0, &params).unwrap();

        assert_eq!(calls, 2);
        assert_eq!(duties(&log), vec![0.4, 0.4]);
    }

    #[test]
    fn test_negative_estimate_does_not_move() {
        let log = EventLog::new();
        let mut ctrl = controller(&log);

        // 默认右向模型斜率为负，正距离得到负时长
        let calls = ctrl
            .move_distance(&MotionModel::default(), Direction::Right, 100.0, &DistanceMove::default())
            .unwrap();

        assert_eq!(calls, 0);
        assert!(log.events().is_empty());
    }
}
