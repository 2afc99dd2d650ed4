//! 电机控制器门面
//!
//! # 状态机
//!
//! ```text
//! Constructed --initialize()--> Initialized
//! ```
//!
//! `initialize()` 的顺序是固定的：
//!
//! 1. 发送唤醒帧（在任何厂商配置调用之前）
//! 2. 沉降等待
//! 3. 恢复出厂配置
//! 4. 输出反转
//! 5. 反馈传感器与相位
//! 6. 增益 kP、kD、kF
//!
//! 第一个失败的步骤中止初始化并返回，状态保持 `Constructed`。
//! 重复调用会重新发送唤醒帧并重新等待。
//!
//! 无法下发厂商配置的后端（如 [`RawSrx`](crate::RawSrx)）只调用 [`MotorController::wake`]
//! 完成第 1、2 步，然后直接执行。

use crate::config::MotorConfig;
use crate::device::{GainKind, MotorDevice, VendorOp, VendorResult};
use crate::error::DriverError;
use crate::wait::SettleWait;
use crate::watchdog::EnableWatchdog;
use srx_can::FrameSender;
use srx_protocol::{DeviceId, SrxFrame};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// 控制器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Constructed,
    Initialized,
}

/// 单个执行器的门面
///
/// 独占一个设备句柄，生命周期与句柄一致；不支持重新绑定到其他设备 ID。
pub struct MotorController<D: MotorDevice> {
    device: D,
    config: MotorConfig,
    sender: Box<dyn FrameSender + Send>,
    settle: Box<dyn SettleWait + Send>,
    watchdog: Arc<EnableWatchdog>,
    state: ControllerState,
}

impl<D: MotorDevice> MotorController<D> {
    pub(crate) fn from_parts(
        device: D,
        config: MotorConfig,
        sender: Box<dyn FrameSender + Send>,
        settle: Box<dyn SettleWait + Send>,
        watchdog: Arc<EnableWatchdog>,
    ) -> Self {
        debug!("Motor controller bound to device {}", device.device_id());
        Self {
            device,
            config,
            sender,
            settle,
            watchdog,
            state: ControllerState::Constructed,
        }
    }

    pub fn device_id(&self) -> DeviceId {
        self.device.device_id()
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn config(&self) -> &MotorConfig {
        &self.config
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    /// 直接访问设备（如 `RawSrx::set_position_revolutions`）
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn watchdog(&self) -> &Arc<EnableWatchdog> {
        &self.watchdog
    }

    /// 一次性初始化
    pub fn initialize(&mut self) -> Result<(), DriverError> {
        info!("Initializing motor controller for device {}", self.device_id());

        self.wake()?;

        let timeout = self.config.command_timeout;
        let gains = self.config.gains;

        let result = self.device.config_factory_default(timeout);
        self.check(VendorOp::ConfigFactoryDefault, result)?;

        let result = self.device.set_inverted(self.config.inverted);
        self.check(VendorOp::SetInverted, result)?;

        let result = self.device.config_selected_feedback_sensor(
            self.config.feedback_device,
            self.config.pid_idx,
            timeout,
        );
        self.check(VendorOp::ConfigSelectedFeedbackSensor, result)?;

        let result = self.device.set_sensor_phase(self.config.sensor_phase);
        self.check(VendorOp::SetSensorPhase, result)?;

        for (kind, value) in [
            (GainKind::P, gains.kp),
            (GainKind::D, gains.kd),
            (GainKind::F, gains.kf),
        ] {
            let result = self.device.config_gain(gains.slot, kind, value, timeout);
            self.check(VendorOp::ConfigGain(kind), result)?;
        }

        self.state = ControllerState::Initialized;
        info!("Motor controller for device {} initialized", self.device_id());
        Ok(())
    }

    /// 发送唤醒帧并等待沉降，不做任何厂商配置，也不改变状态
    pub fn wake(&mut self) -> Result<(), DriverError> {
        self.send_kick()?;
        debug!("Waiting {:?} for bus peripherals to settle", self.config.settle_delay);
        self.settle.wait(self.config.settle_delay);
        Ok(())
    }

    /// 百分比输出；不喂看门狗
    pub fn set_speed(&mut self, duty_cycle: f64) -> Result<(), DriverError> {
        if self.state == ControllerState::Constructed {
            warn!(
                "set_speed on device {} before initialize(); device runs its default configuration",
                self.device_id()
            );
        }
        let duty = self.config.duty_policy.apply(duty_cycle)?;
        let result = self.device.set_percent_output(duty);
        self.check(VendorOp::SetPercentOutput, result)
    }

    /// 设置速度后喂看门狗 `duration_ms` 毫秒
    ///
    /// 调用方需要以小于 `duration_ms` 的间隔周期调用以保持运动；
    /// 看门狗过期后由 SDK 层切断输出，本层不检测。
    pub fn run(&mut self, speed: f64, duration_ms: u32) -> Result<(), DriverError> {
        self.set_speed(speed)?;

        let duration = Duration::from_millis(u64::from(duration_ms));
        match self.watchdog.feed(duration) {
            Ok(_) => Ok(()),
            Err(source) => {
                error!("feed_enable({:?}) failed: {}", duration, source);
                Err(DriverError::Vendor {
                    op: VendorOp::FeedEnable,
                    device: self.device_id(),
                    source,
                })
            },
        }
    }

    /// 以 `period` 为周期重复 `run(speed, feed_ms)`，持续 `duration`
    ///
    /// 调用次数为 `ceil(duration / period)`，每次调用后等待周期的剩余部分；
    /// `duration` 为零时不调用。第一个失败的 `run` 终止循环。返回成功调用的次数。
    pub fn run_for(
        &mut self,
        speed: f64,
        feed_ms: u32,
        duration: Duration,
        period: Duration,
    ) -> Result<u64, DriverError> {
        if period.is_zero() {
            return Err(DriverError::InvalidInput("run period must be non-zero".to_string()));
        }
        if Duration::from_millis(u64::from(feed_ms)) < period {
            warn!(
                "Feed of {} ms is shorter than the {:?} period; output will drop between calls",
                feed_ms, period
            );
        }

        let calls = u64::try_from(duration.as_nanos().div_ceil(period.as_nanos())).unwrap_or(u64::MAX);
        debug!(
            "Running device {} at {} for {:?} ({} calls every {:?})",
            self.device_id(),
            speed,
            duration,
            calls,
            period
        );
        for _ in 0..calls {
            let started = Instant::now();
            self.run(speed, feed_ms)?;
            self.settle.wait(period.saturating_sub(started.elapsed()));
        }
        Ok(calls)
    }

    fn send_kick(&self) -> Result<(), DriverError> {
        let kick = &self.config.kick;
        let frame = SrxFrame::with_dlc(kick.id, &kick.payload, kick.dlc)?;
        self.sender.send_frame(&kick.interface, &frame)?;
        debug!("Kick frame 0x{:X} sent on '{}'", kick.id, kick.interface);
        Ok(())
    }

    fn check(&self, op: VendorOp, result: VendorResult) -> Result<(), DriverError> {
        result.map_err(|source| {
            error!("{} failed on device {}: {}", op, self.device_id(), source);
            DriverError::Vendor {
                op,
                device: self.device_id(),
                source,
            }
        })
    }
}

impl<D: MotorDevice + std::fmt::Debug> std::fmt::Debug for MotorController<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MotorController")
            .field("device", &self.device)
            .field("state", &self.state)
            .field("watchdog", &self.watchdog)
            .finish_non_exhaustive()
    }
}
