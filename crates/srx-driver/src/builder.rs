//! Builder 模式实现
//!
//! 提供链式构造 `MotorController` 的便捷方式。

use crate::config::MotorConfig;
use crate::controller::MotorController;
use crate::device::MotorDevice;
use crate::error::DriverError;
use crate::wait::{SettleWait, ThreadSleep};
use crate::watchdog::EnableWatchdog;
use srx_can::FrameSender;
use std::sync::Arc;

/// MotorController Builder（链式构造）
///
/// 未显式设置时：
/// - 配置：[`MotorConfig::default()`]
/// - 唤醒帧发送器：Linux 上为 [`OneShotSender::new()`](srx_can::OneShotSender)，其他平台必须显式设置
/// - 沉降等待：[`ThreadSleep`]
/// - 看门狗：必须显式设置（决定哪些控制器共享同一个使能看门狗）；
///   `build` 会把设备注册到看门狗
///
/// # Example
///
/// ```no_run
/// use srx_driver::{BusEnableFeeder, EnableWatchdog, MotorControllerBuilder, RawSrx};
/// use srx_can::SocketCanAdapter;
/// use srx_protocol::DeviceId;
/// use parking_lot::Mutex;
/// use std::sync::Arc;
///
/// let device_id = DeviceId::new(5).unwrap();
/// let bus = Arc::new(Mutex::new(SocketCanAdapter::new("can0").unwrap()));
/// let watchdog = EnableWatchdog::shared(BusEnableFeeder::new(bus.clone()));
///
/// let mut motor = MotorControllerBuilder::new()
///     .watchdog(watchdog)
///     .build(RawSrx::new(bus, device_id))
///     .unwrap();
/// // 直接总线后端无法下发厂商配置：只唤醒，不 initialize()
/// motor.wake().unwrap();
/// motor.run(0.5, 100).unwrap();
/// ```
#[derive(Default)]
pub struct MotorControllerBuilder {
    config: Option<MotorConfig>,
    sender: Option<Box<dyn FrameSender + Send>>,
    settle: Option<Box<dyn SettleWait + Send>>,
    watchdog: Option<Arc<EnableWatchdog>>,
}

impl MotorControllerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 替换整个配置
    pub fn config(mut self, config: MotorConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// 唤醒帧发送器
    pub fn frame_sender(mut self, sender: impl FrameSender + Send + 'static) -> Self {
        self.sender = Some(Box::new(sender));
        self
    }

    /// 沉降等待策略（测试中使用 [`NoWait`](crate::NoWait)）
    pub fn settle_wait(mut self, settle: impl SettleWait + Send + 'static) -> Self {
        self.settle = Some(Box::new(settle));
        self
    }

    /// 使能看门狗
    pub fn watchdog(mut self, watchdog: Arc<EnableWatchdog>) -> Self {
        self.watchdog = Some(watchdog);
        self
    }

    /// 绑定设备并构造控制器
    pub fn build<D: MotorDevice>(self, device: D) -> Result<MotorController<D>, DriverError> {
        let watchdog = self.watchdog.ok_or_else(|| {
            DriverError::InvalidInput("enable watchdog not set".to_string())
        })?;
        let sender = match self.sender {
            Some(sender) => sender,
            None => default_sender()?,
        };
        let settle = self.settle.unwrap_or_else(|| Box::new(ThreadSleep));
        watchdog.register(device.device_id());

        Ok(MotorController::from_parts(
            device,
            self.config.unwrap_or_default(),
            sender,
            settle,
            watchdog,
        ))
    }
}

#[cfg(target_os = "linux")]
fn default_sender() -> Result<Box<dyn FrameSender + Send>, DriverError> {
    Ok(Box::new(srx_can::OneShotSender::new()))
}

#[cfg(not(target_os = "linux"))]
fn default_sender() -> Result<Box<dyn FrameSender + Send>, DriverError> {
    Err(DriverError::InvalidInput(
        "frame sender must be set explicitly on this platform".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::ControllerState;
    use crate::mock::{EventLog, MockEnableFeeder, MockFrameSender, MockMotorDevice};
    use crate::wait::NoWait;
    use srx_protocol::DeviceId;
    use std::time::Duration;

    fn device(log: &EventLog) -> MockMotorDevice {
        MockMotorDevice::new(DeviceId::new(3).unwrap(), log.clone())
    }

    #[test]
    fn test_build_requires_watchdog() {
        let log = EventLog::new();
        let err = MotorControllerBuilder::new()
            .frame_sender(MockFrameSender::new(log.clone()))
            .build(device(&log))
            .unwrap_err();
        assert!(matches!(err, DriverError::InvalidInput(msg) if msg.contains("watchdog")));
    }

    #[test]
    fn test_build_defaults() {
        let log = EventLog::new();
        let ctrl = MotorControllerBuilder::new()
            .frame_sender(MockFrameSender::new(log.clone()))
            .settle_wait(NoWait)
            .watchdog(EnableWatchdog::shared(MockEnableFeeder::new(log.clone())))
            .build(device(&log))
            .unwrap();

        assert_eq!(ctrl.device_id().get(), 3);
        assert_eq!(ctrl.state(), ControllerState::Constructed);
        assert_eq!(ctrl.config(), &MotorConfig::default());
    }

    #[test]
    fn test_build_with_custom_config() {
        let log = EventLog::new();
        let config = MotorConfig {
            settle_delay: Duration::from_millis(10),
            inverted: false,
            ..MotorConfig::default()
        };
        let ctrl = MotorControllerBuilder::new()
            .config(config.clone())
            .frame_sender(MockFrameSender::new(log.clone()))
            .watchdog(EnableWatchdog::shared(MockEnableFeeder::new(log.clone())))
            .build(device(&log))
            .unwrap();

        assert_eq!(ctrl.config(), &config);
    }
}
