//! Mock 设备与记录型替身
//!
//! 所有替身向同一个 [`EventLog`] 追加事件，测试通过事件顺序断言调用顺序。

use crate::device::{
    EnableFeeder, FeedbackDevice, GainKind, MotorDevice, VendorOp, VendorResult,
};
use crate::error::VendorError;
use crate::wait::SettleWait;
use parking_lot::Mutex;
use srx_can::{CanDeviceError, CanDeviceErrorKind, CanError, FrameSender, SrxFrame};
use srx_protocol::DeviceId;
use std::sync::Arc;
use std::time::Duration;

/// 记录到的一次调用
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Frame { interface: String, frame: SrxFrame },
    Wait(Duration),
    FactoryDefault { timeout: Duration },
    SetInverted(bool),
    SelectFeedbackSensor {
        sensor: FeedbackDevice,
        pid_idx: u8,
        timeout: Duration,
    },
    SetSensorPhase(bool),
    ConfigGain {
        slot: u8,
        kind: GainKind,
        value: f64,
        timeout: Duration,
    },
    SetPercentOutput(f64),
    FeedEnable(Duration),
}

/// 共享事件日志
#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<Event>>>);

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: Event) {
        self.0.lock().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().clone()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }

    /// 第一个满足条件的事件下标
    pub fn position(&self, pred: impl Fn(&Event) -> bool) -> Option<usize> {
        self.0.lock().iter().position(pred)
    }
}

/// 模拟电机控制器
#[derive(Debug)]
pub struct MockMotorDevice {
    device_id: DeviceId,
    log: EventLog,
    failure: Arc<Mutex<Option<(VendorOp, VendorError)>>>,
}

impl MockMotorDevice {
    pub fn new(device_id: DeviceId, log: EventLog) -> Self {
        Self {
            device_id,
            log,
            failure: Arc::new(Mutex::new(None)),
        }
    }

    /// 下一次 `op` 调用返回 `error`（只触发一次）
    pub fn fail_on(&self, op: VendorOp, error: VendorError) {
        *self.failure.lock() = Some((op, error));
    }

    fn call(&self, op: VendorOp, event: Event) -> VendorResult {
        let mut failure = self.failure.lock();
        if failure.as_ref().is_some_and(|(failing, _)| *failing == op) {
            if let Some((_, error)) = failure.take() {
                return Err(error);
            }
        }
        self.log.push(event);
        Ok(())
    }
}

impl MotorDevice for MockMotorDevice {
    fn device_id(&self) -> DeviceId {
        self.device_id
    }

    fn config_factory_default(&mut self, timeout: Duration) -> VendorResult {
        self.call(VendorOp::ConfigFactoryDefault, Event::FactoryDefault { timeout })
    }

    fn set_inverted(&mut self, inverted: bool) -> VendorResult {
        self.call(VendorOp::SetInverted, Event::SetInverted(inverted))
    }

    fn config_selected_feedback_sensor(
        &mut self,
        sensor: FeedbackDevice,
        pid_idx: u8,
        timeout: Duration,
    ) -> VendorResult {
        self.call(
            VendorOp::ConfigSelectedFeedbackSensor,
            Event::SelectFeedbackSensor {
                sensor,
                pid_idx,
                timeout,
            },
        )
    }

    fn set_sensor_phase(&mut self, phase: bool) -> VendorResult {
        self.call(VendorOp::SetSensorPhase, Event::SetSensorPhase(phase))
    }

    fn config_gain(&mut self, slot: u8, kind: GainKind, value: f64, timeout: Duration) -> VendorResult {
        self.call(
            VendorOp::ConfigGain(kind),
            Event::ConfigGain {
                slot,
                kind,
                value,
                timeout,
            },
        )
    }

    fn set_percent_output(&mut self, duty: f64) -> VendorResult {
        self.call(VendorOp::SetPercentOutput, Event::SetPercentOutput(duty))
    }
}

/// 记录型唤醒帧发送器
#[derive(Debug, Clone)]
pub struct MockFrameSender {
    log: EventLog,
    fail: bool,
}

impl MockFrameSender {
    pub fn new(log: EventLog) -> Self {
        Self { log, fail: false }
    }

    /// 每次发送都报告接口不存在
    pub fn failing(log: EventLog) -> Self {
        Self { log, fail: true }
    }
}

impl FrameSender for MockFrameSender {
    fn send_frame(&self, interface: &str, frame: &SrxFrame) -> Result<(), CanError> {
        if self.fail {
            return Err(CanDeviceError::new(
                CanDeviceErrorKind::NotFound,
                format!("CAN interface '{}' does not exist", interface),
            )
            .into());
        }
        self.log.push(Event::Frame {
            interface: interface.to_string(),
            frame: *frame,
        });
        Ok(())
    }
}

/// 记录型喂狗原语
#[derive(Debug, Clone)]
pub struct MockEnableFeeder {
    log: EventLog,
    fail: bool,
}

impl MockEnableFeeder {
    pub fn new(log: EventLog) -> Self {
        Self { log, fail: false }
    }

    pub fn failing(log: EventLog) -> Self {
        Self { log, fail: true }
    }
}

impl EnableFeeder for MockEnableFeeder {
    fn feed_enable(&self, duration: Duration) -> VendorResult {
        if self.fail {
            return Err(VendorError::Code(-1));
        }
        self.log.push(Event::FeedEnable(duration));
        Ok(())
    }
}

/// 只记录、不睡眠
#[derive(Debug, Clone)]
pub struct RecordingWait {
    log: EventLog,
}

impl RecordingWait {
    pub fn new(log: EventLog) -> Self {
        Self { log }
    }
}

impl SettleWait for RecordingWait {
    fn wait(&self, duration: Duration) {
        self.log.push(Event::Wait(duration));
    }
}
