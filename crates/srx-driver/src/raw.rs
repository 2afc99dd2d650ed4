//! 直接走总线的 Talon SRX 后端（不依赖厂商 SDK）
//!
//! 只有执行类调用会产生总线流量：
//!
//! - `set_position_revolutions` -> demand 帧（模式 0x01，编码器 tick）
//! - `set_percent_output` -> demand 帧（模式 0x00，±1023，**未经硬件验证**，
//!   由位置帧布局外推而来）
//! - [`BusEnableFeeder`] -> 每个已注册设备的控制/使能帧
//!
//! 厂商配置（出厂复位、反馈传感器、传感器相位、增益）无法通过这些帧下发，
//! 一律返回 [`VendorError::Unsupported`]，因此 `MotorController::initialize()`
//! 在该后端上会在出厂复位一步失败。反转只影响下发的 demand，保存在主机侧。

use crate::device::{EnableFeeder, FeedbackDevice, GainKind, MotorDevice, VendorResult};
use crate::error::VendorError;
use parking_lot::Mutex;
use srx_can::CanAdapter;
use srx_protocol::{
    DemandMode, DeviceId, demand_frame, enable_control_frame, percent_to_demand,
    revolutions_to_ticks,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// 直接在总线上驱动的 Talon SRX
pub struct RawSrx<A> {
    bus: Arc<Mutex<A>>,
    device_id: DeviceId,
    inverted: bool,
}

impl<A: CanAdapter> RawSrx<A> {
    pub fn new(bus: Arc<Mutex<A>>, device_id: DeviceId) -> Self {
        Self {
            bus,
            device_id,
            inverted: false,
        }
    }

    pub fn inverted(&self) -> bool {
        self.inverted
    }

    /// 位置闭环：转到 `revolutions` 圈（4096 tick/圈）
    ///
    /// 闭环使用设备上已有的传感器与增益配置。
    pub fn set_position_revolutions(&mut self, revolutions: f64) -> VendorResult {
        let ticks = revolutions_to_ticks(revolutions);
        debug!(
            "Device {}: position command {} rev -> {} ticks",
            self.device_id, revolutions, ticks
        );
        self.send_demand(DemandMode::Position, ticks)
    }

    fn send_demand(&mut self, mode: DemandMode, demand: i32) -> VendorResult {
        let frame = demand_frame(self.device_id, mode, demand);
        self.bus.lock().send(frame)?;
        trace!("Device {}: demand {:?} {}", self.device_id, mode, demand);
        Ok(())
    }

    fn unsupported(&self, what: &'static str) -> VendorResult {
        warn!("Device {}: {} cannot be applied over the raw bus", self.device_id, what);
        Err(VendorError::Unsupported(what))
    }
}

impl<A: CanAdapter> MotorDevice for RawSrx<A> {
    fn device_id(&self) -> DeviceId {
        self.device_id
    }

    fn config_factory_default(&mut self, _timeout: Duration) -> VendorResult {
        self.unsupported("factory default")
    }

    fn set_inverted(&mut self, inverted: bool) -> VendorResult {
        self.inverted = inverted;
        Ok(())
    }

    fn config_selected_feedback_sensor(
        &mut self,
        _sensor: FeedbackDevice,
        _pid_idx: u8,
        _timeout: Duration,
    ) -> VendorResult {
        self.unsupported("feedback sensor selection")
    }

    fn set_sensor_phase(&mut self, _phase: bool) -> VendorResult {
        self.unsupported("sensor phase")
    }

    fn config_gain(&mut self, _slot: u8, _kind: GainKind, _value: f64, _timeout: Duration) -> VendorResult {
        self.unsupported("closed-loop gains")
    }

    fn set_percent_output(&mut self, duty: f64) -> VendorResult {
        let duty = if self.inverted { -duty } else { duty };
        self.send_demand(DemandMode::PercentOutput, percent_to_demand(duty))
    }
}

impl<A> std::fmt::Debug for RawSrx<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawSrx")
            .field("device_id", &self.device_id)
            .field("inverted", &self.inverted)
            .finish_non_exhaustive()
    }
}

/// 通过控制/使能帧喂狗
///
/// 每次喂狗为每个已注册设备各发一个使能帧。`MotorControllerBuilder::build`
/// 会自动注册控制器的设备，所以共享同一看门狗的控制器都会被使能。
/// 使能帧本身不携带时长，时长由 [`EnableWatchdog`](crate::EnableWatchdog) 在主机侧跟踪。
pub struct BusEnableFeeder<A> {
    bus: Arc<Mutex<A>>,
    devices: Mutex<Vec<DeviceId>>,
}

impl<A: CanAdapter> BusEnableFeeder<A> {
    pub fn new(bus: Arc<Mutex<A>>) -> Self {
        Self {
            bus,
            devices: Mutex::new(Vec::new()),
        }
    }

    /// 已注册的设备（按注册顺序）
    pub fn devices(&self) -> Vec<DeviceId> {
        self.devices.lock().clone()
    }
}

impl<A: CanAdapter + Send> EnableFeeder for BusEnableFeeder<A> {
    fn feed_enable(&self, _duration: Duration) -> VendorResult {
        let devices = self.devices.lock().clone();
        if devices.is_empty() {
            warn!("Enable feed with no registered device; nothing sent");
        }
        let mut bus = self.bus.lock();
        for device in devices {
            bus.send(enable_control_frame(device))?;
        }
        Ok(())
    }

    fn register(&self, device: DeviceId) {
        let mut devices = self.devices.lock();
        if !devices.contains(&device) {
            devices.push(device);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use srx_can::mock::MockCanAdapter;

    fn setup() -> (MockCanAdapter, RawSrx<MockCanAdapter>) {
        let adapter = MockCanAdapter::new();
        let bus = Arc::new(Mutex::new(adapter.clone()));
        (adapter, RawSrx::new(bus, DeviceId::new(2).unwrap()))
    }

    fn demand(data: [u8; 8]) -> i32 {
        i32::from_le_bytes([data[1], data[2], data[3], data[4]])
    }

    #[test]
    fn test_percent_output_frame() {
        let (adapter, mut srx) = setup();
        srx.set_percent_output(0.5).unwrap();

        let sent = adapter.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].id, 0x0402_0000);
        assert!(sent[0].is_extended);
        assert_eq!(sent[0].data[0], 0x00);
        assert_eq!(demand(sent[0].data), 512);
    }

    #[test]
    fn test_inversion_applied_to_demand() {
        let (adapter, mut srx) = setup();
        srx.set_inverted(true).unwrap();
        srx.set_percent_output(1.0).unwrap();

        assert!(srx.inverted());
        assert_eq!(demand(adapter.sent()[0].data), -1023);
    }

    #[test]
    fn test_position_command() {
        let (adapter, mut srx) = setup();
        srx.set_position_revolutions(2.0).unwrap();

        let data = adapter.sent()[0].data;
        assert_eq!(data[0], 0x01);
        assert_eq!(demand(data), 8192);
    }

    #[test]
    fn test_vendor_configuration_is_unsupported() {
        let (adapter, mut srx) = setup();
        let timeout = Duration::from_millis(100);

        let results = [
            srx.config_factory_default(timeout),
            srx.config_selected_feedback_sensor(FeedbackDevice::QuadEncoder, 0, timeout),
            srx.set_sensor_phase(true),
            srx.config_gain(0, GainKind::P, 10.0, timeout),
        ];

        for result in results {
            assert!(matches!(result, Err(VendorError::Unsupported(_))));
        }
        assert!(adapter.sent().is_empty());
    }

    #[test]
    fn test_bus_failure_surfaces_as_vendor_error() {
        let (adapter, mut srx) = setup();
        adapter.set_failing(true);
        let err = srx.set_percent_output(0.1).unwrap_err();
        assert!(matches!(err, VendorError::Bus(_)));
    }

    #[test]
    fn test_bus_enable_feeder_sends_control_frame() {
        let adapter = MockCanAdapter::new();
        let bus = Arc::new(Mutex::new(adapter.clone()));
        let feeder = BusEnableFeeder::new(bus);
        feeder.register(DeviceId::new(2).unwrap());

        feeder.feed_enable(Duration::from_millis(100)).unwrap();

        let sent = adapter.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].id, 0x0206_0000);
        assert_eq!(sent[0].data, [0x0F, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_bus_enable_feeder_enables_every_registered_device() {
        let adapter = MockCanAdapter::new();
        let feeder = BusEnableFeeder::new(Arc::new(Mutex::new(adapter.clone())));
        feeder.register(DeviceId::new(1).unwrap());
        feeder.register(DeviceId::new(2).unwrap());
        feeder.register(DeviceId::new(1).unwrap());

        feeder.feed_enable(Duration::from_millis(100)).unwrap();

        let ids: Vec<u32> = adapter.sent().iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![0x0205_0000, 0x0206_0000]);
        assert_eq!(feeder.devices().len(), 2);
    }

    #[test]
    fn test_bus_enable_feeder_without_devices_sends_nothing() {
        let adapter = MockCanAdapter::new();
        let feeder = BusEnableFeeder::new(Arc::new(Mutex::new(adapter.clone())));

        feeder.feed_enable(Duration::from_millis(100)).unwrap();

        assert!(adapter.sent().is_empty());
    }
}
