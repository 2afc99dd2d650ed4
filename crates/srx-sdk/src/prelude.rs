//! Prelude - 常用类型的便捷导入
//!
//! ```rust
//! use srx_sdk::prelude::*;
//! ```

// 驱动层
pub use crate::driver::{
    ControllerState, Direction, DistanceMove, DutyPolicy, EnableFeeder, EnableWatchdog,
    FeedbackDevice, GainKind, MotionModel, MotorConfig, MotorController, MotorControllerBuilder,
    MotorDevice, NoWait, SettleWait, ThreadSleep,
};

// CAN 层（常用 Trait）
pub use crate::can::{CanAdapter, FrameSender, SrxFrame};

// 协议层
pub use crate::protocol::DeviceId;

// 错误类型
pub use crate::can::CanError;
pub use crate::driver::{DriverError, VendorError};
pub use crate::protocol::ProtocolError;
