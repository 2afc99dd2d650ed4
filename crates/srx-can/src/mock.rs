//! Mock CAN 层
//!
//! - [`MockSocketProvider`]: 可在任一步骤注入失败、并统计 open/close 次数的 socket
//! - [`MockCanAdapter`]: 记录发送帧的持久适配器

use crate::oneshot::{CAN_FRAME_WIRE_SIZE, FrameSocket, SocketProvider};
use crate::{CanAdapter, CanDeviceError, CanDeviceErrorKind, CanError, SrxFrame};
use parking_lot::Mutex;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// 注入失败的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Open,
    Resolve,
    Bind,
    Write,
    /// 写入字节数少于完整帧
    ShortWrite,
}

#[derive(Debug, Default)]
struct ProviderState {
    opened: AtomicUsize,
    closed: AtomicUsize,
    fail_at: Mutex<Option<FailAt>>,
    interfaces: Mutex<Vec<(String, u32)>>,
    /// (ifindex, frame)
    sent: Mutex<Vec<(u32, SrxFrame)>>,
}

/// 模拟 socket 来源
#[derive(Debug, Clone, Default)]
pub struct MockSocketProvider {
    state: Arc<ProviderState>,
}

impl MockSocketProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册一个可解析的接口
    pub fn with_interface(name: &str, ifindex: u32) -> Self {
        let provider = Self::new();
        provider.add_interface(name, ifindex);
        provider
    }

    pub fn add_interface(&self, name: &str, ifindex: u32) {
        self.state.interfaces.lock().push((name.to_string(), ifindex));
    }

    pub fn fail_at(&self, fail: FailAt) {
        *self.state.fail_at.lock() = Some(fail);
    }

    pub fn opened(&self) -> usize {
        self.state.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.state.closed.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<(u32, SrxFrame)> {
        self.state.sent.lock().clone()
    }

    fn failing(&self, at: FailAt) -> bool {
        *self.state.fail_at.lock() == Some(at)
    }
}

impl SocketProvider for MockSocketProvider {
    type Socket = MockSocket;

    fn open(&self) -> Result<MockSocket, CanError> {
        if self.failing(FailAt::Open) {
            return Err(CanError::Io(io::Error::new(
                io::ErrorKind::Unsupported,
                "Address family not supported by protocol",
            )));
        }
        self.state.opened.fetch_add(1, Ordering::SeqCst);
        Ok(MockSocket {
            provider: self.clone(),
            ifindex: None,
        })
    }
}

/// 模拟 socket，Drop 时计入 `closed`
#[derive(Debug)]
pub struct MockSocket {
    provider: MockSocketProvider,
    ifindex: Option<u32>,
}

impl FrameSocket for MockSocket {
    fn resolve_interface(&mut self, interface: &str) -> Result<u32, CanError> {
        let found = self
            .provider
            .state
            .interfaces
            .lock()
            .iter()
            .find(|(name, _)| name == interface)
            .map(|(_, index)| *index);

        match found {
            Some(index) if !self.provider.failing(FailAt::Resolve) => Ok(index),
            _ => Err(CanDeviceError::new(
                CanDeviceErrorKind::NotFound,
                format!("CAN interface '{}' does not exist", interface),
            )
            .into()),
        }
    }

    fn bind(&mut self, ifindex: u32) -> Result<(), CanError> {
        if self.provider.failing(FailAt::Bind) {
            return Err(CanError::Io(io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                "Cannot assign requested address",
            )));
        }
        self.ifindex = Some(ifindex);
        Ok(())
    }

    fn write_frame(&mut self, frame: &SrxFrame) -> Result<usize, CanError> {
        if self.provider.failing(FailAt::Write) {
            return Err(CanError::Io(io::Error::new(
                io::ErrorKind::WouldBlock,
                "No buffer space available",
            )));
        }
        let Some(ifindex) = self.ifindex else {
            return Err(CanError::NotStarted);
        };
        if self.provider.failing(FailAt::ShortWrite) {
            return Ok(CAN_FRAME_WIRE_SIZE / 2);
        }
        self.provider.state.sent.lock().push((ifindex, *frame));
        Ok(CAN_FRAME_WIRE_SIZE)
    }
}

impl Drop for MockSocket {
    fn drop(&mut self) {
        self.provider.state.closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// 记录发送帧的适配器
#[derive(Debug, Clone, Default)]
pub struct MockCanAdapter {
    sent: Arc<Mutex<Vec<SrxFrame>>>,
    fail: Arc<Mutex<bool>>,
}

impl MockCanAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 之后的发送全部失败
    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock() = fail;
    }

    pub fn sent(&self) -> Vec<SrxFrame> {
        self.sent.lock().clone()
    }
}

impl CanAdapter for MockCanAdapter {
    fn send(&mut self, frame: SrxFrame) -> Result<(), CanError> {
        if *self.fail.lock() {
            return Err(CanError::Io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "Network is down",
            )));
        }
        frame.validate()?;
        self.sent.lock().push(frame);
        Ok(())
    }
}
