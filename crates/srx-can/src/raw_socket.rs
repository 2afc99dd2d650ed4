//! Linux 原始 CAN socket
//!
//! 直接使用 libc 完成 socket / if_nametoindex / bind / write 四个步骤，
//! 以便每一步的失败都能单独报告。fd 由 `OwnedFd` 持有，Drop 时关闭。

use crate::oneshot::{FrameSocket, SocketProvider};
use crate::{CanDeviceError, CanDeviceErrorKind, CanError, SrxFrame};
use std::ffi::CString;
use std::io;
use std::mem;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
use tracing::trace;

/// ifr_name 为 IFNAMSIZ = 16 字节（含结尾 NUL）
const MAX_IFACE_NAME_LEN: usize = libc::IFNAMSIZ - 1;

/// 打开 `PF_CAN / SOCK_RAW / CAN_RAW` socket
#[derive(Debug, Clone, Copy, Default)]
pub struct RawCanProvider;

impl SocketProvider for RawCanProvider {
    type Socket = RawCanSocket;

    fn open(&self) -> Result<RawCanSocket, CanError> {
        let fd = unsafe { libc::socket(libc::PF_CAN, libc::SOCK_RAW, libc::CAN_RAW) };
        if fd < 0 {
            return Err(CanError::Io(io::Error::last_os_error()));
        }
        // SAFETY: fd 刚由 socket() 返回且未被其他对象持有
        let fd = unsafe { OwnedFd::from_raw_fd(fd) };
        trace!("Opened raw CAN socket fd={}", fd.as_raw_fd());
        Ok(RawCanSocket { fd })
    }
}

#[derive(Debug)]
pub struct RawCanSocket {
    fd: OwnedFd,
}

impl FrameSocket for RawCanSocket {
    fn resolve_interface(&mut self, interface: &str) -> Result<u32, CanError> {
        if interface.len() > MAX_IFACE_NAME_LEN {
            return Err(CanDeviceError::new(
                CanDeviceErrorKind::InvalidName,
                format!(
                    "Interface name '{}' is too long (max {} characters)",
                    interface, MAX_IFACE_NAME_LEN
                ),
            )
            .into());
        }

        let c_iface = CString::new(interface).map_err(|e| {
            CanDeviceError::new(
                CanDeviceErrorKind::InvalidName,
                format!("Invalid interface name: {}", e),
            )
        })?;

        let ifindex = unsafe { libc::if_nametoindex(c_iface.as_ptr()) };
        if ifindex == 0 {
            let errno = io::Error::last_os_error();
            return Err(CanDeviceError::new(
                CanDeviceErrorKind::NotFound,
                format!(
                    "CAN interface '{}' does not exist ({}). Please create it first:\n  sudo ip link add dev {} type can",
                    interface, errno, interface
                ),
            )
            .into());
        }
        Ok(ifindex)
    }

    fn bind(&mut self, ifindex: u32) -> Result<(), CanError> {
        let mut addr: libc::sockaddr_can = unsafe { mem::zeroed() };
        addr.can_family = libc::AF_CAN as libc::sa_family_t;
        addr.can_ifindex = ifindex as libc::c_int;

        let ret = unsafe {
            libc::bind(
                self.fd.as_raw_fd(),
                &addr as *const libc::sockaddr_can as *const libc::sockaddr,
                mem::size_of::<libc::sockaddr_can>() as libc::socklen_t,
            )
        };
        if ret < 0 {
            return Err(CanError::Io(io::Error::last_os_error()));
        }
        Ok(())
    }

    fn write_frame(&mut self, frame: &SrxFrame) -> Result<usize, CanError> {
        let mut raw: libc::can_frame = unsafe { mem::zeroed() };
        raw.can_id = if frame.is_extended {
            frame.id | libc::CAN_EFF_FLAG
        } else {
            frame.id
        };
        let payload = frame.data_slice();
        raw.can_dlc = payload.len() as u8;
        raw.data[..payload.len()].copy_from_slice(payload);

        let written = unsafe {
            libc::write(
                self.fd.as_raw_fd(),
                &raw as *const libc::can_frame as *const libc::c_void,
                mem::size_of::<libc::can_frame>(),
            )
        };
        if written < 0 {
            return Err(CanError::Io(io::Error::last_os_error()));
        }
        Ok(written as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OneShotSender;
    use std::process::Command;

    /// 辅助函数：检查接口是否存在
    fn interface_exists(interface: &str) -> bool {
        Command::new("ip")
            .args(["link", "show", interface])
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    #[test]
    fn test_resolve_rejects_too_long_name() {
        let Ok(mut socket) = RawCanProvider.open() else {
            eprintln!("Skipping test: PF_CAN not supported");
            return;
        };
        let err = socket.resolve_interface(&"a".repeat(20)).unwrap_err();
        match err {
            CanError::Device(e) => {
                assert_eq!(e.kind, CanDeviceErrorKind::InvalidName);
                assert!(e.message.contains("too long"), "got: {}", e.message);
            },
            other => panic!("Expected Device error, got: {:?}", other),
        }
    }

    #[test]
    fn test_resolve_rejects_nul_in_name() {
        let Ok(mut socket) = RawCanProvider.open() else {
            eprintln!("Skipping test: PF_CAN not supported");
            return;
        };
        let err = socket.resolve_interface("can0\0").unwrap_err();
        assert!(matches!(
            err,
            CanError::Device(CanDeviceError {
                kind: CanDeviceErrorKind::InvalidName,
                ..
            })
        ));
    }

    #[test]
    fn test_resolve_unknown_interface() {
        let Ok(mut socket) = RawCanProvider.open() else {
            eprintln!("Skipping test: PF_CAN not supported");
            return;
        };
        let err = socket.resolve_interface("can999").unwrap_err();
        match err {
            CanError::Device(e) => {
                assert_eq!(e.kind, CanDeviceErrorKind::NotFound);
                assert!(e.message.contains("ip link add"), "got: {}", e.message);
            },
            other => panic!("Expected Device error, got: {:?}", other),
        }
    }

    #[test]
    #[ignore]
    fn test_send_kick_on_vcan0() {
        if !interface_exists("vcan0") {
            eprintln!("Skipping test: vcan0 does not exist");
            return;
        }
        let frame = SrxFrame::new_standard(0x123, &[0; 8]).unwrap();
        OneShotSender::new()
            .send("vcan0", &frame)
            .expect("send on vcan0 should succeed");
    }
}
