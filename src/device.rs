//! Backend seam.
//!
//! [`JoystickDevice`] is the raw, protocol-level view of one open joystick: the five capability
//! ioctls, a single-record read and a readiness check. Backends report plain `io::Error`s;
//! [`DeviceHandle`](crate::DeviceHandle) turns them into typed errors, decodes records and owns
//! the lifecycle.
//!
//! Releasing the underlying resource is the backend's `Drop`.

use std::io;
use std::os::unix::io::RawFd;
use std::time::Duration;

use crate::protocol::{ABS_CNT, EVENT_SIZE, NAME_LENGTH};

pub trait JoystickDevice {
    /// `JSIOCGAXES`
    fn axes(&self) -> io::Result<u8>;

    /// `JSIOCGBUTTONS`
    fn buttons(&self) -> io::Result<u8>;

    /// `JSIOCGNAME`: fill `buf`, leaving bytes past the name untouched.
    fn name(&self, buf: &mut [u8; NAME_LENGTH]) -> io::Result<()>;

    /// `JSIOCGAXMAP`: the full driver table, one entry per possible axis.
    fn axis_map(&self, map: &mut [u8; ABS_CNT]) -> io::Result<()>;

    /// `JSIOCGVERSION`: packed 24-bit driver version.
    fn version(&self) -> io::Result<u32>;

    /// One `read(2)` into `buf`. `Ok(0)` means end of stream.
    fn read(&mut self, buf: &mut [u8; EVENT_SIZE]) -> io::Result<usize>;

    /// Wait until a read would not block. `None` waits indefinitely.
    fn wait_readable(&self, timeout: Option<Duration>) -> io::Result<bool>;

    /// Descriptor for callers that register with their own readiness mechanism.
    fn raw_fd(&self) -> Option<RawFd> {
        None
    }
}

impl<D: JoystickDevice + ?Sized> JoystickDevice for Box<D> {
    fn axes(&self) -> io::Result<u8> {
        (**self).axes()
    }
    fn buttons(&self) -> io::Result<u8> {
        (**self).buttons()
    }
    fn name(&self, buf: &mut [u8; NAME_LENGTH]) -> io::Result<()> {
        (**self).name(buf)
    }
    fn axis_map(&self, map: &mut [u8; ABS_CNT]) -> io::Result<()> {
        (**self).axis_map(map)
    }
    fn version(&self) -> io::Result<u32> {
        (**self).version()
    }
    fn read(&mut self, buf: &mut [u8; EVENT_SIZE]) -> io::Result<usize> {
        (**self).read(buf)
    }
    fn wait_readable(&self, timeout: Option<Duration>) -> io::Result<bool> {
        (**self).wait_readable(timeout)
    }
    fn raw_fd(&self) -> Option<RawFd> {
        (**self).raw_fd()
    }
}
