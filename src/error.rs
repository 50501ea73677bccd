//! Error taxonomy.
//!
//! Every fallible operation on a [`DeviceHandle`](crate::DeviceHandle) reports one of four
//! failures, grouped under [`Error`]:
//! - [`DeviceOpenError`]: the node could not be opened (or its descriptor did not fit a slot).
//! - [`QueryError`]: a capability ioctl failed on an open handle.
//! - [`ReadError`]: reading the event stream failed or delivered a partial record.
//! - [`HandleClosedError`]: the handle was already closed; no I/O was attempted.
//!
//! Errors carry the platform `errno` where one exists.

use std::io;
use std::os::unix::io::RawFd;
use std::path::PathBuf;
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Any failure surfaced by a [`DeviceHandle`](crate::DeviceHandle).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Open(#[from] DeviceOpenError),
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error(transparent)]
    Read(#[from] ReadError),
    #[error(transparent)]
    HandleClosed(#[from] HandleClosedError),
}

impl Error {
    /// `true` if the operation was rejected because the handle is closed.
    pub fn is_closed(&self) -> bool {
        matches!(self, Error::HandleClosed(_))
    }

    /// Underlying OS error code, if the failure came from a system call.
    pub fn errno(&self) -> Option<i32> {
        match self {
            Error::Open(e) => match e.reason {
                OpenErrorReason::Other(errno) => Some(errno),
                OpenErrorReason::NotFound => Some(libc::ENOENT),
                OpenErrorReason::PermissionDenied => Some(libc::EACCES),
                OpenErrorReason::TooManyDevices { .. } => None,
            },
            Error::Query(e) => Some(e.errno),
            Error::Read(e) => match e.reason {
                ReadErrorReason::Disconnected => Some(libc::ENODEV),
                ReadErrorReason::Interrupted => Some(libc::EINTR),
                ReadErrorReason::Other(errno) => Some(errno),
                ReadErrorReason::ShortRead { .. } => None,
            },
            Error::HandleClosed(_) => None,
        }
    }
}

/// Why a device node could not be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OpenErrorReason {
    #[error("no such device node")]
    NotFound,
    #[error("permission denied")]
    PermissionDenied,
    /// The kernel handed out a descriptor beyond the configured slot bound.
    #[error("descriptor {fd} exceeds the {slots} configured device slots")]
    TooManyDevices { fd: RawFd, slots: usize },
    #[error("{}", os_message(.0))]
    Other(i32),
}

impl OpenErrorReason {
    pub(crate) fn from_io(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => OpenErrorReason::NotFound,
            io::ErrorKind::PermissionDenied => OpenErrorReason::PermissionDenied,
            // Paths with interior NULs never reach open(2) and carry no errno.
            _ => OpenErrorReason::Other(err.raw_os_error().unwrap_or(libc::EINVAL)),
        }
    }
}

/// Open-time failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot open {}: {reason}", .path.display())]
pub struct DeviceOpenError {
    pub path: PathBuf,
    pub reason: OpenErrorReason,
}

/// A capability ioctl failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} query failed: {}", os_message(.errno))]
pub struct QueryError {
    /// Which query failed (`"axes"`, `"buttons"`, `"name"`, `"axes_map"`, `"version"`).
    pub operation: &'static str,
    pub errno: i32,
}

impl QueryError {
    pub(crate) fn from_io(operation: &'static str, err: &io::Error) -> Self {
        Self {
            operation,
            errno: err.raw_os_error().unwrap_or(libc::EIO),
        }
    }
}

/// Why an event read failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReadErrorReason {
    /// The device went away (`ENODEV`).
    #[error("device disconnected")]
    Disconnected,
    /// Interrupted twice in a row; the single internal retry was used up.
    #[error("read interrupted")]
    Interrupted,
    /// Fewer bytes than one event record arrived.
    #[error("short read: {got} of {} bytes", crate::protocol::EVENT_SIZE)]
    ShortRead { got: usize },
    #[error("{}", os_message(.0))]
    Other(i32),
}

/// Event-read failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("event read failed: {reason}")]
pub struct ReadError {
    pub reason: ReadErrorReason,
}

impl ReadError {
    pub(crate) fn new(reason: ReadErrorReason) -> Self {
        Self { reason }
    }

    pub(crate) fn from_io(err: &io::Error) -> Self {
        let reason = match err.raw_os_error() {
            Some(libc::ENODEV) => ReadErrorReason::Disconnected,
            Some(libc::EINTR) => ReadErrorReason::Interrupted,
            Some(errno) => ReadErrorReason::Other(errno),
            None if err.kind() == io::ErrorKind::Interrupted => ReadErrorReason::Interrupted,
            None => ReadErrorReason::Other(libc::EIO),
        };
        Self { reason }
    }
}

fn os_message(errno: &i32) -> io::Error {
    io::Error::from_raw_os_error(*errno)
}

/// An operation was attempted on a closed handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{operation}: device handle is closed")]
pub struct HandleClosedError {
    pub operation: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_reason_maps_io_kinds() {
        let nf = io::Error::from_raw_os_error(libc::ENOENT);
        assert_eq!(OpenErrorReason::from_io(&nf), OpenErrorReason::NotFound);

        let perm = io::Error::from_raw_os_error(libc::EACCES);
        assert_eq!(OpenErrorReason::from_io(&perm), OpenErrorReason::PermissionDenied);

        let busy = io::Error::from_raw_os_error(libc::EBUSY);
        assert_eq!(OpenErrorReason::from_io(&busy), OpenErrorReason::Other(libc::EBUSY));
    }

    #[test]
    fn read_reason_maps_errno() {
        let gone = io::Error::from_raw_os_error(libc::ENODEV);
        assert_eq!(ReadError::from_io(&gone).reason, ReadErrorReason::Disconnected);

        let io_err = io::Error::from_raw_os_error(libc::EIO);
        assert_eq!(ReadError::from_io(&io_err).reason, ReadErrorReason::Other(libc::EIO));
    }

    #[test]
    fn errno_is_exposed_through_the_umbrella() {
        let err: Error = QueryError { operation: "axes", errno: libc::ENOTTY }.into();
        assert_eq!(err.errno(), Some(libc::ENOTTY));
        assert!(!err.is_closed());

        let closed: Error = HandleClosedError { operation: "axes" }.into();
        assert!(closed.is_closed());
        assert_eq!(closed.errno(), None);
    }

    #[test]
    fn messages_name_the_failure() {
        let err = ReadError::new(ReadErrorReason::ShortRead { got: 3 });
        assert_eq!(err.to_string(), "event read failed: short read: 3 of 8 bytes");

        let err = QueryError { operation: "buttons", errno: libc::ENODEV };
        assert!(err.to_string().starts_with("buttons query failed"));
    }
}
