//! Linux joydev backend.
//!
//! [`JoydevNode`] wraps a read-only `File` on a `/dev/input/js*` node and talks to the driver
//! through the `'j'` ioctls. Dropping it closes the descriptor.

use std::fs::{File, OpenOptions};
use std::io::{self, Read};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::{AsRawFd, RawFd};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::OpenConfig;
use crate::device::JoystickDevice;
use crate::protocol::{ABS_CNT, EVENT_SIZE, NAME_LENGTH};

/// Where the kernel creates joydev nodes.
pub const INPUT_DIR: &str = "/dev/input";

mod ioctl {
    use crate::protocol::ABS_CNT;

    nix::ioctl_read!(jsiocgversion, b'j', 0x01, u32);
    nix::ioctl_read!(jsiocgaxes, b'j', 0x11, u8);
    nix::ioctl_read!(jsiocgbuttons, b'j', 0x12, u8);
    nix::ioctl_read_buf!(jsiocgname, b'j', 0x13, u8);
    nix::ioctl_read!(jsiocgaxmap, b'j', 0x32, [u8; ABS_CNT]);
}

#[derive(Debug)]
pub struct JoydevNode {
    file: File,
}

impl JoydevNode {
    /// Open `path` read-only, with `O_NONBLOCK` if the config asks for it.
    pub fn open(path: &Path, config: &OpenConfig) -> io::Result<Self> {
        let mut opts = OpenOptions::new();
        opts.read(true);
        if config.nonblocking {
            opts.custom_flags(libc::O_NONBLOCK);
        }
        let file = opts.open(path)?;
        Ok(Self { file })
    }

    fn fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }
}

impl AsRawFd for JoydevNode {
    fn as_raw_fd(&self) -> RawFd {
        self.fd()
    }
}

impl JoystickDevice for JoydevNode {
    fn axes(&self) -> io::Result<u8> {
        let mut axes = 0u8;
        // Safety: the driver writes one byte into `axes`.
        unsafe { ioctl::jsiocgaxes(self.fd(), &mut axes) }?;
        Ok(axes)
    }

    fn buttons(&self) -> io::Result<u8> {
        let mut buttons = 0u8;
        // Safety: the driver writes one byte into `buttons`.
        unsafe { ioctl::jsiocgbuttons(self.fd(), &mut buttons) }?;
        Ok(buttons)
    }

    fn name(&self, buf: &mut [u8; NAME_LENGTH]) -> io::Result<()> {
        // Safety: the request encodes the buffer length; the driver copies at most that much.
        unsafe { ioctl::jsiocgname(self.fd(), &mut buf[..]) }?;
        Ok(())
    }

    fn axis_map(&self, map: &mut [u8; ABS_CNT]) -> io::Result<()> {
        // Safety: `map` is exactly the size encoded in the request.
        unsafe { ioctl::jsiocgaxmap(self.fd(), map) }?;
        Ok(())
    }

    fn version(&self) -> io::Result<u32> {
        let mut version = 0u32;
        // Safety: the driver writes a u32.
        unsafe { ioctl::jsiocgversion(self.fd(), &mut version) }?;
        Ok(version)
    }

    fn read(&mut self, buf: &mut [u8; EVENT_SIZE]) -> io::Result<usize> {
        self.file.read(buf)
    }

    fn wait_readable(&self, timeout: Option<Duration>) -> io::Result<bool> {
        let timeout_ms = poll_timeout_ms(timeout);
        let mut pollfd = libc::pollfd {
            fd: self.fd(),
            events: libc::POLLIN,
            revents: 0,
        };
        // Safety: one valid pollfd for the duration of the call.
        let ret = unsafe { libc::poll(&mut pollfd, 1, timeout_ms) };
        if ret < 0 {
            return Err(io::Error::last_os_error());
        }
        // POLLHUP/POLLERR also count: the next read reports the failure.
        Ok(ret > 0)
    }

    fn raw_fd(&self) -> Option<RawFd> {
        Some(self.fd())
    }
}

/// `poll(2)` timeout in milliseconds. Nonzero waits shorter than 1 ms round up to 1 ms.
fn poll_timeout_ms(timeout: Option<Duration>) -> i32 {
    match timeout {
        None => -1,
        Some(d) if d.is_zero() => 0,
        Some(d) => {
            let ms = d.as_nanos().div_ceil(1_000_000);
            i32::try_from(ms).unwrap_or(i32::MAX)
        }
    }
}

/// List joydev nodes (`js<N>`) under `/dev/input`, ordered by index.
pub fn probe_paths() -> io::Result<Vec<PathBuf>> {
    probe_paths_in(Path::new(INPUT_DIR))
}

/// Same as [`probe_paths`] for an arbitrary directory. A missing directory yields no nodes.
pub fn probe_paths_in(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut found: Vec<(u32, PathBuf)> = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(index) = name.to_str().and_then(joydev_index) else {
            continue;
        };
        found.push((index, entry.path()));
    }
    found.sort_by_key(|(index, _)| *index);

    tracing::debug!(dir = %dir.display(), count = found.len(), "probed joydev nodes");
    Ok(found.into_iter().map(|(_, path)| path).collect())
}

fn joydev_index(name: &str) -> Option<u32> {
    let digits = name.strip_prefix("js")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joydev_names_only() {
        assert_eq!(joydev_index("js0"), Some(0));
        assert_eq!(joydev_index("js12"), Some(12));
        assert_eq!(joydev_index("js"), None);
        assert_eq!(joydev_index("jsx"), None);
        assert_eq!(joydev_index("event3"), None);
        assert_eq!(joydev_index("js-1"), None);
    }

    #[test]
    fn poll_timeouts_round_up() {
        assert_eq!(poll_timeout_ms(None), -1);
        assert_eq!(poll_timeout_ms(Some(Duration::ZERO)), 0);
        assert_eq!(poll_timeout_ms(Some(Duration::from_micros(500))), 1);
        assert_eq!(poll_timeout_ms(Some(Duration::from_nanos(1))), 1);
        assert_eq!(poll_timeout_ms(Some(Duration::from_millis(250))), 250);
        assert_eq!(poll_timeout_ms(Some(Duration::from_micros(1500))), 2);
        assert_eq!(poll_timeout_ms(Some(Duration::from_secs(u64::MAX))), i32::MAX);
    }

    #[test]
    fn probe_sorts_numerically() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["js10", "js2", "event0", "mice", "js0"] {
            File::create(dir.path().join(name)).unwrap();
        }
        let found = probe_paths_in(dir.path()).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["js0", "js2", "js10"]);
    }

    #[test]
    fn probe_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(probe_paths_in(&dir.path().join("nope")).unwrap().is_empty());
    }

    #[test]
    fn ioctls_on_a_regular_file_fail_with_enotty() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let node = JoydevNode::open(file.path(), &OpenConfig::default()).unwrap();
        let err = node.axes().unwrap_err();
        assert_eq!(err.raw_os_error(), Some(libc::ENOTTY));
    }
}
