//! Owning handle to one joystick.
//!
//! A [`DeviceHandle`] is either open (it owns a backend, and through it one descriptor) or
//! closed. Every operation checks the state first; on a closed handle it fails with
//! [`HandleClosedError`] before touching the backend. The backend is released by
//! [`DeviceHandle::close`] or when the handle is dropped, whichever comes first, and never twice.
//!
//! # Blocking
//! Only [`DeviceHandle::next_event`] may block, and only for handles opened without
//! [`OpenConfig::nonblocking`]. `close` takes `&mut self`, so it cannot race a read on the same
//! handle; wrap the handle in a `Mutex` if several threads need it. Whether releasing a descriptor
//! wakes a read blocked on a duplicate of it is up to the platform.
//!
//! # Example
//! ```no_run
//! use jsdev::DeviceHandle;
//!
//! let mut js = DeviceHandle::open("/dev/input/js0")?;
//! println!("{} ({} axes, {} buttons)", js.name()?, js.axes()?, js.buttons()?);
//! while let Some(ev) = js.next_event()? {
//!     println!("{ev}");
//! }
//! # Ok::<(), jsdev::Error>(())
//! ```

use std::io;
use std::os::unix::io::{AsRawFd, RawFd};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::backends::linux::JoydevNode;
use crate::config::OpenConfig;
use crate::device::JoystickDevice;
use crate::error::{
    DeviceOpenError, HandleClosedError, OpenErrorReason, QueryError, ReadError, ReadErrorReason,
    Result,
};
use crate::event::InputEvent;
use crate::metadata::DeviceInfo;
use crate::protocol::{decode_event, decode_name, Version, ABS_CNT, EVENT_SIZE, NAME_LENGTH};

/// Exclusive owner of one open joystick backend.
pub struct DeviceHandle<D: JoystickDevice = JoydevNode> {
    device: Option<D>,
    path: PathBuf,
    last_event: Option<InputEvent>,
}

impl DeviceHandle<JoydevNode> {
    /// Open a joydev node with the default [`OpenConfig`] (blocking, 32 slots).
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, &OpenConfig::default())
    }

    /// Open a joydev node with an explicit [`OpenConfig`].
    pub fn open_with(path: impl AsRef<Path>, config: &OpenConfig) -> Result<Self> {
        let path = path.as_ref();
        let open_error = |reason| DeviceOpenError {
            path: path.to_path_buf(),
            reason,
        };

        let node = JoydevNode::open(path, config)
            .map_err(|e| open_error(OpenErrorReason::from_io(&e)))?;

        let fd = node.as_raw_fd();
        let in_range = usize::try_from(fd).is_ok_and(|slot| slot < config.device_slots);
        if !in_range {
            tracing::debug!(
                path = %path.display(),
                fd,
                slots = config.device_slots,
                "descriptor outside device slots, releasing"
            );
            drop(node);
            return Err(open_error(OpenErrorReason::TooManyDevices {
                fd,
                slots: config.device_slots,
            })
            .into());
        }

        tracing::debug!(
            path = %path.display(),
            fd,
            nonblocking = config.nonblocking,
            "opened joystick"
        );
        Ok(Self::with_path(node, path))
    }
}

impl<D: JoystickDevice> DeviceHandle<D> {
    /// Wrap an already-open backend.
    pub fn from_device(device: D) -> Self {
        Self::with_path(device, PathBuf::new())
    }

    /// Wrap an already-open backend, remembering where it came from.
    pub fn with_path(device: D, path: impl Into<PathBuf>) -> Self {
        Self {
            device: Some(device),
            path: path.into(),
            last_event: None,
        }
    }

    /// Path the handle was opened from; empty for backends built in memory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `false` once the handle has been closed.
    pub fn is_open(&self) -> bool {
        self.device.is_some()
    }

    /// The most recent event this handle decoded, if any.
    pub fn last_event(&self) -> Option<InputEvent> {
        self.last_event
    }

    fn live(&self, operation: &'static str) -> Result<&D, HandleClosedError> {
        self.device.as_ref().ok_or(HandleClosedError { operation })
    }

    fn live_mut(&mut self, operation: &'static str) -> Result<&mut D, HandleClosedError> {
        self.device.as_mut().ok_or(HandleClosedError { operation })
    }

    /// Number of axes the driver exposes.
    pub fn axes(&self) -> Result<u8> {
        let device = self.live("axes")?;
        Ok(device.axes().map_err(|e| QueryError::from_io("axes", &e))?)
    }

    /// Number of buttons the driver exposes.
    pub fn buttons(&self) -> Result<u8> {
        let device = self.live("buttons")?;
        Ok(device
            .buttons()
            .map_err(|e| QueryError::from_io("buttons", &e))?)
    }

    /// Device name, at most [`NAME_LENGTH`] bytes. `"Unknown"` if the driver supplies none.
    pub fn name(&self) -> Result<String> {
        let device = self.live("name")?;
        let mut buf = [0u8; NAME_LENGTH];
        device
            .name(&mut buf)
            .map_err(|e| QueryError::from_io("name", &e))?;
        Ok(decode_name(&buf))
    }

    /// Axis-to-ABS-code table, one entry per axis.
    pub fn axes_map(&self) -> Result<Vec<u8>> {
        let device = self.live("axes_map")?;
        let axes = device.axes().map_err(|e| QueryError::from_io("axes", &e))?;
        let mut map = [0u8; ABS_CNT];
        device
            .axis_map(&mut map)
            .map_err(|e| QueryError::from_io("axes_map", &e))?;
        let len = usize::from(axes).min(ABS_CNT);
        Ok(map[..len].to_vec())
    }

    /// Driver version.
    pub fn version(&self) -> Result<Version> {
        let device = self.live("version")?;
        let packed = device
            .version()
            .map_err(|e| QueryError::from_io("version", &e))?;
        let version = Version::from_packed(packed);
        tracing::debug!(path = %self.path.display(), %version, "driver version");
        Ok(version)
    }

    /// All capabilities in one snapshot.
    pub fn describe(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo {
            path: (!self.path.as_os_str().is_empty()).then(|| self.path.display().to_string()),
            name: self.name()?,
            axes: self.axes()?,
            buttons: self.buttons()?,
            axis_map: self.axes_map()?,
            version: self.version()?,
        })
    }

    /// Read one event record.
    ///
    /// `Ok(None)` means no event: end of stream, or nothing pending on a non-blocking handle.
    /// An interrupted read is retried once. A partial record is an error, never a zero-filled
    /// event.
    pub fn next_event(&mut self) -> Result<Option<InputEvent>> {
        let device = self.live_mut("next_event")?;
        let mut buf = [0u8; EVENT_SIZE];

        let read = match device.read(&mut buf) {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {
                tracing::trace!("event read interrupted, retrying");
                device.read(&mut buf)
            }
            other => other,
        };

        let n = match read {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(None),
            Err(e) => return Err(ReadError::from_io(&e).into()),
        };

        match n {
            0 => Ok(None),
            EVENT_SIZE => {
                let event = decode_event(&buf);
                tracing::trace!(
                    time = event.time(),
                    kind = event.raw_type(),
                    number = event.number(),
                    value = event.value(),
                    "event"
                );
                self.last_event = Some(event);
                Ok(Some(event))
            }
            got => Err(ReadError::new(ReadErrorReason::ShortRead { got }).into()),
        }
    }

    /// Iterate events until none is available. Stops after the first error.
    pub fn events(&mut self) -> Events<'_, D> {
        Events {
            handle: self,
            done: false,
        }
    }

    /// Wait until [`next_event`](Self::next_event) would not block. `None` waits forever.
    pub fn wait_readable(&self, timeout: Option<Duration>) -> Result<bool> {
        let device = self.live("wait_readable")?;
        Ok(device
            .wait_readable(timeout)
            .map_err(|e| ReadError::from_io(&e))?)
    }

    /// Descriptor for external readiness registration; `None` for in-memory backends.
    pub fn raw_fd(&self) -> Result<Option<RawFd>> {
        Ok(self.live("raw_fd")?.raw_fd())
    }

    /// Release the device. Safe to call any number of times.
    pub fn close(&mut self) {
        if let Some(device) = self.device.take() {
            tracing::debug!(path = %self.path.display(), "closing joystick");
            drop(device);
        }
    }
}

impl<D: JoystickDevice> Drop for DeviceHandle<D> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<D: JoystickDevice> std::fmt::Debug for DeviceHandle<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceHandle")
            .field("path", &self.path)
            .field("open", &self.is_open())
            .field("last_event", &self.last_event)
            .finish()
    }
}

/// Iterator returned by [`DeviceHandle::events`].
pub struct Events<'a, D: JoystickDevice> {
    handle: &'a mut DeviceHandle<D>,
    done: bool,
}

impl<D: JoystickDevice> Iterator for Events<'_, D> {
    type Item = Result<InputEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.handle.next_event() {
            Ok(Some(event)) => Some(Ok(event)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
