//! In-memory joystick.
//!
//! [`VirtualJoystick`] answers the capability queries from fixed values and serves reads from a
//! queue of byte chunks, so every branch of the read path (whole records, partial records,
//! errors, end of stream) can be driven without hardware. A shared [`VirtualProbe`] counts I/O and
//! releases, which lets callers check what a handle did after it has been closed or dropped.

use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::device::JoystickDevice;
use crate::event::InputEvent;
use crate::protocol::{encode_event, ABS_CNT, EVENT_SIZE, JS_VERSION, NAME_LENGTH};

/// Counters shared between a virtual device and the test holding it.
#[derive(Debug, Default)]
pub struct VirtualProbe {
    queries: AtomicUsize,
    reads: AtomicUsize,
    releases: AtomicUsize,
}

impl VirtualProbe {
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Total I/O calls (queries, reads, readiness checks).
    pub fn io_count(&self) -> usize {
        self.queries() + self.reads()
    }

    /// How many times the device was released. Never more than one.
    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
enum Chunk {
    Bytes(Vec<u8>),
    Error(i32),
}

#[derive(Debug)]
pub struct VirtualJoystick {
    name: Option<Vec<u8>>,
    axes: u8,
    buttons: u8,
    axis_map: Vec<u8>,
    version: u32,
    nonblocking: bool,
    clock: u32,
    chunks: VecDeque<Chunk>,
    query_errors: HashMap<&'static str, i32>,
    unplugged: bool,
    probe: Arc<VirtualProbe>,
}

impl VirtualJoystick {
    /// A device with identity axis mapping and the current joydev driver version.
    pub fn new(name: &str, axes: u8, buttons: u8) -> Self {
        Self {
            name: Some(name.as_bytes().to_vec()),
            axes,
            buttons,
            axis_map: (0..axes).take(ABS_CNT).collect(),
            version: JS_VERSION,
            nonblocking: false,
            clock: 0,
            chunks: VecDeque::new(),
            query_errors: HashMap::new(),
            unplugged: false,
            probe: Arc::default(),
        }
    }

    pub fn probe(&self) -> Arc<VirtualProbe> {
        Arc::clone(&self.probe)
    }

    /// Reads on an empty queue fail with `EAGAIN` instead of reporting end of stream.
    pub fn nonblocking(mut self, nonblocking: bool) -> Self {
        self.nonblocking = nonblocking;
        self
    }

    /// Override the driver's axis table. Entries past `axes` are kept but not reported.
    pub fn with_axis_map(mut self, map: &[u8]) -> Self {
        self.axis_map = map.iter().copied().take(ABS_CNT).collect();
        self
    }

    pub fn with_version(mut self, packed: u32) -> Self {
        self.version = packed;
        self
    }

    /// Behave like older drivers that leave the name buffer untouched.
    pub fn without_name(mut self) -> Self {
        self.name = None;
        self
    }

    /// Make one capability query fail with `errno` (`"axes"`, `"buttons"`, `"name"`,
    /// `"axes_map"`, `"version"`).
    pub fn fail_query(&mut self, operation: &'static str, errno: i32) {
        self.query_errors.insert(operation, errno);
    }

    /// Every later query and read fails with `ENODEV`.
    pub fn unplug(&mut self) {
        self.unplugged = true;
    }

    /// Inject a raw input event into the virtual device.
    pub fn feed(&mut self, event: InputEvent) {
        self.chunks.push_back(Chunk::Bytes(encode_event(&event).to_vec()));
    }

    /// Queue bytes exactly as a single read should return them.
    pub fn feed_raw(&mut self, bytes: &[u8]) {
        self.chunks.push_back(Chunk::Bytes(bytes.to_vec()));
    }

    /// Queue a failing read.
    pub fn feed_error(&mut self, errno: i32) {
        self.chunks.push_back(Chunk::Error(errno));
    }

    /// Convenience method to set an axis value.
    pub fn set_axis(&mut self, axis: u8, value: i16) {
        let time = self.tick();
        self.feed(InputEvent::axis(time, axis, value));
    }

    pub fn press_button(&mut self, button: u8) {
        let time = self.tick();
        self.feed(InputEvent::button(time, button, true));
    }

    pub fn release_button(&mut self, button: u8) {
        let time = self.tick();
        self.feed(InputEvent::button(time, button, false));
    }

    /// Queue the init events a driver sends right after open: every button released, every
    /// axis centered.
    pub fn replay_initial_state(&mut self) {
        let time = self.clock;
        for button in 0..self.buttons {
            self.feed(InputEvent::button(time, button, false).as_init());
        }
        for axis in 0..self.axes {
            self.feed(InputEvent::axis(time, axis, 0).as_init());
        }
    }

    pub fn pending(&self) -> usize {
        self.chunks.len()
    }

    fn tick(&mut self) -> u32 {
        self.clock = self.clock.wrapping_add(1);
        self.clock
    }

    fn query(&self, operation: &'static str) -> io::Result<()> {
        self.probe.queries.fetch_add(1, Ordering::SeqCst);
        if self.unplugged {
            return Err(io::Error::from_raw_os_error(libc::ENODEV));
        }
        match self.query_errors.get(operation) {
            Some(&errno) => Err(io::Error::from_raw_os_error(errno)),
            None => Ok(()),
        }
    }
}

impl JoystickDevice for VirtualJoystick {
    fn axes(&self) -> io::Result<u8> {
        self.query("axes")?;
        Ok(self.axes)
    }

    fn buttons(&self) -> io::Result<u8> {
        self.query("buttons")?;
        Ok(self.buttons)
    }

    fn name(&self, buf: &mut [u8; NAME_LENGTH]) -> io::Result<()> {
        self.query("name")?;
        if let Some(name) = &self.name {
            // The driver copies at most len - 1 bytes and NUL-terminates.
            let n = name.len().min(NAME_LENGTH - 1);
            buf[..n].copy_from_slice(&name[..n]);
            buf[n] = 0;
        }
        Ok(())
    }

    fn axis_map(&self, map: &mut [u8; ABS_CNT]) -> io::Result<()> {
        self.query("axes_map")?;
        map.fill(0);
        map[..self.axis_map.len()].copy_from_slice(&self.axis_map);
        Ok(())
    }

    fn version(&self) -> io::Result<u32> {
        self.query("version")?;
        Ok(self.version)
    }

    fn read(&mut self, buf: &mut [u8; EVENT_SIZE]) -> io::Result<usize> {
        self.probe.reads.fetch_add(1, Ordering::SeqCst);
        if self.unplugged {
            return Err(io::Error::from_raw_os_error(libc::ENODEV));
        }
        match self.chunks.pop_front() {
            Some(Chunk::Bytes(mut bytes)) => {
                let n = bytes.len().min(EVENT_SIZE);
                buf[..n].copy_from_slice(&bytes[..n]);
                if bytes.len() > n {
                    bytes.drain(..n);
                    self.chunks.push_front(Chunk::Bytes(bytes));
                }
                Ok(n)
            }
            Some(Chunk::Error(errno)) => Err(io::Error::from_raw_os_error(errno)),
            None if self.nonblocking => Err(io::Error::from_raw_os_error(libc::EAGAIN)),
            None => Ok(0),
        }
    }

    fn wait_readable(&self, _timeout: Option<Duration>) -> io::Result<bool> {
        self.query("poll")?;
        Ok(!self.chunks.is_empty())
    }
}

impl Drop for VirtualJoystick {
    fn drop(&mut self) {
        self.probe.releases.fetch_add(1, Ordering::SeqCst);
    }
}
