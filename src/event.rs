//! Decoded joystick events.
//!
//! jsdev hands events out exactly as the driver reports them, as [`InputEvent`] values.
//! It does not normalize or remap them.
//!
//! ## Value conventions
//! - **Buttons:** `value` is `1` for pressed and `0` for released.
//! - **Axes:** `value` is signed. Bounds are device-defined; most drivers span
//!   `-32767..=32767`.
//!
//! ### Initial state
//! Right after open the driver replays the current state of every control. Those events carry
//! [`JS_EVENT_INIT`] in their type tag, so [`InputEvent::event_type`] reports them as
//! [`EventType::Unknown`] with the full tag. Use [`InputEvent::is_init`] and
//! [`InputEvent::base_type`] to fold them back into buttons and axes.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::protocol::{JS_EVENT_AXIS, JS_EVENT_BUTTON, JS_EVENT_INIT};

/// Kind of control an event refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    Button,
    Axis,
    /// Any tag other than a plain button or axis, passed through untouched.
    Unknown(u8),
}

impl EventType {
    /// Classify a kernel type tag.
    pub fn from_raw(tag: u8) -> Self {
        match tag {
            JS_EVENT_BUTTON => EventType::Button,
            JS_EVENT_AXIS => EventType::Axis,
            other => EventType::Unknown(other),
        }
    }

    /// The tag this variant stands for.
    pub fn raw(self) -> u8 {
        match self {
            EventType::Button => JS_EVENT_BUTTON,
            EventType::Axis => JS_EVENT_AXIS,
            EventType::Unknown(tag) => tag,
        }
    }

    pub fn is_known(self) -> bool {
        !matches!(self, EventType::Unknown(_))
    }
}

/// One state change read from a device.
///
/// A snapshot: it does not borrow the handle that produced it and stays valid after close.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputEvent {
    time: u32,
    kind: u8,
    number: u8,
    value: i16,
}

impl InputEvent {
    pub fn new(time: u32, kind: u8, number: u8, value: i16) -> Self {
        Self {
            time,
            kind,
            number,
            value,
        }
    }

    /// Convenience constructor for a button edge.
    pub fn button(time: u32, number: u8, pressed: bool) -> Self {
        Self::new(time, JS_EVENT_BUTTON, number, i16::from(pressed))
    }

    /// Convenience constructor for an axis movement.
    pub fn axis(time: u32, number: u8, value: i16) -> Self {
        Self::new(time, JS_EVENT_AXIS, number, value)
    }

    /// Same event, flagged as part of the initial-state replay.
    pub fn as_init(self) -> Self {
        Self {
            kind: self.kind | JS_EVENT_INIT,
            ..self
        }
    }

    /// Driver timestamp in milliseconds. Wraps with the kernel's counter.
    pub fn time(&self) -> u32 {
        self.time
    }

    /// Type tag as a variant; unrecognized tags (including init-flagged ones) are `Unknown`.
    pub fn event_type(&self) -> EventType {
        EventType::from_raw(self.kind)
    }

    /// The tag exactly as the kernel sent it.
    pub fn raw_type(&self) -> u8 {
        self.kind
    }

    /// Button or axis index.
    pub fn number(&self) -> u8 {
        self.number
    }

    /// Button state (0/1) or signed axis position.
    pub fn value(&self) -> i16 {
        self.value
    }

    /// `true` for events synthesized by the driver to report initial state.
    pub fn is_init(&self) -> bool {
        self.kind & JS_EVENT_INIT != 0
    }

    /// Type with the init flag stripped.
    pub fn base_type(&self) -> EventType {
        EventType::from_raw(self.kind & !JS_EVENT_INIT)
    }

    /// `Some(pressed)` for button events (init or live).
    pub fn pressed(&self) -> Option<bool> {
        match self.base_type() {
            EventType::Button => Some(self.value != 0),
            _ => None,
        }
    }
}

impl fmt::Display for InputEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let init = if self.is_init() { " (init)" } else { "" };
        match self.base_type() {
            EventType::Button => write!(
                f,
                "[{:>10}] button {} {}{}",
                self.time,
                self.number,
                if self.value != 0 { "pressed" } else { "released" },
                init
            ),
            EventType::Axis => write!(
                f,
                "[{:>10}] axis {} = {}{}",
                self.time, self.number, self.value, init
            ),
            EventType::Unknown(_) => write!(
                f,
                "[{:>10}] type 0x{:02x} #{} = {}",
                self.time, self.kind, self.number, self.value
            ),
        }
    }
}
