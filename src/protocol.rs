//! Joystick API wire format (`linux/joystick.h`).
//!
//! The kernel delivers one `struct js_event` per read:
//!
//! | offset | size | field    |
//! |--------|------|----------|
//! | 0      | 4    | `time`   (u32, ms) |
//! | 4      | 2    | `value`  (i16)     |
//! | 6      | 1    | `type`   (u8)      |
//! | 7      | 1    | `number` (u8)      |
//!
//! Fields are in host byte order.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::event::InputEvent;

/// Size of one event record in bytes.
pub const EVENT_SIZE: usize = 8;

/// Event type tag: button pressed/released.
pub const JS_EVENT_BUTTON: u8 = 0x01;
/// Event type tag: joystick moved.
pub const JS_EVENT_AXIS: u8 = 0x02;
/// Flag or-ed into the type for the synthetic initial-state events.
pub const JS_EVENT_INIT: u8 = 0x80;

/// Upper bound on axes the driver reports (`ABS_CNT`); sizes the axis map.
pub const ABS_CNT: usize = 0x40;

/// Buffer size used for the `JSIOCGNAME` query.
pub const NAME_LENGTH: usize = 128;

/// Name reported when the driver leaves the name buffer empty.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Driver version the joydev module ships with today (2.1.0).
pub const JS_VERSION: u32 = 0x0002_0100;

/// Decode one raw record.
pub fn decode_event(raw: &[u8; EVENT_SIZE]) -> InputEvent {
    let time = u32::from_ne_bytes([raw[0], raw[1], raw[2], raw[3]]);
    let value = i16::from_ne_bytes([raw[4], raw[5]]);
    InputEvent::new(time, raw[6], raw[7], value)
}

/// Encode a record the way the kernel lays it out.
///
/// Used by the virtual backend to feed the same bytes a real node would produce.
pub fn encode_event(event: &InputEvent) -> [u8; EVENT_SIZE] {
    let mut raw = [0u8; EVENT_SIZE];
    raw[0..4].copy_from_slice(&event.time().to_ne_bytes());
    raw[4..6].copy_from_slice(&event.value().to_ne_bytes());
    raw[6] = event.raw_type();
    raw[7] = event.number();
    raw
}

/// Turn a `JSIOCGNAME` buffer into text.
///
/// Stops at the first NUL; invalid UTF-8 is replaced. An empty name falls back to
/// [`UNKNOWN_NAME`].
pub fn decode_name(buf: &[u8]) -> String {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    if end == 0 {
        return UNKNOWN_NAME.to_string();
    }
    String::from_utf8_lossy(&buf[..end]).into_owned()
}

/// Driver version as reported by `JSIOCGVERSION`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl Version {
    /// Split the packed 24-bit value: major in bits 16-23, minor 8-15, patch 0-7.
    pub fn from_packed(packed: u32) -> Self {
        Self {
            major: ((packed >> 16) & 0xff) as u8,
            minor: ((packed >> 8) & 0xff) as u8,
            patch: (packed & 0xff) as u8,
        }
    }

    pub fn packed(&self) -> u32 {
        (u32::from(self.major) << 16) | (u32::from(self.minor) << 8) | u32::from(self.patch)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventType;

    #[test]
    fn version_unpacks_each_byte() {
        let v = Version::from_packed(0x020401);
        assert_eq!(v, Version { major: 2, minor: 4, patch: 1 });
        assert_eq!(v.to_string(), "2.4.1");
        assert_eq!(v.packed(), 0x020401);
    }

    #[test]
    fn version_ignores_bits_above_24() {
        let v = Version::from_packed(0xff02_0100);
        assert_eq!(v, Version::from_packed(JS_VERSION));
    }

    #[test]
    fn button_record_decodes_bit_exact() {
        let mut raw = [0u8; EVENT_SIZE];
        raw[0..4].copy_from_slice(&1000u32.to_ne_bytes());
        raw[4..6].copy_from_slice(&1i16.to_ne_bytes());
        raw[6] = JS_EVENT_BUTTON;
        raw[7] = 3;

        let ev = decode_event(&raw);
        assert_eq!(ev.time(), 1000);
        assert_eq!(ev.event_type(), EventType::Button);
        assert_eq!(ev.number(), 3);
        assert_eq!(ev.value(), 1);
    }

    #[test]
    fn axis_record_keeps_sign() {
        let ev = InputEvent::new(42, JS_EVENT_AXIS, 1, -32767);
        let back = decode_event(&encode_event(&ev));
        assert_eq!(back, ev);
        assert_eq!(back.value(), -32767);
    }

    #[test]
    fn name_stops_at_nul() {
        let mut buf = [0u8; NAME_LENGTH];
        buf[..12].copy_from_slice(b"Logitech Pad");
        assert_eq!(decode_name(&buf), "Logitech Pad");
    }

    #[test]
    fn empty_name_falls_back() {
        assert_eq!(decode_name(&[0u8; NAME_LENGTH]), UNKNOWN_NAME);
    }

    #[test]
    fn unterminated_name_uses_whole_buffer() {
        let buf = [b'x'; NAME_LENGTH];
        assert_eq!(decode_name(&buf).len(), NAME_LENGTH);
    }
}
