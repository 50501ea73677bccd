//! Device backends for `jsdev`.
//!
//! Implementations of [`JoystickDevice`](crate::device::JoystickDevice).
//!
//! # Feature flags
//! - **`virtual`** (default): in-memory [`virtual_input::VirtualJoystick`] for tests and demos.
//!
//! The Linux joydev backend is always built.

pub mod linux;

#[cfg(feature = "virtual")]
#[cfg_attr(docsrs, doc(cfg(feature = "virtual")))]
pub mod virtual_input;

pub use linux::{probe_paths, JoydevNode};
