//! Device capability snapshot.
//!
//! [`DeviceInfo`] is a cloneable description of one joystick suitable for display, logging and
//! persistence. It is produced by [`DeviceHandle::describe`](crate::DeviceHandle::describe) and
//! does not refer back to the handle.
//!
//! # Example
//! ```no_run
//! use jsdev::DeviceHandle;
//!
//! let js = DeviceHandle::open("/dev/input/js0")?;
//! let info = js.describe()?;
//! println!("{info}");
//! # Ok::<(), jsdev::Error>(())
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::protocol::Version;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Node the handle was opened from; `None` for in-memory devices.
    pub path: Option<String>,

    /// Driver-reported name, or `"Unknown"`.
    pub name: String,

    pub axes: u8,

    pub buttons: u8,

    /// `axis_map[i]` is the ABS code reported as axis `i`.
    pub axis_map: Vec<u8>,

    /// Joystick driver version.
    pub version: Version,
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} axes, {} buttons, driver {})",
            self.name, self.axes, self.buttons, self.version
        )?;
        if let Some(path) = &self.path {
            write!(f, " at {path}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_summarizes() {
        let info = DeviceInfo {
            path: Some("/dev/input/js0".into()),
            name: "Gamepad".into(),
            axes: 2,
            buttons: 8,
            axis_map: vec![0, 1],
            version: Version::from_packed(0x020100),
        };
        assert_eq!(
            info.to_string(),
            "Gamepad (2 axes, 8 buttons, driver 2.1.0) at /dev/input/js0"
        );
    }
}
