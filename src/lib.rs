//! jsdev: read Linux joystick devices.
//!
//! Opens a joydev node (`/dev/input/js*`), answers capability queries (axes, buttons, name,
//! axis map, driver version) and decodes the raw event stream into [`InputEvent`] values.
//! A [`DeviceHandle`] owns its descriptor exclusively and releases it on close or drop.

pub mod backends;
pub mod config;
pub mod device;
pub mod error;
pub mod event;
pub mod handle;
pub mod metadata;
pub mod protocol;
pub mod state;

pub use config::*;
pub use device::*;
pub use error::*;
pub use event::*;
pub use handle::*;
pub use metadata::*;
pub use protocol::Version;
pub use state::*;
