//! Last-known control values.
//!
//! [`JoystickState`] folds a stream of [`InputEvent`]s into the current value of every axis and
//! button. Init events count the same as live ones, so after the driver's initial replay the
//! state matches the hardware. Events for indices outside the sized range grow the state rather
//! than being dropped.

use serde::{Deserialize, Serialize};

use crate::device::JoystickDevice;
use crate::error::Result;
use crate::event::{EventType, InputEvent};
use crate::handle::DeviceHandle;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoystickState {
    pub axes: Vec<i16>,
    pub buttons: Vec<bool>,
    /// Timestamp of the last applied event.
    pub time: u32,
}

impl JoystickState {
    pub fn new(axes: u8, buttons: u8) -> Self {
        Self {
            axes: vec![0; usize::from(axes)],
            buttons: vec![false; usize::from(buttons)],
            time: 0,
        }
    }

    /// Size the state from an open handle's capabilities.
    pub fn for_handle<D: JoystickDevice>(handle: &DeviceHandle<D>) -> Result<Self> {
        Ok(Self::new(handle.axes()?, handle.buttons()?))
    }

    /// Apply one event. Returns `false` for event types that carry no axis/button state.
    pub fn apply(&mut self, event: &InputEvent) -> bool {
        let idx = usize::from(event.number());
        match event.base_type() {
            EventType::Axis => {
                if idx >= self.axes.len() {
                    self.axes.resize(idx + 1, 0);
                }
                self.axes[idx] = event.value();
            }
            EventType::Button => {
                if idx >= self.buttons.len() {
                    self.buttons.resize(idx + 1, false);
                }
                self.buttons[idx] = event.value() != 0;
            }
            EventType::Unknown(_) => return false,
        }
        self.time = event.time();
        true
    }

    /// Value of an axis (0 if never reported).
    pub fn axis(&self, idx: u8) -> i16 {
        self.axes.get(usize::from(idx)).copied().unwrap_or(0)
    }

    /// State of a button (`false` if never reported).
    pub fn button(&self, idx: u8) -> bool {
        self.buttons.get(usize::from(idx)).copied().unwrap_or(false)
    }

    pub fn pressed(&self) -> impl Iterator<Item = u8> + '_ {
        self.buttons
            .iter()
            .enumerate()
            .filter(|&(_, &down)| down)
            .map(|(i, _)| i as u8)
    }
}
