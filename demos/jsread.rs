use std::time::Duration;

use jsdev::{DeviceHandle, JoystickState, OpenConfig};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/dev/input/js0".to_string());
    let config = OpenConfig::load("jsdev.toml")?.nonblocking(true);

    let mut js = DeviceHandle::open_with(&path, &config)?;
    println!("{}", js.describe()?);

    let mut state = JoystickState::for_handle(&js)?;
    loop {
        // Block in poll(2) between bursts
        if !js.wait_readable(Some(Duration::from_millis(500)))? {
            continue;
        }
        for ev in js.events() {
            let ev = ev?;
            state.apply(&ev);
            println!("{ev}");
        }
        let pressed: Vec<_> = state.pressed().collect();
        println!("  axes={:?} pressed={:?}", state.axes, pressed);
    }
}
