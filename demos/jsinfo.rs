use jsdev::backends::probe_paths;
use jsdev::{DeviceHandle, OpenConfig};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let paths = match std::env::args().nth(1) {
        Some(path) => vec![std::path::PathBuf::from(path)],
        None => probe_paths()?,
    };
    if paths.is_empty() {
        println!("No joystick nodes found under /dev/input");
        return Ok(());
    }

    let config = OpenConfig::load("jsdev.toml")?;
    for path in paths {
        match DeviceHandle::open_with(&path, &config) {
            Ok(js) => {
                let info = js.describe()?;
                println!("{}", serde_json::to_string_pretty(&info)?);
            }
            Err(e) => eprintln!("{e}"),
        }
    }
    Ok(())
}
