//! Tests against real descriptors.
//!
//! Regular files and FIFOs stand in for joydev nodes: reads behave like the event stream and
//! every joystick ioctl fails with `ENOTTY`.

use std::ffi::CString;
use std::fs::OpenOptions;
use std::io::Write;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use jsdev::protocol::encode_event;
use jsdev::{
    DeviceHandle, Error, EventType, InputEvent, OpenConfig, OpenErrorReason, QueryError,
    ReadErrorReason,
};

/// Test processes hold more descriptors than a game would; don't trip the slot bound.
fn roomy() -> OpenConfig {
    OpenConfig::default().device_slots(1 << 20)
}

fn fd_target(fd: i32) -> Option<PathBuf> {
    std::fs::read_link(format!("/proc/self/fd/{fd}")).ok()
}

fn mkfifo(path: &Path) {
    let c = CString::new(path.as_os_str().as_bytes()).unwrap();
    let rc = unsafe { libc::mkfifo(c.as_ptr(), 0o600) };
    assert_eq!(rc, 0, "mkfifo failed: {}", std::io::Error::last_os_error());
}

#[test]
fn open_then_close_releases_the_descriptor() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let path = file.path().canonicalize().unwrap();

    let mut js = DeviceHandle::open_with(&path, &roomy()).unwrap();
    let fd = js.raw_fd().unwrap().expect("joydev handles expose a descriptor");
    assert_eq!(fd_target(fd).as_deref(), Some(path.as_path()));

    js.close();
    assert_ne!(fd_target(fd).as_deref(), Some(path.as_path()));
    js.close();
}

#[test]
fn drop_releases_the_descriptor() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let path = file.path().canonicalize().unwrap();

    let fd = {
        let js = DeviceHandle::open_with(&path, &roomy()).unwrap();
        js.raw_fd().unwrap().unwrap()
    };
    assert_ne!(fd_target(fd).as_deref(), Some(path.as_path()));
}

#[test]
fn missing_node_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let err = DeviceHandle::open(dir.path().join("js9")).unwrap_err();
    match err {
        Error::Open(e) => assert_eq!(e.reason, OpenErrorReason::NotFound),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn descriptor_beyond_slots_is_refused_and_released() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let err = DeviceHandle::open_with(file.path(), &OpenConfig::default().device_slots(0))
        .unwrap_err();
    let Error::Open(e) = err else {
        panic!("expected an open error");
    };
    let OpenErrorReason::TooManyDevices { fd, slots } = e.reason else {
        panic!("expected TooManyDevices, got {:?}", e.reason);
    };
    assert_eq!(slots, 0);
    let path = file.path().canonicalize().unwrap();
    assert_ne!(fd_target(fd).as_deref(), Some(path.as_path()));
}

#[test]
fn ioctls_on_a_non_joystick_are_query_errors() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let js = DeviceHandle::open_with(file.path(), &roomy()).unwrap();

    assert_eq!(
        js.axes().unwrap_err(),
        Error::Query(QueryError {
            operation: "axes",
            errno: libc::ENOTTY
        })
    );
    assert_eq!(js.name().unwrap_err().errno(), Some(libc::ENOTTY));
    assert_eq!(js.version().unwrap_err().errno(), Some(libc::ENOTTY));
}

#[test]
fn records_in_a_file_decode_in_order() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&encode_event(&InputEvent::button(1000, 3, true)))
        .unwrap();
    file.write_all(&encode_event(&InputEvent::axis(1010, 0, -4000)))
        .unwrap();
    file.write_all(&[0xde, 0xad, 0xbe]).unwrap();
    file.flush().unwrap();

    let mut js = DeviceHandle::open_with(file.path(), &roomy()).unwrap();

    let ev = js.next_event().unwrap().unwrap();
    assert_eq!(
        (ev.time(), ev.event_type(), ev.number(), ev.value()),
        (1000, EventType::Button, 3, 1)
    );
    let ev = js.next_event().unwrap().unwrap();
    assert_eq!(ev.event_type(), EventType::Axis);
    assert_eq!(ev.value(), -4000);

    let err = js.next_event().unwrap_err();
    let Error::Read(e) = err else {
        panic!("expected a read error");
    };
    assert_eq!(e.reason, ReadErrorReason::ShortRead { got: 3 });

    assert_eq!(js.next_event().unwrap(), None);
}

#[test]
fn nonblocking_fifo_without_data_yields_none() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("js0");
    mkfifo(&path);

    let mut js = DeviceHandle::open_with(&path, &roomy().nonblocking(true)).unwrap();
    let mut writer = OpenOptions::new().write(true).open(&path).unwrap();

    assert_eq!(js.next_event().unwrap(), None);
    assert!(!js.wait_readable(Some(std::time::Duration::ZERO)).unwrap());

    writer
        .write_all(&encode_event(&InputEvent::axis(77, 1, 15)))
        .unwrap();
    assert!(js
        .wait_readable(Some(std::time::Duration::from_secs(5)))
        .unwrap());
    let ev = js.next_event().unwrap().unwrap();
    assert_eq!((ev.time(), ev.number(), ev.value()), (77, 1, 15));

    writer.write_all(&[1, 2, 3]).unwrap();
    let err = js.next_event().unwrap_err();
    assert!(matches!(
        err,
        Error::Read(e) if e.reason == ReadErrorReason::ShortRead { got: 3 }
    ));
}

/// Needs a joystick on /dev/input/js0 (run with: cargo test -- --ignored).
#[test]
#[ignore]
fn real_joystick_reports_capabilities() {
    let mut js = DeviceHandle::open_with("/dev/input/js0", &roomy().nonblocking(true)).unwrap();
    let info = js.describe().unwrap();
    println!("{info}");
    assert_eq!(info.axis_map.len(), usize::from(info.axes));

    // The driver replays the initial state right after open.
    let first = js.next_event().unwrap().expect("initial state");
    assert!(first.is_init());
}
