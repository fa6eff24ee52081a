use projector_link::domain::model::{DataBits, Parity, StopBits};
use projector_link::{Catalog, MockOpener, Overrides, Projector};
use std::path::PathBuf;

fn bundled_catalog() -> Catalog {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("projector_configs");
    Catalog::load(dir).unwrap()
}

#[test]
fn test_bundled_benq_profile_end_to_end() {
    let catalog = bundled_catalog();
    assert!(catalog.contains("benq"));

    let opener = MockOpener::new();
    let handle = opener.handle();
    handle.reply_to("\r*pow=?#\r", "\r*POW=ON#\r\n");

    let overrides = Overrides::from_pairs(&["wait_time=0"]).unwrap();
    let mut projector = Projector::open(&catalog, "benq", Some("/dev/ttyUSB0"), &overrides, &opener).unwrap();

    let settings = projector.settings().clone();
    assert_eq!(settings.baudrate, 115200);
    assert_eq!(settings.bytesize, DataBits::Eight);
    assert_eq!(settings.parity, Parity::None);
    assert_eq!(settings.stopbits, StopBits::One);

    let response = projector.dispatch("pow", "?").unwrap();
    assert_eq!(response, "\r*POW=ON#\r\n");

    projector.dispatch("mute", "on").unwrap();
    assert_eq!(handle.writes(), vec!["\r*pow=?#\r", "\r*mute=on#\r"]);

    projector.close().unwrap();
    assert!(handle.is_closed());
}

#[test]
fn test_bundled_profiles_all_resolve() {
    let catalog = bundled_catalog();

    for device_id in catalog.device_ids() {
        let profile = catalog.resolve(device_id, &Overrides::new()).unwrap();
        assert!(!profile.command_table().unwrap().is_empty(), "{} has no commands", device_id);
        assert!(profile.wait_time().is_ok(), "{} has no wait_time", device_id);
    }
}

#[test]
fn test_bundled_toml_profile() {
    let catalog = bundled_catalog();
    let opener = MockOpener::new();
    let handle = opener.handle();
    handle.reply_to("PWR ?\r", "PWR=01\r:");

    let overrides = Overrides::from_pairs(&["wait_time=0"]).unwrap();
    let mut projector = Projector::open(&catalog, "epson", Some("COM3"), &overrides, &opener).unwrap();

    assert_eq!(projector.settings().baudrate, 9600);
    assert_eq!(projector.dispatch("PWR", "?").unwrap(), "PWR=01\r:");
    assert_eq!(handle.writes(), vec!["PWR ?\r"]);
}
