use regrow_core::config::{GrowpartConfig, Mode, RegrowConfig};
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn missing_file_gives_defaults() {
    let dir = tempdir().unwrap();
    let cfg = RegrowConfig::load(&dir.path().join("regrow.toml")).unwrap();
    assert_eq!(cfg, RegrowConfig::default());
    assert_eq!(cfg.growpart(), GrowpartConfig::default());
    assert_eq!(cfg.growpart().devices, vec!["/".to_string()]);
    assert_eq!(cfg.growpart().mode, Mode::Auto);
}

#[test]
fn missing_table_gives_defaults() {
    let cfg = RegrowConfig::parse("").unwrap();
    assert!(cfg.growpart.is_none());
    assert_eq!(cfg.growpart(), GrowpartConfig::default());
}

#[test]
fn full_table_is_loaded() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("regrow.toml");
    fs::write(
        &path,
        r#"
[growpart]
mode = "gpart"
devices = ["/", "/var/lib/data", "/dev/vtbd1p1"]
ignore_growroot_disabled = true
probe_timeout_secs = 5
resize_timeout_secs = 120
"#,
    )
    .unwrap();

    let cfg = RegrowConfig::load(&path).unwrap().growpart();
    assert_eq!(cfg.mode, Mode::Named("gpart".to_string()));
    assert_eq!(cfg.devices, vec!["/", "/var/lib/data", "/dev/vtbd1p1"]);
    assert!(cfg.ignore_growroot_disabled);
    assert_eq!(cfg.timeouts().probe, Duration::from_secs(5));
    assert_eq!(cfg.timeouts().resize, Duration::from_secs(120));
}

#[test]
fn partial_table_keeps_other_defaults() {
    let cfg = RegrowConfig::parse("[growpart]\ndevices = [\"/srv\"]\n")
        .unwrap()
        .growpart();
    assert_eq!(cfg.mode, Mode::Auto);
    assert_eq!(cfg.devices, vec!["/srv"]);
    assert!(!cfg.ignore_growroot_disabled);
}

#[test]
fn legacy_false_modes_mean_off() {
    for value in ["false", "\"false\"", "\"no\"", "\"0\"", "\"off\"", "\"OFF\""] {
        let cfg = RegrowConfig::parse(&format!("[growpart]\nmode = {}\n", value))
            .unwrap()
            .growpart();
        assert_eq!(cfg.mode, Mode::Off, "mode = {}", value);
    }
}

#[test]
fn empty_device_list_is_kept() {
    let cfg = RegrowConfig::parse("[growpart]\ndevices = []\n")
        .unwrap()
        .growpart();
    assert!(cfg.devices.is_empty());
}

#[test]
fn malformed_config_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("regrow.toml");
    fs::write(&path, "growpart = \"yes\"\n").unwrap();
    let err = RegrowConfig::load(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("invalid config"));

    assert!(RegrowConfig::parse("[growpart]\ndevices = \"/\"\n").is_err());
    assert!(RegrowConfig::parse("[growpart]\nmodes = \"auto\"\n").is_err());
}

#[test]
fn zero_timeouts_are_rejected() {
    let err = RegrowConfig::parse("[growpart]\nprobe_timeout_secs = 0\n").unwrap_err();
    let message = format!("{:#}", err);
    assert!(message.contains("invalid [growpart] table"));
    assert!(message.contains("probe_timeout_secs must be greater than zero"));

    let dir = tempdir().unwrap();
    let path = dir.path().join("regrow.toml");
    fs::write(&path, "[growpart]\nresize_timeout_secs = 0\n").unwrap();
    let err = RegrowConfig::load(&path).unwrap_err();
    let message = format!("{:#}", err);
    assert!(message.contains("invalid config"));
    assert!(message.contains("resize_timeout_secs must be greater than zero"));
}
