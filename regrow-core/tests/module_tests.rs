use regrow_core::config::{GrowpartConfig, Mode};
use regrow_core::errors::SelectError;
use regrow_core::module::{handle, RunDisposition, RunOptions};
use regrow_core::report::ResizeAction;
use regrow_hal::{DeviceKind, FakeCommand, FakeHal};
use tempfile::{tempdir, TempDir};

const GROWPART_HELP: &str = "    -u | --update  R  update the the kernel partition table info after growing\n";
const SENTINEL: &str = "/etc/growroot-disabled";

fn host() -> FakeHal {
    let hal = FakeHal::new();
    hal.set_mountinfo("22 1 253:1 / / rw - ext4 /dev/vda1 rw\n");
    hal.add_device("/dev/vda", DeviceKind::Block);
    hal.add_device("/dev/vda1", DeviceKind::Block);
    hal.add_symlink("/sys/class/block/vda1", "/sys/devices/virtio2/block/vda/vda1");
    hal.add_attribute("/sys/devices/virtio2/block/vda/vda1/partition", "1\n");
    hal.add_attribute("/sys/devices/virtio2/block/vda/dev", "253:0\n");
    hal.add_symlink("/dev/block/253:0", "/dev/vda");
    hal.set_device_sizes("/dev/vda1", &[8 << 30, 16 << 30]);
    hal.script_command("growpart", &["--help"], FakeCommand::ok().with_stdout(GROWPART_HELP));
    hal.remove_program("gpart");
    hal
}

fn options() -> (RunOptions, TempDir) {
    let scratch = tempdir().unwrap();
    let opts = RunOptions {
        sentinel: SENTINEL.into(),
        scratch_base: scratch.path().to_path_buf(),
    };
    (opts, scratch)
}

fn config(mode: Mode) -> GrowpartConfig {
    GrowpartConfig {
        mode,
        ..GrowpartConfig::default()
    }
}

#[test]
fn default_config_grows_root() {
    let hal = host();
    let (opts, _scratch) = options();

    let disposition = handle(&GrowpartConfig::default(), &hal, &opts).unwrap();

    let report = match disposition {
        RunDisposition::Completed(report) => report,
        other => panic!("expected a completed run, got {:?}", other),
    };
    assert_eq!(report.len(), 1);
    assert_eq!(report.entries[0].entry, "/");
    assert_eq!(report.entries[0].outcome.action, ResizeAction::Changed);
}

#[test]
fn mode_off_does_nothing() {
    let hal = host();
    let (opts, _scratch) = options();

    let disposition = handle(&config(Mode::Off), &hal, &opts).unwrap();

    assert!(matches!(disposition, RunDisposition::Disabled(_)));
    assert!(hal.operations().is_empty());
}

#[test]
fn sentinel_disables_run() {
    let hal = host();
    hal.add_file(SENTINEL);
    let (opts, _scratch) = options();

    let disposition = handle(&GrowpartConfig::default(), &hal, &opts).unwrap();

    match disposition {
        RunDisposition::Disabled(reason) => assert!(reason.contains(SENTINEL)),
        other => panic!("expected disabled, got {:?}", other),
    }
    assert!(hal.operations().is_empty());
}

#[test]
fn sentinel_can_be_ignored() {
    let hal = host();
    hal.add_file(SENTINEL);
    let (opts, _scratch) = options();
    let cfg = GrowpartConfig {
        ignore_growroot_disabled: true,
        ..GrowpartConfig::default()
    };

    let disposition = handle(&cfg, &hal, &opts).unwrap();

    assert!(matches!(disposition, RunDisposition::Completed(_)));
}

#[test]
fn empty_device_list_stops_early() {
    let hal = host();
    let (opts, _scratch) = options();
    let cfg = GrowpartConfig {
        devices: Vec::new(),
        ..GrowpartConfig::default()
    };

    let disposition = handle(&cfg, &hal, &opts).unwrap();

    assert!(matches!(disposition, RunDisposition::NoDevices));
    assert!(hal.operations().is_empty());
}

#[test]
fn auto_without_backend_stops_quietly() {
    let hal = host();
    hal.remove_program("growpart");
    let (opts, _scratch) = options();

    let disposition = handle(&GrowpartConfig::default(), &hal, &opts).unwrap();

    match disposition {
        RunDisposition::NoBackend(err) => {
            assert!(err.is_no_backend());
            assert_eq!(err, SelectError::NoBackendAvailable);
        }
        other => panic!("expected no backend, got {:?}", other),
    }
    assert_eq!(hal.command_count("growpart", &["--dry-run"]), 0);
}

#[test]
fn explicit_unavailable_mode_is_an_error() {
    let hal = host();
    let (opts, _scratch) = options();

    let err = handle(&config(Mode::Named("gpart".to_string())), &hal, &opts).unwrap_err();

    assert_eq!(
        err.downcast_ref::<SelectError>(),
        Some(&SelectError::ModeUnavailable("gpart".to_string()))
    );
}

#[test]
fn explicit_unknown_mode_is_an_error() {
    let hal = host();
    let (opts, _scratch) = options();

    let err = handle(&config(Mode::Named("parted".to_string())), &hal, &opts).unwrap_err();

    assert_eq!(err.to_string(), "unknown resize mode parted");
}

#[test]
fn explicit_available_mode_runs() {
    let hal = host();
    let (opts, _scratch) = options();

    let disposition = handle(&config(Mode::Named("growpart".to_string())), &hal, &opts).unwrap();

    assert!(matches!(disposition, RunDisposition::Completed(_)));
    assert_eq!(hal.command_count("growpart", &["/dev/vda", "1"]), 1);
}

#[test]
fn unresolvable_entries_are_reported_not_fatal() {
    let hal = host();
    let (opts, _scratch) = options();
    let cfg = GrowpartConfig {
        devices: vec!["/nonexistent".to_string(), "/".to_string()],
        ..GrowpartConfig::default()
    };

    let RunDisposition::Completed(report) = handle(&cfg, &hal, &opts).unwrap() else {
        panic!("expected a completed run");
    };
    assert_eq!(
        report.actions(),
        vec![ResizeAction::Skipped, ResizeAction::Changed]
    );
}
