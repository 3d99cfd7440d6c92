//! Bring-up, clock handling and teardown against the simulated chip.

mod common;

use common::{open, test_config, SimChip};
use ft260_hid::{BringupStage, Error, ErrorKind, Ft260, I2cAddress};

#[test]
fn test_bringup_sequence() {
    let chip = SimChip::new();
    chip.state().clock_khz = 400;
    let device = open(&chip);

    assert!(device.is_open());
    assert_eq!(device.path(), "/dev/hidraw-sim");
    assert_eq!(device.info().raw_name, "FTDI FT260");
    assert_eq!(device.info().vendor_id, 0x0403);
    assert_eq!(device.clock_khz(), 400);

    let s = chip.state();
    // Reset comes before the mode switch
    assert_eq!(s.feature_writes, vec![vec![0xA1, 0x20], vec![0xA1, 0x02, 0x01]]);
    assert!(s.i2c_mode);
    assert!(s.output_reports.is_empty());
}

#[test]
fn test_failed_chip_id_closes_transport() {
    let chip = SimChip::new();
    chip.state().fail_get_feature = Some(0xA0);

    let result = Ft260::from_transport(chip.transport(), "/dev/hidraw-sim", test_config());
    match result {
        Err(Error::BringupFailed { stage, source }) => {
            assert_eq!(stage, BringupStage::ReadChipId);
            assert_eq!(source.kind(), ErrorKind::IoFailure);
        }
        other => panic!("expected bring-up failure, got {:?}", other),
    }
    assert!(chip.is_closed());
    assert_eq!(chip.state().resets, 0);
}

#[test]
fn test_failed_status_read_reports_stage() {
    let chip = SimChip::new();
    chip.state().fail_get_feature = Some(0xC0);

    let err = Ft260::from_transport(chip.transport(), "/dev/hidraw-sim", test_config())
        .unwrap_err();
    assert!(matches!(
        err,
        Error::BringupFailed {
            stage: BringupStage::ReadClock,
            ..
        }
    ));
    assert_eq!(err.kind(), ErrorKind::BringupFailed);
    assert!(chip.is_closed());
}

#[test]
fn test_close_twice() {
    let chip = SimChip::new();
    let mut device = open(&chip);

    assert!(device.close().is_ok());
    assert!(chip.is_closed());
    assert!(!device.is_open());
    assert!(matches!(device.close(), Err(Error::AlreadyClosed)));
}

#[test]
fn test_operations_after_close_fail() {
    let chip = SimChip::new().with_slave(0x50);
    let mut device = open(&chip);
    device.close().unwrap();

    let addr = I2cAddress::new_7bit(0x50).unwrap();
    assert!(matches!(device.get_status(), Err(Error::TransportUnavailable)));
    assert!(matches!(
        device.i2c_write(addr, &[1], true),
        Err(Error::TransportUnavailable)
    ));
    let mut buf = [0u8; 1];
    assert!(matches!(
        device.i2c_read(addr, &mut buf, true),
        Err(Error::TransportUnavailable)
    ));
    assert!(matches!(device.reset(), Err(Error::TransportUnavailable)));
    assert!(matches!(device.set_clock(100), Err(Error::TransportUnavailable)));
}

#[test]
fn test_drop_closes_transport() {
    let chip = SimChip::new();
    let device = open(&chip);
    assert!(!chip.is_closed());
    drop(device);
    assert!(chip.is_closed());
}

#[test]
fn test_set_clock_applied() {
    let chip = SimChip::new();
    let mut device = open(&chip);

    device.set_clock(3400).unwrap();
    assert_eq!(device.clock_khz(), 3400);
    assert_eq!(device.get_clock_khz().unwrap(), 3400);
    assert_eq!(
        chip.state().feature_writes.last().unwrap(),
        &vec![0xA1, 0x22, 0x0D, 0x48]
    );
}

#[test]
fn test_set_clock_clamped() {
    let chip = SimChip::new();
    chip.state().max_clock_khz = Some(400);
    let mut device = open(&chip);

    match device.set_clock(3400) {
        Err(Error::SettingNotApplied { requested, actual }) => {
            assert_eq!(requested, 3400);
            assert_eq!(actual, 400);
        }
        other => panic!("expected SettingNotApplied, got {:?}", other),
    }
    assert_eq!(device.clock_khz(), 400);
}

#[test]
fn test_chip_identification() {
    let chip = SimChip::new();
    let mut device = open(&chip);

    let version = device.get_chip_id().unwrap();
    assert!(version.is_ft260());
    assert_eq!(version.raw()[0], 0xA0);

    let snapshot = device.get_system_snapshot().unwrap();
    assert!(snapshot.i2c_enabled);
    assert_eq!(snapshot.system_clock_mhz(), Some(48));
}
