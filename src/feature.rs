//! Chip-level feature reports: status, clock, reset, mode, identification.

use crate::consts::{self, setting};
use crate::device::Ft260;
use crate::error::{Error, Result};
use crate::status::I2cStatus;
use crate::transport::HidTransport;
use log::{debug, trace, warn};

/// Chip identification from the chip code report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipVersion {
    /// 0x0260 for an FT260.
    pub part_number: u16,
    pub minor: u8,
    pub major: u8,
    raw: [u8; consts::CHIP_CODE_REPORT_SIZE],
}

impl ChipVersion {
    pub fn from_report(raw: [u8; consts::CHIP_CODE_REPORT_SIZE]) -> Self {
        ChipVersion {
            part_number: u16::from_be_bytes([raw[1], raw[2]]),
            minor: raw[3],
            major: raw[4],
            raw,
        }
    }

    pub fn is_ft260(&self) -> bool {
        self.part_number == consts::FT260_PART_NUMBER
    }

    /// The complete report, including the report id.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }
}

/// Decoded head of the system status report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemSnapshot {
    /// DCNF0/DCNF1 strap mode.
    pub chip_mode: u8,
    /// 0 = 12 MHz, 1 = 24 MHz, 2 = 48 MHz.
    pub clock_control: u8,
    pub suspended: bool,
    pub pwren: bool,
    pub i2c_enabled: bool,
    pub uart_mode: u8,
    pub hid_over_i2c_enabled: bool,
}

impl SystemSnapshot {
    pub fn from_report(raw: &[u8; consts::SYSTEM_STATUS_REPORT_SIZE]) -> Self {
        SystemSnapshot {
            chip_mode: raw[1],
            clock_control: raw[2],
            suspended: raw[3] != 0,
            pwren: raw[4] != 0,
            i2c_enabled: raw[5] != 0,
            uart_mode: raw[6],
            hid_over_i2c_enabled: raw[7] != 0,
        }
    }

    /// System clock in MHz, if `clock_control` holds a known value.
    pub fn system_clock_mhz(&self) -> Option<u8> {
        match self.clock_control {
            0 => Some(12),
            1 => Some(24),
            2 => Some(48),
            _ => None,
        }
    }
}

pub(crate) fn set_clock_report(clock_khz: u16) -> [u8; 4] {
    let [hi, lo] = clock_khz.to_be_bytes();
    [consts::REPORT_ID_SYSTEM_SETTING, setting::I2C_SPEED, hi, lo]
}

pub(crate) fn reset_report() -> [u8; 2] {
    [consts::REPORT_ID_SYSTEM_SETTING, setting::I2C_RESET]
}

pub(crate) fn enable_i2c_mode_report() -> [u8; 3] {
    [consts::REPORT_ID_SYSTEM_SETTING, setting::I2C_MODE, 0x01]
}

/// Splits a status response into status byte and clock.
pub(crate) fn parse_status_report(buf: &[u8], len: usize) -> Result<(I2cStatus, u16)> {
    if len < 4 || buf.len() < 4 {
        return Err(Error::InvalidReport(len));
    }
    if buf[0] != consts::REPORT_ID_I2C_STATUS {
        return Err(Error::UnexpectedReportId {
            expected: consts::REPORT_ID_I2C_STATUS,
            actual: buf[0],
        });
    }
    Ok((
        I2cStatus::from_raw(buf[1]),
        u16::from_be_bytes([buf[2], buf[3]]),
    ))
}

impl<T: HidTransport> Ft260<T> {
    fn read_feature<const N: usize>(&self, report_id: u8, min_len: usize) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        buf[0] = report_id;
        let len = self.transport()?.get_feature_report(&mut buf)?;
        if len < min_len {
            warn!(
                "Feature report 0x{:02X} returned {} bytes (expected {})",
                report_id, len, N
            );
            return Err(Error::InvalidReport(len));
        }
        if buf[0] != report_id {
            warn!(
                "get_feature_report returned unexpected report ID: {:02X}",
                buf[0]
            );
            return Err(Error::UnexpectedReportId {
                expected: report_id,
                actual: buf[0],
            });
        }
        Ok(buf)
    }

    fn write_feature(&self, report: &[u8]) -> Result<()> {
        trace!("Writing Feature Report: {:02X?}", report);
        self.transport()?.send_feature_report(report)
    }

    /// Queries the I2C controller status and refreshes the cached clock.
    pub fn get_status(&mut self) -> Result<I2cStatus> {
        let buf: [u8; consts::I2C_STATUS_REPORT_SIZE] =
            self.read_feature(consts::REPORT_ID_I2C_STATUS, 4)?;
        let (status, clock_khz) = parse_status_report(&buf, buf.len())?;
        self.clock_khz = clock_khz;
        trace!("I2C status {} clock {} kHz", status, clock_khz);
        Ok(status)
    }

    /// Queries the chip and returns the current I2C clock in kHz.
    pub fn get_clock_khz(&mut self) -> Result<u16> {
        self.get_status()?;
        Ok(self.clock_khz)
    }

    /// Sets the I2C clock and verifies the chip adopted it.
    ///
    /// Returns [`Error::SettingNotApplied`] when the read-back differs; the
    /// cached clock then holds the value the chip actually runs at.
    pub fn set_clock(&mut self, clock_khz: u16) -> Result<()> {
        debug!("Setting I2C clock to {} kHz", clock_khz);
        self.write_feature(&set_clock_report(clock_khz))?;
        self.get_status()?;
        if self.clock_khz != clock_khz {
            warn!(
                "I2C clock not applied: requested {} kHz, running at {} kHz",
                clock_khz, self.clock_khz
            );
            return Err(Error::SettingNotApplied {
                requested: clock_khz,
                actual: self.clock_khz,
            });
        }
        Ok(())
    }

    /// Resets the I2C master controller.
    pub fn reset(&mut self) -> Result<()> {
        debug!("Resetting I2C controller");
        self.write_feature(&reset_report())
    }

    /// Switches the chip into I2C mode.
    pub fn enable_i2c_mode(&mut self) -> Result<()> {
        self.write_feature(&enable_i2c_mode_report())
    }

    pub fn get_chip_id(&mut self) -> Result<ChipVersion> {
        let buf = self.read_feature(consts::REPORT_ID_CHIP_CODE, 5)?;
        Ok(ChipVersion::from_report(buf))
    }

    pub fn get_system_snapshot(&mut self) -> Result<SystemSnapshot> {
        let buf = self.read_feature(consts::REPORT_ID_SYSTEM_SETTING, 8)?;
        Ok(SystemSnapshot::from_report(&buf))
    }
}
