//! I2C transaction engine: framing, wait-for-idle, status classification.

use crate::consts::i2c::{self as c, out_flags};
use crate::device::Ft260;
use crate::error::{Error, Result};
use crate::status::I2cStatus;
use crate::transport::HidTransport;
use log::{debug, trace, warn};
use std::fmt;
use std::thread;
use std::time::Instant;

/// Target of an I2C transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum I2cAddress {
    /// Standard 7-bit address (0x00 - 0x7F), without the R/W bit.
    Bit7(u8),
    /// No address: START is suppressed and the transfer continues the
    /// previous one on a bus that was left acquired.
    NoStart,
}

impl I2cAddress {
    /// Creates a 7-bit address, checking validity (0-127).
    pub fn new_7bit(addr: u8) -> Result<Self> {
        if addr <= 0x7F {
            Ok(I2cAddress::Bit7(addr))
        } else {
            Err(Error::ArgumentOutOfRange(
                "7-bit I2C address must be 0-127".to_string(),
            ))
        }
    }

    /// Maps a raw 16-bit value; 0xFFFF is the "no START" sentinel.
    pub fn from_raw(raw: u16) -> Result<Self> {
        if raw == c::NO_START_ADDRESS {
            return Ok(I2cAddress::NoStart);
        }
        u8::try_from(raw)
            .map_err(|_| {
                Error::ArgumentOutOfRange(format!("I2C address 0x{:04X} out of range", raw))
            })
            .and_then(Self::new_7bit)
    }

    /// Address byte and flags byte of a request frame.
    fn frame_fields(self, release_bus: bool) -> (u8, u8) {
        let (addr_byte, mut flags) = match self {
            I2cAddress::Bit7(a) => (a, out_flags::START_BIT),
            I2cAddress::NoStart => (0, 0),
        };
        if release_bus {
            flags |= out_flags::STOP_BIT;
        }
        (addr_byte, flags)
    }
}

impl fmt::Display for I2cAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            I2cAddress::Bit7(a) => write!(f, "7-bit 0x{:02X}", a),
            I2cAddress::NoStart => f.write_str("(no start)"),
        }
    }
}

/// Slot size covering `len` payload bytes: the smallest multiple of 4 in 4..=60.
pub(crate) fn write_slot_size(len: usize) -> Result<usize> {
    if len > c::REPORT_MAX_DATA_SIZE {
        return Err(Error::ProtocolLimitExceeded {
            max: c::REPORT_MAX_DATA_SIZE,
            actual: len,
        });
    }
    Ok(len.div_ceil(4).max(1) * 4)
}

/// Report id of the write report carrying `len` payload bytes.
pub(crate) fn write_report_id(len: usize) -> Result<u8> {
    let slot = write_slot_size(len)?;
    Ok(c::REPORT_ID_DATA_FIRST + (slot / 4 - 1) as u8)
}

pub(crate) fn read_request(
    address: I2cAddress,
    len: u16,
    release_bus: bool,
) -> [u8; c::READ_REQUEST_SIZE] {
    let (addr_byte, flags) = address.frame_fields(release_bus);
    let [hi, lo] = len.to_be_bytes();
    [c::REPORT_ID_READ_REQUEST, addr_byte, flags, hi, lo]
}

/// One I2C write output report, bounded to the largest report slot.
pub(crate) struct WriteFrame {
    buf: [u8; c::REPORT_SLOT_SIZE],
    len: usize,
}

impl WriteFrame {
    pub(crate) fn new(address: I2cAddress, data: &[u8], release_bus: bool) -> Result<Self> {
        let report_id = write_report_id(data.len())?;
        let (addr_byte, flags) = address.frame_fields(release_bus);
        let mut buf = [0u8; c::REPORT_SLOT_SIZE];
        buf[0] = report_id;
        buf[1] = addr_byte;
        buf[2] = flags;
        buf[3] = data.len() as u8;
        let len = c::WRITE_HEADER_SIZE + data.len();
        buf[c::WRITE_HEADER_SIZE..len].copy_from_slice(data);
        Ok(WriteFrame { buf, len })
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

impl<T: HidTransport> Ft260<T> {
    // --- I2C Methods ---

    /// Writes up to 60 bytes to `address`.
    ///
    /// Waits for the controller to be idle before and after sending. If
    /// `release_bus` is false the bus stays acquired for a follow-up transfer.
    pub fn i2c_write(
        &mut self,
        address: I2cAddress,
        data: &[u8],
        release_bus: bool,
    ) -> Result<()> {
        let frame = WriteFrame::new(address, data, release_bus)?;
        self.transport()?;

        self.wait_idle(address)?;

        let out = frame.as_bytes();
        let written = self.transport()?.write_report(out)?;
        debug!(
            "Wrote {} bytes to {} {}start {}stop",
            written,
            address,
            if out[2] & out_flags::START_BIT != 0 { "" } else { "!" },
            if release_bus { "" } else { "!" }
        );
        if written != out.len() {
            warn!("Partial write: sent {} of {} bytes", written, out.len());
            return Err(Error::ShortWrite {
                expected: out.len(),
                actual: written,
            });
        }

        self.wait_idle(address)?;
        let status = self.get_status()?;
        check_status(address, status)
    }

    /// Reads `buffer.len()` bytes from `address`.
    ///
    /// `buffer` is left untouched unless the whole transfer succeeds.
    pub fn i2c_read(
        &mut self,
        address: I2cAddress,
        buffer: &mut [u8],
        release_bus: bool,
    ) -> Result<()> {
        let len = u16::try_from(buffer.len()).map_err(|_| Error::ProtocolLimitExceeded {
            max: c::MAX_READ_SIZE,
            actual: buffer.len(),
        })?;
        let request = read_request(address, len, release_bus);
        trace!("I2C read request: {:02X?}", request);

        let written = self.transport()?.write_report(&request)?;
        if written != request.len() {
            warn!("Partial write: sent {} of {} bytes", written, request.len());
            return Err(Error::ShortWrite {
                expected: request.len(),
                actual: written,
            });
        }

        let data = self.collect_input(buffer.len())?;
        debug!("Read {} of {} bytes from {}", data.len(), buffer.len(), address);

        let status = self.wait_idle(address)?;
        check_status(address, status)?;

        if data.len() < buffer.len() {
            return Err(Error::ShortRead {
                expected: buffer.len(),
                actual: data.len(),
            });
        }
        buffer.copy_from_slice(&data);
        Ok(())
    }

    /// Writes `write_data` without STOP, then reads into `read_buffer` with
    /// a repeated START and a final STOP.
    pub fn i2c_write_read(
        &mut self,
        address: I2cAddress,
        write_data: &[u8],
        read_buffer: &mut [u8],
    ) -> Result<()> {
        self.i2c_write(address, write_data, false)?;
        self.i2c_read(address, read_buffer, true)
    }

    /// Issues a bare STOP to release a bus left acquired by an earlier transfer.
    pub fn i2c_release_bus(&mut self) -> Result<()> {
        self.i2c_write(I2cAddress::NoStart, &[], true)
    }

    /// Probes 7-bit addresses `start_addr..=end_addr` and returns the ones
    /// that acknowledged. The I2C controller is reset after every failed probe.
    pub fn i2c_scan(&mut self, start_addr: u8, end_addr: u8) -> Result<Vec<u8>> {
        let mut found_devices = Vec::new();
        for addr_7bit in start_addr..=end_addr {
            let address = I2cAddress::new_7bit(addr_7bit)?;
            match self.i2c_write(address, &[], true) {
                Ok(()) => found_devices.push(addr_7bit),
                Err(e) if e.is_retryable() => {
                    trace!("No device at 0x{:02X}: {}", addr_7bit, e);
                    self.reset()?;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(found_devices)
    }

    /// Scans the standard address range (0x08 to 0x77).
    pub fn i2c_scan_default(&mut self) -> Result<Vec<u8>> {
        self.i2c_scan(0x08, 0x77)
    }

    /// Polls status until the controller reports idle.
    pub(crate) fn wait_idle(&mut self, address: I2cAddress) -> Result<I2cStatus> {
        let wait = self.config.wait;
        let started = Instant::now();
        loop {
            let status = self.get_status()?;
            if status.is_idle() {
                return Ok(status);
            }
            if let Some(deadline) = wait.deadline {
                let waited = started.elapsed();
                if waited >= deadline {
                    warn!("Controller not idle after {:?} (status {})", waited, status);
                    return Err(Error::BusTimeout {
                        address,
                        waited_ms: waited.as_millis() as u64,
                    });
                }
            }
            thread::sleep(wait.poll_interval);
        }
    }

    /// Gathers `expected` data bytes from consecutive input reports.
    fn collect_input(&self, expected: usize) -> Result<Vec<u8>> {
        let transport = self.transport()?;
        let timeout_ms = self.config.read_timeout_ms;
        let mut data = Vec::with_capacity(expected);
        let mut report = [0u8; c::REPORT_SLOT_SIZE];
        while data.len() < expected {
            let received = transport.read_report(&mut report, timeout_ms)?;
            if received == 0 {
                break;
            }
            if received < c::IN_REPORT_HEADER_SIZE {
                return Err(Error::InvalidReport(received));
            }
            if !(c::REPORT_ID_DATA_FIRST..=c::REPORT_ID_DATA_LAST).contains(&report[0]) {
                return Err(Error::UnexpectedReportId {
                    expected: c::REPORT_ID_DATA_FIRST,
                    actual: report[0],
                });
            }
            let available = (report[1] as usize).min(received - c::IN_REPORT_HEADER_SIZE);
            let take = available.min(expected - data.len());
            data.extend_from_slice(
                &report[c::IN_REPORT_HEADER_SIZE..c::IN_REPORT_HEADER_SIZE + take],
            );
        }
        Ok(data)
    }
}

/// Maps a post-transaction status onto success or a bus failure.
pub(crate) fn check_status(address: I2cAddress, status: I2cStatus) -> Result<()> {
    let Some(flags) = status.flags() else {
        warn!("I2C controller busy at {}", address);
        return Err(Error::ControllerBusy { address });
    };
    if let Some(condition) = flags.error_condition() {
        debug!("I2C error at {}: {}", address, condition);
        return Err(Error::BusError { address, condition });
    }
    if flags.bus_busy {
        trace!("I2C bus held after transfer to {}", address);
    }
    Ok(())
}
