//! Raw HID channel to the bridge chip.
//!
//! [`HidTransport`] is the seam between the protocol layer and the operating
//! system. The production implementation is `hidapi::HidDevice`; tests plug in
//! a simulated chip instead.

use crate::error::{Error, Result};
use hidapi::{BusType, HidDevice};
use log::trace;
use std::fmt;

/// Longest raw descriptor name kept, matching the kernel's 256-byte buffer.
pub const RAW_NAME_MAX_LEN: usize = 255;

/// Bus the HID device is attached through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BusKind {
    Usb,
    Bluetooth,
    I2c,
    Spi,
    Other,
}

impl fmt::Display for BusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BusKind::Usb => "USB",
            BusKind::Bluetooth => "Bluetooth",
            BusKind::I2c => "I2C",
            BusKind::Spi => "SPI",
            BusKind::Other => "Other",
        })
    }
}

impl From<BusType> for BusKind {
    fn from(bus: BusType) -> Self {
        match bus {
            BusType::Usb => BusKind::Usb,
            BusType::Bluetooth => BusKind::Bluetooth,
            BusType::I2c => BusKind::I2c,
            BusType::Spi => BusKind::Spi,
            _ => BusKind::Other,
        }
    }
}

/// Identification of an opened transport, captured once at bring-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportInfo {
    /// Descriptor name ("manufacturer product"), at most [`RAW_NAME_MAX_LEN`] bytes.
    pub raw_name: String,
    pub bus_type: BusKind,
    pub vendor_id: u16,
    pub product_id: u16,
}

impl TransportInfo {
    pub fn new(raw_name: &str, bus_type: BusKind, vendor_id: u16, product_id: u16) -> Self {
        TransportInfo {
            raw_name: bounded_name(raw_name),
            bus_type,
            vendor_id,
            product_id,
        }
    }
}

/// Truncates on a char boundary so the result never exceeds [`RAW_NAME_MAX_LEN`].
fn bounded_name(name: &str) -> String {
    if name.len() <= RAW_NAME_MAX_LEN {
        return name.to_string();
    }
    let mut end = RAW_NAME_MAX_LEN;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    name[..end].to_string()
}

/// Bidirectional report channel to one HID interface.
///
/// Dropping the transport closes it.
pub trait HidTransport {
    /// Sends an output report (first byte is the report id). Returns bytes written.
    fn write_report(&self, data: &[u8]) -> Result<usize>;

    /// Reads one input report into `buf`, waiting at most `timeout_ms`
    /// (-1 blocks). Returns 0 when nothing arrived in time.
    fn read_report(&self, buf: &mut [u8], timeout_ms: i32) -> Result<usize>;

    /// Sends a feature report (first byte is the report id).
    fn send_feature_report(&self, data: &[u8]) -> Result<()>;

    /// Fetches the feature report whose id is in `buf[0]`. Returns bytes filled.
    fn get_feature_report(&self, buf: &mut [u8]) -> Result<usize>;

    /// Descriptor name and bus identifiers.
    fn info(&self) -> Result<TransportInfo>;
}

impl HidTransport for HidDevice {
    fn write_report(&self, data: &[u8]) -> Result<usize> {
        trace!("HID OUT report: {:02X?}", data);
        Ok(self.write(data)?)
    }

    fn read_report(&self, buf: &mut [u8], timeout_ms: i32) -> Result<usize> {
        let received = self.read_timeout(buf, timeout_ms)?;
        trace!("HID IN report: {:02X?}", &buf[..received]);
        Ok(received)
    }

    fn send_feature_report(&self, data: &[u8]) -> Result<()> {
        trace!("Set Feature Report: {:02X?}", data);
        Ok(HidDevice::send_feature_report(self, data)?)
    }

    fn get_feature_report(&self, buf: &mut [u8]) -> Result<usize> {
        let len = HidDevice::get_feature_report(self, buf)?;
        trace!("Get Feature Report: {:02X?}", &buf[..len.min(buf.len())]);
        Ok(len)
    }

    fn info(&self) -> Result<TransportInfo> {
        let device_info = self.get_device_info().map_err(Error::Hid)?;
        let manufacturer = self.get_manufacturer_string()?.unwrap_or_default();
        let product = self.get_product_string()?.unwrap_or_default();
        let raw_name = [manufacturer.as_str(), product.as_str()]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ");
        Ok(TransportInfo::new(
            &raw_name,
            device_info.bus_type().into(),
            device_info.vendor_id(),
            device_info.product_id(),
        ))
    }
}
