//! Locating FT260 I2C interfaces among the host's HID devices.

use crate::config::DeviceSelector;
use crate::error::{Error, Result};
use hidapi::HidApi;
use log::debug;
use std::ffi::CString;

/// Information about one matching HID interface.
#[derive(Debug, Clone)]
pub struct Ft260DeviceInfo {
    pub vendor_id: u16,
    pub product_id: u16,
    pub interface_number: i32,
    /// Platform-specific path accepted by [`Ft260::open_path`](crate::Ft260::open_path).
    pub path: CString,
    pub serial_number: Option<String>,
    pub product_string: Option<String>,
}

/// Finds all interfaces matching the selector, ordered by path.
pub fn find_all(hid_api: &HidApi, selector: &DeviceSelector) -> Vec<Ft260DeviceInfo> {
    let mut devices: Vec<Ft260DeviceInfo> = hid_api
        .device_list()
        .filter(|info| {
            info.vendor_id() == selector.vendor_id
                && info.product_id() == selector.product_id
                && info.interface_number() == selector.interface
        })
        .map(|info| {
            debug!(
                "Found FT260 interface: VID={:04X}, PID={:04X}, IF={}, Path={:?}, SN={:?}",
                info.vendor_id(),
                info.product_id(),
                info.interface_number(),
                info.path(),
                info.serial_number()
            );
            Ft260DeviceInfo {
                vendor_id: info.vendor_id(),
                product_id: info.product_id(),
                interface_number: info.interface_number(),
                path: info.path().to_owned(),
                serial_number: info.serial_number().map(|s| s.to_string()),
                product_string: info.product_string().map(|s| s.to_string()),
            }
        })
        .collect();
    // hidapi enumeration order is not stable across platforms
    devices.sort_by(|a, b| a.path.cmp(&b.path));
    devices
}

/// Path of the first interface matching the selector.
/// **Warning:** Ambiguous if multiple devices exist.
pub fn find_device_path(hid_api: &HidApi, selector: &DeviceSelector) -> Result<CString> {
    find_all(hid_api, selector)
        .into_iter()
        .next()
        .map(|info| info.path)
        .ok_or(Error::DeviceNotFound {
            vendor_id: selector.vendor_id,
            product_id: selector.product_id,
            interface: selector.interface,
        })
}
