//! # ft260-hid
//!
//! A Rust crate for driving the I²C master of FTDI FT260 USB bridge chips
//! via their USB HID interface.
//!
//! This crate uses the `hidapi` crate for cross-platform USB HID communication.
//!
//! ## Features
//!
//! *   Device discovery by vendor ID, product ID and interface number (`find_all`, `find_device_path`).
//! *   Device bring-up (`Ft260::open`, `Ft260::open_path`, `Ft260::from_transport`):
//!     chip identification, I²C reset, I²C mode enable, clock read-back.
//! *   Chip-level control:
//!     *   Status query (`get_status`) with decoded flags.
//!     *   Clock query and verified clock setting (`get_clock_khz`, `set_clock`).
//!     *   Controller reset (`reset`).
//! *   I²C communication:
//!     *   Writes of up to 60 bytes (`i2c_write`), reads of up to 65535 bytes (`i2c_read`).
//!     *   Optional START suppression (`I2cAddress::NoStart`) and bus release (`i2c_release_bus`).
//!     *   Write-then-read (`i2c_write_read`) and bus scanning (`i2c_scan`).
//!     *   Register helpers (`read_register_byte`, `write_register_word`, ...).
//!
//! ## Basic Usage
//!
//! ```no_run
//! use ft260_hid::{Ft260, Ft260Config, I2cAddress, Result};
//! use hidapi::HidApi;
//!
//! fn main() -> Result<()> {
//!     // Optional: Initialize logging
//!     // env_logger::init();
//!
//!     let hid_api = HidApi::new()?;
//!     let mut device = Ft260::open(&hid_api, Ft260Config::default())?;
//!     println!("Opened {} ({} kHz)", device.info().raw_name, device.clock_khz());
//!
//!     device.set_clock(100)?;
//!
//!     let sensor = I2cAddress::new_7bit(0x48)?;
//!     let temperature = device.read_register_word(sensor, 0x00)?;
//!     println!("Raw temperature: 0x{:04X}", temperature);
//!
//!     device.close()
//! }
//! ```
//!
//! ## Waiting and Timeouts
//!
//! Every write waits for the controller to report idle before and after the
//! transfer. The wait is bounded by [`WaitPolicy::deadline`] (500 ms by
//! default); on expiry the operation fails with [`Error::BusTimeout`] and the
//! handle should be [`reset`](Ft260::reset) before further use.
//!
//! ## Error Recovery
//!
//! [`Error::is_retryable`] is true for bus errors (NACK, arbitration lost) and
//! timeouts: reset the controller and retry. Protocol-limit and transport
//! errors are programming or configuration errors and will not go away on retry.
//!
//! ## Thread Safety
//!
//! All operations take `&mut self`. Share a handle between threads by
//! wrapping it in a `Mutex`.
//!
//! ## Hardware Setup Notes
//!
//! *   **I²C Pull-up Resistors:** Required externally (e.g., 4.7kΩ to 3.3V).
//! *   **Linux udev Rules:** Grant user permission to the HID devices. Create `/etc/udev/rules.d/99-ft260.rules`:
//!     ```udev
//!     SUBSYSTEM=="hidraw", ATTRS{idVendor}=="0403", ATTRS{idProduct}=="6030", MODE="0666", GROUP="plugdev"
//!     ```
//!     Reload: `sudo udevadm control --reload-rules && sudo udevadm trigger`

mod consts;
pub mod config;
pub mod device;
pub mod discovery;
mod error;
pub mod feature;
pub mod i2c; // Keep i2c public for its enums/structs
mod register;
pub mod status;
pub mod transport;

pub use config::{DeviceSelector, Ft260Config, WaitPolicy};
pub use device::{BringupStage, Ft260};
pub use discovery::{find_all, find_device_path, Ft260DeviceInfo};
pub use error::{Error, ErrorKind, Result};
pub use feature::{ChipVersion, SystemSnapshot};
pub use i2c::I2cAddress;
pub use status::{BusErrorCondition, I2cStatus, StatusFlags};
pub use transport::{BusKind, HidTransport, TransportInfo};

pub use consts::{FT260_I2C_INTERFACE, FT260_PID, FTDI_VID};

/// Protocol constants useful when inspecting raw reports.
pub mod flags {
    /// Flags byte of I2C read requests and write reports.
    pub mod i2c {
        pub use crate::consts::i2c::out_flags::{REPEATED_START, START_BIT, STOP_BIT};
    }
    /// Bits of the I2C status byte.
    pub mod status {
        pub use crate::consts::i2c::status::*;
    }
    pub use crate::consts::i2c::{NO_START_ADDRESS, REPORT_MAX_DATA_SIZE};
}
