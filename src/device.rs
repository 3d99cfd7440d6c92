//! Device handle and its lifecycle: open, bring-up, close.

use crate::config::{Ft260Config, WaitPolicy};
use crate::discovery;
use crate::error::{Error, Result};
use crate::transport::{HidTransport, TransportInfo};
use hidapi::{HidApi, HidDevice};
use log::{debug, warn};
use std::ffi::CStr;
use std::fmt;

/// Bring-up step that failed, carried by [`Error::BringupFailed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BringupStage {
    OpenTransport,
    QueryDescriptor,
    ReadChipId,
    ReadSystemStatus,
    ResetI2c,
    EnableI2cMode,
    ReadClock,
}

impl fmt::Display for BringupStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BringupStage::OpenTransport => "opening the transport",
            BringupStage::QueryDescriptor => "querying the HID descriptor",
            BringupStage::ReadChipId => "reading the chip ID",
            BringupStage::ReadSystemStatus => "reading the system status",
            BringupStage::ResetI2c => "resetting the I2C controller",
            BringupStage::EnableI2cMode => "enabling I2C mode",
            BringupStage::ReadClock => "reading the I2C clock",
        })
    }
}

/// A handle to an opened FT260 I2C interface.
///
/// The handle owns its transport exclusively. Every operation takes
/// `&mut self`; wrap the handle in a `Mutex` to share it between threads.
pub struct Ft260<T: HidTransport = HidDevice> {
    pub(crate) transport: Option<T>,
    pub(crate) config: Ft260Config,
    pub(crate) clock_khz: u16,
    path: String,
    info: TransportInfo,
}

impl Ft260<HidDevice> {
    /// Opens the first interface matching `config.selector`.
    /// **Warning:** Ambiguous if multiple devices exist.
    pub fn open(hid_api: &HidApi, config: Ft260Config) -> Result<Self> {
        let path = discovery::find_device_path(hid_api, &config.selector)?;
        Self::open_path(hid_api, &path, config)
    }

    /// Opens the interface at a platform-specific path and brings it up.
    pub fn open_path(hid_api: &HidApi, path: &CStr, config: Ft260Config) -> Result<Self> {
        let device = hid_api
            .open_path(path)
            .map_err(|e| Error::bringup(BringupStage::OpenTransport)(Error::Hid(e)))?;
        Self::from_transport(device, path.to_string_lossy(), config)
    }
}

impl<T: HidTransport> Ft260<T> {
    /// Brings up a device over an already opened transport.
    ///
    /// Steps: descriptor query, chip ID, system status, I2C reset, I2C mode
    /// enable, clock read. On any failure the transport is dropped before
    /// the error is returned.
    pub fn from_transport(
        transport: T,
        path: impl Into<String>,
        config: Ft260Config,
    ) -> Result<Self> {
        let path = path.into();
        let info = transport
            .info()
            .map_err(Error::bringup(BringupStage::QueryDescriptor))?;

        let mut device = Ft260 {
            transport: Some(transport),
            config,
            clock_khz: 0,
            path,
            info,
        };
        if let Err(e) = device.bring_up() {
            warn!("FT260 bring-up failed for {}: {}", device.path, e);
            device.release();
            return Err(e);
        }

        debug!(
            "FT260 initialized: path={} bus={} vendor=0x{:04X} product=0x{:04X} rawname='{}' i2cfreq={}kHz",
            device.path,
            device.info.bus_type,
            device.info.vendor_id,
            device.info.product_id,
            device.info.raw_name,
            device.clock_khz
        );
        Ok(device)
    }

    fn bring_up(&mut self) -> Result<()> {
        let chip = self
            .get_chip_id()
            .map_err(Error::bringup(BringupStage::ReadChipId))?;
        debug!("Chip ID: {:02X?}", chip.raw());
        if !chip.is_ft260() {
            warn!(
                "Unexpected part number 0x{:04X}, continuing anyway",
                chip.part_number
            );
        }

        let snapshot = self
            .get_system_snapshot()
            .map_err(Error::bringup(BringupStage::ReadSystemStatus))?;
        debug!("System status: {:?}", snapshot);

        self.reset().map_err(Error::bringup(BringupStage::ResetI2c))?;
        self.enable_i2c_mode()
            .map_err(Error::bringup(BringupStage::EnableI2cMode))?;
        self.get_clock_khz()
            .map_err(Error::bringup(BringupStage::ReadClock))?;
        Ok(())
    }

    /// Closes the transport.
    ///
    /// Returns [`Error::AlreadyClosed`] if the handle was closed before. After
    /// closing, every other operation fails with [`Error::TransportUnavailable`].
    pub fn close(&mut self) -> Result<()> {
        if self.transport.is_none() {
            return Err(Error::AlreadyClosed);
        }
        self.release();
        Ok(())
    }

    fn release(&mut self) {
        if self.transport.take().is_some() {
            debug!("Closed FT260 transport at {}", self.path);
        }
    }

    /// Whether the transport is still open.
    pub fn is_open(&self) -> bool {
        self.transport.is_some()
    }

    /// Device path the handle was opened with.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Descriptor name and bus identifiers captured at bring-up.
    pub fn info(&self) -> &TransportInfo {
        &self.info
    }

    /// I2C clock in kHz as of the last status query.
    pub fn clock_khz(&self) -> u16 {
        self.clock_khz
    }

    pub fn config(&self) -> &Ft260Config {
        &self.config
    }

    /// Replaces the wait-for-idle behaviour for subsequent transactions.
    pub fn set_wait_policy(&mut self, wait: WaitPolicy) {
        self.config.wait = wait;
    }

    pub(crate) fn transport(&self) -> Result<&T> {
        self.transport.as_ref().ok_or(Error::TransportUnavailable)
    }
}

impl<T: HidTransport> fmt::Debug for Ft260<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ft260")
            .field("path", &self.path)
            .field("info", &self.info)
            .field("clock_khz", &self.clock_khz)
            .field("open", &self.is_open())
            .finish()
    }
}

impl<T: HidTransport> Drop for Ft260<T> {
    fn drop(&mut self) {
        self.release();
    }
}
