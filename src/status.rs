//! Decoding of the I2C controller status byte.

use crate::consts::i2c::status;
use std::fmt;

/// Raw I2C controller status as returned by the status report.
///
/// While the master-busy bit is set the remaining bits are not valid, so they
/// are only reachable through [`I2cStatus::flags`], which returns `None` in
/// that case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct I2cStatus(u8);

/// Status bits valid once the controller is no longer busy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusFlags {
    /// The last operation ended in an error condition.
    pub error: bool,
    /// Slave address was not acknowledged.
    pub slave_nack: bool,
    /// A data byte was not acknowledged.
    pub data_nack: bool,
    /// Another master won arbitration.
    pub arbitration_lost: bool,
    /// The controller is idle and ready for a new operation.
    pub idle: bool,
    /// The bus is held (START issued without STOP, or another master).
    pub bus_busy: bool,
}

/// Error sub-flags attached to [`Error::BusError`](crate::Error::BusError).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BusErrorCondition {
    /// Slave address was not acknowledged.
    pub slave_nack: bool,
    /// A data byte was not acknowledged.
    pub data_nack: bool,
    /// Another master won arbitration.
    pub arbitration_lost: bool,
}

impl I2cStatus {
    /// Wraps a raw status byte.
    pub const fn from_raw(raw: u8) -> Self {
        I2cStatus(raw)
    }

    /// The raw status byte.
    pub const fn raw(self) -> u8 {
        self.0
    }

    pub fn master_busy(self) -> bool {
        self.0 & status::MASTER_BUSY != 0
    }

    /// Decoded flags, or `None` while the controller is busy.
    pub fn flags(self) -> Option<StatusFlags> {
        if self.master_busy() {
            return None;
        }
        Some(StatusFlags {
            error: self.0 & status::ERROR != 0,
            slave_nack: self.0 & status::SLAVE_NACK != 0,
            data_nack: self.0 & status::DATA_NACK != 0,
            arbitration_lost: self.0 & status::ARBITRATION_LOST != 0,
            idle: self.0 & status::IDLE != 0,
            bus_busy: self.0 & status::BUS_BUSY != 0,
        })
    }

    /// Not busy and the idle bit is set.
    pub fn is_idle(self) -> bool {
        self.flags().is_some_and(|f| f.idle)
    }
}

impl StatusFlags {
    /// The error sub-flags, if the error bit is set.
    pub fn error_condition(&self) -> Option<BusErrorCondition> {
        self.error.then_some(BusErrorCondition {
            slave_nack: self.slave_nack,
            data_nack: self.data_nack,
            arbitration_lost: self.arbitration_lost,
        })
    }
}

impl fmt::Display for I2cStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.flags() {
            None => write!(f, "0x{:02X} (master busy)", self.0),
            Some(flags) => {
                write!(f, "0x{:02X} (", self.0)?;
                let names = [
                    (flags.error, "error"),
                    (flags.slave_nack, "slave nack"),
                    (flags.data_nack, "data nack"),
                    (flags.arbitration_lost, "arbitration lost"),
                    (flags.idle, "idle"),
                    (flags.bus_busy, "bus busy"),
                ];
                let mut first = true;
                for (_, name) in names.iter().filter(|(set, _)| *set) {
                    if !first {
                        f.write_str(", ")?;
                    }
                    f.write_str(name)?;
                    first = false;
                }
                f.write_str(")")
            }
        }
    }
}

impl fmt::Display for BusErrorCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.slave_nack {
            parts.push("slave address not acknowledged");
        }
        if self.data_nack {
            parts.push("data not acknowledged");
        }
        if self.arbitration_lost {
            parts.push("arbitration lost");
        }
        if parts.is_empty() {
            f.write_str("unspecified error condition")
        } else {
            f.write_str(&parts.join(", "))
        }
    }
}
