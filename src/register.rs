//! Register access for devices using the common "register pointer, then data"
//! convention. Multi-byte words are big-endian.

use crate::consts::i2c::REPORT_MAX_DATA_SIZE;
use crate::device::Ft260;
use crate::error::{Error, Result};
use crate::i2c::I2cAddress;
use crate::transport::HidTransport;

impl<T: HidTransport> Ft260<T> {
    /// Reads `buffer.len()` bytes starting at `register`.
    ///
    /// Writes the register number without STOP, then reads with STOP.
    /// `buffer` is untouched on failure.
    pub fn read_register_n(
        &mut self,
        address: I2cAddress,
        register: u8,
        buffer: &mut [u8],
    ) -> Result<()> {
        self.i2c_write_read(address, &[register], buffer)
    }

    /// Writes `data` starting at `register` in a single transfer.
    pub fn write_register_n(
        &mut self,
        address: I2cAddress,
        register: u8,
        data: &[u8],
    ) -> Result<()> {
        let mut frame = [0u8; REPORT_MAX_DATA_SIZE];
        let len = data.len() + 1;
        if len > frame.len() {
            return Err(Error::ProtocolLimitExceeded {
                max: REPORT_MAX_DATA_SIZE,
                actual: len,
            });
        }
        frame[0] = register;
        frame[1..len].copy_from_slice(data);
        self.i2c_write(address, &frame[..len], true)
    }

    pub fn read_register_byte(&mut self, address: I2cAddress, register: u8) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.read_register_n(address, register, &mut buf)?;
        Ok(buf[0])
    }

    pub fn write_register_byte(
        &mut self,
        address: I2cAddress,
        register: u8,
        value: u8,
    ) -> Result<()> {
        self.write_register_n(address, register, &[value])
    }

    /// Reads a big-endian 16-bit register.
    pub fn read_register_word(&mut self, address: I2cAddress, register: u8) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.read_register_n(address, register, &mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    /// Writes a big-endian 16-bit register.
    pub fn write_register_word(
        &mut self,
        address: I2cAddress,
        register: u8,
        value: u16,
    ) -> Result<()> {
        self.write_register_n(address, register, &value.to_be_bytes())
    }
}
