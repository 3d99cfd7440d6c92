//! Internal constants: report selectors, status bits, and slot sizes.

// Default Vendor/Product IDs
/// FTDI vendor ID.
pub const FTDI_VID: u16 = 0x0403;
/// Product ID of the FT260 HID bridge.
pub const FT260_PID: u16 = 0x6030;
/// USB interface number carrying the I2C function (interface 1 is UART).
pub const FT260_I2C_INTERFACE: i32 = 0;

// --- Feature Reports (Control Transfer) ---
pub const REPORT_ID_CHIP_CODE: u8 = 0xA0;
pub const REPORT_ID_SYSTEM_SETTING: u8 = 0xA1;
pub const REPORT_ID_I2C_STATUS: u8 = 0xC0;

pub const CHIP_CODE_REPORT_SIZE: usize = 13;
pub const SYSTEM_STATUS_REPORT_SIZE: usize = 26;
pub const I2C_STATUS_REPORT_SIZE: usize = 5;

/// Part number reported in bytes 1..=2 of the chip code report.
pub const FT260_PART_NUMBER: u16 = 0x0260;

// Second byte of a SYSTEM_SETTING output report.
pub mod setting {
    pub const I2C_MODE: u8 = 0x02;
    pub const I2C_RESET: u8 = 0x20;
    pub const I2C_SPEED: u8 = 0x22;
}

// --- I2C Related Constants ---
pub mod i2c {
    // HID Reports (Interrupt Transfer)
    pub const REPORT_ID_READ_REQUEST: u8 = 0xC2;
    /// First write/input report id; covers 4 data bytes. Each next id adds 4.
    pub const REPORT_ID_DATA_FIRST: u8 = 0xD0;
    /// Last write/input report id; covers 60 data bytes.
    pub const REPORT_ID_DATA_LAST: u8 = 0xDE;

    /// Hard ceiling of one I2C write report's payload.
    pub const REPORT_MAX_DATA_SIZE: usize = 60;
    /// Report id + address + flags + length.
    pub const WRITE_HEADER_SIZE: usize = 4;
    pub const READ_REQUEST_SIZE: usize = 5;
    /// Largest report exchanged on the interrupt endpoints.
    pub const REPORT_SLOT_SIZE: usize = 64;
    /// Report id + length ahead of the data in an input report.
    pub const IN_REPORT_HEADER_SIZE: usize = 2;
    /// Read length is carried in a 16-bit field.
    pub const MAX_READ_SIZE: usize = u16::MAX as usize;

    /// Raw address value meaning "no target address, suppress START".
    pub const NO_START_ADDRESS: u16 = 0xFFFF;

    // Flags byte of the read request and write reports
    pub mod out_flags {
        pub const START_BIT: u8 = 1 << 1;
        pub const REPEATED_START: u8 = 0x03;
        pub const STOP_BIT: u8 = 1 << 2;
    }

    // Status byte of the I2C status report
    pub mod status {
        /// When set, every other bit is invalid.
        pub const MASTER_BUSY: u8 = 1 << 0;
        pub const ERROR: u8 = 1 << 1;
        pub const SLAVE_NACK: u8 = 1 << 2;
        pub const DATA_NACK: u8 = 1 << 3;
        pub const ARBITRATION_LOST: u8 = 1 << 4;
        pub const IDLE: u8 = 1 << 5;
        pub const BUS_BUSY: u8 = 1 << 6;
    }
}
