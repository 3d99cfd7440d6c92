use crate::device::BringupStage;
use crate::i2c::I2cAddress;
use crate::status::BusErrorCondition;
use thiserror::Error;

/// Errors that can occur when using FT260 devices.
///
/// Every variant maps onto one [`ErrorKind`] via [`Error::kind`], which is the
/// coarse classification callers should branch on.
#[derive(Error, Debug)]
pub enum Error {
    /// Error from the underlying HID API layer.
    #[error("HID API error: {0}")]
    Hid(#[from] hidapi::HidError),
    /// General I/O error during device communication.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// No HID interface matched the requested vendor/product/interface triple.
    #[error(
        "No FT260 found with VID={vendor_id:04X}, PID={product_id:04X}, interface {interface}"
    )]
    DeviceNotFound {
        /// Vendor ID searched for.
        vendor_id: u16,
        /// Product ID searched for.
        product_id: u16,
        /// USB interface number searched for.
        interface: i32,
    },
    /// The handle has no open transport (never opened or already closed).
    #[error("Transport is not open")]
    TransportUnavailable,
    /// `close()` was called on a handle that was already closed.
    #[error("Device handle was already closed")]
    AlreadyClosed,
    /// The transport accepted fewer bytes than the report holds.
    #[error("Short write: sent {actual} of {expected} bytes")]
    ShortWrite {
        /// Bytes in the report.
        expected: usize,
        /// Bytes the transport accepted.
        actual: usize,
    },
    /// The chip delivered fewer data bytes than requested.
    #[error("Short read: received {actual} of {expected} bytes")]
    ShortRead {
        /// Bytes requested.
        expected: usize,
        /// Bytes delivered before the transport ran dry.
        actual: usize,
    },
    /// Invalid or malformed HID report received from device.
    #[error("Invalid HID report received or unexpected size ({0} bytes)")]
    InvalidReport(usize),
    /// A report came back carrying a different report id than the one requested.
    #[error("Unexpected report id 0x{actual:02X} (expected 0x{expected:02X})")]
    UnexpectedReportId {
        /// Report id that was requested.
        expected: u8,
        /// Report id that arrived.
        actual: u8,
    },
    /// Payload does not fit the fixed protocol ceiling. No I/O was performed.
    #[error("Requested operation size is too large (max {max}, got {actual})")]
    ProtocolLimitExceeded {
        /// Maximum allowed size for this operation.
        max: usize,
        /// Actual size requested.
        actual: usize,
    },
    /// Function argument is outside the valid range.
    #[error("Argument out of range: {0}")]
    ArgumentOutOfRange(String),
    /// The controller never reported idle within the configured deadline.
    #[error(
        "I2C timeout at address {address}: controller not idle after {waited_ms} ms. Reset the I2C block before retrying."
    )]
    BusTimeout {
        /// The I2C address being accessed.
        address: I2cAddress,
        /// Time spent polling before giving up.
        waited_ms: u64,
    },
    /// The controller still reported busy when the transaction should have finished.
    #[error("I2C controller busy after transaction at address {address}")]
    ControllerBusy {
        /// The I2C address being accessed.
        address: I2cAddress,
    },
    /// The controller reported an error condition for the last transaction.
    #[error("I2C bus error at address {address}: {condition}")]
    BusError {
        /// The I2C address being accessed.
        address: I2cAddress,
        /// Decoded error sub-flags.
        condition: BusErrorCondition,
    },
    /// The chip accepted the request but reads back a different value.
    #[error("Setting not applied: requested {requested}, device reports {actual}")]
    SettingNotApplied {
        /// Value that was written.
        requested: u16,
        /// Value read back afterwards.
        actual: u16,
    },
    /// A step of device bring-up failed; the transport has been released.
    #[error("Device bring-up failed while {stage}: {source}")]
    BringupFailed {
        /// Which step failed.
        stage: BringupStage,
        /// What went wrong.
        #[source]
        source: Box<Error>,
    },
}

/// Coarse failure classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No open handle, or it was closed.
    TransportUnavailable,
    /// Short transfer, malformed report, or OS/HID-level error.
    IoFailure,
    /// Payload over the protocol ceiling.
    ProtocolLimitExceeded,
    /// The idle flag was never observed.
    BusTimeout,
    /// The controller reported an error or stayed busy.
    BusError,
    /// Read-back did not match the requested setting.
    SettingNotApplied,
    /// Device creation failed.
    BringupFailed,
    /// Caller passed an invalid argument.
    InvalidArgument,
    /// Device discovery found nothing.
    NotFound,
}

impl Error {
    /// Classifies this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Hid(_)
            | Error::Io(_)
            | Error::ShortWrite { .. }
            | Error::ShortRead { .. }
            | Error::InvalidReport(_)
            | Error::UnexpectedReportId { .. } => ErrorKind::IoFailure,
            Error::DeviceNotFound { .. } => ErrorKind::NotFound,
            Error::TransportUnavailable | Error::AlreadyClosed => ErrorKind::TransportUnavailable,
            Error::ProtocolLimitExceeded { .. } => ErrorKind::ProtocolLimitExceeded,
            Error::ArgumentOutOfRange(_) => ErrorKind::InvalidArgument,
            Error::BusTimeout { .. } => ErrorKind::BusTimeout,
            Error::ControllerBusy { .. } | Error::BusError { .. } => ErrorKind::BusError,
            Error::SettingNotApplied { .. } => ErrorKind::SettingNotApplied,
            Error::BringupFailed { .. } => ErrorKind::BringupFailed,
        }
    }

    /// Whether retrying after [`Ft260::reset`](crate::Ft260::reset) can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::BusError | ErrorKind::BusTimeout)
    }

    pub(crate) fn bringup(stage: BringupStage) -> impl FnOnce(Error) -> Error {
        move |source| Error::BringupFailed {
            stage,
            source: Box::new(source),
        }
    }
}

/// Result type alias for FT260 operations.
pub type Result<T> = std::result::Result<T, Error>;
