//! Device selection and timing configuration.

use crate::consts;
use std::time::Duration;

/// Default cadence of the status polling loop.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_micros(100);
/// Default upper bound on a single wait-for-idle.
pub const DEFAULT_WAIT_DEADLINE: Duration = Duration::from_millis(500);
/// Default timeout for one input report read, in milliseconds.
pub const DEFAULT_READ_TIMEOUT_MS: i32 = 500;

/// Identifies which HID interface to auto-detect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceSelector {
    /// USB vendor ID.
    pub vendor_id: u16,
    /// USB product ID.
    pub product_id: u16,
    /// USB interface number of the I2C function.
    pub interface: i32,
}

impl Default for DeviceSelector {
    fn default() -> Self {
        DeviceSelector {
            vendor_id: consts::FTDI_VID,
            product_id: consts::FT260_PID,
            interface: consts::FT260_I2C_INTERFACE,
        }
    }
}

impl DeviceSelector {
    pub fn new(vendor_id: u16, product_id: u16, interface: i32) -> Self {
        DeviceSelector {
            vendor_id,
            product_id,
            interface,
        }
    }
}

/// How the engine waits for the controller to become idle.
///
/// `deadline: None` polls forever. A handle whose wait expired should be
/// reset before further use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Sleep between two status queries.
    pub poll_interval: Duration,
    /// Give up after this much time has elapsed.
    pub deadline: Option<Duration>,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        WaitPolicy {
            poll_interval: DEFAULT_POLL_INTERVAL,
            deadline: Some(DEFAULT_WAIT_DEADLINE),
        }
    }
}

impl WaitPolicy {
    /// Polls until idle with no deadline.
    pub fn unbounded() -> Self {
        WaitPolicy {
            deadline: None,
            ..WaitPolicy::default()
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Everything needed to open and drive a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ft260Config {
    /// Used only when no explicit path is given.
    pub selector: DeviceSelector,
    /// Wait-for-idle behaviour.
    pub wait: WaitPolicy,
    /// Timeout for reading one input report; -1 blocks.
    pub read_timeout_ms: i32,
}

impl Default for Ft260Config {
    fn default() -> Self {
        Ft260Config {
            selector: DeviceSelector::default(),
            wait: WaitPolicy::default(),
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
        }
    }
}

impl Ft260Config {
    pub fn with_selector(mut self, selector: DeviceSelector) -> Self {
        self.selector = selector;
        self
    }

    pub fn with_wait(mut self, wait: WaitPolicy) -> Self {
        self.wait = wait;
        self
    }

    pub fn with_read_timeout_ms(mut self, read_timeout_ms: i32) -> Self {
        self.read_timeout_ms = read_timeout_ms;
        self
    }
}
