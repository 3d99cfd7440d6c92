//! Simulated FT260 for exercising the driver without hardware.
//!
//! The chip keeps a register file per attached slave. Register access follows
//! the usual convention: the first written byte sets the register pointer,
//! further bytes are stored with auto-increment, reads continue from the pointer.
#![allow(dead_code)]

use ft260_hid::{BusKind, Error, Ft260, Ft260Config, HidTransport, Result, TransportInfo};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

const STATUS_MASTER_BUSY: u8 = 0x01;
const STATUS_ERROR: u8 = 0x02;
const STATUS_SLAVE_NACK: u8 = 0x04;
const STATUS_DATA_NACK: u8 = 0x08;
const STATUS_IDLE: u8 = 0x20;
const STATUS_BUS_BUSY: u8 = 0x40;

#[derive(Default)]
pub struct Slave {
    pub regs: Vec<u8>,
    pointer: usize,
    /// NACK every data byte written to this slave.
    pub nack_data: bool,
}

impl Slave {
    fn new() -> Self {
        Slave {
            regs: vec![0; 256],
            ..Default::default()
        }
    }
}

#[derive(Default)]
pub struct ChipState {
    pub slaves: HashMap<u8, Slave>,
    pub clock_khz: u16,
    /// Highest clock the chip adopts; larger requests are clamped.
    pub max_clock_khz: Option<u16>,
    /// Status queries answered with master-busy after each I2C report.
    pub busy_polls: u32,
    busy_remaining: u32,
    /// Never report idle.
    pub stuck: bool,
    error_bits: u8,
    bus_held: bool,
    current_slave: Option<u8>,
    /// Feature report id whose get request fails.
    pub fail_get_feature: Option<u8>,
    /// Deliver at most this many data bytes per read request.
    pub read_limit: Option<usize>,
    /// Accept one byte less than offered on output reports.
    pub short_writes: bool,
    pending_input: VecDeque<Vec<u8>>,
    pub output_reports: Vec<Vec<u8>>,
    pub feature_writes: Vec<Vec<u8>>,
    pub status_queries: u32,
    pub resets: u32,
    pub i2c_mode: bool,
    pub closed: bool,
}

impl ChipState {
    fn select(&mut self, addr: u8, start: bool) -> bool {
        self.error_bits = 0;
        if start {
            if !self.slaves.contains_key(&addr) {
                self.error_bits = STATUS_ERROR | STATUS_SLAVE_NACK;
                self.current_slave = None;
                return false;
            }
            self.current_slave = Some(addr);
        }
        self.current_slave.is_some()
    }

    fn finish(&mut self, flags: u8) {
        self.bus_held = flags & 0x04 == 0 && self.error_bits == 0;
        self.busy_remaining = self.busy_polls;
    }

    fn handle_write(&mut self, report: &[u8]) {
        let (addr, flags, len) = (report[1], report[2], report[3] as usize);
        let payload = report[4..4 + len].to_vec();
        if self.select(addr, flags & 0x02 != 0) {
            let slave_addr = self.current_slave.unwrap_or_default();
            let slave = self.slaves.get_mut(&slave_addr).unwrap();
            if slave.nack_data && !payload.is_empty() {
                self.error_bits = STATUS_ERROR | STATUS_DATA_NACK;
            } else if let Some((&reg, data)) = payload.split_first() {
                slave.pointer = reg as usize;
                for &b in data {
                    slave.regs[slave.pointer % 256] = b;
                    slave.pointer += 1;
                }
            }
        }
        self.finish(flags);
    }

    fn handle_read(&mut self, report: &[u8]) {
        let (addr, flags) = (report[1], report[2]);
        let mut len = u16::from_be_bytes([report[3], report[4]]) as usize;
        if let Some(limit) = self.read_limit {
            len = len.min(limit);
        }
        if self.select(addr, flags & 0x02 != 0) {
            let slave_addr = self.current_slave.unwrap_or_default();
            let slave = self.slaves.get_mut(&slave_addr).unwrap();
            let mut data = Vec::with_capacity(len);
            for _ in 0..len {
                data.push(slave.regs[slave.pointer % 256]);
                slave.pointer += 1;
            }
            for chunk in data.chunks(60) {
                let mut input = vec![0xD0 + ((chunk.len() - 1) / 4) as u8, chunk.len() as u8];
                input.extend_from_slice(chunk);
                self.pending_input.push_back(input);
            }
        }
        self.finish(flags);
    }

    fn status_byte(&mut self) -> u8 {
        if self.busy_remaining > 0 {
            self.busy_remaining -= 1;
            return STATUS_MASTER_BUSY;
        }
        if self.stuck {
            return STATUS_BUS_BUSY;
        }
        let mut status = STATUS_IDLE | self.error_bits;
        if self.bus_held {
            status |= STATUS_BUS_BUSY;
        }
        status
    }
}

/// Shared view of a simulated chip. Clone freely; all clones see the same state.
#[derive(Clone, Default)]
pub struct SimChip(Rc<RefCell<ChipState>>);

impl SimChip {
    pub fn new() -> Self {
        let chip = SimChip::default();
        chip.state().clock_khz = 100;
        chip
    }

    pub fn with_slave(self, addr: u8) -> Self {
        self.state().slaves.insert(addr, Slave::new());
        self
    }

    pub fn state(&self) -> std::cell::RefMut<'_, ChipState> {
        self.0.borrow_mut()
    }

    pub fn transport(&self) -> SimTransport {
        SimTransport(self.clone())
    }

    pub fn is_closed(&self) -> bool {
        self.0.borrow().closed
    }

    pub fn output_reports(&self) -> Vec<Vec<u8>> {
        self.0.borrow().output_reports.clone()
    }
}

pub struct SimTransport(SimChip);

impl HidTransport for SimTransport {
    fn write_report(&self, data: &[u8]) -> Result<usize> {
        let mut s = self.0.state();
        assert!(!s.closed, "write on closed transport");
        s.output_reports.push(data.to_vec());
        match data[0] {
            0xC2 => s.handle_read(data),
            0xD0..=0xDE => s.handle_write(data),
            _ => {}
        }
        Ok(if s.short_writes { data.len() - 1 } else { data.len() })
    }

    fn read_report(&self, buf: &mut [u8], _timeout_ms: i32) -> Result<usize> {
        let mut s = self.0.state();
        match s.pending_input.pop_front() {
            Some(report) => {
                buf[..report.len()].copy_from_slice(&report);
                Ok(report.len())
            }
            None => Ok(0),
        }
    }

    fn send_feature_report(&self, data: &[u8]) -> Result<()> {
        let mut s = self.0.state();
        s.feature_writes.push(data.to_vec());
        match data {
            [0xA1, 0x22, hi, lo] => {
                let requested = u16::from_be_bytes([*hi, *lo]);
                s.clock_khz = s.max_clock_khz.map_or(requested, |max| requested.min(max));
            }
            [0xA1, 0x20] => {
                s.resets += 1;
                s.error_bits = 0;
                s.bus_held = false;
                s.busy_remaining = 0;
            }
            [0xA1, 0x02, 0x01] => s.i2c_mode = true,
            _ => {}
        }
        Ok(())
    }

    fn get_feature_report(&self, buf: &mut [u8]) -> Result<usize> {
        let mut s = self.0.state();
        if s.fail_get_feature == Some(buf[0]) {
            return Err(Error::Io(std::io::Error::other("injected feature failure")));
        }
        let report: Vec<u8> = match buf[0] {
            0xC0 => {
                s.status_queries += 1;
                let [hi, lo] = s.clock_khz.to_be_bytes();
                vec![0xC0, s.status_byte(), hi, lo, 0]
            }
            0xA0 => {
                let mut r = vec![0u8; 13];
                r[..5].copy_from_slice(&[0xA0, 0x02, 0x60, 0x01, 0x00]);
                r
            }
            0xA1 => {
                let mut r = vec![0u8; 26];
                r[..8].copy_from_slice(&[0xA1, 0x01, 0x02, 0x00, 0x01, s.i2c_mode as u8, 0, 0]);
                r
            }
            _ => return Ok(0),
        };
        let len = report.len().min(buf.len());
        buf[..len].copy_from_slice(&report[..len]);
        Ok(len)
    }

    fn info(&self) -> Result<TransportInfo> {
        Ok(TransportInfo::new("FTDI FT260", BusKind::Usb, 0x0403, 0x6030))
    }
}

impl Drop for SimTransport {
    fn drop(&mut self) {
        self.0.state().closed = true;
    }
}

/// Short deadline so stuck-chip tests finish quickly.
pub fn test_config() -> Ft260Config {
    Ft260Config::default().with_wait(
        ft260_hid::WaitPolicy::default()
            .with_poll_interval(Duration::from_micros(10))
            .with_deadline(Duration::from_millis(20)),
    )
}

pub fn open(chip: &SimChip) -> Ft260<SimTransport> {
    let _ = env_logger::builder().is_test(true).try_init();
    Ft260::from_transport(chip.transport(), "/dev/hidraw-sim", test_config())
        .expect("bring-up on simulated chip")
}
