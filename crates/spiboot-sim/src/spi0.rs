//! Register model of the SPI0 controller
//!
//! Both controller generations are modelled from their register layout.
//! An exchange completes the moment the start bit is written, so the FIFO
//! status the driver polls afterwards already shows the whole burst.

use std::collections::HashMap;

use heapless::{Deque, Vec as FifoVec};
use spiboot_core::controller::regs::{Sun4iCtl, Sun6iGcr, FIFO_DEPTH};
use spiboot_core::controller::ControllerVariant;

use crate::flash::SimFlash;

/// One exchange as seen by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Burst {
    /// Value of the burst counter
    pub total: usize,
    /// Value of the transfer counter
    pub header: usize,
}

impl Burst {
    /// Response bytes clocked in after the header
    pub fn payload(&self) -> usize {
        self.total.saturating_sub(self.header)
    }
}

/// Simulated SPI0 controller with a flash on its chip select
#[derive(Debug)]
pub struct Spi0Model {
    variant: ControllerVariant,
    regs: HashMap<usize, u32>,
    tx: FifoVec<u8, FIFO_DEPTH>,
    rx: Deque<u8, FIFO_DEPTH>,
    flash: SimFlash,
    clocked: bool,
    bursts: Vec<Burst>,
    disables: usize,
    violations: Vec<String>,
}

impl Spi0Model {
    /// Create a controller of generation `variant` in its reset state
    pub fn new(variant: ControllerVariant, flash: SimFlash) -> Self {
        Self {
            variant,
            regs: HashMap::new(),
            tx: FifoVec::new(),
            rx: Deque::new(),
            flash,
            clocked: false,
            bursts: Vec::new(),
            disables: 0,
            violations: Vec::new(),
        }
    }

    /// The flash on the chip select
    pub fn flash(&self) -> &SimFlash {
        &self.flash
    }

    /// Every exchange started so far
    pub fn bursts(&self) -> &[Burst] {
        &self.bursts
    }

    /// Number of times the controller went from enabled to disabled
    pub fn disable_count(&self) -> usize {
        self.disables
    }

    /// Driver errors seen by the controller
    pub fn violations(&self) -> &[String] {
        &self.violations
    }

    /// True while master mode and the enable bit are set
    pub fn is_enabled(&self) -> bool {
        let ctl = self.reg(self.variant.layout().global_ctl);
        let bits = self.variant.disable_bits();
        ctl & bits == bits
    }

    pub(crate) fn set_clocked(&mut self, clocked: bool) {
        self.clocked = clocked;
    }

    fn reg(&self, offset: usize) -> u32 {
        self.regs.get(&offset).copied().unwrap_or(0)
    }

    /// 32-bit register read
    pub fn read32(&mut self, offset: usize) -> u32 {
        let layout = self.variant.layout();
        if offset == layout.fifo_status {
            return self.rx.len() as u32 | ((self.tx.len() as u32) << 16);
        }
        if offset == layout.rx {
            let mut word = 0u32;
            for i in 0..4 {
                word |= (self.pop_rx() as u32) << (8 * i);
            }
            return word;
        }
        let value = self.reg(offset);
        if offset == layout.global_ctl && self.variant.is_gen_b() {
            // Soft reset completes after being observed once
            let srst = Sun6iGcr::SRST.bits();
            if value & srst != 0 {
                self.regs.insert(offset, value & !srst);
            }
        }
        value
    }

    /// 32-bit register write
    pub fn write32(&mut self, offset: usize, value: u32) {
        let layout = self.variant.layout();
        if offset == layout.tx {
            for b in value.to_le_bytes() {
                self.push_tx(b);
            }
            return;
        }

        let mut value = value;
        if offset == layout.global_ctl {
            let bits = self.variant.disable_bits();
            let was_enabled = self.reg(offset) & bits == bits;
            if was_enabled && value & bits != bits {
                self.disables += 1;
            }
        }
        if self.variant == ControllerVariant::GenA && offset == layout.global_ctl {
            if value & Sun4iCtl::TF_RST.bits() != 0 {
                self.tx.clear();
            }
            if value & Sun4iCtl::RF_RST.bits() != 0 {
                self.rx.clear();
            }
            value &= !(Sun4iCtl::TF_RST | Sun4iCtl::RF_RST).bits();
        }

        let start = offset == layout.xfer_ctl && value & layout.xch_bit != 0;
        if start {
            value &= !layout.xch_bit;
        }
        self.regs.insert(offset, value);
        if start {
            self.run_burst();
        }
    }

    /// 8-bit register read
    pub fn read8(&mut self, offset: usize) -> u8 {
        if offset == self.variant.layout().rx {
            return self.pop_rx();
        }
        self.read32(offset & !3).to_le_bytes()[offset & 3]
    }

    /// 8-bit register write
    pub fn write8(&mut self, offset: usize, value: u8) {
        if offset == self.variant.layout().tx {
            self.push_tx(value);
            return;
        }
        let mut bytes = self.reg(offset & !3).to_le_bytes();
        bytes[offset & 3] = value;
        self.write32(offset & !3, u32::from_le_bytes(bytes));
    }

    fn push_tx(&mut self, b: u8) {
        if self.tx.push(b).is_err() {
            panic!("SPI0 TX FIFO overflow");
        }
    }

    fn pop_rx(&mut self) -> u8 {
        match self.rx.pop_front() {
            Some(b) => b,
            None => {
                self.violations.push("read from empty RX FIFO".into());
                0
            }
        }
    }

    fn run_burst(&mut self) {
        let layout = self.variant.layout();
        let total = self.reg(layout.burst_count) as usize;
        let header = self.reg(layout.transfer_count) as usize;

        if !self.is_enabled() {
            self.violations.push("exchange started with the controller disabled".into());
        }
        if !self.clocked {
            self.violations.push("exchange started without SPI0 clock".into());
        }
        if let Some(bcc) = layout.burst_control {
            if self.reg(bcc) as usize != header {
                self.violations.push(format!(
                    "BCC {} does not match MTC {}",
                    self.reg(bcc),
                    header
                ));
            }
        }
        if self.tx.len() != header {
            self.violations.push(format!(
                "{} bytes queued for a {}-byte header",
                self.tx.len(),
                header
            ));
        }
        if total > FIFO_DEPTH {
            panic!("burst of {} bytes overflows the {}-byte RX FIFO", total, FIFO_DEPTH);
        }
        if !self.rx.is_empty() {
            self.violations
                .push(format!("{} stale bytes in RX FIFO", self.rx.len()));
        }

        let sent: Vec<u8> = self.tx.iter().copied().collect();
        self.tx.clear();
        let mut response = vec![0u8; total.saturating_sub(header)];
        self.flash.transfer(&sent, &mut response);

        // Nothing drives MISO while the header goes out
        for b in std::iter::repeat(0u8).take(header).chain(response) {
            if self.rx.push_back(b).is_err() {
                panic!("SPI0 RX FIFO overflow");
            }
        }
        self.bursts.push(Burst { total, header });
    }
}
