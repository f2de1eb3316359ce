//! Command/response exchange over the SPI0 FIFOs

use embedded_hal::delay::DelayNs;

use crate::controller::regs::{FIFO_DEPTH, FIFO_STA_RX_CNT, FIFO_STA_TX_CNT};
use crate::spi::{opcodes, CommandFrame, MAX_HEADER_LEN};
use crate::transport::{RegisterBus, TransportHandle};

/// Settle delays issued after certain transactions
///
/// The defaults are the worst-case figures found across common SPI flash
/// datasheets. They can be stretched for slow parts but the delays are
/// always issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// tSHSL after identifier and NAND cache reads
    pub cs_recovery_ns: u32,
    /// tCS + tRD_ECC before every NAND status poll
    pub nand_poll_ns: u32,
    /// Chip-select recovery after a NOR read
    pub nor_read_recovery_ns: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            cs_recovery_ns: 100,
            nand_poll_ns: 200,
            nor_read_recovery_ns: 1_000,
        }
    }
}

/// The SPI0 protocol engine
///
/// Owns the transport for the duration of a load. Every flash command goes
/// through [`exchange`](Self::exchange), which hides the register layout of
/// the controller generation.
pub struct SpiEngine<B: RegisterBus, D: DelayNs> {
    transport: TransportHandle<B>,
    delay: D,
    timing: Timing,
}

impl<B: RegisterBus, D: DelayNs> SpiEngine<B, D> {
    /// Wrap an initialised transport
    pub fn new(transport: TransportHandle<B>, delay: D, timing: Timing) -> Self {
        Self {
            transport,
            delay,
            timing,
        }
    }

    /// Settle delays in use
    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    /// Access the transport
    pub fn transport(&self) -> &TransportHandle<B> {
        &self.transport
    }

    /// Tear the transport down
    pub fn shutdown(self) {
        self.transport.deinit();
    }

    /// Perform one full-duplex exchange
    ///
    /// Sends the frame header, clocks in response bytes and discards the
    /// bytes received while the header was being sent. Header and response
    /// share the 64-byte RX FIFO, so at most `64 - header` bytes of `rx`
    /// are filled; the count filled is returned. Both waits spin without
    /// bound.
    pub fn exchange(&mut self, frame: &CommandFrame, rx: &mut [u8]) -> usize {
        let layout = self.transport.layout();
        let mut header = [0u8; MAX_HEADER_LEN];
        let header_len = frame.encode(&mut header);
        let capacity = FIFO_DEPTH - header_len;
        if rx.len() > capacity {
            log::warn!(
                "spi0: {} byte response does not fit the FIFO, reading {}",
                rx.len(),
                capacity
            );
        }
        let rx_len = rx.len().min(capacity);
        let rx = &mut rx[..rx_len];
        let total = header_len + rx.len();

        log::trace!(
            "spi0: xfer op={:#04x} addr={:#x} hdr={} rx={}",
            frame.opcode,
            frame.address,
            header_len,
            rx.len()
        );

        self.transport.write_reg(layout.burst_count, total as u32);
        self.transport.write_reg(layout.transfer_count, header_len as u32);
        if let Some(bcc) = layout.burst_control {
            self.transport.write_reg(bcc, header_len as u32);
        }

        for &b in &header[..header_len] {
            self.transport.write_reg8(layout.tx, b);
        }

        self.transport.set_reg_bits(layout.xfer_ctl, layout.xch_bit);

        while self.transport.read_reg(layout.fifo_status) & FIFO_STA_TX_CNT != 0 {}
        while ((self.transport.read_reg(layout.fifo_status) & FIFO_STA_RX_CNT) as usize) < total {}

        // The controller clocks in one byte for every byte sent
        let mut echo = header_len;
        while echo >= 4 {
            self.transport.read_reg(layout.rx);
            echo -= 4;
        }
        for _ in 0..echo {
            self.transport.read_reg8(layout.rx);
        }

        for b in rx.iter_mut() {
            *b = self.transport.read_reg8(layout.rx);
        }
        rx.len()
    }

    /// Read the 3-byte identifier
    ///
    /// SPI NAND parts expect one dummy byte between the opcode and the ID;
    /// NOR parts answer directly.
    pub fn read_jedec_id(&mut self, dummy_bytes: u8) -> u32 {
        let mut id = [0u8; 3];
        self.exchange(&CommandFrame::read_id(dummy_bytes), &mut id);
        self.delay.delay_ns(self.timing.cs_recovery_ns);
        ((id[0] as u32) << 16) | ((id[1] as u32) << 8) | id[2] as u32
    }

    /// Load page `row` into the NAND cache and wait until it is ready
    pub fn nand_page_read_to_cache(&mut self, row: u32) {
        self.exchange(&CommandFrame::page_read(row), &mut []);
        while self.nand_read_status() & opcodes::STATUS_OIP != 0 {}
    }

    /// Read the NAND status feature register
    pub fn nand_read_status(&mut self) -> u8 {
        self.delay.delay_ns(self.timing.nand_poll_ns);
        let mut status = [0u8; 1];
        self.exchange(&CommandFrame::read_status(), &mut status);
        status[0]
    }

    /// Read from the NAND cache starting at `column`, returning the bytes
    /// read (at most one FIFO burst)
    pub fn nand_read_from_cache(&mut self, column: u32, buf: &mut [u8]) -> usize {
        let n = self.exchange(&CommandFrame::read_from_cache(column), buf);
        self.delay.delay_ns(self.timing.cs_recovery_ns);
        n
    }

    /// Read from NOR flash at `addr`, returning the bytes read (at most
    /// one FIFO burst)
    pub fn nor_read(&mut self, addr: u32, buf: &mut [u8]) -> usize {
        let n = self.exchange(&CommandFrame::nor_read(addr), buf);
        self.delay.delay_ns(self.timing.nor_read_recovery_ns);
        n
    }
}

impl<B: RegisterBus, D: DelayNs> core::fmt::Debug for SpiEngine<B, D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SpiEngine")
            .field("transport", &self.transport)
            .field("timing", &self.timing)
            .finish()
    }
}
