//! SPI flash device models
//!
//! The models answer one chip-select cycle at a time: the controller hands
//! over the bytes it shifted out and the number of bytes it clocks in
//! afterwards.

use spiboot_core::spi::opcodes;

/// Flash kind behind the chip select
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    /// Nothing attached: MISO reads as zero
    Absent,
    /// SPI NOR answering Read ID without a dummy byte
    Nor,
    /// SPI NAND with a page cache
    Nand {
        /// log2 of the page size
        page_shift: u8,
        /// Status polls that report busy after each Page Read
        busy_polls: u32,
    },
}

/// Configuration for a simulated flash
#[derive(Debug, Clone)]
pub struct FlashConfig {
    /// 24-bit identifier
    pub jedec_id: u32,
    /// Device kind
    pub kind: FlashKind,
    /// Size in bytes
    pub size: usize,
}

impl FlashConfig {
    /// Nothing attached
    pub fn absent() -> Self {
        Self {
            jedec_id: 0,
            kind: FlashKind::Absent,
            size: 0,
        }
    }

    /// A 16 MiB Winbond W25Q128 NOR
    pub fn nor() -> Self {
        Self {
            jedec_id: 0x00EF_4018,
            kind: FlashKind::Nor,
            size: 16 * 1024 * 1024,
        }
    }

    /// A 2 KiB page SPI NAND with the given identifier, first 16 MiB only
    pub fn nand(jedec_id: u32) -> Self {
        Self {
            jedec_id,
            kind: FlashKind::Nand {
                page_shift: 11,
                busy_polls: 2,
            },
            size: 16 * 1024 * 1024,
        }
    }
}

/// One chip-select cycle as seen by the flash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Opcode byte
    pub opcode: u8,
    /// Bytes shifted out, opcode included
    pub header_len: usize,
    /// Address decoded from the header, if the opcode takes one
    pub address: Option<u32>,
    /// Bytes clocked in after the header
    pub rx_len: usize,
}

/// Simulated SPI flash
#[derive(Debug)]
pub struct SimFlash {
    config: FlashConfig,
    data: Vec<u8>,
    cache: Vec<u8>,
    cache_page: Option<u32>,
    busy_remaining: u32,
    log: Vec<Transaction>,
    violations: Vec<String>,
}

impl SimFlash {
    /// Create an erased flash
    pub fn new(config: FlashConfig) -> Self {
        let data = vec![0xFF; config.size];
        Self {
            config,
            data,
            cache: Vec::new(),
            cache_page: None,
            busy_remaining: 0,
            log: Vec::new(),
            violations: Vec::new(),
        }
    }

    /// Create a flash with `image` at `offset`
    pub fn with_data(config: FlashConfig, offset: usize, image: &[u8]) -> Self {
        let mut flash = Self::new(config);
        let end = (offset + image.len()).min(flash.data.len());
        if offset < end {
            flash.data[offset..end].copy_from_slice(&image[..end - offset]);
        }
        flash
    }

    /// Flash contents
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Configuration
    pub fn config(&self) -> &FlashConfig {
        &self.config
    }

    /// Every transaction seen so far
    pub fn transactions(&self) -> &[Transaction] {
        &self.log
    }

    /// Protocol violations, such as reading a cache that was never loaded
    pub fn violations(&self) -> &[String] {
        &self.violations
    }

    /// Run one chip-select cycle
    pub fn transfer(&mut self, header: &[u8], response: &mut [u8]) {
        let Some(&opcode) = header.first() else {
            response.fill(0);
            return;
        };

        let address = match opcode {
            opcodes::READ | opcodes::PAGE_READ => be_address(&header[1..]),
            opcodes::READ_FROM_CACHE => be_address(&header[1..header.len().min(3)]),
            opcodes::GET_FEATURE => header.get(1).map(|&b| b as u32),
            _ => None,
        };
        self.log.push(Transaction {
            opcode,
            header_len: header.len(),
            address,
            rx_len: response.len(),
        });
        log::trace!("flash: op {:#04x} addr {:?} rx {}", opcode, address, response.len());

        match self.config.kind {
            FlashKind::Absent => response.fill(0),
            FlashKind::Nor => self.nor_transfer(opcode, address, response),
            FlashKind::Nand { page_shift, busy_polls } => {
                self.nand_transfer(opcode, header, address, page_shift, busy_polls, response)
            }
        }
    }

    fn id_bytes(&self) -> [u8; 3] {
        let id = self.config.jedec_id;
        [(id >> 16) as u8, (id >> 8) as u8, id as u8]
    }

    fn nor_transfer(&mut self, opcode: u8, address: Option<u32>, response: &mut [u8]) {
        match opcode {
            opcodes::RDID => fill_repeating(response, &self.id_bytes()),
            opcodes::READ => {
                let addr = address.unwrap_or(0) as usize;
                self.copy_out(addr, response);
            }
            _ => {
                self.violations.push(format!("NOR: unsupported opcode {:#04x}", opcode));
                response.fill(0xFF);
            }
        }
    }

    fn nand_transfer(
        &mut self,
        opcode: u8,
        header: &[u8],
        address: Option<u32>,
        page_shift: u8,
        busy_polls: u32,
        response: &mut [u8],
    ) {
        let page_size = 1usize << page_shift;
        match opcode {
            opcodes::RDID => {
                if header.len() != 2 {
                    self.violations
                        .push(format!("NAND: Read ID with {} header bytes", header.len()));
                }
                fill_repeating(response, &self.id_bytes());
            }
            opcodes::PAGE_READ => {
                let row = address.unwrap_or(0);
                let start = (row as usize) << page_shift;
                let mut cache = vec![0xFF; page_size];
                if start < self.data.len() {
                    let end = (start + page_size).min(self.data.len());
                    cache[..end - start].copy_from_slice(&self.data[start..end]);
                }
                self.cache = cache;
                self.cache_page = Some(row);
                self.busy_remaining = busy_polls;
            }
            opcodes::GET_FEATURE => {
                let status = if self.busy_remaining > 0 {
                    self.busy_remaining -= 1;
                    opcodes::STATUS_OIP
                } else {
                    0
                };
                response.fill(status);
            }
            opcodes::READ_FROM_CACHE => {
                if header.len() != 4 {
                    self.violations
                        .push(format!("NAND: cache read with {} header bytes", header.len()));
                }
                if self.busy_remaining > 0 {
                    self.violations.push("NAND: cache read while busy".into());
                }
                if self.cache_page.is_none() {
                    self.violations.push("NAND: cache read before page load".into());
                }
                let column = address.unwrap_or(0) as usize;
                if column + response.len() > page_size {
                    self.violations.push(format!(
                        "NAND: cache read {:#x}+{} crosses the page",
                        column,
                        response.len()
                    ));
                }
                for (i, b) in response.iter_mut().enumerate() {
                    *b = self.cache.get(column + i).copied().unwrap_or(0xFF);
                }
            }
            _ => {
                self.violations.push(format!("NAND: unsupported opcode {:#04x}", opcode));
                response.fill(0xFF);
            }
        }
    }

    fn copy_out(&self, addr: usize, response: &mut [u8]) {
        for (i, b) in response.iter_mut().enumerate() {
            *b = self.data.get(addr + i).copied().unwrap_or(0xFF);
        }
    }
}

fn be_address(bytes: &[u8]) -> Option<u32> {
    if bytes.is_empty() {
        return None;
    }
    Some(bytes.iter().take(3).fold(0u32, |acc, &b| (acc << 8) | b as u32))
}

fn fill_repeating(buf: &mut [u8], pattern: &[u8]) {
    for (b, p) in buf.iter_mut().zip(pattern.iter().cycle()) {
        *b = *p;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nor_read() {
        let mut flash = SimFlash::with_data(FlashConfig::nor(), 0x100, &[1, 2, 3, 4]);
        let mut buf = [0u8; 4];
        flash.transfer(&[0x03, 0x00, 0x01, 0x00], &mut buf);
        assert_eq!(buf, [1, 2, 3, 4]);
        assert_eq!(flash.transactions()[0].address, Some(0x100));
    }

    #[test]
    fn test_nand_page_cycle() {
        let mut flash = SimFlash::with_data(FlashConfig::nand(0x00C212C2), 2048 + 5, &[0xAB]);
        let mut none = [0u8; 0];
        flash.transfer(&[0x13, 0x00, 0x00, 0x01], &mut none);

        let mut status = [0u8; 1];
        flash.transfer(&[0x0F, 0xC0], &mut status);
        assert_eq!(status[0], 1);
        flash.transfer(&[0x0F, 0xC0], &mut status);
        flash.transfer(&[0x0F, 0xC0], &mut status);
        assert_eq!(status[0], 0);

        let mut buf = [0u8; 1];
        flash.transfer(&[0x0B, 0x00, 0x05, 0x00], &mut buf);
        assert_eq!(buf[0], 0xAB);
        assert!(flash.violations().is_empty());
    }

    #[test]
    fn test_nand_cache_read_before_load() {
        let mut flash = SimFlash::new(FlashConfig::nand(0x00C212C2));
        let mut buf = [0u8; 4];
        flash.transfer(&[0x0B, 0x00, 0x00, 0x00], &mut buf);
        assert_eq!(flash.violations().len(), 1);
    }

    #[test]
    fn test_absent_reads_zero() {
        let mut flash = SimFlash::new(FlashConfig::absent());
        let mut buf = [0xAAu8; 3];
        flash.transfer(&[0x9F, 0x00], &mut buf);
        assert_eq!(buf, [0, 0, 0]);
    }
}
