//! spiboot-sim - Register-level SPI0 simulator
//!
//! This crate simulates just enough of an Allwinner SoC to run the real
//! `spiboot-core` loader on a host: the SPI0 controller of either
//! generation, the CCU and port-controller registers the transport
//! touches, a SPI NOR or SPI NAND flash behind the chip select, and a RAM
//! window to load into.
//!
//! The models check the driver as they go. An exchange that overflows the
//! 64-byte FIFO panics; softer protocol errors are collected and exposed
//! through `violations()`.

mod delay;
mod flash;
mod memory;
mod soc;
mod spi0;

pub use delay::SimDelay;
pub use flash::{FlashConfig, FlashKind, SimFlash, Transaction};
pub use memory::SimMemory;
pub use soc::{SimSoc, SPI0_WINDOW};
pub use spi0::{Burst, Spi0Model};

#[cfg(test)]
mod tests {
    use super::*;
    use spiboot_core::chip::{find_by_jedec_id, Medium, GENERIC_2K};
    use spiboot_core::error::{Error, Result};
    use spiboot_core::image::{ImageInfo, LegacyHeader, LegacyImage, RawHeader, FDT_MAGIC};
    use spiboot_core::loader::{BootConfig, BootLoader, FitLoader, LoadSource, NoFit};
    use spiboot_core::protocol::{SpiEngine, Timing};
    use spiboot_core::reader::{FlashReader, FIFO_DATA_CAPACITY};
    use spiboot_core::spi::{opcodes, CommandFrame};
    use spiboot_core::target::SocTarget;
    use spiboot_core::transport::TransportHandle;

    const RAM_BASE: u32 = 0x4000_0000;
    const LOAD_ADDR: u32 = 0x4000_1000;

    fn payload(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 7 + 3) as u8).collect()
    }

    fn legacy_image(len: usize) -> Vec<u8> {
        let body = payload(len);
        let mut image = LegacyHeader::for_payload(LOAD_ADDR, LOAD_ADDR, "U-Boot", &body).to_vec();
        image.extend_from_slice(&body);
        image
    }

    struct Run {
        soc: SimSoc,
        delay: SimDelay,
        memory: SimMemory,
        result: Result<ImageInfo>,
    }

    fn boot_with<F: FitLoader>(target: SocTarget, flash: SimFlash, config: BootConfig, fit: &mut F) -> Run {
        let desc = target.descriptor();
        let mut soc = SimSoc::new(desc, flash);
        let mut delay = SimDelay::new();
        let mut memory = SimMemory::new(RAM_BASE, 1024 * 1024);
        let loader = BootLoader::new(desc, config);
        let result = loader.load(&mut soc, &mut delay, &LegacyImage, fit, &mut memory);
        Run {
            soc,
            delay,
            memory,
            result,
        }
    }

    fn boot(target: SocTarget, flash: SimFlash, config: BootConfig) -> Run {
        boot_with(target, flash, config, &mut NoFit)
    }

    fn assert_clean_shutdown(soc: &SimSoc) {
        assert_eq!(soc.teardown_count(), 1);
        assert!(!soc.clock_running());
        assert!(!soc.spi0().is_enabled());
        assert!(soc.pins_set_to(soc.target().inert_function));
    }

    fn opcodes_sent(soc: &SimSoc) -> Vec<u8> {
        soc.flash().transactions().iter().map(|t| t.opcode).collect()
    }

    #[test]
    fn test_nor_legacy_image_gen_a() {
        let image = legacy_image(1000);
        let flash = SimFlash::with_data(FlashConfig::nor(), 0x8000, &image);
        let run = boot(SocTarget::Sun7i, flash, BootConfig::nor(0x6000, 0x8000));

        let info = run.result.unwrap();
        assert_eq!(info.load_address, LOAD_ADDR - 64);
        assert_eq!(info.size, 1064);
        assert_eq!(run.memory.slice(info.load_address, image.len()).unwrap(), &image[..]);
        assert_clean_shutdown(&run.soc);
        assert!(run.soc.spi0().violations().is_empty());
        assert!(run.soc.flash().violations().is_empty());
        assert!(run.delay.calls().contains(&1_000));
    }

    #[test]
    fn test_nor_legacy_image_gen_b() {
        let image = legacy_image(333);
        let flash = SimFlash::with_data(FlashConfig::nor(), 0x8000, &image);
        let run = boot(SocTarget::Sun6i, flash, BootConfig::nor(0x6000, 0x8000));

        let info = run.result.unwrap();
        assert_eq!(run.memory.slice(info.load_address, image.len()).unwrap(), &image[..]);
        assert_clean_shutdown(&run.soc);
        assert!(run.soc.spi0().violations().is_empty());
    }

    #[test]
    fn test_nand_legacy_image_gen_b() {
        let image = legacy_image(5000);
        let flash = SimFlash::with_data(FlashConfig::nand(0x00C212C2), 0x4_0000, &image);
        let run = boot(SocTarget::Sun8iT113, flash, BootConfig::nand(0x8000, 0x4_0000));

        let info = run.result.unwrap();
        assert_eq!(info.name(), "U-Boot");
        assert_eq!(run.memory.slice(info.load_address, image.len()).unwrap(), &image[..]);
        assert_clean_shutdown(&run.soc);
        assert!(run.soc.spi0().violations().is_empty());
        assert!(run.soc.flash().violations().is_empty());
        assert!(run.delay.calls().contains(&200));
        assert!(run.delay.calls().contains(&100));
    }

    #[test]
    fn test_nand_legacy_image_gen_a() {
        let image = legacy_image(4200);
        let flash = SimFlash::with_data(FlashConfig::nand(0x00C8B148), 0x2_0000, &image);
        let run = boot(SocTarget::Sun5i, flash, BootConfig::nand(0x6000, 0x2_0000));

        let info = run.result.unwrap();
        assert_eq!(run.memory.slice(info.load_address, image.len()).unwrap(), &image[..]);
        assert_clean_shutdown(&run.soc);
        assert!(run.soc.flash().violations().is_empty());
    }

    #[test]
    fn test_own_image_larger_than_offset() {
        let image = legacy_image(64);
        let flash = SimFlash::with_data(FlashConfig::nor(), 0x9000, &image);
        let run = boot(SocTarget::Sun50i, flash, BootConfig::nor(0x9000, 0x8000));

        assert!(run.result.is_ok());
        let first_read = run
            .soc
            .flash()
            .transactions()
            .iter()
            .find(|t| t.opcode == opcodes::READ)
            .unwrap();
        assert_eq!(first_read.address, Some(0x9000));
    }

    /// FIT loader that pulls `len` bytes following the header
    struct RecordingFit {
        calls: usize,
        len: u32,
        seen: Vec<u8>,
        medium: Option<Medium>,
    }

    impl FitLoader for RecordingFit {
        fn load_fit(
            &mut self,
            source: &mut dyn LoadSource,
            offset: u32,
            header: &RawHeader,
        ) -> Result<ImageInfo> {
            self.calls += 1;
            assert_eq!(header[..4], FDT_MAGIC.to_be_bytes());
            assert_eq!(source.block_len(), 1);
            self.medium = Some(source.medium());
            let mut buf = vec![0u8; self.len as usize];
            let n = source.read(offset + 64, self.len, &mut buf);
            assert_eq!(n, self.len);
            self.seen = buf;
            Ok(ImageInfo::new(LOAD_ADDR, LOAD_ADDR, self.len, "fit"))
        }
    }

    fn fit_image(len: usize) -> Vec<u8> {
        let mut image = FDT_MAGIC.to_be_bytes().to_vec();
        image.extend_from_slice(&((len + 64) as u32).to_be_bytes());
        image.resize(64, 0);
        image.extend_from_slice(&payload(len));
        image
    }

    #[test]
    fn test_nand_fit_lazy_reads() {
        let offset = 0x4_0000usize;
        let image = fit_image(3000);
        let flash = SimFlash::with_data(FlashConfig::nand(0x00C954C9), offset, &image);
        let mut fit = RecordingFit {
            calls: 0,
            len: 3000,
            seen: Vec::new(),
            medium: None,
        };
        let run = boot_with(
            SocTarget::Sun50iH6,
            flash,
            BootConfig::nand(0x8000, offset as u32),
            &mut fit,
        );

        assert!(run.result.is_ok());
        assert_eq!(fit.calls, 1);
        assert_eq!(&fit.seen[..], &run.soc.flash().data()[offset + 64..offset + 64 + 3000]);
        assert_eq!(fit.medium, Some(Medium::Nand(find_by_jedec_id(0x00C954C9).unwrap())));
        assert_clean_shutdown(&run.soc);
    }

    #[test]
    fn test_nor_fit_lazy_reads() {
        let image = fit_image(200);
        let flash = SimFlash::with_data(FlashConfig::nor(), 0x8000, &image);
        let mut fit = RecordingFit {
            calls: 0,
            len: 200,
            seen: Vec::new(),
            medium: None,
        };
        let run = boot_with(SocTarget::Sun6i, flash, BootConfig::nor(0, 0x8000), &mut fit);

        assert!(run.result.is_ok());
        assert_eq!(fit.calls, 1);
        assert_eq!(fit.seen, payload(200));
        assert_eq!(fit.medium, Some(Medium::Nor));
    }

    #[test]
    fn test_fit_disabled_falls_back_to_parser() {
        let image = fit_image(16);
        let flash = SimFlash::with_data(FlashConfig::nor(), 0x8000, &image);
        let mut config = BootConfig::nor(0, 0x8000);
        config.load_fit = false;
        let run = boot(SocTarget::Sun6i, flash, config);

        assert_eq!(run.result, Err(Error::ImageParseError));
        assert_clean_shutdown(&run.soc);
    }

    #[test]
    fn test_no_chip_nand() {
        let run = boot(
            SocTarget::Sun8iT113,
            SimFlash::new(FlashConfig::absent()),
            BootConfig::nand(0x8000, 0x4_0000),
        );

        assert_eq!(run.result, Err(Error::NoChipDetected));
        assert_clean_shutdown(&run.soc);
        assert_eq!(opcodes_sent(&run.soc), vec![opcodes::RDID]);
    }

    #[test]
    fn test_no_chip_nor() {
        let run = boot(
            SocTarget::Sun4i,
            SimFlash::new(FlashConfig::absent()),
            BootConfig::nor(0x6000, 0x8000),
        );

        assert_eq!(run.result, Err(Error::NoChipDetected));
        assert_clean_shutdown(&run.soc);
        assert_eq!(opcodes_sent(&run.soc), vec![opcodes::RDID]);
    }

    #[test]
    fn test_unknown_chip() {
        let image = legacy_image(100);
        let flash = SimFlash::with_data(FlashConfig::nand(0x00123456), 0x4_0000, &image);
        let run = boot(SocTarget::Sun50i, flash, BootConfig::nand(0, 0x4_0000));

        assert_eq!(run.result, Err(Error::UnsupportedChip { jedec_id: 0x123456 }));
        assert_clean_shutdown(&run.soc);
        assert_eq!(opcodes_sent(&run.soc), vec![opcodes::RDID]);
    }

    #[test]
    fn test_unknown_chip_generic_fallback() {
        let image = legacy_image(100);
        let flash = SimFlash::with_data(FlashConfig::nand(0x00123456), 0x4_0000, &image);
        let mut config = BootConfig::nand(0, 0x4_0000);
        config.allow_generic_nand = true;
        let run = boot(SocTarget::Sun50i, flash, config);

        let info = run.result.unwrap();
        assert_eq!(run.memory.slice(info.load_address, image.len()).unwrap(), &image[..]);
        assert_clean_shutdown(&run.soc);
    }

    #[test]
    fn test_crc_error() {
        let mut image = legacy_image(100);
        image[12] ^= 0x40;
        let flash = SimFlash::with_data(FlashConfig::nand(0x00C222C2), 0x4_0000, &image);
        let run = boot(SocTarget::Sun8iR40, flash, BootConfig::nand(0, 0x4_0000));

        assert_eq!(run.result, Err(Error::ChecksumInvalid));
        assert_clean_shutdown(&run.soc);
        assert!(run.memory.slice(RAM_BASE, 0x2000).unwrap().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_load_address_outside_ram() {
        let body = payload(10);
        let mut image = LegacyHeader::for_payload(0x8000_0000, 0x8000_0000, "far", &body).to_vec();
        image.extend_from_slice(&body);
        let flash = SimFlash::with_data(FlashConfig::nor(), 0x8000, &image);
        let run = boot(SocTarget::Sun6i, flash, BootConfig::nor(0, 0x8000));

        assert_eq!(run.result, Err(Error::AddressOutOfRange));
        assert_clean_shutdown(&run.soc);
    }

    fn nand_reader<'a>(
        soc: &'a mut SimSoc,
        delay: &'a mut SimDelay,
    ) -> FlashReader<&'a mut SimSoc, &'a mut SimDelay> {
        let desc = *soc.target();
        let transport = TransportHandle::init(soc, desc);
        let engine = SpiEngine::new(transport, delay, Timing::default());
        FlashReader::new(engine, Medium::Nand(&GENERIC_2K))
    }

    #[test]
    fn test_nand_read_across_page_boundary() {
        let desc = SocTarget::Sun6i.descriptor();
        let data = payload(8192);
        let mut soc = SimSoc::new(desc, SimFlash::with_data(FlashConfig::nand(0x00C212C2), 0, &data));
        let mut delay = SimDelay::new();

        let mut buf = [0u8; 16];
        {
            let mut reader = nand_reader(&mut soc, &mut delay);
            reader.read(2040, &mut buf);
            assert_eq!(reader.page_cache().cached_page(), Some(1));
            reader.shutdown();
        }
        assert_eq!(&buf[..], &data[2040..2056]);

        let page_ops: Vec<_> = soc
            .flash()
            .transactions()
            .iter()
            .filter(|t| t.opcode == opcodes::PAGE_READ || t.opcode == opcodes::READ_FROM_CACHE)
            .map(|t| (t.opcode, t.address, t.rx_len))
            .collect();
        assert_eq!(
            page_ops,
            vec![
                (opcodes::PAGE_READ, Some(0), 0),
                (opcodes::READ_FROM_CACHE, Some(2040), 8),
                (opcodes::PAGE_READ, Some(1), 0),
                (opcodes::READ_FROM_CACHE, Some(0), 8),
            ]
        );
        assert!(soc.flash().violations().is_empty());
    }

    #[test]
    fn test_nand_status_polled_until_ready() {
        let desc = SocTarget::Sun50i.descriptor();
        let mut soc = SimSoc::new(desc, SimFlash::new(FlashConfig::nand(0x00C212C2)));
        let mut delay = SimDelay::new();
        {
            let mut reader = nand_reader(&mut soc, &mut delay);
            let mut buf = [0u8; 4];
            reader.read(0, &mut buf);
        }
        // Two busy answers, then ready
        let polls = opcodes_sent(&soc)
            .iter()
            .filter(|&&op| op == opcodes::GET_FEATURE)
            .count();
        assert_eq!(polls, 3);
        assert_eq!(delay.calls().iter().filter(|&&ns| ns == 200).count(), 3);
        assert_eq!(soc.teardown_count(), 1);
    }

    #[test]
    fn test_no_burst_over_fifo_capacity() {
        let data = payload(16384);
        let addrs = [0u32, 1, 59, 60, 2000, 2047, 2048, 4090, 6143];
        let lens = [0usize, 1, 59, 60, 61, 120, 2047, 2048, 2049, 5000];

        for target in [SocTarget::Sun7i, SocTarget::Sun50iH6] {
            for nand in [false, true] {
                for &addr in &addrs {
                    for &len in &lens {
                        let desc = target.descriptor();
                        let base = if nand {
                            FlashConfig::nand(0x00C212C2)
                        } else {
                            FlashConfig::nor()
                        };
                        let config = FlashConfig {
                            size: data.len(),
                            ..base
                        };
                        let mut soc = SimSoc::new(desc, SimFlash::with_data(config, 0, &data));
                        let mut delay = SimDelay::new();
                        let mut buf = vec![0u8; len];
                        {
                            let transport = TransportHandle::init(&mut soc, desc);
                            let engine = SpiEngine::new(transport, &mut delay, Timing::default());
                            let medium = if nand {
                                Medium::Nand(&GENERIC_2K)
                            } else {
                                Medium::Nor
                            };
                            let mut reader = FlashReader::new(engine, medium);
                            reader.read(addr, &mut buf);
                        }

                        let start = addr as usize;
                        assert_eq!(&buf[..], &data[start..start + len], "{:?} {} {}", target, addr, len);
                        for burst in soc.spi0().bursts() {
                            assert!(burst.payload() <= FIFO_DATA_CAPACITY);
                        }
                        assert!(soc.flash().violations().is_empty());
                        assert!(soc.spi0().violations().is_empty());
                    }
                }
            }
        }
    }
    #[test]
    fn test_nand_row_mask_wraps() {
        // W25N01GV keeps only 16 row bits, so the page after 0xFFFF is row 0
        let geometry = find_by_jedec_id(0x00EF_AA21).unwrap();
        assert_eq!(geometry.page_mask, 0xFFFF);

        let desc = SocTarget::Sun50iH6.descriptor();
        let data = payload(4096);
        let mut soc = SimSoc::new(desc, SimFlash::with_data(FlashConfig::nand(0x00EF_AA21), 0, &data));
        let mut delay = SimDelay::new();

        let top = 0x1_0000u32 << 11;
        let mut buf = [0u8; 16];
        {
            let transport = TransportHandle::init(&mut soc, desc);
            let engine = SpiEngine::new(transport, &mut delay, Timing::default());
            let mut reader = FlashReader::new(engine, Medium::Nand(geometry));
            reader.read(top - 8, &mut buf);
            assert_eq!(reader.page_cache().cached_page(), Some(0x1_0000));
            reader.shutdown();
        }

        assert_eq!(&buf[..8], &[0xFF; 8]);
        assert_eq!(&buf[8..], &data[..8]);

        let page_ops: Vec<_> = soc
            .flash()
            .transactions()
            .iter()
            .filter(|t| t.opcode == opcodes::PAGE_READ || t.opcode == opcodes::READ_FROM_CACHE)
            .map(|t| (t.opcode, t.address, t.rx_len))
            .collect();
        assert_eq!(
            page_ops,
            vec![
                (opcodes::PAGE_READ, Some(0xFFFF), 0),
                (opcodes::READ_FROM_CACHE, Some(0x7F8), 8),
                (opcodes::PAGE_READ, Some(0), 0),
                (opcodes::READ_FROM_CACHE, Some(0), 8),
            ]
        );
        assert!(soc.flash().violations().is_empty());
    }

    #[test]
    fn test_exchange_clamped_to_fifo() {
        for target in [SocTarget::Sun7i, SocTarget::Sun8iT113] {
            let desc = target.descriptor();
            let data = payload(256);
            let mut soc = SimSoc::new(desc, SimFlash::with_data(FlashConfig::nor(), 0, &data));
            let mut delay = SimDelay::new();
            let mut buf = [0xA5u8; 100];
            {
                let transport = TransportHandle::init(&mut soc, desc);
                let mut engine = SpiEngine::new(transport, &mut delay, Timing::default());
                assert_eq!(engine.nor_read(0, &mut buf), FIFO_DATA_CAPACITY);

                let mut id = [0u8; 70];
                assert_eq!(engine.exchange(&CommandFrame::read_id(0), &mut id), 63);
                assert_eq!(&id[..3], &[0xEF, 0x40, 0x18]);
                engine.shutdown();
            }

            assert_eq!(&buf[..FIFO_DATA_CAPACITY], &data[..FIFO_DATA_CAPACITY]);
            assert!(buf[FIFO_DATA_CAPACITY..].iter().all(|&b| b == 0xA5));
            assert_eq!(
                soc.spi0().bursts(),
                &[Burst { total: 64, header: 4 }, Burst { total: 64, header: 1 }]
            );
            assert!(soc.spi0().violations().is_empty());
            assert_eq!(soc.teardown_count(), 1);
        }
    }
}
