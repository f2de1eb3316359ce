//! Board targets
//!
//! Everything that differs between Allwinner SoC families, as far as SPI0
//! boot is concerned, lives in one [`TargetDescriptor`] per family. The
//! loader picks a [`SocTarget`] at build time and never branches on the
//! SoC again.

use crate::controller::regs::SPI0_CLK_DIV_BY_4;
use crate::controller::ControllerVariant;
use crate::gpio::{GpioPin, PioLayout};

/// A register address together with the bits the driver sets and clears
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterBits {
    /// Absolute register address
    pub addr: usize,
    /// Bits to set on enable and clear on disable
    pub bits: u32,
}

impl RegisterBits {
    const fn new(addr: usize, bits: u32) -> Self {
        Self { addr, bits }
    }
}

/// How SPI0 is clocked on a target
///
/// Any step set to `None` is skipped on that family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockPlan {
    /// Reset de-assert bits
    pub reset: Option<RegisterBits>,
    /// AHB bus gate bits
    pub gate: Option<RegisterBits>,
    /// Clock divider value, written to the controller's CCTL register
    pub divider: Option<u32>,
    /// Module clock register, enabled with bit 31
    pub module_clock: Option<usize>,
}

/// Module clock enable bit in the CCU SPI0 clock register
pub const SPI0_MODULE_CLK_EN: u32 = 1 << 31;

/// Static description of SPI0 on one SoC family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetDescriptor {
    /// Human readable family name
    pub name: &'static str,
    /// Controller generation
    pub variant: ControllerVariant,
    /// SPI0 register block base address
    pub spi0_base: usize,
    /// SPI0 signal pins (CLK, MOSI, MISO, CS in no particular order)
    pub pins: [GpioPin; 4],
    /// Pin function selecting SPI0
    pub pin_function: u8,
    /// Pin function applied at teardown
    pub inert_function: u8,
    /// Port controller layout
    pub pio: PioLayout,
    /// Clock enable plan
    pub clocks: ClockPlan,
}

// CCU registers
const CCM_AHB_GATING0: usize = 0x01C2_0000 + 0x60;
const CCM_SPI0_CLK: usize = 0x01C2_0000 + 0xA0;
const SUN6I_BUS_SOFT_RST_REG0: usize = 0x01C2_0000 + 0x2C0;
const CCM_H6_SPI_BGR_REG: usize = 0x0300_1000 + 0x96C;
const CCM_H6_SPI0_CLK: usize = 0x0300_1000 + 0x940;
const CCM_T113_SPI_BGR_REG: usize = 0x0200_1000 + 0x96C;
const CCM_T113_SPI0_CLK: usize = 0x0200_1000 + 0x940;

const AHB_RESET_SPI0: u32 = 1 << 20;
const AHB_GATE_SPI0: u32 = 1 << 20;
/// BGR register: reset de-assert (bit 16) plus gate (bit 0)
const BGR_SPI0: u32 = (1 << 16) | 1;

// Pin functions
const SUNXI_GPIO_INPUT: u8 = 0;
const SUNXI_GPIO_DISABLE: u8 = 7;
const SUNXI_GPC_SPI0: u8 = 3;
const SUN50I_GPC_SPI0: u8 = 4;
const SUNIV_GPC_SPI0: u8 = 2;
const SUN8I_T113_GPC_SPI0: u8 = 2;
const SUN8I_T113_GPIO_DISABLE: u8 = 0xF;

// Port controllers
const SUNXI_PIO: PioLayout = PioLayout::new(0x01C2_0800, 0x24);
const SUN50I_H6_PIO: PioLayout = PioLayout::new(0x0300_B000, 0x24);
const SUN8I_T113_PIO: PioLayout = PioLayout::new(0x0200_0000, 0x30);

const PINS_PC0_3: [GpioPin; 4] = [GpioPin::pc(2), GpioPin::pc(0), GpioPin::pc(1), GpioPin::pc(3)];
const PINS_PC23_CS: [GpioPin; 4] = [GpioPin::pc(2), GpioPin::pc(0), GpioPin::pc(1), GpioPin::pc(23)];
const PINS_H6: [GpioPin; 4] = [GpioPin::pc(2), GpioPin::pc(0), GpioPin::pc(5), GpioPin::pc(3)];
const PINS_T113: [GpioPin; 4] = [GpioPin::pc(2), GpioPin::pc(4), GpioPin::pc(5), GpioPin::pc(3)];

const SUN4I_CLOCKS: ClockPlan = ClockPlan {
    reset: None,
    gate: Some(RegisterBits::new(CCM_AHB_GATING0, AHB_GATE_SPI0)),
    divider: Some(SPI0_CLK_DIV_BY_4),
    module_clock: Some(CCM_SPI0_CLK),
};

const SUN6I_CLOCKS: ClockPlan = ClockPlan {
    reset: Some(RegisterBits::new(SUN6I_BUS_SOFT_RST_REG0, AHB_RESET_SPI0)),
    ..SUN4I_CLOCKS
};

/// Supported SoC families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocTarget {
    /// A10
    Sun4i,
    /// A13
    Sun5i,
    /// A20
    Sun7i,
    /// A31, A23, A33, H3 and the rest of the sun6i generation
    Sun6i,
    /// R40
    Sun8iR40,
    /// A64, H5
    Sun50i,
    /// H6
    Sun50iH6,
    /// F1C100s
    Suniv,
    /// T113
    Sun8iT113,
}

impl SocTarget {
    /// Every supported family, in listing order
    pub const ALL: &'static [SocTarget] = &[
        Self::Sun4i,
        Self::Sun5i,
        Self::Sun7i,
        Self::Sun6i,
        Self::Sun8iR40,
        Self::Sun50i,
        Self::Sun50iH6,
        Self::Suniv,
        Self::Sun8iT113,
    ];

    /// Short command-line name
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Sun4i => "sun4i",
            Self::Sun5i => "sun5i",
            Self::Sun7i => "sun7i",
            Self::Sun6i => "sun6i",
            Self::Sun8iR40 => "r40",
            Self::Sun50i => "sun50i",
            Self::Sun50iH6 => "h6",
            Self::Suniv => "suniv",
            Self::Sun8iT113 => "t113",
        }
    }

    /// Look a target up by its [`key`](Self::key)
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.key().eq_ignore_ascii_case(key))
    }

    /// SPI0 description of this family
    pub const fn descriptor(&self) -> TargetDescriptor {
        match self {
            Self::Sun4i | Self::Sun5i | Self::Sun7i => TargetDescriptor {
                name: match self {
                    Self::Sun4i => "A10",
                    Self::Sun5i => "A13",
                    _ => "A20",
                },
                variant: ControllerVariant::GenA,
                spi0_base: 0x01C0_5000,
                pins: if matches!(self, Self::Sun5i) {
                    PINS_PC0_3
                } else {
                    PINS_PC23_CS
                },
                pin_function: SUNXI_GPC_SPI0,
                inert_function: SUNXI_GPIO_INPUT,
                pio: SUNXI_PIO,
                clocks: SUN4I_CLOCKS,
            },
            Self::Sun6i => TargetDescriptor {
                name: "A31/H3",
                variant: ControllerVariant::GenB,
                spi0_base: 0x01C6_8000,
                pins: PINS_PC0_3,
                pin_function: SUNXI_GPC_SPI0,
                inert_function: SUNXI_GPIO_DISABLE,
                pio: SUNXI_PIO,
                clocks: SUN6I_CLOCKS,
            },
            Self::Sun8iR40 => TargetDescriptor {
                name: "R40",
                variant: ControllerVariant::GenB,
                spi0_base: 0x01C0_5000,
                pins: PINS_PC23_CS,
                pin_function: SUNXI_GPC_SPI0,
                inert_function: SUNXI_GPIO_DISABLE,
                pio: SUNXI_PIO,
                clocks: SUN6I_CLOCKS,
            },
            Self::Sun50i => TargetDescriptor {
                name: "A64/H5",
                variant: ControllerVariant::GenB,
                spi0_base: 0x01C6_8000,
                pins: PINS_PC0_3,
                pin_function: SUN50I_GPC_SPI0,
                inert_function: SUNXI_GPIO_DISABLE,
                pio: SUNXI_PIO,
                clocks: SUN6I_CLOCKS,
            },
            Self::Sun50iH6 => TargetDescriptor {
                name: "H6",
                variant: ControllerVariant::GenB,
                spi0_base: 0x0501_0000,
                pins: PINS_H6,
                pin_function: SUN50I_GPC_SPI0,
                inert_function: SUNXI_GPIO_DISABLE,
                pio: SUN50I_H6_PIO,
                clocks: ClockPlan {
                    reset: Some(RegisterBits::new(CCM_H6_SPI_BGR_REG, BGR_SPI0)),
                    gate: None,
                    divider: Some(SPI0_CLK_DIV_BY_4),
                    module_clock: Some(CCM_H6_SPI0_CLK),
                },
            },
            Self::Suniv => TargetDescriptor {
                name: "F1C100s",
                variant: ControllerVariant::GenB,
                spi0_base: 0x01C0_5000,
                pins: PINS_PC0_3,
                pin_function: SUNIV_GPC_SPI0,
                inert_function: SUNXI_GPIO_DISABLE,
                pio: SUNXI_PIO,
                clocks: ClockPlan {
                    module_clock: None,
                    ..SUN6I_CLOCKS
                },
            },
            Self::Sun8iT113 => TargetDescriptor {
                name: "T113",
                variant: ControllerVariant::GenB,
                spi0_base: 0x0402_5000,
                pins: PINS_T113,
                pin_function: SUN8I_T113_GPC_SPI0,
                inert_function: SUN8I_T113_GPIO_DISABLE,
                pio: SUN8I_T113_PIO,
                clocks: ClockPlan {
                    reset: Some(RegisterBits::new(CCM_T113_SPI_BGR_REG, BGR_SPI0)),
                    gate: None,
                    divider: None,
                    module_clock: Some(CCM_T113_SPI0_CLK),
                },
            },
        }
    }
}

impl core::fmt::Display for SocTarget {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.key())
    }
}
