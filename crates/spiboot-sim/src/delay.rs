//! Recording delay provider

use embedded_hal::delay::DelayNs;

/// [`DelayNs`] that only records what it was asked to wait
#[derive(Debug, Default, Clone)]
pub struct SimDelay {
    calls: Vec<u32>,
}

impl SimDelay {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Every requested delay in nanoseconds, in order
    pub fn calls(&self) -> &[u32] {
        &self.calls
    }

    /// Sum of all requested delays
    pub fn total_ns(&self) -> u64 {
        self.calls.iter().map(|&ns| ns as u64).sum()
    }
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.calls.push(ns);
    }
}
