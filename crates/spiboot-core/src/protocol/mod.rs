//! Flash command protocol
//!
//! A thin layer on top of the transport that knows how to issue one
//! command frame and collect its response. The exchange is end-to-end
//! tested against the register model in `spiboot-sim`.

mod engine;

pub use engine::{SpiEngine, Timing};
