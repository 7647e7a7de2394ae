//! Infrastructure layer: clocks, configuration loading, logging, and
//! usage sink adapters.

pub mod clock;
pub mod config;
pub mod logging;
pub mod sink;
