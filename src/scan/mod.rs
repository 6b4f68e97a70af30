//! The slit-scan compositor: session state machine, tick driver and export.

pub(crate) mod driver;
pub(crate) mod export;
pub(crate) mod opts;
pub(crate) mod session;
