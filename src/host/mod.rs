//! Host-side flow around the compositor: choose a direction, start, export, retry, close.

pub(crate) mod scanner;
