//! Site-specific listing configurations

pub mod amazon;
