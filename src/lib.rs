//! Fire Map - satellite fire-detection CSV extraction and world map plotting.

pub mod charts;
pub mod config;
pub mod data;
pub mod stats;
