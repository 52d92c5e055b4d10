//! Stats module - brightness statistics

mod summary;

pub use summary::{date_span, BrightnessSummary};
