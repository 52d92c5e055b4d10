//! Charts module - Fire map rendering

mod colors;
mod plotter;

pub use colors::ColorScale;
pub use plotter::{FireMapPlotter, FirePlot, OutputFormat, PlotConfig, PlotError};
