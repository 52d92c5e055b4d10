//! Fire Map Plotter Module
//! Renders fire detections as a brightness-colored scatter on a world frame using plotters.

use crate::charts::ColorScale;
use crate::stats::{date_span, BrightnessSummary};
use chrono::NaiveDate;
use plotters::coord::Shift;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

const LON_RANGE: std::ops::Range<f64> = -180.0..180.0;
const LAT_RANGE: std::ops::Range<f64> = -90.0..90.0;

const COLOR_BAR_WIDTH: u32 = 130;
const FOOTER_HEIGHT: u32 = 30;
const COLOR_BAR_STEPS: usize = 100;

const OCEAN: RGBColor = RGBColor(235, 242, 250);
const GRID: RGBColor = RGBColor(200, 200, 200);

#[derive(Error, Debug)]
pub enum PlotError {
    #[error(
        "Sequence lengths differ: {lats} lats, {lons} lons, {brights} brights, {dates} dates"
    )]
    LengthMismatch {
        lats: usize,
        lons: usize,
        brights: usize,
        dates: usize,
    },
    #[error("Failed to draw chart: {0}")]
    Drawing(String),
    #[error("Failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Image encoding, chosen from the output file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Svg,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("svg") => OutputFormat::Svg,
            _ => OutputFormat::Png,
        }
    }
}

/// Rendering settings for the fire map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub width: u32,
    pub height: u32,
    /// Marker radius in pixels
    pub marker_size: u32,
    pub color_scale: ColorScale,
    pub output: PathBuf,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: 1400,
            height: 800,
            marker_size: 5,
            color_scale: ColorScale::default(),
            output: PathBuf::from("fire_map.png"),
        }
    }
}

/// Handle to a rendered fire map.
#[derive(Debug, Clone, PartialEq)]
pub struct FirePlot {
    pub path: PathBuf,
    pub format: OutputFormat,
    pub title: String,
    /// Points drawn on the map
    pub points: usize,
    /// Points whose coordinates fall outside the world frame
    pub off_map: usize,
}

/// One marker, already resolved to map coordinates and color.
struct Marker {
    lon: f64,
    lat: f64,
    color: RGBColor,
}

/// Creates world map scatter plots of fire detections.
pub struct FireMapPlotter {
    config: PlotConfig,
}

impl Default for FireMapPlotter {
    fn default() -> Self {
        Self::new(PlotConfig::default())
    }
}

impl FireMapPlotter {
    pub fn new(config: PlotConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlotConfig {
        &self.config
    }

    /// Render the detections to the configured output file.
    ///
    /// Marker color encodes brightness. The four sequences must have equal length.
    pub fn create_plot(
        &self,
        lats: &[f64],
        lons: &[f64],
        brights: &[f64],
        dates: &[NaiveDate],
        title: &str,
    ) -> Result<FirePlot, PlotError> {
        let n = lats.len();
        if lons.len() != n || brights.len() != n || dates.len() != n {
            return Err(PlotError::LengthMismatch {
                lats: n,
                lons: lons.len(),
                brights: brights.len(),
                dates: dates.len(),
            });
        }

        let summary = BrightnessSummary::from_values(brights);
        let (markers, off_map) = self.markers(lats, lons, brights, &summary);
        if off_map > 0 {
            debug!(off_map, "points outside the world frame are not drawn");
        }

        let footer = footer_text(markers.len(), dates);
        let path = self.config.output.clone();
        let format = OutputFormat::from_path(&path);
        let dims = (self.config.width, self.config.height);

        let drawn = match format {
            OutputFormat::Png => {
                let root = BitMapBackend::new(&path, dims).into_drawing_area();
                self.draw(root, title, &footer, &markers, &summary)
            }
            OutputFormat::Svg => {
                let root = SVGBackend::new(&path, dims).into_drawing_area();
                self.draw(root, title, &footer, &markers, &summary)
            }
        };
        drawn.map_err(|e| PlotError::Drawing(e.to_string()))?;

        info!(path = %path.display(), points = markers.len(), "fire map rendered");

        Ok(FirePlot {
            path,
            format,
            title: title.to_string(),
            points: markers.len(),
            off_map,
        })
    }

    /// Open the rendered file with the system default viewer.
    pub fn show_plot(&self, plot: &FirePlot) -> Result<(), PlotError> {
        open::that(&plot.path).map_err(|source| PlotError::Open {
            path: plot.path.clone(),
            source,
        })
    }

    fn markers(
        &self,
        lats: &[f64],
        lons: &[f64],
        brights: &[f64],
        summary: &BrightnessSummary,
    ) -> (Vec<Marker>, usize) {
        let mut markers = Vec::with_capacity(lats.len());
        let mut off_map = 0;

        for ((&lat, &lon), &bright) in lats.iter().zip(lons).zip(brights) {
            if !on_map(lat, lon) {
                off_map += 1;
                continue;
            }
            markers.push(Marker {
                lon,
                lat,
                color: self.config.color_scale.color_at(summary.normalize(bright)),
            });
        }

        (markers, off_map)
    }

    fn draw<DB>(
        &self,
        root: DrawingArea<DB, Shift>,
        title: &str,
        footer: &str,
        markers: &[Marker],
        summary: &BrightnessSummary,
    ) -> Result<(), Box<dyn std::error::Error>>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        root.fill(&WHITE)?;

        let (body, footer_area) =
            root.split_vertically(self.config.height.saturating_sub(FOOTER_HEIGHT));
        let (map_area, bar_area) =
            body.split_horizontally(self.config.width.saturating_sub(COLOR_BAR_WIDTH));

        let mut chart = ChartBuilder::on(&map_area)
            .caption(title, ("sans-serif", 28))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(LON_RANGE, LAT_RANGE)?;

        chart.plotting_area().fill(&OCEAN)?;

        chart
            .configure_mesh()
            .x_labels(13)
            .y_labels(7)
            .x_desc("Longitude")
            .y_desc("Latitude")
            .x_label_formatter(&|v: &f64| format!("{:.0}°", v))
            .y_label_formatter(&|v: &f64| format!("{:.0}°", v))
            .bold_line_style(GRID.mix(0.6))
            .light_line_style(WHITE.mix(0.0))
            .draw()?;

        let radius = self.config.marker_size;
        chart.draw_series(markers.iter().map(|m| {
            EmptyElement::at((m.lon, m.lat))
                + Circle::new((0, 0), radius, m.color.filled())
                + Circle::new((0, 0), radius, WHITE.stroke_width(1))
        }))?;

        self.draw_color_bar(&bar_area, summary)?;

        footer_area.draw(&Text::new(
            footer.to_string(),
            (15, 8),
            ("sans-serif", 14).into_font().color(&BLACK.mix(0.7)),
        ))?;

        root.present()?;
        Ok(())
    }

    fn draw_color_bar<DB>(
        &self,
        area: &DrawingArea<DB, Shift>,
        summary: &BrightnessSummary,
    ) -> Result<(), Box<dyn std::error::Error>>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        let (lo, hi) = color_bar_range(summary);

        let mut bar = ChartBuilder::on(area)
            .caption("Brightness", ("sans-serif", 16))
            .margin_top(60)
            .margin_bottom(55)
            .margin_left(10)
            .margin_right(5)
            .right_y_label_area_size(60)
            .build_cartesian_2d(0.0..1.0, lo..hi)?;

        bar.configure_mesh()
            .disable_mesh()
            .disable_x_axis()
            .y_labels(6)
            .y_label_formatter(&|v: &f64| format!("{:.1}", v))
            .draw()?;

        let step = (hi - lo) / COLOR_BAR_STEPS as f64;
        let scale = self.config.color_scale;
        bar.draw_series((0..COLOR_BAR_STEPS).map(|i| {
            let y0 = lo + step * i as f64;
            let t = (i as f64 + 0.5) / COLOR_BAR_STEPS as f64;
            Rectangle::new([(0.0, y0), (1.0, y0 + step)], scale.color_at(t).filled())
        }))?;

        Ok(())
    }
}

fn on_map(lat: f64, lon: f64) -> bool {
    (LAT_RANGE.start..=LAT_RANGE.end).contains(&lat)
        && (LON_RANGE.start..=LON_RANGE.end).contains(&lon)
}

/// Value range for the color bar axis. Degenerate ranges are widened.
fn color_bar_range(summary: &BrightnessSummary) -> (f64, f64) {
    if summary.count == 0 {
        return (0.0, 1.0);
    }
    if summary.max > summary.min {
        (summary.min, summary.max)
    } else {
        (summary.min - 0.5, summary.max + 0.5)
    }
}

/// Point count and date span, shown under the map.
fn footer_text(points: usize, dates: &[NaiveDate]) -> String {
    let noun = if points == 1 { "detection" } else { "detections" };
    match date_span(dates) {
        Some((first, last)) if first == last => format!("{} {} on {}", points, noun, first),
        Some((first, last)) => format!("{} {}, {} to {}", points, noun, first, last),
        None => "No detections".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn unequal_lengths_are_rejected_before_drawing() {
        let dir = tempfile::tempdir().unwrap();
        let plotter = FireMapPlotter::new(PlotConfig {
            output: dir.path().join("map.png"),
            ..PlotConfig::default()
        });

        let err = plotter
            .create_plot(&[1.0, 2.0], &[1.0], &[300.0, 310.0], &[d("2021-01-01")], "t")
            .unwrap_err();

        assert!(matches!(
            err,
            PlotError::LengthMismatch {
                lats: 2,
                lons: 1,
                brights: 2,
                dates: 1
            }
        ));
        assert!(!dir.path().join("map.png").exists());
    }

    #[test]
    fn output_format_follows_extension() {
        assert_eq!(OutputFormat::from_path(Path::new("a/map.SVG")), OutputFormat::Svg);
        assert_eq!(OutputFormat::from_path(Path::new("map.png")), OutputFormat::Png);
        assert_eq!(OutputFormat::from_path(Path::new("map")), OutputFormat::Png);
    }

    #[test]
    fn markers_skip_points_off_the_frame() {
        let plotter = FireMapPlotter::default();
        let brights = [300.0, 320.0, 340.0, 360.0];
        let summary = BrightnessSummary::from_values(&brights);

        let (markers, off_map) = plotter.markers(
            &[10.0, 91.0, 90.0, -45.0],
            &[20.0, 20.0, 180.0, -181.0],
            &brights,
            &summary,
        );

        assert_eq!(off_map, 2);
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].color, ColorScale::RedsReversed.color_at(0.0));
        assert_eq!((markers[1].lon, markers[1].lat), (180.0, 90.0));
    }

    #[test]
    fn color_bar_range_widens_flat_data() {
        let flat = BrightnessSummary::from_values(&[300.0]);
        assert_eq!(color_bar_range(&flat), (299.5, 300.5));
        assert_eq!(color_bar_range(&BrightnessSummary::default()), (0.0, 1.0));
    }

    #[test]
    fn footer_describes_date_span() {
        assert_eq!(
            footer_text(2, &[d("2021-01-02"), d("2021-01-01")]),
            "2 detections, 2021-01-01 to 2021-01-02"
        );
        assert_eq!(footer_text(1, &[d("2021-01-01")]), "1 detection on 2021-01-01");
        assert_eq!(footer_text(0, &[]), "No detections");
    }

    #[test]
    fn config_defaults_fill_missing_fields() {
        let cfg: PlotConfig = serde_json::from_str(r#"{"width": 800}"#).unwrap();

        assert_eq!(cfg.width, 800);
        assert_eq!(cfg.height, PlotConfig::default().height);
        assert_eq!(cfg.color_scale, ColorScale::RedsReversed);
    }
}
