// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Four-panel PNG chart of a result set.
//!
//! Layout (2x2):
//!
//! | execution time (ms) | operations per second |
//! | runtime share (pie) | relative slowdown     |

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use chrono::{DateTime, Local};
use plotters::coord::Shift;
use plotters::element::Pie;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontTransform;

use crate::config::OutputConfig;
use crate::error::RenderError;
use crate::record::ResultSet;

const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);
const LIGHT_GREEN: RGBColor = RGBColor(144, 238, 144);
const LIGHT_CORAL: RGBColor = RGBColor(240, 128, 128);

/// ColorBrewer "Set3" qualitative palette, used for pie slices.
const SET3: [RGBColor; 12] = [
    RGBColor(141, 211, 199),
    RGBColor(255, 255, 179),
    RGBColor(190, 186, 218),
    RGBColor(251, 128, 114),
    RGBColor(128, 177, 211),
    RGBColor(253, 180, 98),
    RGBColor(179, 222, 105),
    RGBColor(252, 205, 229),
    RGBColor(217, 217, 217),
    RGBColor(188, 128, 189),
    RGBColor(204, 235, 197),
    RGBColor(255, 237, 111),
];

/// Reference height the font sizes below are tuned for (8 in at 300 DPI).
const REFERENCE_HEIGHT: f64 = 2400.0;

type Panel<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// File stem shared by the chart and its JSON report.
pub fn output_stem(at: &DateTime<Local>) -> String {
    format!("benchmark_results_{}", at.format("%Y%m%d_%H%M%S"))
}

/// Renders result sets to PNG files.
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    width: u32,
    height: u32,
}

struct BarPanel<'a> {
    title: &'a str,
    y_desc: &'a str,
    color: RGBColor,
    value_label: Option<fn(f64) -> String>,
}

impl ChartRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(config.width, config.height)
    }

    /// Render into `dir/<stem>.png` and return the path.
    pub fn render_into(
        &self,
        results: &ResultSet,
        dir: &Path,
        stem: &str,
    ) -> Result<PathBuf, RenderError> {
        std::fs::create_dir_all(dir).map_err(|source| RenderError::OutputDirectory {
            path: dir.to_path_buf(),
            source,
        })?;

        let path = dir.join(format!("{}.png", stem));
        self.render(results, &path)?;
        Ok(path)
    }

    /// Render the four panels into `path`.
    pub fn render(&self, results: &ResultSet, path: &Path) -> Result<(), RenderError> {
        if results.is_empty() {
            return Err(RenderError::NoRecords);
        }

        tracing::debug!(path = %path.display(), records = results.len(), "Rendering chart");

        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        self.draw(&root, results)?;
        root.present().map_err(drawing)?;
        Ok(())
    }

    fn draw(&self, root: &Panel<'_>, results: &ResultSet) -> Result<(), RenderError> {
        root.fill(&WHITE).map_err(drawing)?;

        let panels = root.split_evenly((2, 2));
        let names = results.names();

        self.draw_bars(
            &panels[0],
            &BarPanel {
                title: "Execution Time per Benchmark",
                y_desc: "Time (ms)",
                color: SKY_BLUE,
                value_label: Some(|v: f64| format!("{:.1}ms", v)),
            },
            &names,
            &results.elapsed_ms(),
        )?;

        self.draw_bars(
            &panels[1],
            &BarPanel {
                title: "Operations per Second",
                y_desc: "Ops/second",
                color: LIGHT_GREEN,
                value_label: None,
            },
            &names,
            &results.throughputs(),
        )?;

        self.draw_pie(&panels[2], "Runtime Distribution", &names, results)?;

        self.draw_bars(
            &panels[3],
            &BarPanel {
                title: "Relative Slowdown (fastest = 1.0)",
                y_desc: "max ops/s \u{f7} ops/s",
                color: LIGHT_CORAL,
                value_label: None,
            },
            &names,
            &results.slowdown_factors(),
        )?;

        Ok(())
    }

    fn scale(&self) -> f64 {
        self.height as f64 / REFERENCE_HEIGHT
    }

    fn font_size(&self, base: f64) -> f64 {
        (base * self.scale()).max(8.0)
    }

    fn draw_bars(
        &self,
        area: &Panel<'_>,
        panel: &BarPanel<'_>,
        names: &[&str],
        values: &[f64],
    ) -> Result<(), RenderError> {
        let count = values.len();
        let y_top = axis_top(values);
        let tick_size = self.font_size(34.0);
        let (_, panel_height) = area.dim_in_pixel();
        let label_area = x_label_area(names, tick_size, panel_height);

        let mut chart = ChartBuilder::on(area)
            .caption(panel.title, ("sans-serif", self.font_size(56.0)).into_font())
            .margin((20.0 * self.scale()).max(5.0) as u32)
            .x_label_area_size(label_area)
            .y_label_area_size((180.0 * self.scale()).max(40.0) as u32)
            .build_cartesian_2d(-0.5..(count as f64 - 0.5), 0.0..y_top)
            .map_err(drawing)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(0)
            .y_labels(8)
            .y_label_formatter(&|y| format_compact(*y))
            .y_label_style(("sans-serif", tick_size).into_font())
            .y_desc(panel.y_desc)
            .axis_desc_style(("sans-serif", self.font_size(40.0)).into_font())
            .draw()
            .map_err(drawing)?;

        chart
            .draw_series(values.iter().enumerate().map(|(i, &v)| {
                let x = i as f64;
                Rectangle::new([(x - 0.35, 0.0), (x + 0.35, v)], panel.color.filled())
            }))
            .map_err(drawing)?;

        chart
            .draw_series(values.iter().enumerate().map(|(i, &v)| {
                let x = i as f64;
                Rectangle::new(
                    [(x - 0.35, 0.0), (x + 0.35, v)],
                    BLACK.stroke_width((2.0 * self.scale()).max(1.0) as u32),
                )
            }))
            .map_err(drawing)?;

        // The mesh anchors rotated tick labels at their centre, which pushes
        // half of each name up into the plot. Names hang from the axis instead.
        let (base_x, base_y) = area.get_base_pixel();
        let gap = (tick_size * 0.5) as i32;
        let name_style = ("sans-serif", tick_size)
            .into_font()
            .transform(FontTransform::Rotate90)
            .color(&BLACK)
            .pos(Pos::new(HPos::Left, VPos::Center));

        for (i, name) in names.iter().enumerate() {
            let (x, y) = chart.backend_coord(&(i as f64, 0.0));
            area.draw(&Text::new(
                name.to_string(),
                (x - base_x, y - base_y + gap),
                name_style.clone(),
            ))
            .map_err(drawing)?;
        }

        if let Some(format_value) = panel.value_label {
            let offset = y_top * 0.01;
            let style = ("sans-serif", self.font_size(28.0))
                .into_font()
                .color(&BLACK)
                .pos(Pos::new(HPos::Center, VPos::Bottom));

            chart
                .draw_series(values.iter().enumerate().map(|(i, &v)| {
                    Text::new(format_value(v), (i as f64, v + offset), style.clone())
                }))
                .map_err(drawing)?;
        }

        Ok(())
    }

    fn draw_pie(
        &self,
        area: &Panel<'_>,
        title: &str,
        names: &[&str],
        results: &ResultSet,
    ) -> Result<(), RenderError> {
        let body = area
            .titled(title, ("sans-serif", self.font_size(56.0)).into_font())
            .map_err(drawing)?;

        // `Pie` draws in backend pixels, not relative to the area.
        let (width, height) = body.dim_in_pixel();
        let (x0, y0) = body.get_base_pixel();
        let center = (x0 + width as i32 / 2, y0 + height as i32 / 2);
        let radius = width.min(height) as f64 * 0.32;
        let sizes = results.elapsed_ms();
        let colors = palette(sizes.len());
        let labels = pie_labels(names, &results.time_shares());

        let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
        pie.start_angle(90.0);
        pie.label_style(("sans-serif", self.font_size(32.0)).into_font().color(&BLACK));
        body.draw(&pie).map_err(drawing)?;

        Ok(())
    }
}

/// Hand the written chart to the desktop image viewer, when there is a desktop.
///
/// Failures are logged; the chart file is already on disk at this point.
pub fn show(path: &Path) {
    if !display_available() {
        tracing::debug!("No display available, skipping chart preview");
        return;
    }

    let viewer = if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(target_os = "windows") {
        "explorer"
    } else {
        "xdg-open"
    };

    match Command::new(viewer)
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(_) => tracing::info!(viewer = viewer, path = %path.display(), "Opened chart"),
        Err(e) => tracing::warn!(viewer = viewer, error = %e, "Could not open chart viewer"),
    }
}

fn display_available() -> bool {
    if cfg!(any(target_os = "macos", target_os = "windows")) {
        return true;
    }
    std::env::var_os("DISPLAY").is_some() || std::env::var_os("WAYLAND_DISPLAY").is_some()
}

fn drawing<E: std::fmt::Display>(err: E) -> RenderError {
    RenderError::Drawing {
        message: err.to_string(),
    }
}

/// Upper bound of the value axis: headroom for the value labels, and a unit
/// range when every value is zero.
fn axis_top(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(0.0_f64, f64::max);
    if max > 0.0 {
        max * 1.15
    } else {
        1.0
    }
}

/// Room for vertical category labels, capped at 40% of the panel.
fn x_label_area(names: &[&str], font_size: f64, panel_height: u32) -> u32 {
    let longest = names.iter().map(|n| n.chars().count()).max().unwrap_or(0);
    let wanted = longest as f64 * font_size * 0.6 + font_size;
    let cap = panel_height as f64 * 0.4;
    wanted.min(cap).max(font_size * 2.0) as u32
}

fn pie_labels(names: &[&str], shares: &[f64]) -> Vec<String> {
    names
        .iter()
        .zip(shares)
        .map(|(name, share)| format!("{} ({:.1}%)", name, share))
        .collect()
}

fn palette(count: usize) -> Vec<RGBColor> {
    SET3.iter().copied().cycle().take(count).collect()
}

/// Short axis labels for large counts: `81.0M`, `6.4k`.
pub fn format_compact(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 1_000_000_000.0 {
        format!("{:.1}G", value / 1_000_000_000.0)
    } else if magnitude >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if magnitude >= 1_000.0 {
        format!("{:.1}k", value / 1_000.0)
    } else {
        format!("{:.1}", value)
    }
}
