//! Static frame images and animated GIFs.
//!
//! - [`PlotStyle`] — colors and sizes, and the scoped paint helper that
//!   presents a drawing area however drawing ends.
//! - [`FrameRenderer`] — scatter plot of a frame with its statistics.

use glam::DVec2;
use morph_core::bounds::BoundingBox;
use morph_core::{MorphError, Result, SummaryStatistics};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;

#[derive(Clone, Debug)]
pub struct PlotStyle {
    /// Image size in pixels.
    pub size: (u32, u32),
    pub background: RGBColor,
    pub ink: RGBColor,
    pub point_color: RGBColor,
    pub point_radius: u32,
    pub font: &'static str,
    pub caption_size: u32,
    pub label_size: u32,
    /// Draw captions, axes and the statistics panel. Off renders points
    /// only.
    pub annotate: bool,
}

impl PlotStyle {
    /// A style for a square plot of `edge` pixels with a text panel beside
    /// it.
    pub fn square(edge: u32) -> Self {
        Self {
            size: (edge * 5 / 3, edge),
            ..Self::default()
        }
    }

    /// Width of the plot part of the image.
    fn plot_width(&self) -> u32 {
        if self.annotate {
            self.size.1.min(self.size.0)
        } else {
            self.size.0
        }
    }

    /// Fills `root`, runs `draw` on it and presents it.
    ///
    /// The area is presented even if filling or drawing fails; the first
    /// error is returned.
    pub fn paint<DB, F>(&self, root: &DrawingArea<DB, Shift>, draw: F) -> Result<()>
    where
        DB: DrawingBackend,
        F: FnOnce(
            &DrawingArea<DB, Shift>,
        ) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>>,
    {
        let drawn = root.fill(&self.background).and_then(|()| draw(root));
        let presented = root.present();
        drawn.and(presented).map_err(render_error)
    }
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            size: (1000, 600),
            background: WHITE,
            ink: BLACK,
            point_color: RGBColor(0x2b, 0x5c, 0x8a),
            point_radius: 3,
            font: "sans-serif",
            caption_size: 22,
            label_size: 18,
            annotate: true,
        }
    }
}

fn render_error<E: std::error::Error + Send + Sync>(err: DrawingAreaErrorKind<E>) -> MorphError {
    MorphError::Render(err.to_string())
}

/// Statistics lines shown beside a frame, floored to `decimals` places.
pub fn format_statistics(stats: &SummaryStatistics, decimals: u32) -> Vec<String> {
    let factor = 10f64.powi(decimals as i32);
    let show = |v: f64| format!("{:.*}", decimals as usize, (v * factor).floor() / factor);
    let mut lines = vec![
        format!("X Mean: {}", show(stats.x_mean)),
        format!("Y Mean: {}", show(stats.y_mean)),
        format!("X SD: {}", show(stats.x_stdev)),
        format!("Y SD: {}", show(stats.y_stdev)),
        format!("Corr.: {}", show(stats.correlation)),
    ];
    if let (Some(xm), Some(ym)) = (stats.x_median, stats.y_median) {
        lines.push(format!("X Med.: {}", show(xm)));
        lines.push(format!("Y Med.: {}", show(ym)));
    }
    lines
}

/// Renders frames of one run.
#[derive(Clone, Debug)]
pub struct FrameRenderer {
    style: PlotStyle,
    decimals: u32,
    with_median: bool,
}

impl FrameRenderer {
    pub fn new(style: PlotStyle, decimals: u32, with_median: bool) -> Self {
        Self {
            style,
            decimals,
            with_median,
        }
    }

    /// Writes one frame as a PNG.
    ///
    /// ### Errors
    /// [`MorphError::Render`] if plotting or encoding fails.
    pub fn render_png(
        &self,
        path: &Path,
        caption: &str,
        points: &[DVec2],
        bounds: &BoundingBox,
    ) -> Result<()> {
        let root = BitMapBackend::new(path, self.style.size).into_drawing_area();
        self.style
            .paint(&root, |area| self.draw_frame(area, caption, points, bounds))
    }

    /// Writes `frames` as an animated GIF, followed by the frames in
    /// reverse unless `forward_only` is set.
    ///
    /// ### Errors
    /// [`MorphError::Render`] if plotting or encoding fails.
    pub fn render_gif(
        &self,
        path: &Path,
        caption: &str,
        frames: &[Vec<DVec2>],
        bounds: &BoundingBox,
        frame_delay_ms: u32,
        forward_only: bool,
    ) -> Result<()> {
        let root = BitMapBackend::gif(path, self.style.size, frame_delay_ms)
            .map_err(|e| MorphError::Render(e.to_string()))?
            .into_drawing_area();

        let backward = frames.iter().rev().take(if forward_only { 0 } else { frames.len() });
        for points in frames.iter().chain(backward) {
            self.style
                .paint(&root, |area| self.draw_frame(area, caption, points, bounds))?;
        }
        Ok(())
    }

    fn draw_frame<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        caption: &str,
        points: &[DVec2],
        bounds: &BoundingBox,
    ) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        let style = &self.style;
        let (plot_area, text_area) = root.split_horizontally(style.plot_width());

        let mut builder = ChartBuilder::on(&plot_area);
        builder.margin(10);
        if style.annotate {
            builder
                .caption(caption, (style.font, style.caption_size))
                .x_label_area_size(30)
                .y_label_area_size(40);
        }
        let mut chart = builder.build_cartesian_2d(
            bounds.x.low()..bounds.x.high(),
            bounds.y.low()..bounds.y.high(),
        )?;
        if style.annotate {
            chart.configure_mesh().disable_mesh().draw()?;
        }

        let fill = style.point_color.mix(0.8).filled();
        chart.draw_series(
            points
                .iter()
                .map(|p| Circle::new((p.x, p.y), style.point_radius, fill)),
        )?;

        if style.annotate {
            let stats = SummaryStatistics::of(points, self.with_median);
            let font = (style.font, style.label_size).into_font().color(&style.ink);
            let line_height = style.label_size as i32 * 3 / 2;
            let top = style.size.1 as i32 / 3;
            for (i, line) in format_statistics(&stats, self.decimals).iter().enumerate() {
                text_area.draw_text(line, &font, (20, top + i as i32 * line_height))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use morph_core::bounds::Interval;

    fn bounds() -> BoundingBox {
        BoundingBox::new(
            Interval::exclusive(0.0, 10.0).unwrap(),
            Interval::exclusive(0.0, 10.0).unwrap(),
        )
    }

    fn plain() -> PlotStyle {
        PlotStyle {
            size: (64, 64),
            annotate: false,
            ..PlotStyle::default()
        }
    }

    #[test]
    fn statistics_are_floored_for_display() {
        let stats = SummaryStatistics {
            x_mean: 54.26999,
            y_mean: 47.5,
            x_stdev: 16.76982,
            y_stdev: 26.9354,
            correlation: -0.06447,
            x_median: Some(53.3333),
            y_median: Some(46.0256),
        };
        let lines = format_statistics(&stats, 2);
        assert_eq!(lines[0], "X Mean: 54.26");
        assert_eq!(lines[1], "Y Mean: 47.50");
        assert_eq!(lines[4], "Corr.: -0.07");
        assert_eq!(lines.len(), 7);
    }

    #[test]
    fn paint_presents_after_drawing_errors() {
        let dir = std::env::temp_dir().join(format!("morph_view_render_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("failed.png");
        let style = plain();
        let root = BitMapBackend::new(&path, style.size).into_drawing_area();

        let result = style.paint(&root, |_| Err(DrawingAreaErrorKind::LayoutError));
        assert!(matches!(result, Err(MorphError::Render(_))));
        assert!(path.exists());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn renders_png_and_gif() {
        let dir = std::env::temp_dir().join(format!("morph_view_gif_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let renderer = FrameRenderer::new(plain(), 2, false);
        let frames = vec![
            vec![DVec2::new(2.0, 2.0), DVec2::new(5.0, 7.0)],
            vec![DVec2::new(3.0, 2.5), DVec2::new(4.0, 6.0)],
        ];

        let png = dir.join("frame.png");
        renderer.render_png(&png, "test", &frames[0], &bounds()).unwrap();
        assert!(png.exists());

        let gif = dir.join("anim.gif");
        renderer
            .render_gif(&gif, "test", &frames, &bounds(), 20, false)
            .unwrap();
        assert!(std::fs::metadata(&gif).unwrap().len() > 0);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
