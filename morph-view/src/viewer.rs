//! Interactive morph viewer built with eframe/egui.
//!
//! [`Viewer`] owns a [`MorphEngine`] for one dataset and target shape and
//! implements [`eframe::App`] to step, draw and reconfigure it.

use crate::render::format_statistics;
use eframe::App;
use glam::DVec2;
use morph_core::shapes::Geometry;
use morph_core::{
    AVAILABLE_SHAPES, Dataset, MorphConfig, MorphEngine, Result, ShapeFactory, StepOutcome,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Main application state for the interactive viewer.
///
/// The typical per-frame update is:
/// 1. Handle UI interactions.
/// 2. If `running` is `true` and enough time has passed, call
///    [`Viewer::step_once`].
/// 3. Draw the morph bounds, the target shape and the points.
///
/// ### Fields
/// - `dataset` - Starting points; every reset starts from them again.
/// - `shape_name` - Target selected in the config panel.
/// - `cfg` - Run parameters edited in the config panel.
/// - `engine` - The running morph, rebuilt by [`Viewer::reset`].
///
/// - `running` - Whether the morph is auto-advancing.
/// - `steps_per_update` - Iterations run per automatic or manual step.
/// - `zoom` - Pixels per world unit.
/// - `pan` - Screen-space pan offset in pixels.
///
/// - `last_outcome` - Result of the most recent iteration.
/// - `error` - Message of the last failed reset, shown in the config panel.
pub struct Viewer {
    dataset: Arc<Dataset>,
    shape_name: String,
    cfg: MorphConfig,
    engine: MorphEngine,

    running: bool,
    steps_per_update: usize,
    zoom: f32,
    pan: egui::Vec2,

    last_outcome: Option<StepOutcome>,
    error: Option<String>,

    step_interval: f64,
    last_step_time: f64,
    last_step_dt: f64,
}

impl Viewer {
    /// Creates a viewer morphing `dataset` into the shape named `shape`.
    ///
    /// The camera is zoomed so the plot bounds span roughly 500 pixels.
    ///
    /// ### Errors
    /// Any error from [`ShapeFactory::generate`] or [`MorphEngine::new`].
    pub fn new(dataset: Arc<Dataset>, shape: &str, cfg: MorphConfig) -> Result<Self> {
        let engine = Self::build_engine(&dataset, shape, &cfg)?;
        let range = dataset.plot_bounds().range();
        let zoom = (500.0 / range.x.max(range.y)) as f32;

        Ok(Self {
            dataset,
            shape_name: shape.to_string(),
            cfg,
            engine,
            running: false,
            steps_per_update: 100,
            zoom,
            pan: egui::vec2(0.0, 0.0),
            last_outcome: None,
            error: None,
            step_interval: 0.02,
            last_step_time: 0.0,
            last_step_dt: 0.0,
        })
    }

    fn build_engine(dataset: &Dataset, shape: &str, cfg: &MorphConfig) -> Result<MorphEngine> {
        let shape = ShapeFactory::new(dataset).generate(shape)?;
        MorphEngine::new(dataset, &shape, cfg.clone())
    }

    /// Restarts the morph from the dataset with the current shape and
    /// configuration.
    ///
    /// If the engine cannot be built the previous one is kept and the
    /// error is shown in the config panel.
    fn reset(&mut self) {
        match Self::build_engine(&self.dataset, &self.shape_name, &self.cfg) {
            Ok(engine) => {
                info!(run = %engine.name(), "viewer reset");
                self.engine = engine;
                self.error = None;
            }
            Err(err) => {
                warn!(%err, "viewer reset failed");
                self.error = Some(err.to_string());
            }
        }
        self.last_outcome = None;
        self.running = false;
    }

    /// Runs up to `steps_per_update` iterations, stopping at the end of the
    /// run.
    fn step_once(&mut self) {
        for _ in 0..self.steps_per_update {
            let outcome = self.engine.step();
            self.last_outcome = Some(outcome);
            if outcome == StepOutcome::Finished {
                self.running = false;
                break;
            }
        }
    }

    /// Converts a world-space position to screen-space.
    ///
    /// The plot bounds center maps to the center of `rect`; world
    /// coordinates are then scaled by `zoom` and offset by `pan`. The
    /// y-axis is flipped so that positive y goes up.
    fn world_to_screen(&self, p: DVec2, rect: egui::Rect) -> egui::Pos2 {
        let center = rect.center();
        let local = (p - self.engine.plot_bounds().center()).as_vec2();
        egui::pos2(
            center.x + local.x * self.zoom + self.pan.x,
            center.y - local.y * self.zoom + self.pan.y,
        )
    }

    /// Inverse of [`Viewer::world_to_screen`] up to rounding.
    fn screen_to_world(&self, p: egui::Pos2, rect: egui::Rect) -> DVec2 {
        let center = rect.center();
        let x = (p.x - center.x - self.pan.x) / self.zoom;
        let y = (center.y - p.y + self.pan.y) / self.zoom;
        self.engine.plot_bounds().center() + DVec2::new(x as f64, y as f64)
    }

    /// Helper to draw a labeled [`egui::DragValue`].
    fn labeled_drag<N: egui::emath::Numeric>(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut N,
        range: std::ops::RangeInclusive<N>,
        speed: f64,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed));
        });
    }

    /// Builds the top panel UI (run controls, stepping, zoom).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let finished = self.engine.is_finished();
                if ui
                    .add_enabled(
                        !finished,
                        egui::Button::new(if self.running { "⏸ Pause" } else { "▶ Run" }),
                    )
                    .clicked()
                {
                    self.running = !self.running;
                }

                ui.add(
                    egui::DragValue::new(&mut self.steps_per_update)
                        .prefix("iterations/step = ")
                        .range(1..=100_000)
                        .speed(10.0),
                );

                if ui.add_enabled(!finished, egui::Button::new("Step")).clicked() {
                    let now = ctx.input(|i| i.time);
                    if self.last_step_time > 0.0 {
                        self.last_step_dt = now - self.last_step_time;
                    }
                    self.step_once();
                    self.last_step_time = now;
                }

                if ui.button("Reset").clicked() {
                    self.reset();
                }

                ui.separator();
                ui.add(
                    egui::Slider::new(&mut self.zoom, 0.01..=100.0)
                        .logarithmic(true)
                        .text("Zoom"),
                );
            });
        });
    }

    /// Builds the bottom status bar (progress, acceptance, schedule).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        let engine = &self.engine;
        let i = engine.iteration();
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("dt last = {:.3} s", self.last_step_dt));
                ui.separator();
                ui.label(format!("shake = {:.3}", engine.shake_at(i)));
                ui.label(format!("temp = {:.3}", engine.temperature_at(i)));
                ui.separator();
                ui.label(format!("rejected = {}", engine.rejected()));
                ui.label(format!("accepted = {}", engine.accepted()));
                ui.label(format!("iteration = {i} / {}", engine.config().iterations));
                if let Some(outcome) = self.last_outcome {
                    ui.separator();
                    ui.label(format!("{outcome:?}"));
                }
            });
        });
    }

    /// Builds the right-hand panel for the target, parameters and
    /// statistics.
    fn ui_config_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("config_panel")
            .resizable(true)
            .default_width(240.0)
            .show(ctx, |ui| {
                ui.heading(self.engine.name());

                ui.separator();
                egui::ComboBox::from_label("target")
                    .selected_text(self.shape_name.as_str())
                    .show_ui(ui, |ui| {
                        for name in AVAILABLE_SHAPES {
                            ui.selectable_value(&mut self.shape_name, name.to_string(), name);
                        }
                    });

                ui.separator();
                ui.label("Run");
                Self::labeled_drag(
                    ui,
                    "iterations:",
                    &mut self.cfg.iterations,
                    1..=10_000_000,
                    100.0,
                );
                Self::labeled_drag(
                    ui,
                    "decimals:",
                    &mut self.cfg.decimals,
                    0..=MorphConfig::MAX_DECIMALS,
                    0.05,
                );
                Self::labeled_drag(
                    ui,
                    "allowed_dist:",
                    &mut self.cfg.allowed_dist,
                    0.0..=100.0,
                    0.05,
                );
                ui.checkbox(&mut self.cfg.with_median, "preserve medians");

                ui.separator();
                ui.label("Temperature");
                Self::labeled_drag(ui, "min_temp:", &mut self.cfg.min_temp, 0.0..=1.0, 0.01);
                Self::labeled_drag(ui, "max_temp:", &mut self.cfg.max_temp, 0.0..=1.0, 0.01);

                ui.separator();
                ui.label("Shake");
                Self::labeled_drag(ui, "min_shake:", &mut self.cfg.min_shake, 0.0..=1.0, 0.01);
                Self::labeled_drag(ui, "max_shake:", &mut self.cfg.max_shake, 0.0..=1.0, 0.01);

                ui.separator();
                if ui.button("Apply and reset").clicked() {
                    self.reset();
                }
                if let Some(err) = &self.error {
                    ui.colored_label(egui::Color32::LIGHT_RED, err);
                }

                ui.separator();
                let decimals = self.engine.config().decimals;
                ui.label("Target statistics");
                for line in format_statistics(self.engine.target_statistics(), decimals) {
                    ui.monospace(line);
                }
                ui.label("Current statistics");
                for line in format_statistics(&self.engine.current_statistics(), decimals) {
                    ui.monospace(line);
                }
            });
    }

    /// Draws the target shape under the points.
    fn draw_shape(&self, painter: &egui::Painter, rect: egui::Rect) {
        let stroke = egui::Stroke::new(1.0, egui::Color32::from_gray(120));
        match self.engine.shape().geometry() {
            Geometry::Lines(lines) => {
                for [a, b] in lines.lines() {
                    painter.line_segment(
                        [self.world_to_screen(*a, rect), self.world_to_screen(*b, rect)],
                        stroke,
                    );
                }
            }
            Geometry::Rings(rings) => {
                for circle in rings.circles() {
                    painter.circle_stroke(
                        self.world_to_screen(circle.center, rect),
                        circle.radius as f32 * self.zoom,
                        stroke,
                    );
                }
            }
            Geometry::Points(points) | Geometry::Scatter(points) => {
                for p in points.points() {
                    painter.circle_filled(self.world_to_screen(*p, rect), 1.5, stroke.color);
                }
            }
        }
    }

    /// Builds the central panel where the morph is drawn.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::drag());
            let rect = response.rect;
            let painter = ui.painter_at(rect);

            // Pan with drag.
            if response.dragged() {
                self.pan += response.drag_delta();
            }

            // Zoom around the mouse cursor.
            let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                let pointer_screen = response.hover_pos().unwrap_or(rect.center());
                let world_before = self.screen_to_world(pointer_screen, rect);

                let factor = (1.0 + scroll * 0.001).clamp(0.5, 2.0);
                self.zoom = (self.zoom * factor).clamp(0.01, 100.0);

                let screen_after = self.world_to_screen(world_before, rect);
                self.pan += pointer_screen - screen_after;
            }

            // Morph bounds.
            let bounds = self.engine.morph_bounds();
            let corners = [
                DVec2::new(bounds.x.low(), bounds.y.low()),
                DVec2::new(bounds.x.high(), bounds.y.low()),
                DVec2::new(bounds.x.high(), bounds.y.high()),
                DVec2::new(bounds.x.low(), bounds.y.high()),
            ];
            let outline: Vec<egui::Pos2> = corners
                .iter()
                .map(|&c| self.world_to_screen(c, rect))
                .collect();
            painter.add(egui::Shape::closed_line(
                outline,
                egui::Stroke::new(1.0, egui::Color32::DARK_GRAY),
            ));

            self.draw_shape(&painter, rect);

            let moved = match self.last_outcome {
                Some(StepOutcome::Accepted { index }) => Some(index),
                _ => None,
            };
            for (i, p) in self.engine.points().iter().enumerate() {
                let color = if moved == Some(i) {
                    egui::Color32::RED
                } else {
                    egui::Color32::LIGHT_BLUE
                };
                painter.circle_filled(self.world_to_screen(*p, rect), 3.0, color);
            }

            // Auto-run the morph if requested.
            if self.running {
                let now = ctx.input(|i| i.time);
                let elapsed = now - self.last_step_time;
                if elapsed >= self.step_interval {
                    if self.last_step_time > 0.0 {
                        self.last_step_dt = elapsed;
                    }
                    self.step_once();
                    self.last_step_time = now;
                }

                ctx.request_repaint();
            }
        });
    }
}

impl App for Viewer {
    /// eframe callback that builds all UI panels for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_config_panel(ctx);
        self.ui_central_panel(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_rect() -> egui::Rect {
        egui::Rect::from_min_size(egui::Pos2::new(0.0, 0.0), egui::vec2(800.0, 600.0))
    }

    fn viewer(shape: &str) -> Viewer {
        let points = (0..40)
            .map(|i| {
                let t = i as f64;
                DVec2::new(20.0 + (t * 0.9).sin() * 15.0 + t, 50.0 + (t * 0.4).cos() * 20.0)
            })
            .collect();
        let dataset = Arc::new(Dataset::new("wave", points, None).unwrap());
        let cfg = MorphConfig {
            iterations: 500,
            seed: Some(11),
            ..MorphConfig::default()
        };
        Viewer::new(dataset, shape, cfg).unwrap()
    }

    #[test]
    fn world_to_screen_and_back_is_roundtrip() {
        let mut viewer = viewer("circle");
        viewer.zoom = 2.0;
        viewer.pan = egui::vec2(15.0, -7.0);
        let rect = test_rect();

        for p in [
            DVec2::new(20.0, 50.0),
            DVec2::new(61.5, 30.25),
            DVec2::new(0.0, 0.0),
        ] {
            let back = viewer.screen_to_world(viewer.world_to_screen(p, rect), rect);
            assert!(back.distance(p) < 1e-3, "roundtrip mismatch: p={p:?}, back={back:?}");
        }
    }

    #[test]
    fn plot_center_maps_to_rect_center() {
        let viewer = viewer("star");
        let rect = test_rect();
        let center = viewer.engine.plot_bounds().center();
        assert_eq!(viewer.world_to_screen(center, rect), rect.center());
    }

    #[test]
    fn step_once_runs_a_batch_and_stops_at_the_end() {
        let mut viewer = viewer("x");
        viewer.steps_per_update = 120;
        viewer.step_once();
        assert_eq!(viewer.engine.iteration(), 120);

        viewer.running = true;
        viewer.steps_per_update = 1000;
        viewer.step_once();
        assert!(viewer.engine.is_finished());
        assert_eq!(viewer.last_outcome, Some(StepOutcome::Finished));
        assert!(!viewer.running);
    }

    #[test]
    fn reset_applies_new_target() {
        let mut viewer = viewer("circle");
        viewer.step_once();
        viewer.running = true;

        viewer.shape_name = "dots".into();
        viewer.reset();

        assert_eq!(viewer.engine.iteration(), 0);
        assert_eq!(viewer.engine.shape().name(), "dots");
        assert_eq!(viewer.engine.points(), viewer.dataset.points());
        assert!(viewer.error.is_none());
        assert!(!viewer.running);
    }

    #[test]
    fn failed_reset_keeps_running_engine() {
        let mut viewer = viewer("circle");
        viewer.step_once();
        viewer.cfg.max_temp = 0.0;
        viewer.reset();

        assert!(viewer.error.is_some());
        assert_eq!(viewer.engine.iteration(), 100);
        assert_eq!(viewer.engine.shape().name(), "circle");
    }
}
