use std::time::Instant;

use egui::{Color32, Rect, Stroke};
use maze::{Controller, Edge, MazeConfig, Outcome, Phase, WallModel};
use rand::{rngs::StdRng, SeedableRng};

use crate::render::{FrameRenderer, FrameScheduler};

type MazeController = Controller<FrameRenderer, FrameScheduler, StdRng>;

pub struct App {
    state: State,
    controller: MazeController,
}

/// We derive Deserialize/Serialize so we can persist app state on shutdown.
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
struct State {
    config: MazeConfig,
    draw_visited: bool,
    animate_backtrace: bool,
}

impl Default for State {
    fn default() -> Self {
        Self {
            config: MazeConfig::default(),
            draw_visited: true,
            animate_backtrace: true,
        }
    }
}

fn rng_for(config: &MazeConfig) -> StdRng {
    match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

impl App {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        // Load previous app state (if any).
        // Note that you must enable the `persistence` feature for this to work.
        let mut state: State = if let Some(storage) = cc.storage {
            eframe::get_value(storage, eframe::APP_KEY).unwrap_or_default()
        } else {
            Default::default()
        };

        if let Err(err) = state.config.validate() {
            log::warn!("discarding stored settings: {err}");
            state.config = MazeConfig::default();
        }

        let controller = Controller::new(
            state.config.clone(),
            rng_for(&state.config),
            FrameRenderer::default(),
            FrameScheduler::default(),
        )
        .expect("settings were validated above");

        App { state, controller }
    }

    /// Fire the search timer if it is due and advance the backtrace animation
    fn drive(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        if self.controller.scheduler_mut().take_due(now) {
            self.controller.tick();
        }
        if let Some(remaining) = self.controller.scheduler().remaining(now) {
            ctx.request_repaint_after(remaining);
        }

        if self.controller.phase() == Phase::Idle {
            let tempo = self.controller.config().tempo();
            let renderer = self.controller.renderer_mut();
            if !self.state.animate_backtrace {
                renderer.revealed = usize::MAX;
            } else if let Some(remaining) = renderer.reveal_paced(now, tempo) {
                ctx.request_repaint_after(remaining);
            }
        }
    }

    fn apply_settings(&mut self) {
        self.controller.reseed(rng_for(&self.state.config));
        if let Err(err) = self.controller.configure(self.state.config.clone()) {
            log::warn!("rejected settings: {err}");
        }
    }

    fn status(&self) -> String {
        match self.controller.outcome() {
            Some(Outcome::PathFound(result)) => format!("Path of {} steps", result.steps),
            Some(Outcome::Exhausted) => "No path found".to_string(),
            None if self.controller.phase() != Phase::Idle => {
                format!("Wave {}", self.controller.renderer().wave_step)
            }
            None => String::new(),
        }
    }

    fn paint_maze(&self, ui: &mut egui::Ui) {
        let (rect, _response) = ui.allocate_exact_size(ui.available_size(), egui::Sense::hover());
        let painter = ui.painter_at(rect);

        let maze = self.controller.maze();
        let renderer = self.controller.renderer();

        // keep a margin of one cell around the maze
        let cell = (rect.width() / (maze.width() + 2) as f32)
            .min(rect.height() / (maze.height() + 2) as f32);
        let origin = rect.min + egui::vec2(cell, cell);
        let to_screen = |x: f32, y: f32| origin + egui::vec2(x * cell, y * cell);

        if self.state.draw_visited {
            let color = Color32::from_rgba_unmultiplied(0, 255, 255, 77);
            for visit in &renderer.visited {
                let min = to_screen(visit.point.x as f32, visit.point.y as f32);
                painter.rect_filled(Rect::from_min_size(min, egui::vec2(cell, cell)), 0.0, color);
            }
        }

        let stroke = Stroke::new(1.0, ui.visuals().text_color());
        for edge in maze.walls().iter() {
            let (a, b) = edge.endpoints();
            painter.line_segment(
                [
                    to_screen(a.x as f32, a.y as f32),
                    to_screen(b.x as f32, b.y as f32),
                ],
                stroke,
            );
        }

        match &renderer.outcome {
            Some(Outcome::PathFound(result)) => {
                let midpoint = |edge: Edge| {
                    let (a, b) = edge.endpoints();
                    to_screen((a.x + b.x) as f32 / 2.0, (a.y + b.y) as f32 / 2.0)
                };

                // walk from the entrance, through the cell centers, out of the exit
                let mut points = vec![midpoint(result.entrance)];
                points.extend(
                    result
                        .path
                        .iter()
                        .rev()
                        .map(|p| to_screen(p.x as f32 + 0.5, p.y as f32 + 0.5)),
                );
                points.push(midpoint(result.exit));

                let stroke = Stroke::new((cell / 4.0).max(1.0), Color32::RED);
                for segment in points.windows(2).take(renderer.revealed) {
                    painter.line_segment([segment[0], segment[1]], stroke);
                }
            }
            Some(Outcome::Exhausted) => {
                painter.rect_filled(rect, 0.0, Color32::from_rgba_unmultiplied(255, 0, 0, 51));
            }
            None => {}
        }
    }
}

impl eframe::App for App {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.state);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drive(ctx);

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                // NOTE: no File->Quit on web pages!
                let is_web = cfg!(target_arch = "wasm32");
                if !is_web {
                    ui.menu_button("File", |ui| {
                        if ui.button("Quit").clicked() {
                            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                        }
                    });
                    ui.add_space(16.0);
                }

                egui::widgets::global_dark_light_mode_buttons(ui);
            });
        });

        let status = self.status();
        egui::SidePanel::left("side_panel").show(ctx, |ui| {
            let phase = self.controller.phase();
            let idle = phase == Phase::Idle;

            ui.label("Maze");
            ui.horizontal(|ui| {
                if ui.add_enabled(idle, egui::Button::new("Generate")).clicked() {
                    self.controller.generate();
                }
                if ui.button("Reset").clicked() {
                    self.controller.reset();
                }
            });

            ui.label("Search");
            ui.horizontal(|ui| {
                if ui.add_enabled(idle, egui::Button::new("Solve")).clicked() {
                    self.controller.solve_immediate();
                }
                if ui.add_enabled(idle, egui::Button::new("Animate")).clicked() {
                    self.controller.solve_animated();
                }
            });
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(phase == Phase::Running, egui::Button::new("Pause"))
                    .clicked()
                {
                    self.controller.pause();
                }
                if ui
                    .add_enabled(phase == Phase::Paused, egui::Button::new("Resume"))
                    .clicked()
                {
                    self.controller.resume();
                }
                if ui
                    .add_enabled(phase != Phase::Running, egui::Button::new("Step"))
                    .clicked()
                {
                    self.controller.step();
                }
            });
            ui.label(format!("{phase:?}"));
            ui.label(status);

            ui.separator();
            ui.checkbox(&mut self.state.draw_visited, "Draw visited cells");
            ui.checkbox(&mut self.state.animate_backtrace, "Animate backtrace");

            ui.separator();
            ui.label("Settings");
            ui.add(egui::Slider::new(&mut self.state.config.width, 2..=128).text("width"));
            ui.add(egui::Slider::new(&mut self.state.config.height, 2..=128).text("height"));
            ui.add(egui::Slider::new(&mut self.state.config.tempo_ms, 0..=200).text("tempo (ms)"));

            let mut fixed_seed = self.state.config.seed.is_some();
            if ui.checkbox(&mut fixed_seed, "Fixed seed").changed() {
                self.state.config.seed = fixed_seed.then_some(0);
            }
            if let Some(seed) = &mut self.state.config.seed {
                ui.add(egui::DragValue::new(seed).prefix("seed "));
            }
            if ui.button("Apply").clicked() {
                self.apply_settings();
            }

            ui.with_layout(egui::Layout::bottom_up(egui::Align::LEFT), |ui| {
                powered_by_egui_and_eframe(ui);
                egui::warn_if_debug_build(ui);
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.paint_maze(ui);
        });
    }
}

fn powered_by_egui_and_eframe(ui: &mut egui::Ui) {
    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 0.0;
        ui.label("Powered by ");
        ui.hyperlink_to("egui", "https://github.com/emilk/egui");
        ui.label(" and ");
        ui.hyperlink_to(
            "eframe",
            "https://github.com/emilk/egui/tree/master/crates/eframe",
        );
        ui.label(".");
    });
}
