use std::sync::mpsc::{self, Receiver};

use eframe::egui;

use crate::assets::{AppSettings, Assets, Icon, SettingsWindow};
use crate::components::layers::LayersPanel;
use crate::plan::PlanState;
use crate::source::{SourceResult, StubSource, spawn_fetch};
use crate::theme::{Theme, ThemeMode, WindowVisibility};

/// Viewport width below which the floating panel clamps to fit.
const NARROW_VIEWPORT_W: f32 = 480.0;

pub struct PlanFEApp {
    plan: PlanState,
    source_receiver: Receiver<SourceResult>,
    /// Frame time when the fetch was issued; drives elapsed readouts.
    fetch_started_at: Option<f64>,

    layers_panel: LayersPanel,
    settings_window: SettingsWindow,
    assets: Assets,
    settings: AppSettings,
    theme: Theme,
    window_visibility: WindowVisibility,

    /// (offset from the right screen edge, y) of the floating panel, so it
    /// sticks to the right side across window resizes.
    layers_panel_right_offset: Option<(f32, f32)>,
    last_screen_size: egui::Vec2,
}

impl PlanFEApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings = AppSettings::load();

        // Language: saved choice, or system locale on first boot
        if settings.language.is_empty() {
            let detected = crate::i18n::detect_system_language();
            crate::i18n::set_language(&detected);
            log_info!("Language auto-detected: {}", detected);
        } else {
            crate::i18n::set_language(&settings.language);
        }

        let theme = Theme::from_mode(settings.theme_mode);
        theme.apply(&cc.egui_ctx);

        let mut assets = Assets::new();
        assets.init(&cc.egui_ctx);

        // Kick off the layer fetch right away; results arrive over the
        // channel and get drained in update().
        let (sender, source_receiver) = mpsc::channel();
        spawn_fetch(StubSource::new(), sender);
        log_info!("Layer fetch started");

        Self {
            plan: PlanState::new(),
            source_receiver,
            fetch_started_at: None,
            layers_panel: LayersPanel::default(),
            settings_window: SettingsWindow::default(),
            assets,
            settings,
            theme,
            window_visibility: WindowVisibility::new(),
            layers_panel_right_offset: None,
            last_screen_size: egui::Vec2::ZERO,
        }
    }

    fn show_menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar")
            .frame(self.theme.toolbar_frame())
            .show(ctx, |ui| {
                egui::menu::bar(ui, |ui| {
                    ui.menu_button(t!("menu.file"), |ui| {
                        if self
                            .assets
                            .menu_item(ui, Icon::Settings, &t!("menu.file.settings"))
                            .clicked()
                        {
                            self.settings_window.open = true;
                            ui.close_menu();
                        }
                        ui.separator();
                        if ui.button(t!("menu.file.quit")).clicked() {
                            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                        }
                    });

                    ui.menu_button(t!("menu.view"), |ui| {
                        ui.checkbox(
                            &mut self.window_visibility.layers,
                            t!("menu.view.layers_panel"),
                        );
                        ui.separator();
                        ui.label(egui::RichText::new(t!("menu.view.theme")).weak());
                        let mut mode = self.theme.mode;
                        ui.radio_value(&mut mode, ThemeMode::Light, t!("menu.view.theme.light"));
                        ui.radio_value(&mut mode, ThemeMode::Dark, t!("menu.view.theme.dark"));
                        if mode != self.theme.mode {
                            self.theme = Theme::from_mode(mode);
                            self.theme.apply(ctx);
                            self.settings.theme_mode = mode;
                            self.settings.save();
                        }
                    });
                });
            });
    }

    fn show_status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar")
            .frame(self.theme.toolbar_frame())
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    if self.plan.is_loading() {
                        let elapsed = match self.fetch_started_at {
                            Some(start) => ctx.input(|i| i.time) - start,
                            None => 0.0,
                        };
                        ui.spinner();
                        ui.label(format!("{} ({:.1}s)", t!("status.loading"), elapsed));
                    } else if let Some(message) = self.plan.load_error() {
                        ui.colored_label(
                            ui.visuals().warn_fg_color,
                            t!("status.failed", error = message),
                        );
                    } else {
                        ui.label(t!(
                            "status.loaded",
                            count = self.plan.layers().len(),
                            visible = self.plan.visible_count()
                        ));
                    }
                });
            });
    }

    fn show_floating_layers_panel(&mut self, ctx: &egui::Context, screen_size_changed: bool) {
        let mut show = self.window_visibility.layers;
        let mut close_clicked = false;

        let screen_rect = ctx.screen_rect();
        let screen_w = screen_rect.max.x;

        let first_show = self.layers_panel_right_offset.is_none();

        // Default: hug the right edge, just below the menu bar
        let (right_off, y_pos) = self.layers_panel_right_offset.unwrap_or((332.0, 48.0));
        let pos_x = screen_w - right_off;

        // Narrow viewports: shrink the panel to fit rather than overflow
        let panel_w = if screen_w < NARROW_VIEWPORT_W {
            (screen_w - 16.0).max(160.0)
        } else {
            320.0
        };

        let mut window = egui::Window::new(t!("panel.title"))
            .open(&mut show)
            .resizable(true)
            .collapsible(false)
            .default_size(egui::vec2(panel_w, 260.0))
            .min_width(160.0)
            .min_height(180.0)
            .max_width(panel_w.max(320.0))
            .title_bar(false)
            .frame(self.theme.floating_window_frame());

        // Only force position on first show or when screen size changes
        if first_show || screen_size_changed {
            window = window.current_pos(egui::pos2(pos_x.max(8.0), y_pos));
        }

        let resp = window.show(ctx, |ui| {
            if screen_w < NARROW_VIEWPORT_W {
                ui.set_max_width(panel_w);
            }
            // Custom left-aligned title with close button
            ui.horizontal(|ui| {
                ui.label(
                    egui::RichText::new(t!("panel.title"))
                        .size(14.0)
                        .color(self.theme.text_color),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button("×").clicked() {
                        close_clicked = true;
                    }
                });
            });
            ui.add_space(4.0);
            self.layers_panel
                .show(ui, &mut self.plan, &self.assets, self.fetch_started_at);
        });

        // Remember the offset from the right edge so user drags survive
        // window resizes.
        if let Some(inner_resp) = resp {
            let win_rect = inner_resp.response.rect;
            self.layers_panel_right_offset = Some((screen_w - win_rect.min.x, win_rect.min.y));
        }

        if close_clicked {
            show = false;
        }
        self.window_visibility.layers = show;
    }
}

impl eframe::App for PlanFEApp {
    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        let c = self.theme.canvas_bg_bottom;
        [
            c.r() as f32 / 255.0,
            c.g() as f32 / 255.0,
            c.b() as f32 / 255.0,
            1.0,
        ]
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Anchor the elapsed readout to the first frame after the fetch
        // was issued.
        if self.fetch_started_at.is_none() {
            self.fetch_started_at = Some(ctx.input(|i| i.time));
        }

        // --- Drain fetch results from the worker ---
        while let Ok(result) = self.source_receiver.try_recv() {
            match result {
                SourceResult::Loaded(layers) => {
                    log_info!("Layer fetch finished: {} layers", layers.len());
                    self.plan.finish_load(layers);
                }
                SourceResult::Failed(err) => {
                    log_err!("Layer fetch failed: {}", err);
                    self.plan.fail_load(err.to_string());
                }
            }
        }

        // --- Dynamic window title: "PlanFE - Layers (n)" ---
        {
            let title = if self.plan.is_loading() || self.plan.load_error().is_some() {
                "PlanFE".to_string()
            } else {
                t!("app.title.layers", count = self.plan.layers().len())
            };
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title));
        }

        // --- Sync icon colors with theme (catches settings window, menu toggle) ---
        let is_dark = matches!(self.theme.mode, ThemeMode::Dark);
        self.assets.update_theme(ctx, is_dark);

        // --- Sync OS window chrome (title bar) with app theme on Windows/macOS ---
        let system_theme = if is_dark {
            egui::SystemTheme::Dark
        } else {
            egui::SystemTheme::Light
        };
        ctx.send_viewport_cmd(egui::ViewportCommand::SetTheme(system_theme));

        let screen_size = ctx.screen_rect().size();
        let screen_size_changed = (screen_size - self.last_screen_size).length() > 0.5;
        self.last_screen_size = screen_size;

        self.show_menu_bar(ctx);
        self.show_status_bar(ctx);

        // --- Backdrop (CentralPanel fills remaining space) ---
        let canvas_bg_top = self.theme.canvas_bg_top;
        let canvas_bg_bottom = self.theme.canvas_bg_bottom;
        let panel_hidden = !self.window_visibility.layers;

        egui::CentralPanel::default()
            .frame(egui::Frame {
                fill: canvas_bg_bottom,
                ..Default::default()
            })
            .show(ctx, |ui| {
                // Vertical gradient from top to bottom
                let rect = ui.max_rect();
                let painter = ui.painter();
                let mesh = {
                    let mut mesh = egui::Mesh::default();
                    mesh.colored_vertex(rect.left_top(), canvas_bg_top);
                    mesh.colored_vertex(rect.right_top(), canvas_bg_top);
                    mesh.colored_vertex(rect.left_bottom(), canvas_bg_bottom);
                    mesh.colored_vertex(rect.right_bottom(), canvas_bg_bottom);
                    mesh.add_triangle(0, 1, 2);
                    mesh.add_triangle(1, 2, 3);
                    mesh
                };
                painter.add(egui::Shape::mesh(mesh));

                if panel_hidden {
                    ui.centered_and_justified(|ui| {
                        ui.label(egui::RichText::new(t!("app.hint.panel_hidden")).weak());
                    });
                }
            });

        self.show_floating_layers_panel(ctx, screen_size_changed);

        self.settings_window
            .show(ctx, &mut self.settings, &mut self.theme);

        // Keep painting while the fetch is outstanding so the channel gets
        // drained promptly and the loading pulse animates.
        if self.plan.is_loading() {
            ctx.request_repaint();
        }
    }
}
