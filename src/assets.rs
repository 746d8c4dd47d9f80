use eframe::egui;
use egui::{Color32, ColorImage, Sense, TextureHandle, TextureOptions, Vec2};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::theme::ThemeMode;

/// Icon identifiers for the asset system
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Icon {
    /// App mark — viewport icon and the hint label.
    App,
    Layers,
    Settings,
    /// Open eye, drawn in layer rows for visible layers.
    Visible,
    /// Slashed eye for hidden layers.
    Hidden,
    ShowAll,
    HideAll,
    Warning,
    Close,
}

impl Icon {
    /// Fallback glyph used when a texture failed to build.
    pub fn emoji(&self) -> &'static str {
        match self {
            Icon::App => "▣",
            Icon::Layers => "🗇",
            Icon::Settings => "⚙",
            Icon::Visible => "👁",
            Icon::Hidden => "🚫",
            Icon::ShowAll => "👁",
            Icon::HideAll => "🚫",
            Icon::Warning => "⚠",
            Icon::Close => "×",
        }
    }

    pub fn tooltip(&self) -> String {
        match self {
            Icon::App => "PlanFE".to_string(),
            Icon::Layers => t!("panel.title"),
            Icon::Settings => t!("settings.title"),
            Icon::Visible => t!("panel.hide_layer"),
            Icon::Hidden => t!("panel.show_layer"),
            Icon::ShowAll => t!("panel.show_all_tip"),
            Icon::HideAll => t!("panel.hide_all_tip"),
            Icon::Warning => t!("panel.failed"),
            Icon::Close => String::new(),
        }
    }
}

// ============================================================================
// PROCEDURAL ICON RASTERIZATION
// ============================================================================
// The repo ships no binary assets: every icon is drawn into an RGBA buffer
// at startup. Glyphs are drawn dark-on-transparent; dark mode inverts RGB.

const ICON_SIZE: usize = 32;
const GLYPH: [u8; 3] = [30, 30, 30];

/// Small RGBA scratch buffer the glyph painters draw into.
struct Raster {
    size: usize,
    pixels: Vec<u8>,
}

impl Raster {
    fn new(size: usize) -> Self {
        Self {
            size,
            pixels: vec![0; size * size * 4],
        }
    }

    fn set(&mut self, x: i32, y: i32, rgb: [u8; 3], a: u8) {
        if x < 0 || y < 0 || x >= self.size as i32 || y >= self.size as i32 {
            return;
        }
        let idx = (y as usize * self.size + x as usize) * 4;
        // Keep the strongest coverage when strokes overlap.
        if self.pixels[idx + 3] < a {
            self.pixels[idx] = rgb[0];
            self.pixels[idx + 1] = rgb[1];
            self.pixels[idx + 2] = rgb[2];
            self.pixels[idx + 3] = a;
        }
    }

    /// Stroke a line segment with round caps.
    fn line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, width: f32, rgb: [u8; 3]) {
        let half = width / 2.0;
        let (dx, dy) = (x1 - x0, y1 - y0);
        let len_sq = dx * dx + dy * dy;
        for y in 0..self.size as i32 {
            for x in 0..self.size as i32 {
                let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
                let t = if len_sq > 0.0 {
                    (((px - x0) * dx + (py - y0) * dy) / len_sq).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let (cx, cy) = (x0 + t * dx, y0 + t * dy);
                let dist = ((px - cx).powi(2) + (py - cy).powi(2)).sqrt();
                if dist <= half {
                    self.set(x, y, rgb, 255);
                } else if dist <= half + 1.0 {
                    // one pixel of soft edge
                    let a = (255.0 * (half + 1.0 - dist)) as u8;
                    self.set(x, y, rgb, a);
                }
            }
        }
    }

    /// Stroke an axis-aligned ellipse outline.
    fn ellipse(&mut self, cx: f32, cy: f32, rx: f32, ry: f32, width: f32, rgb: [u8; 3]) {
        for y in 0..self.size as i32 {
            for x in 0..self.size as i32 {
                let nx = (x as f32 + 0.5 - cx) / rx;
                let ny = (y as f32 + 0.5 - cy) / ry;
                // Approximate distance to the ellipse outline, scaled back to pixels
                let d = (nx * nx + ny * ny).sqrt();
                let dist = (d - 1.0).abs() * rx.min(ry);
                if dist <= width / 2.0 {
                    self.set(x, y, rgb, 255);
                } else if dist <= width / 2.0 + 1.0 {
                    let a = (255.0 * (width / 2.0 + 1.0 - dist)) as u8;
                    self.set(x, y, rgb, a);
                }
            }
        }
    }

    fn disk(&mut self, cx: f32, cy: f32, r: f32, rgb: [u8; 3]) {
        for y in 0..self.size as i32 {
            for x in 0..self.size as i32 {
                let dist = ((x as f32 + 0.5 - cx).powi(2) + (y as f32 + 0.5 - cy).powi(2)).sqrt();
                if dist <= r {
                    self.set(x, y, rgb, 255);
                } else if dist <= r + 1.0 {
                    self.set(x, y, rgb, (255.0 * (r + 1.0 - dist)) as u8);
                }
            }
        }
    }

    fn stroke_rect(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, width: f32, rgb: [u8; 3]) {
        self.line(x0, y0, x1, y0, width, rgb);
        self.line(x1, y0, x1, y1, width, rgb);
        self.line(x1, y1, x0, y1, width, rgb);
        self.line(x0, y1, x0, y0, width, rgb);
    }
}

/// An open eye: almond outline plus pupil.
fn raster_eye(size: usize) -> Vec<u8> {
    let mut r = Raster::new(size);
    let s = size as f32;
    let (cx, cy) = (s / 2.0, s / 2.0);
    r.ellipse(cx, cy, s * 0.40, s * 0.26, 2.0, GLYPH);
    r.disk(cx, cy, s * 0.12, GLYPH);
    r.pixels
}

/// The open eye with a diagonal slash across it.
fn raster_eye_slashed(size: usize) -> Vec<u8> {
    let mut r = Raster::new(size);
    let s = size as f32;
    let (cx, cy) = (s / 2.0, s / 2.0);
    r.ellipse(cx, cy, s * 0.40, s * 0.26, 2.0, GLYPH);
    r.disk(cx, cy, s * 0.12, GLYPH);
    r.line(s * 0.15, s * 0.85, s * 0.85, s * 0.15, 2.5, GLYPH);
    r.pixels
}

/// Three offset sheet outlines, back to front.
fn raster_layers(size: usize) -> Vec<u8> {
    let mut r = Raster::new(size);
    let s = size as f32;
    r.stroke_rect(s * 0.32, s * 0.14, s * 0.86, s * 0.60, 2.0, GLYPH);
    r.stroke_rect(s * 0.23, s * 0.26, s * 0.77, s * 0.72, 2.0, GLYPH);
    r.stroke_rect(s * 0.14, s * 0.38, s * 0.68, s * 0.84, 2.0, GLYPH);
    r.pixels
}

/// Gear: ring plus eight radial teeth.
fn raster_gear(size: usize) -> Vec<u8> {
    let mut r = Raster::new(size);
    let s = size as f32;
    let (cx, cy) = (s / 2.0, s / 2.0);
    r.ellipse(cx, cy, s * 0.26, s * 0.26, 2.5, GLYPH);
    r.disk(cx, cy, s * 0.08, GLYPH);
    for i in 0..8 {
        let angle = i as f32 * std::f32::consts::TAU / 8.0;
        let (sin, cos) = angle.sin_cos();
        r.line(
            cx + cos * s * 0.28,
            cy + sin * s * 0.28,
            cx + cos * s * 0.42,
            cy + sin * s * 0.42,
            2.5,
            GLYPH,
        );
    }
    r.pixels
}

/// Warning triangle with an exclamation mark.
fn raster_warning(size: usize) -> Vec<u8> {
    let mut r = Raster::new(size);
    let s = size as f32;
    let top = (s * 0.50, s * 0.14);
    let left = (s * 0.12, s * 0.84);
    let right = (s * 0.88, s * 0.84);
    r.line(top.0, top.1, left.0, left.1, 2.0, GLYPH);
    r.line(left.0, left.1, right.0, right.1, 2.0, GLYPH);
    r.line(right.0, right.1, top.0, top.1, 2.0, GLYPH);
    r.line(s * 0.50, s * 0.38, s * 0.50, s * 0.62, 2.5, GLYPH);
    r.disk(s * 0.50, s * 0.72, s * 0.05, GLYPH);
    r.pixels
}

fn raster_close(size: usize) -> Vec<u8> {
    let mut r = Raster::new(size);
    let s = size as f32;
    r.line(s * 0.25, s * 0.25, s * 0.75, s * 0.75, 2.5, GLYPH);
    r.line(s * 0.75, s * 0.25, s * 0.25, s * 0.75, 2.5, GLYPH);
    r.pixels
}

/// App mark: accent rounded square behind the white layer stack. The only
/// colored glyph — it is never inverted, so it reads the same in both modes.
fn raster_app_mark(size: usize) -> Vec<u8> {
    let mut r = Raster::new(size);
    let s = size as f32;
    let accent = [50, 110, 220];
    let corner = s * 0.16;
    for y in 0..size as i32 {
        for x in 0..size as i32 {
            let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
            let qx = (px - s / 2.0).abs() - (s / 2.0 - corner - 1.0);
            let qy = (py - s / 2.0).abs() - (s / 2.0 - corner - 1.0);
            let dist = (qx.max(0.0).powi(2) + qy.max(0.0).powi(2)).sqrt() - corner;
            if dist <= 0.0 {
                r.set(x, y, accent, 255);
            } else if dist <= 1.0 {
                r.set(x, y, accent, (255.0 * (1.0 - dist)) as u8);
            }
        }
    }
    let white = [245, 245, 245];
    r.stroke_rect(s * 0.34, s * 0.20, s * 0.82, s * 0.56, s * 0.06, white);
    r.stroke_rect(s * 0.18, s * 0.44, s * 0.66, s * 0.80, s * 0.06, white);
    r.pixels
}

/// Raw RGBA for the viewport icon (window title bar, taskbar, Alt+Tab).
pub fn app_icon_rgba(size: usize) -> Vec<u8> {
    raster_app_mark(size)
}

// ============================================================================
// ASSETS
// ============================================================================

pub struct Assets {
    textures: HashMap<Icon, TextureHandle>,
    /// Original (light-mode) RGBA pixel data for each icon
    icon_pixels: HashMap<Icon, Vec<u8>>,
    /// Dimensions [width, height] for each icon
    icon_sizes: HashMap<Icon, [usize; 2]>,
    /// Whether icons are currently inverted (dark mode)
    icons_inverted: bool,
}

impl Default for Assets {
    fn default() -> Self {
        Self {
            textures: HashMap::new(),
            icon_pixels: HashMap::new(),
            icon_sizes: HashMap::new(),
            icons_inverted: false,
        }
    }
}

impl Assets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize assets - call once during app startup with the egui context
    pub fn init(&mut self, ctx: &egui::Context) {
        self.load_icon(ctx, Icon::App, raster_app_mark(ICON_SIZE));
        self.load_icon(ctx, Icon::Layers, raster_layers(ICON_SIZE));
        self.load_icon(ctx, Icon::Settings, raster_gear(ICON_SIZE));
        self.load_icon(ctx, Icon::Visible, raster_eye(ICON_SIZE));
        self.load_icon(ctx, Icon::Hidden, raster_eye_slashed(ICON_SIZE));
        self.load_icon(ctx, Icon::ShowAll, raster_eye(ICON_SIZE));
        self.load_icon(ctx, Icon::HideAll, raster_eye_slashed(ICON_SIZE));
        self.load_icon(ctx, Icon::Warning, raster_warning(ICON_SIZE));
        self.load_icon(ctx, Icon::Close, raster_close(ICON_SIZE));
    }

    fn load_icon(&mut self, ctx: &egui::Context, icon: Icon, pixels: Vec<u8>) {
        let size = [ICON_SIZE, ICON_SIZE];
        // Cache original pixels and size for theme-based inversion
        self.icon_pixels.insert(icon, pixels.clone());
        self.icon_sizes.insert(icon, size);
        let display_pixels = if self.icons_inverted && icon != Icon::App {
            Self::invert_rgb(&pixels)
        } else {
            pixels
        };
        let color_image = ColorImage::from_rgba_unmultiplied(size, &display_pixels);
        let texture =
            ctx.load_texture(format!("icon_{:?}", icon), color_image, TextureOptions::LINEAR);
        self.textures.insert(icon, texture);
    }

    /// Invert RGB channels for dark-mode display.
    ///
    /// Simple `255 - x` inversion: black → white, white → black.
    /// Fully-transparent pixels are skipped so their RGB noise
    /// doesn't bleed through when composited.
    fn invert_rgb(pixels: &[u8]) -> Vec<u8> {
        let mut out = pixels.to_vec();
        for chunk in out.chunks_exact_mut(4) {
            let a = chunk[3];
            if a == 0 {
                // Fully transparent — leave RGB as-is (invisible anyway).
                continue;
            }
            chunk[0] = 255 - chunk[0];
            chunk[1] = 255 - chunk[1];
            chunk[2] = 255 - chunk[2];
            // alpha unchanged
        }
        out
    }

    /// Update all icon textures for the current theme.
    /// Call this when the theme changes between light and dark mode.
    pub fn update_theme(&mut self, ctx: &egui::Context, dark: bool) {
        if dark == self.icons_inverted {
            return; // already in the correct state
        }
        self.icons_inverted = dark;

        for (icon, original_pixels) in &self.icon_pixels {
            if *icon == Icon::App {
                continue; // the colored mark is theme-independent
            }
            if let Some(size) = self.icon_sizes.get(icon) {
                let display_pixels = if dark {
                    Self::invert_rgb(original_pixels)
                } else {
                    original_pixels.clone()
                };
                let color_image = ColorImage::from_rgba_unmultiplied(*size, &display_pixels);
                let texture = ctx.load_texture(
                    format!("icon_{:?}", icon),
                    color_image,
                    TextureOptions::LINEAR,
                );
                self.textures.insert(*icon, texture);
            }
        }
    }

    pub fn has_texture(&self, icon: Icon) -> bool {
        self.textures.contains_key(&icon)
    }

    pub fn get_texture(&self, icon: Icon) -> Option<&TextureHandle> {
        self.textures.get(&icon)
    }

    /// Create an icon button that uses texture if available, emoji fallback otherwise
    pub fn icon_button(&self, ui: &mut egui::Ui, icon: Icon, size: Vec2) -> egui::Response {
        let response = if let Some(texture) = self.textures.get(&icon) {
            let sized_texture = egui::load::SizedTexture::from_handle(texture);
            let img = egui::Image::from_texture(sized_texture).fit_to_exact_size(size);
            ui.add_sized(size, egui::Button::image(img))
        } else {
            ui.add_sized(size, egui::Button::new(icon.emoji()))
        };
        response.on_hover_text(icon.tooltip())
    }

    /// Create a small icon button (for toolbar)
    pub fn small_icon_button(&self, ui: &mut egui::Ui, icon: Icon) -> egui::Response {
        let response = if let Some(texture) = self.textures.get(&icon) {
            let sized_texture = egui::load::SizedTexture::from_handle(texture);
            let img = egui::Image::from_texture(sized_texture).fit_to_exact_size(Vec2::splat(24.0));
            let mut btn = egui::Button::image(img);
            if ui.visuals().dark_mode {
                btn = btn.fill(egui::Color32::from_gray(18));
            }
            ui.add(btn)
        } else {
            ui.button(icon.emoji())
        };
        response.on_hover_text(icon.tooltip())
    }

    /// Create an enabled/disabled icon button
    pub fn icon_button_enabled(&self, ui: &mut egui::Ui, icon: Icon, enabled: bool) -> egui::Response {
        let response = if let Some(texture) = self.textures.get(&icon) {
            let sized_texture = egui::load::SizedTexture::from_handle(texture);
            let img = egui::Image::from_texture(sized_texture).fit_to_exact_size(Vec2::splat(24.0));
            let mut btn = egui::Button::image(img);
            if ui.visuals().dark_mode {
                btn = btn.fill(egui::Color32::from_gray(18));
            }
            ui.add_enabled(enabled, btn)
        } else {
            ui.add_enabled(enabled, egui::Button::new(icon.emoji()))
        };
        response.on_hover_text(icon.tooltip())
    }

    /// Paint an icon image into a specific rect, returning a click-sense response.
    /// Used for inline icons in layer rows (eye toggle).
    pub fn icon_in_rect(&self, ui: &mut egui::Ui, icon: Icon, rect: egui::Rect, tint: Color32) -> egui::Response {
        if let Some(texture) = self.textures.get(&icon) {
            let sized_texture = egui::load::SizedTexture::from_handle(texture);
            let img = egui::Image::from_texture(sized_texture)
                .fit_to_exact_size(rect.size())
                .tint(tint);
            ui.put(rect, img.sense(Sense::click()))
        } else {
            ui.put(rect, egui::Label::new(
                egui::RichText::new(icon.emoji()).size(rect.height() * 0.7).color(tint)
            ).sense(Sense::click()))
        }
    }

    /// Create a menu item button with a small icon + text label
    pub fn menu_item(&self, ui: &mut egui::Ui, icon: Icon, text: &str) -> egui::Response {
        if let Some(texture) = self.textures.get(&icon) {
            let sized_texture = egui::load::SizedTexture::from_handle(texture);
            let img = egui::Image::from_texture(sized_texture).fit_to_exact_size(Vec2::splat(16.0));
            ui.add(egui::Button::image_and_text(img, text))
        } else {
            ui.button(format!("{} {}", icon.emoji(), text))
        }
    }
}

// ============================================================================
// APP SETTINGS
// ============================================================================

pub struct AppSettings {
    /// Theme mode (Light or Dark)
    pub theme_mode: ThemeMode,
    /// Language code (e.g. "en", "es", "fr"). Empty string = auto-detect system language.
    pub language: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            theme_mode: ThemeMode::Light,
            language: String::new(), // empty = auto-detect on first boot
        }
    }
}

impl AppSettings {
    /// Path to the settings file.
    /// On Linux:   ~/.config/planfe/planfe_settings.cfg  (XDG_CONFIG_HOME respected)
    /// On Windows: %APPDATA%\PlanFE\planfe_settings.cfg
    /// On macOS:   ~/Library/Application Support/PlanFE/planfe_settings.cfg
    /// Fallback:   same directory as the executable.
    pub(crate) fn settings_path() -> Option<PathBuf> {
        #[cfg(target_os = "linux")]
        {
            let config_dir = std::env::var("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    let home = std::env::var("HOME").unwrap_or_else(|_| "~".to_string());
                    PathBuf::from(home).join(".config")
                })
                .join("planfe");
            let _ = std::fs::create_dir_all(&config_dir);
            return Some(config_dir.join("planfe_settings.cfg"));
        }
        #[cfg(target_os = "windows")]
        {
            // Use %APPDATA% so the settings are stored in the user profile and
            // isolated from other users.
            let appdata = std::env::var("APPDATA")
                .or_else(|_| std::env::var("USERPROFILE"))
                .unwrap_or_else(|_| {
                    std::env::current_exe()
                        .ok()
                        .and_then(|p| p.parent().map(|d| d.to_string_lossy().into_owned()))
                        .unwrap_or_default()
                });
            let config_dir = PathBuf::from(appdata).join("PlanFE");
            let _ = std::fs::create_dir_all(&config_dir);
            return Some(config_dir.join("planfe_settings.cfg"));
        }
        #[cfg(target_os = "macos")]
        {
            let home = std::env::var("HOME").unwrap_or_else(|_| "~".to_string());
            let config_dir = PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("PlanFE");
            let _ = std::fs::create_dir_all(&config_dir);
            return Some(config_dir.join("planfe_settings.cfg"));
        }
        #[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
        {
            std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|d| d.join("planfe_settings.cfg")))
        }
    }

    /// Serialized key=value form of these settings.
    pub fn to_config_string(&self) -> String {
        let mode_str = match self.theme_mode {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        };
        format!("theme_mode={mode_str}\nlanguage={}\n", self.language)
    }

    /// Apply one `key=value` line. Unknown keys are ignored so older or newer
    /// config files still load.
    pub fn apply_config_line(&mut self, line: &str) {
        let Some((key, val)) = line.split_once('=') else { return };
        let key = key.trim();
        let val = val.trim();
        match key {
            "theme_mode" => {
                self.theme_mode = match val {
                    "dark" => ThemeMode::Dark,
                    _ => ThemeMode::Light,
                };
            }
            "language" => {
                self.language = val.to_string();
            }
            _ => {}
        }
    }

    /// Save settings to disk
    pub fn save(&self) {
        let Some(path) = Self::settings_path() else { return };
        self.save_to_path(&path);
    }

    pub fn save_to_path(&self, path: &Path) {
        let _ = std::fs::write(path, self.to_config_string());
    }

    /// Load settings from disk (returns default if file missing or corrupt)
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else { return Self::default() };
        Self::load_from_path(&path)
    }

    pub fn load_from_path(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else { return Self::default() };
        let mut s = Self::default();
        for line in content.lines() {
            s.apply_config_line(line);
        }
        s
    }
}

// ============================================================================
// SETTINGS WINDOW
// ============================================================================

pub struct SettingsWindow {
    pub open: bool,
    /// Staging copies, synced from settings when the window opens.
    staged_mode: ThemeMode,
    staged_language: String,
}

impl Default for SettingsWindow {
    fn default() -> Self {
        Self {
            open: false,
            staged_mode: ThemeMode::Light,
            staged_language: String::new(),
        }
    }
}

impl SettingsWindow {
    /// Sync staged state from current settings (call when opening)
    fn sync_from_settings(&mut self, settings: &AppSettings) {
        self.staged_mode = settings.theme_mode;
        self.staged_language = settings.language.clone();
    }

    pub fn show(
        &mut self,
        ctx: &egui::Context,
        settings: &mut AppSettings,
        theme: &mut crate::theme::Theme,
    ) {
        if !self.open {
            return;
        }

        // Sync on first frame the window is shown
        let id = egui::Id::new("settings_sync_flag");
        let was_open_last_frame = ctx.data_mut(|d| {
            let prev: bool = d.get_temp(id).unwrap_or(false);
            d.insert_temp(id, true);
            prev
        });
        if !was_open_last_frame {
            self.sync_from_settings(settings);
        }

        let mut should_close = false;

        egui::Window::new("settings_window_internal")
            .title_bar(false)
            .resizable(false)
            .collapsible(false)
            .default_width(320.0)
            .show(ctx, |ui| {
                // ── Custom header strip ─────────────────────────────────────
                {
                    let available_width = ui.available_width();
                    let header_height = 32.0;
                    let v = ctx.style().visuals.clone();
                    let accent = v.selection.stroke.color;
                    let accent_faint = if v.dark_mode {
                        Color32::from_rgba_unmultiplied(accent.r(), accent.g(), accent.b(), 35)
                    } else {
                        Color32::from_rgba_unmultiplied(accent.r(), accent.g(), accent.b(), 25)
                    };

                    let (rect, _) = ui
                        .allocate_exact_size(Vec2::new(available_width, header_height), Sense::hover());
                    let painter = ui.painter();
                    painter.rect_filled(rect, egui::Rounding::ZERO, accent_faint);
                    painter.rect_filled(
                        egui::Rect::from_min_size(rect.min, Vec2::new(3.0, header_height)),
                        egui::Rounding::ZERO,
                        accent,
                    );
                    painter.text(
                        egui::pos2(rect.min.x + 12.0, rect.center().y),
                        egui::Align2::LEFT_CENTER,
                        format!("\u{2699} {}", t!("settings.title")),
                        egui::FontId::proportional(14.0),
                        accent,
                    );

                    // X close button on the right
                    let btn_size = Vec2::splat(header_height);
                    let btn_rect = egui::Rect::from_min_size(
                        egui::pos2(rect.max.x - btn_size.x, rect.min.y),
                        btn_size,
                    );
                    let btn_response =
                        ui.interact(btn_rect, ui.id().with("hdr_close"), Sense::click());
                    if btn_response.hovered() {
                        painter.rect_filled(
                            btn_rect,
                            egui::Rounding::ZERO,
                            Color32::from_rgba_unmultiplied(accent.r(), accent.g(), accent.b(), 55),
                        );
                    }
                    painter.text(
                        btn_rect.center(),
                        egui::Align2::CENTER_CENTER,
                        "×",
                        egui::FontId::proportional(14.0),
                        accent,
                    );
                    if btn_response.clicked() {
                        should_close = true;
                    }
                }
                ui.add_space(8.0);

                // -- Language -------------------------------------------
                ui.horizontal(|ui| {
                    ui.label(t!("settings.language"));
                    let display_text = if self.staged_language.is_empty() {
                        t!("settings.language.system")
                    } else {
                        crate::i18n::LANGUAGES
                            .iter()
                            .find(|(c, _)| *c == self.staged_language.as_str())
                            .map(|(_, name)| name.to_string())
                            .unwrap_or_else(|| self.staged_language.clone())
                    };
                    egui::ComboBox::from_id_source("settings_language_combo")
                        .selected_text(display_text)
                        .width(160.0)
                        .show_ui(ui, |ui: &mut egui::Ui| {
                            let mut pick: Option<String> = None;
                            if ui
                                .selectable_label(
                                    self.staged_language.is_empty(),
                                    t!("settings.language.system"),
                                )
                                .clicked()
                            {
                                pick = Some(String::new());
                            }
                            for &(code, name) in crate::i18n::LANGUAGES {
                                if ui.selectable_label(self.staged_language == code, name).clicked() {
                                    pick = Some(code.to_string());
                                }
                            }
                            if let Some(code) = pick {
                                self.staged_language = code.clone();
                                settings.language = code.clone();
                                let effective = if code.is_empty() {
                                    crate::i18n::detect_system_language()
                                } else {
                                    code
                                };
                                crate::i18n::set_language(&effective);
                                settings.save();
                                log_info!("Language changed to \"{}\"", effective);
                            }
                        });
                });

                ui.add_space(6.0);

                // -- Theme ----------------------------------------------
                ui.horizontal(|ui| {
                    ui.label(t!("settings.theme"));
                    let mut changed = false;
                    changed |= ui
                        .radio_value(&mut self.staged_mode, ThemeMode::Light, t!("settings.theme.light"))
                        .clicked();
                    changed |= ui
                        .radio_value(&mut self.staged_mode, ThemeMode::Dark, t!("settings.theme.dark"))
                        .clicked();
                    if changed && settings.theme_mode != self.staged_mode {
                        settings.theme_mode = self.staged_mode;
                        *theme = crate::theme::Theme::from_mode(self.staged_mode);
                        theme.apply(ctx);
                        settings.save();
                        log_info!("Theme changed to {:?}", self.staged_mode);
                    }
                });

                ui.add_space(6.0);

                // -- Session log location -------------------------------
                if let Some(path) = crate::logger::log_path() {
                    ui.horizontal(|ui| {
                        ui.label(t!("settings.log_file"));
                        ui.label(
                            egui::RichText::new(path.display().to_string())
                                .weak()
                                .size(11.0),
                        );
                    });
                }
            });

        if should_close {
            self.open = false;
        }
        if !self.open {
            // Clear the sync flag when window closes
            ctx.data_mut(|d| d.insert_temp(id, false));
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_round_trip_through_a_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("planfe_settings.cfg");
        let settings = AppSettings {
            theme_mode: ThemeMode::Dark,
            language: "fr".to_string(),
        };
        settings.save_to_path(&path);
        let loaded = AppSettings::load_from_path(&path);
        assert_eq!(loaded.theme_mode, ThemeMode::Dark);
        assert_eq!(loaded.language, "fr");
    }

    #[test]
    fn missing_settings_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let loaded = AppSettings::load_from_path(&dir.path().join("nope.cfg"));
        assert_eq!(loaded.theme_mode, ThemeMode::Light);
        assert!(loaded.language.is_empty());
    }

    #[test]
    fn unknown_and_malformed_config_lines_are_ignored() {
        let mut s = AppSettings::default();
        s.apply_config_line("theme_mode=dark");
        s.apply_config_line("future_knob=42");
        s.apply_config_line("no equals sign here");
        s.apply_config_line("language = de ");
        assert_eq!(s.theme_mode, ThemeMode::Dark);
        assert_eq!(s.language, "de");
    }

    #[test]
    fn invert_rgb_skips_fully_transparent_pixels() {
        let pixels = vec![10, 20, 30, 255, 7, 7, 7, 0];
        let out = Assets::invert_rgb(&pixels);
        assert_eq!(&out[..4], &[245, 235, 225, 255]);
        assert_eq!(&out[4..], &[7, 7, 7, 0]);
    }

    #[test]
    fn rasterized_glyphs_have_visible_coverage() {
        for pixels in [
            raster_eye(ICON_SIZE),
            raster_eye_slashed(ICON_SIZE),
            raster_layers(ICON_SIZE),
            raster_gear(ICON_SIZE),
            raster_warning(ICON_SIZE),
            raster_close(ICON_SIZE),
            raster_app_mark(ICON_SIZE),
        ] {
            assert_eq!(pixels.len(), ICON_SIZE * ICON_SIZE * 4);
            let opaque = pixels.chunks_exact(4).filter(|c| c[3] > 128).count();
            assert!(opaque > 20, "glyph is nearly empty ({} opaque px)", opaque);
        }
    }
}
