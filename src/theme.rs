use eframe::egui;
use egui::Color32;

// ============================================================================
// THEME
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThemeMode {
    Light,
    Dark,
}

/// Color set for the whole app. One accent per mode; the gradient backdrop
/// and floating-window chrome derive from these fields.
#[derive(Clone, Copy, Debug)]
pub struct Theme {
    pub mode: ThemeMode,
    /// Accent for selection, the loading bar, and window borders.
    pub accent: Color32,
    /// Brighter accent for emphasis (hovered bulk buttons, header stripe).
    pub accent_strong: Color32,
    pub text_color: Color32,
    /// Top color of the central-panel backdrop gradient.
    pub canvas_bg_top: Color32,
    /// Bottom color of the backdrop gradient; also the clear color.
    pub canvas_bg_bottom: Color32,
    /// Fill for floating windows and the toolbar strip.
    pub panel_fill: Color32,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            mode: ThemeMode::Dark,
            accent: Color32::from_rgb(90, 150, 250),
            accent_strong: Color32::from_rgb(130, 180, 255),
            text_color: Color32::from_gray(220),
            canvas_bg_top: Color32::from_rgb(38, 42, 50),
            canvas_bg_bottom: Color32::from_rgb(24, 26, 32),
            panel_fill: Color32::from_rgb(32, 34, 40),
        }
    }

    pub fn light() -> Self {
        Self {
            mode: ThemeMode::Light,
            accent: Color32::from_rgb(50, 110, 220),
            accent_strong: Color32::from_rgb(30, 90, 200),
            text_color: Color32::from_gray(40),
            canvas_bg_top: Color32::from_rgb(238, 240, 244),
            canvas_bg_bottom: Color32::from_rgb(218, 222, 228),
            panel_fill: Color32::from_rgb(246, 247, 249),
        }
    }

    pub fn from_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Dark => Self::dark(),
            ThemeMode::Light => Self::light(),
        }
    }

    /// Switch between light and dark, keeping everything else derived.
    pub fn toggle(&mut self) {
        *self = match self.mode {
            ThemeMode::Dark => Self::light(),
            ThemeMode::Light => Self::dark(),
        };
    }

    /// Push this theme into the egui visuals. Called whenever the mode
    /// changes (settings window, View menu radios).
    pub fn apply(&self, ctx: &egui::Context) {
        let mut visuals = match self.mode {
            ThemeMode::Dark => egui::Visuals::dark(),
            ThemeMode::Light => egui::Visuals::light(),
        };
        visuals.selection.bg_fill = self.accent;
        visuals.selection.stroke = egui::Stroke::new(1.0, self.accent_strong);
        visuals.hyperlink_color = self.accent;
        visuals.panel_fill = self.panel_fill;
        visuals.window_fill = self.panel_fill;
        ctx.set_visuals(visuals);
    }

    /// Frame for the floating layers panel and other floating windows.
    pub fn floating_window_frame(&self) -> egui::Frame {
        let border = match self.mode {
            ThemeMode::Dark => Color32::from_gray(60),
            ThemeMode::Light => Color32::from_gray(180),
        };
        egui::Frame {
            fill: self.panel_fill,
            stroke: egui::Stroke::new(1.0, border),
            rounding: egui::Rounding::same(6.0),
            inner_margin: egui::Margin::same(8.0),
            shadow: egui::epaint::Shadow {
                extrusion: 8.0,
                color: Color32::from_black_alpha(60),
            },
            ..Default::default()
        }
    }

    /// Flat frame for the menu and status strips.
    pub fn toolbar_frame(&self) -> egui::Frame {
        egui::Frame {
            fill: self.panel_fill,
            inner_margin: egui::Margin::symmetric(8.0, 4.0),
            ..Default::default()
        }
    }
}

// ============================================================================
// WINDOW VISIBILITY
// ============================================================================

/// Which floating windows are currently shown.
pub struct WindowVisibility {
    pub layers: bool,
}

impl WindowVisibility {
    pub fn new() -> Self {
        Self { layers: true }
    }
}

impl Default for WindowVisibility {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_between_modes() {
        let mut theme = Theme::dark();
        theme.toggle();
        assert_eq!(theme.mode, ThemeMode::Light);
        theme.toggle();
        assert_eq!(theme.mode, ThemeMode::Dark);
    }

    #[test]
    fn from_mode_matches_constructors() {
        assert_eq!(Theme::from_mode(ThemeMode::Dark).mode, ThemeMode::Dark);
        assert_eq!(Theme::from_mode(ThemeMode::Light).mode, ThemeMode::Light);
    }
}
