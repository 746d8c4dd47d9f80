use eframe::egui;
use egui::{Color32, Pos2, Rect, Sense, Vec2};

use crate::assets::{Assets, Icon};
use crate::plan::PlanState;

const ROW_HEIGHT: f32 = 28.0;
const ROW_GAP: f32 = 3.0;

/// Actions collected while drawing rows and applied after the loop, so the
/// render pass never mutates the list it is iterating.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelAction {
    ToggleVisibility(String),
    SetAllVisibility(bool),
}

/// Apply collected panel actions to the controller, in click order.
pub fn apply_actions(plan: &mut PlanState, actions: Vec<PanelAction>) {
    for action in actions {
        match action {
            PanelAction::ToggleVisibility(id) => plan.toggle_layer(&id),
            PanelAction::SetAllVisibility(visible) => plan.set_all_visibility(visible),
        }
    }
}

#[derive(Default)]
pub struct LayersPanel {}

impl LayersPanel {
    /// Main show method - renders the entire layers panel.
    ///
    /// `fetch_started_at` is the frame time when the snapshot fetch was
    /// issued, used for the elapsed readout in the loading indicator.
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        plan: &mut PlanState,
        assets: &Assets,
        fetch_started_at: Option<f64>,
    ) {
        if plan.is_loading() {
            self.show_loading(ui, fetch_started_at);
            return;
        }

        if let Some(message) = plan.load_error() {
            let message = message.to_string();
            self.show_error_strip(ui, assets, &message);
            return;
        }

        if plan.layers().is_empty() {
            ui.vertical_centered(|ui| {
                ui.add_space(20.0);
                ui.label(egui::RichText::new(t!("panel.empty")).weak());
                ui.add_space(20.0);
            });
            return;
        }

        let mut actions: Vec<PanelAction> = Vec::new();

        // Bulk action row. Each button disables itself when clicking it would
        // change nothing.
        ui.horizontal(|ui| {
            let show_all = ui
                .add_enabled(!plan.all_visible(), egui::Button::new(t!("panel.show_all")))
                .on_hover_text(t!("panel.show_all_tip"));
            if show_all.clicked() {
                actions.push(PanelAction::SetAllVisibility(true));
            }
            let hide_all = ui
                .add_enabled(!plan.none_visible(), egui::Button::new(t!("panel.hide_all")))
                .on_hover_text(t!("panel.hide_all_tip"));
            if hide_all.clicked() {
                actions.push(PanelAction::SetAllVisibility(false));
            }
        });
        ui.add_space(4.0);

        // Layer list. Leaves room below for the footer count.
        let scroll_h = (ui.available_height() - 28.0).max(60.0);
        egui::ScrollArea::vertical()
            .id_source("plan_layers_scroll")
            .max_height(scroll_h)
            .auto_shrink([false, true])
            .show(ui, |ui: &mut egui::Ui| {
                for layer in plan.layers() {
                    self.show_layer_row(ui, assets, &layer.id, &layer.name, layer.visible, &mut actions);
                    ui.add_space(ROW_GAP);
                }
            });

        ui.add_space(4.0);
        ui.separator();

        // Footer: visible count, right-aligned like the row toggles.
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let count_text = t!(
                "panel.visible_count",
                visible = plan.visible_count(),
                total = plan.layers().len()
            );
            ui.label(egui::RichText::new(count_text).size(11.0).color(Color32::GRAY));
        });

        apply_actions(plan, actions);
    }

    /// One row: checkbox, name (struck through when hidden), eye toggle.
    fn show_layer_row(
        &self,
        ui: &mut egui::Ui,
        assets: &Assets,
        id: &str,
        name: &str,
        visible: bool,
        actions: &mut Vec<PanelAction>,
    ) {
        let available_w = ui.available_width();
        let (row_rect, row_response) =
            ui.allocate_exact_size(Vec2::new(available_w, ROW_HEIGHT), Sense::hover());

        if !ui.is_rect_visible(row_rect) {
            return;
        }

        // Hover highlight behind the whole row
        if row_response.hovered() {
            ui.painter()
                .rect_filled(row_rect, 4.0, ui.visuals().widgets.hovered.bg_fill);
        }

        let center_y = row_rect.center().y;

        // Layout: [Checkbox] [Name ...] [Eye]
        let check_rect = Rect::from_center_size(
            Pos2::new(row_rect.left() + 14.0, center_y),
            Vec2::splat(18.0),
        );
        let eye_rect = Rect::from_center_size(
            Pos2::new(row_rect.right() - 14.0, center_y),
            Vec2::splat(20.0),
        );
        let name_rect = Rect::from_min_max(
            Pos2::new(check_rect.right() + 6.0, row_rect.top() + 2.0),
            Pos2::new(eye_rect.left() - 6.0, row_rect.bottom() - 2.0),
        );

        // Checkbox — checked means visible. Uses a local copy; the actual
        // flip goes through the deferred action.
        let mut checked = visible;
        let check_response = ui
            .put(check_rect, egui::Checkbox::without_text(&mut checked))
            .on_hover_text(t!("panel.toggle_for", name = name));
        if check_response.changed() {
            actions.push(PanelAction::ToggleVisibility(id.to_string()));
        }

        // Name, struck through when hidden
        let mut name_text = egui::RichText::new(name).size(13.0);
        if !visible {
            name_text = name_text.strikethrough().color(ui.visuals().weak_text_color());
        }
        ui.put(name_rect, egui::Label::new(name_text).truncate(true));

        // Eye toggle on the right
        let icon_color = ui.visuals().strong_text_color();
        let muted_color = ui.visuals().text_color();
        let eye_icon = if visible { Icon::Visible } else { Icon::Hidden };
        let eye_tint = if visible { icon_color } else { muted_color };
        let eye_response = assets.icon_in_rect(ui, eye_icon, eye_rect, eye_tint);
        if eye_response.clicked() {
            actions.push(PanelAction::ToggleVisibility(id.to_string()));
        }
        eye_response.on_hover_text(if visible {
            t!("panel.hide_layer")
        } else {
            t!("panel.show_layer")
        });
    }

    /// Centered loading label with elapsed seconds and a pulsing accent bar.
    fn show_loading(&self, ui: &mut egui::Ui, fetch_started_at: Option<f64>) {
        let current_time = ui.input(|i| i.time);
        let elapsed = match fetch_started_at {
            Some(start) => format!("{:.1}s", current_time - start),
            None => "0.0s".to_string(),
        };

        ui.vertical_centered(|ui| {
            ui.add_space(24.0);
            ui.label(format!("{} ({})", t!("panel.loading"), elapsed));
            ui.add_space(8.0);

            // Animated bar sweeping with a sine pulse
            let bar_w = ui.available_width() * 0.7;
            let (bar_rect, _) = ui.allocate_exact_size(Vec2::new(bar_w, 4.0), Sense::hover());
            let progress = ((current_time * 2.0).sin() + 1.0) / 2.0;
            let accent = ui.visuals().selection.bg_fill;
            ui.painter().rect_filled(
                bar_rect,
                0.0,
                ui.visuals().widgets.inactive.bg_fill,
            );
            let fill_rect = Rect::from_min_size(
                bar_rect.min,
                Vec2::new(bar_rect.width() * progress as f32, bar_rect.height()),
            );
            ui.painter().rect_filled(fill_rect, 0.0, accent);
            ui.add_space(24.0);
        });

        // Keep the pulse moving while we wait
        ui.ctx().request_repaint();
    }

    /// Warning icon plus message, distinct from the loaded-but-empty label.
    fn show_error_strip(&self, ui: &mut egui::Ui, assets: &Assets, message: &str) {
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            let icon_rect = Rect::from_center_size(
                Pos2::new(ui.cursor().left() + 12.0, ui.cursor().top() + 12.0),
                Vec2::splat(20.0),
            );
            assets.icon_in_rect(ui, Icon::Warning, icon_rect, ui.visuals().warn_fg_color);
            ui.add_space(28.0);
            ui.vertical(|ui| {
                ui.label(
                    egui::RichText::new(t!("panel.failed"))
                        .strong()
                        .color(ui.visuals().warn_fg_color),
                );
                ui.label(egui::RichText::new(message).weak().size(11.0));
            });
        });
        ui.add_space(8.0);
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::Layer;
    use pretty_assertions::assert_eq;

    fn loaded_plan() -> PlanState {
        let mut plan = PlanState::new();
        plan.finish_load(vec![
            Layer { id: "1".into(), name: "Walls".into(), visible: true },
            Layer { id: "2".into(), name: "Doors".into(), visible: false },
        ]);
        plan
    }

    #[test]
    fn actions_apply_in_click_order() {
        let mut plan = loaded_plan();
        apply_actions(
            &mut plan,
            vec![
                PanelAction::ToggleVisibility("2".to_string()),
                PanelAction::SetAllVisibility(false),
                PanelAction::ToggleVisibility("1".to_string()),
            ],
        );
        let visible: Vec<bool> = plan.layers().iter().map(|l| l.visible).collect();
        assert_eq!(visible, vec![true, false]);
    }

    #[test]
    fn bulk_gating_predicates_drive_button_state() {
        let mut plan = loaded_plan();
        // Mixed visibility: both bulk buttons active
        assert!(!plan.all_visible());
        assert!(!plan.none_visible());

        apply_actions(&mut plan, vec![PanelAction::SetAllVisibility(true)]);
        // Show All would now be disabled, Hide All enabled
        assert!(plan.all_visible());
        assert!(!plan.none_visible());
    }

    #[test]
    fn unknown_row_action_leaves_state_alone() {
        let mut plan = loaded_plan();
        let before = plan.layers().to_vec();
        apply_actions(
            &mut plan,
            vec![PanelAction::ToggleVisibility("missing".to_string())],
        );
        assert_eq!(plan.layers(), before.as_slice());
    }
}
