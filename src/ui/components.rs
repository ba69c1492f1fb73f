// Reusable UI components
// Status label, buttons and chat bubbles

use crate::state::{ChatEntry, ConnectionStatus, Speaker};
use eframe::egui;

/// Render the connection status label with a status color
pub fn status_label(ui: &mut egui::Ui, status: ConnectionStatus) {
    let color = match status {
        ConnectionStatus::Disconnected => egui::Color32::GRAY,
        ConnectionStatus::Connecting => egui::Color32::from_rgb(220, 180, 0), // Yellow
        ConnectionStatus::Connected => egui::Color32::from_rgb(0, 200, 0),    // Green
        ConnectionStatus::TimedOut
        | ConnectionStatus::InvalidPort
        | ConnectionStatus::InvalidCryptoKey => {
            egui::Color32::from_rgb(220, 0, 0) // Red
        }
    };

    ui.colored_label(color, status.label());
}

/// Render a primary action button
pub fn primary_button(ui: &mut egui::Ui, text: &str) -> egui::Response {
    ui.add_sized(
        [120.0, 28.0],
        egui::Button::new(egui::RichText::new(text).strong()),
    )
}

/// Render one transcript entry as a chat bubble
/// User bubbles sit on the right, bot bubbles on the left
pub fn chat_bubble(ui: &mut egui::Ui, entry: &ChatEntry) {
    let is_user = entry.speaker == Speaker::User;
    let layout = if is_user {
        egui::Layout::right_to_left(egui::Align::TOP)
    } else {
        egui::Layout::left_to_right(egui::Align::TOP)
    };
    let max_width = ui.available_width() * 0.8;

    ui.with_layout(layout, |ui| {
        let frame = egui::Frame::none()
            .fill(if is_user {
                ui.visuals().selection.bg_fill
            } else {
                ui.visuals().extreme_bg_color
            })
            .rounding(egui::Rounding::same(8.0))
            .inner_margin(egui::Margin::same(8.0));

        frame.show(ui, |ui| {
            ui.set_max_width(max_width);
            ui.vertical(|ui| {
                let who = if is_user { "You" } else { "HiveMind" };
                ui.label(egui::RichText::new(who).small().weak());
                ui.label(&entry.text);
            });
        });
    });
}
