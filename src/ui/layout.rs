// Main application layout
// Menu bar, tab strip, connect form and chat view

use crate::state::{ChatController, Tab};
use crate::ui::components::*;
use eframe::egui;

const INPUT_ROW_HEIGHT: f32 = 40.0;
const FIELD_WIDTH: f32 = 300.0;

/// Render the main application layout
/// Menu bar on top, then a tab strip switching between connect form and chat
pub fn render_app_layout(ctx: &egui::Context, controller: &mut ChatController) {
    render_menu_bar(ctx, controller);

    egui::TopBottomPanel::top("tab_strip").show(ctx, |ui| {
        ui.add_space(4.0);
        ui.horizontal(|ui| {
            ui.heading("HiveMind");
            ui.add_space(16.0);
            ui.selectable_value(&mut controller.ui_state.active_tab, Tab::Connect, "Connect");
            ui.selectable_value(&mut controller.ui_state.active_tab, Tab::Chat, "Chat");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                status_label(ui, controller.status);
            });
        });
        ui.add_space(4.0);
    });

    egui::CentralPanel::default().show(ctx, |ui| match controller.ui_state.active_tab {
        Tab::Connect => render_connect_form(ui, controller),
        Tab::Chat => render_chat_view(ui, controller),
    });
}

/// Render the top menu bar
fn render_menu_bar(ctx: &egui::Context, controller: &mut ChatController) {
    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("Quit").clicked() {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });

            ui.menu_button("Chat", |ui| {
                if ui
                    .add_enabled(!controller.transcript.is_empty(), egui::Button::new("Clear chat"))
                    .clicked()
                {
                    controller.clear_chat();
                    ui.close_menu();
                }
            });

            ui.menu_button("View", |ui| {
                let mut dark_mode = ctx.style().visuals.dark_mode;
                if ui.checkbox(&mut dark_mode, "Dark Mode").changed() {
                    ctx.set_visuals(if dark_mode {
                        egui::Visuals::dark()
                    } else {
                        egui::Visuals::light()
                    });
                }
            });
        });
    });
}

/// Render the credentials form
fn render_connect_form(ui: &mut egui::Ui, controller: &mut ChatController) {
    ui.add_space(24.0);

    egui::Grid::new("connect_form")
        .num_columns(2)
        .spacing([16.0, 12.0])
        .show(ui, |ui| {
            let form = &mut controller.form;

            ui.label("Host");
            ui.add(egui::TextEdit::singleline(&mut form.host).desired_width(FIELD_WIDTH));
            ui.end_row();

            ui.label("Port");
            ui.add(egui::TextEdit::singleline(&mut form.port).desired_width(FIELD_WIDTH));
            ui.end_row();

            ui.label("Access Key");
            ui.add(
                egui::TextEdit::singleline(&mut form.access_key)
                    .password(true)
                    .desired_width(FIELD_WIDTH),
            );
            ui.end_row();

            ui.label("Crypto Key");
            ui.add(
                egui::TextEdit::singleline(&mut form.crypto_key)
                    .password(true)
                    .desired_width(FIELD_WIDTH),
            );
            ui.end_row();

            ui.label("Language");
            ui.add(egui::TextEdit::singleline(&mut form.lang).desired_width(FIELD_WIDTH));
            ui.end_row();

            ui.label("Accept self signed");
            if ui.checkbox(&mut form.accept_self_signed, "").changed() {
                controller.on_self_signed_toggled();
            }
            ui.end_row();

            ui.label("Status");
            ui.horizontal(|ui| {
                status_label(ui, controller.status);
                ui.add_space(16.0);
                if primary_button(ui, "Connect").clicked() {
                    controller.on_connect_pressed();
                    ui.ctx().request_repaint();
                }
            });
            ui.end_row();
        });
}

/// Render the chat transcript and input row
fn render_chat_view(ui: &mut egui::Ui, controller: &mut ChatController) {
    let transcript_height = (ui.available_height() - INPUT_ROW_HEIGHT).max(0.0);

    egui::ScrollArea::vertical()
        .id_source("chat_transcript")
        .max_height(transcript_height)
        .auto_shrink([false; 2])
        .stick_to_bottom(true)
        .show(ui, |ui| {
            ui.set_min_height(transcript_height);
            for entry in controller.transcript.entries() {
                chat_bubble(ui, entry);
                ui.add_space(6.0);
            }
        });

    ui.separator();
    ui.horizontal(|ui| {
        let input_width = (ui.available_width() - 140.0).max(100.0);
        let hint = if controller.is_connected() {
            "Say something"
        } else {
            "Not connected"
        };
        let response = ui.add(
            egui::TextEdit::singleline(&mut controller.input)
                .hint_text(hint)
                .desired_width(input_width),
        );
        let enter = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

        if primary_button(ui, "Send").clicked() || enter {
            controller.on_send_pressed();
            response.request_focus();
        }
    });
}
