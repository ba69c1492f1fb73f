// HiveMind Chat GUI - Main Entry Point
// Native Rust chat client for a HiveMind hub

mod config;
mod session;
mod state;
mod ui;

use config::Config;
use eframe::egui;
use session::SessionManager;
use state::app_state::ConnectForm;
use state::ChatController;
use std::sync::Arc;
use tracing::info;
use ui::render_app_layout;

fn main() -> eframe::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load configuration
    let config = Config::from_env();
    info!(form = ?config.form, session = ?config.session, "Configuration loaded");

    // Configure window options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("HiveMind Chat")
            .with_inner_size([640.0, 720.0])
            .with_min_inner_size([420.0, 480.0]),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "HiveMind Chat",
        options,
        Box::new(move |cc| {
            let mut app = HiveMindChatApp::new(&config);
            let ctx = cc.egui_ctx.clone();
            app.controller
                .set_repaint_hook(Arc::new(move || ctx.request_repaint()));
            Box::new(app)
        }),
    )
}

/// Main application struct
/// Owns the chat controller, which owns the single hub session
struct HiveMindChatApp {
    controller: ChatController,
}

impl HiveMindChatApp {
    /// Create a new application instance
    fn new(config: &Config) -> Self {
        let session = SessionManager::hivemind(
            config.session.useragent.clone(),
            config.session.connect_timeout(),
        );
        Self {
            controller: ChatController::new(session, ConnectForm::from(&config.form)),
        }
    }
}

impl eframe::App for HiveMindChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Responses spoken while we were idle
        self.controller.drain_inbound();

        render_app_layout(ctx, &mut self.controller);
    }
}
