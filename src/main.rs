use clap::Parser;
use labware_replay::messaging::{Notification, NotificationCategory};
use labware_replay::ui::ReplayApp;
use labware_replay::{ReplayConfig, SimulationSession, create_notification_channel};
use ringbuf::traits::Producer;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const NOTIFICATION_RINGBUFFER_CAPACITY: usize = 64;

#[derive(Parser)]
#[command(name = "labware_replay")]
#[command(about = "Step through an instrument run log on a simulated deck")]
#[command(version)]
struct Args {
    /// Run log to pre-load into the log box
    log_path: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let (mut notification_tx, notification_rx) =
        create_notification_channel(NOTIFICATION_RINGBUFFER_CAPACITY);

    let (config, config_error) = ReplayConfig::load_or_default();
    if let Some(e) = config_error {
        let _ = notification_tx.try_push(Notification::warning(
            NotificationCategory::Config,
            format!("Using default settings: {}", e),
        ));
    }

    let session = SimulationSession::new(config).with_notifications(notification_tx);

    // Optional log file to pre-load
    let initial_log = args.log_path.and_then(|path| {
        std::fs::read_to_string(&path)
            .map_err(|e| {
                tracing::warn!(path = %path.display(), error = %e, "Could not read log file")
            })
            .ok()
    });

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([640.0, 900.0])
            .with_title("Labware Replay"),
        ..Default::default()
    };

    let result = eframe::run_native(
        "Labware Replay",
        native_options,
        Box::new(|_cc| {
            let app = ReplayApp::new(session, notification_rx)
                .with_log_text(initial_log.unwrap_or_default());
            Ok(Box::new(app))
        }),
    );

    if let Err(e) = result {
        tracing::error!(error = %e, "UI exited with an error");
    }
}
