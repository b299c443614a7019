//! Motion Camera Control Panel
//!
//! Console front end: polls device status, prints panel updates and
//! reads operator commands from stdin.

use motioncam_panel::{
    console::{describe, ConsoleCommand, HELP},
    panel_hub::{NotificationLevel, PanelMessage},
    state::{AppConfig, AppState},
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn render_message(message: &PanelMessage) -> Option<String> {
    match message {
        PanelMessage::StatusUpdate(p) => Some(describe(p)),
        PanelMessage::Notification(n) => Some(match n.level {
            NotificationLevel::Blocking => format!("*** {} ***", n.message),
            NotificationLevel::Info => n.message.clone(),
        }),
        PanelMessage::ConfigLoaded(m) => Some(format!(
            "config: {}x{} grid, {} active zones",
            m.grid_rows, m.grid_cols, m.active_cells
        )),
        // gallery refreshes every few seconds; too chatty for the console
        PanelMessage::GalleryUpdated(_) => None,
        PanelMessage::Logs(_) => None,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "motioncam_panel=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting motioncam-panel v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::default();
    tracing::info!(
        device_url = %config.device_url,
        status_poll_ms = config.status_poll_interval.as_millis() as u64,
        gallery_poll_ms = config.gallery_poll_interval.as_millis() as u64,
        "Configuration loaded"
    );

    let state = AppState::new(config)?;

    // Print panel updates
    let (_view_id, mut updates) = state.hub.subscribe().await;
    tokio::spawn(async move {
        while let Some(message) = updates.recv().await {
            if let Some(line) = render_message(&message) {
                println!("{}", line);
            }
        }
    });

    // Initial load; failure is logged and the panel keeps running
    let _ = state.panel.reload().await;

    let poller = state.poller.clone().start().await;
    let gallery = state
        .gallery
        .clone()
        .start(state.config.gallery_poll_interval);

    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match ConsoleCommand::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        if command == ConsoleCommand::Quit {
            break;
        }

        match command.execute(&state).await {
            Ok(output) if !output.is_empty() => println!("{}", output),
            Ok(_) => {}
            // already shown through the hub
            Err(e) if command.reports_via_hub() => {
                tracing::debug!(error = %e, "Command failed");
            }
            Err(e) => println!("error: {}", e),
        }
    }

    state.poller.stop().await;
    gallery.abort();
    if let Some(handle) = poller {
        let _ = handle.await;
    }
    tracing::info!("Panel closed");

    Ok(())
}
