// auraspy - Intercepting proxy and editor for Salesforce Aura traffic
//
// The browser is pointed at the proxy; every request passing through is
// inspected for the Aura parameters (message, aura.context, aura.pageURI),
// stored in history and highlighted when it carries them. The TUI shows
// the history and opens an editor that decodes those parameters into
// readable JSON, then re-encodes edits into the request.
//
// Architecture:
// - Proxy server (axum): captures traffic and forwards it with reqwest
// - aura: parameter detection, decode/encode, rewriting, reprocessing
// - History: bounded in-memory store shared between proxy and TUI
// - TUI (ratatui): history list, parameter editor, settings
// - Event system: an mpsc channel notifies the TUI of captures and replays

mod aura;
mod cli;
mod config;
mod demo;
mod events;
mod history;
mod http;
mod logging;
mod proxy;
mod tui;

use anyhow::Result;
use aura::{HighlightSettings, Inspector};
use config::Config;
use history::History;
use logging::LogBuffer;
use proxy::ProxyState;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<()> {
    // Handle CLI commands first (decode, encode, inspect, config)
    // If a command was handled, exit early
    if cli::handle_cli() {
        return Ok(());
    }

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();

    // Load configuration first to determine TUI vs headless mode
    let config = Config::from_env()?;

    // In TUI mode logs are captured to this buffer instead of stdout
    let log_buffer = LogBuffer::new();
    // The guard must be kept alive for the duration of the program to ensure logs flush
    let _file_guard = logging::init(&config, &log_buffer);

    tracing::info!(
        "auraspy v{} (highlight: {}, history limit: {})",
        config::VERSION,
        config.highlight_color,
        config.history_limit
    );

    // The settings context is the only writer of the highlight color;
    // the inspector reads it through a handle
    let highlight = HighlightSettings::new(config.highlight_color);
    let history = History::shared(config.history_limit);
    let inspector = Arc::new(Mutex::new(Inspector::new(highlight.handle())));

    // Bounded channel: if the TUI falls behind, senders wait (backpressure)
    let (event_tx, event_rx) = mpsc::channel(1000);

    // Create shutdown channel for graceful proxy shutdown
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let proxy_state = ProxyState::new(&config, history.clone(), inspector.clone(), event_tx.clone())?;

    // Spawn the proxy server task (or demo task in demo mode)
    let proxy_handle = if config.demo_mode {
        tracing::info!("Running in DEMO MODE - seeding history with sample traffic");
        let history = history.clone();
        let inspector = inspector.clone();
        tokio::spawn(async move {
            demo::run_demo(history, inspector, event_tx, shutdown_rx).await;
        })
    } else {
        let bind_addr = config.bind_addr;
        let state = proxy_state.clone();
        drop(event_tx);
        tokio::spawn(async move {
            if let Err(e) = proxy::start_proxy(bind_addr, state, shutdown_rx).await {
                tracing::error!("Proxy server failed: {:#}", e);
            }
        })
    };

    if config.enable_tui {
        tracing::info!("Starting TUI");
        let settings_path = Config::config_path();
        let app = tui::app::App::new(config, highlight, history, inspector, log_buffer)
            .with_proxy(proxy_state)
            .with_settings_path(settings_path);

        if let Err(e) = tui::run_tui(app, event_rx).await {
            tracing::error!("TUI error: {:?}", e);
        }
    } else {
        tracing::info!(
            "TUI disabled, running in headless mode on {}",
            config.bind_addr
        );
        // Keep draining events so the proxy never blocks on a full channel
        let drain = tokio::spawn(log_events(event_rx));
        tokio::signal::ctrl_c().await?;
        drain.abort();
        // Keep the color writer alive until shutdown
        drop(highlight);
    }

    tracing::info!("Shutting down...");

    // Signal the proxy to shut down gracefully
    // If the send fails, the proxy has already shut down (which is fine)
    let _ = shutdown_tx.send(());
    let _ = proxy_handle.await;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Headless mode: report captures in the log instead of the TUI
async fn log_events(mut event_rx: mpsc::Receiver<events::ProxyEvent>) {
    use events::ProxyEvent;

    while let Some(event) = event_rx.recv().await {
        match event {
            ProxyEvent::Captured {
                id,
                method,
                url,
                matched: true,
                ..
            } => tracing::info!(id, "Aura request: {} {}", method, url),
            ProxyEvent::Error { message, context, .. } => {
                tracing::warn!(?context, "{}", message)
            }
            _ => {}
        }
    }
}
