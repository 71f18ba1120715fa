use anyhow::{Context, Result};
use clap::Parser;
use notify::{EventKind, RecursiveMode, Watcher};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{reload, EnvFilter};

use vani_audio::{decode_wav, encode_wav, record_for, PlaybackSink};
use vani_client::DecoderClient;
use vani_core::{AppConfig, ConfigDiff, DashboardState, UiCommand};
use vani_poller::{AudioOut, PollController, SpeechSource, StatusSource};

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);
const VOICE_QUERY_DURATION: Duration = Duration::from_secs(5);
const VOICE_QUERY_SAMPLE_RATE: u32 = 16000;

#[derive(Parser)]
#[command(name = "vani", about = "Terminal dashboard for a silent-speech decoder")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_from_file(&cli.config)
        .with_context(|| format!("failed to load config from {:?}", cli.config))?;

    // Set up TUI log buffer and layered tracing subscriber
    let log_buffer = Arc::new(Mutex::new(VecDeque::<String>::new()));
    let tui_log_layer = vani_tui::DashLogLayer::new(Arc::clone(&log_buffer), 1000);

    let env_filter = EnvFilter::try_new(&config.general.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter_layer, filter_handle) = reload::Layer::new(env_filter);

    let subscriber = tracing_subscriber::Registry::default()
        .with(filter_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .with(tui_log_layer);

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    tracing::info!("vani starting, polling {}", config.server.base_url);

    let client = Arc::new(
        DecoderClient::new(&config.server.base_url, HTTP_TIMEOUT)
            .context("failed to build HTTP client")?,
    );
    let sink = Arc::new(PlaybackSink::spawn(
        &config.playback.device_name,
        config.playback.enabled,
    ));

    // Channel wiring: poller → TUI state, TUI → command handler,
    // everyone ← shutdown.
    let (state_tx, state_rx) = tokio::sync::watch::channel(DashboardState::default());
    let (cmd_tx, mut cmd_rx) = tokio::sync::mpsc::unbounded_channel::<UiCommand>();
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    let controller = PollController::new(
        Arc::clone(&client) as Arc<dyn StatusSource>,
        Arc::clone(&client) as Arc<dyn SpeechSource>,
        Arc::clone(&sink) as Arc<dyn AudioOut>,
        state_tx,
        Duration::from_millis(config.server.poll_interval_ms),
        config.history.capacity,
    );
    let poller_handle = tokio::spawn(controller.run(shutdown_rx));

    // Watch the config file and apply reloadable changes in place.
    let (fs_tx, mut fs_rx) = tokio::sync::mpsc::unbounded_channel();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        let _ = fs_tx.send(res);
    })
    .context("failed to create config watcher")?;
    watcher
        .watch(&cli.config, RecursiveMode::NonRecursive)
        .with_context(|| format!("failed to watch {:?}", cli.config))?;

    let config_path = cli.config.clone();
    let reload_sink = Arc::clone(&sink);
    let mut current_config = config.clone();
    tokio::spawn(async move {
        while let Some(event) = fs_rx.recv().await {
            let event = match event {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!("config watch error: {}", e);
                    continue;
                }
            };
            if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                continue;
            }

            match AppConfig::load_from_file(&config_path) {
                Ok(new_config) => {
                    let diff = ConfigDiff::diff(&current_config, &new_config);
                    if diff.is_empty() {
                        continue;
                    }
                    if let Some(enabled) = diff.playback_enabled_change {
                        reload_sink.set_enabled(enabled);
                        tracing::info!(
                            "config reload: playback {}",
                            if enabled { "enabled" } else { "disabled" },
                        );
                    }
                    if let Some(ref level) = diff.log_level_change {
                        match EnvFilter::try_new(level) {
                            Ok(filter) => {
                                if filter_handle.reload(filter).is_ok() {
                                    tracing::info!("config reload: log level '{}'", level);
                                }
                            }
                            Err(e) => {
                                tracing::warn!("invalid log level '{}': {}", level, e);
                            }
                        }
                    }
                    for warning in &diff.non_reloadable {
                        tracing::warn!("config reload: {}", warning);
                    }
                    current_config = new_config;
                }
                Err(e) => tracing::warn!("config reload failed: {}", e),
            }
        }
    });

    // Spawn command handler task
    let cmd_client = Arc::clone(&client);
    let cmd_sink = Arc::clone(&sink);
    let cmd_shutdown = shutdown_tx.clone();
    tokio::spawn(async move {
        while let Some(cmd) = cmd_rx.recv().await {
            match cmd {
                UiCommand::SetPlaybackEnabled(enabled) => {
                    cmd_sink.set_enabled(enabled);
                    tracing::info!(
                        "playback {}",
                        if enabled { "enabled" } else { "disabled" },
                    );
                }
                UiCommand::VoiceQuery => {
                    let client = Arc::clone(&cmd_client);
                    let sink = Arc::clone(&cmd_sink);
                    tokio::spawn(async move {
                        if let Err(e) = handle_voice_query(client, sink).await {
                            tracing::warn!("voice query failed: {}", e);
                        }
                    });
                }
                UiCommand::Quit => {
                    let _ = cmd_shutdown.send(true);
                    break;
                }
            }
        }
    });

    tracing::info!("TUI active — press 'q' to quit");

    // Run TUI (blocks until user quits)
    vani_tui::run(state_rx, cmd_tx, log_buffer, config.wave.clone())
        .await
        .context("TUI error")?;

    tracing::info!("shutting down");
    let _ = shutdown_tx.send(true);
    let _ = tokio::time::timeout(Duration::from_secs(2), poller_handle).await;

    Ok(())
}

/// Record a short question from the microphone, send it to the backend
/// and play the synthesized answer.
async fn handle_voice_query(
    client: Arc<DecoderClient>,
    sink: Arc<PlaybackSink>,
) -> Result<()> {
    tracing::info!("recording voice query ({:?})", VOICE_QUERY_DURATION);

    let clip = tokio::task::spawn_blocking(|| {
        record_for("default", VOICE_QUERY_DURATION, VOICE_QUERY_SAMPLE_RATE, 1)
    })
    .await
    .context("recording task panicked")?
    .context("failed to record voice query")?;

    let wav = encode_wav(&clip).context("failed to encode voice query")?;
    let answer_bytes = client
        .voice_query(wav)
        .await
        .context("voice query request failed")?;
    let answer = decode_wav(&answer_bytes).context("failed to decode answer audio")?;

    tracing::info!("playing voice query answer ({:.1}s)", answer.duration_secs());
    sink.play(answer).context("failed to queue answer playback")?;
    Ok(())
}
