use anyhow::Result;
use clap::Parser;
use log::{info, warn, LevelFilter};
use std::{env, io, path::PathBuf};
use tokio::sync::mpsc;

mod ui;
mod utils;

use crate::ui::{BoardUI, UiAction};
use msgboard::config::{self, ClientConfig};
use msgboard::{MessageStore, SendOutcome, SyncError, SyncEvent, SyncService};

/// Command line arguments for msgboard
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "msgboard: a terminal client for a simple message board.",
    long_about = "msgboard shows the messages on a board service and lets you post new ones.\n\n\
    The endpoint is taken from --base-url, then MSGBOARD_BASE_URL, then the saved config file,\n\
    then http://127.0.0.1:4010."
)]
struct Args {
    /// Base URL of the message service
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Give up on a request after this many seconds (default: wait forever)
    #[arg(long, value_name = "SECS")]
    request_timeout: Option<u64>,

    /// Use this config file instead of the one in the user config directory
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write the resolved settings to the config file
    #[arg(long)]
    save_config: bool,

    /// Where to write the log
    #[arg(long, value_name = "PATH", default_value = "msgboard.log")]
    log_file: PathBuf,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn resolve_config(args: &Args) -> Result<ClientConfig> {
    let mut config = config::load_config()?.unwrap_or_default();

    if let Some(base_url) = args.base_url.clone().or_else(|| env::var("MSGBOARD_BASE_URL").ok()) {
        config = config.with_base_url(base_url);
    }
    if let Some(secs) = args.request_timeout {
        config = config.with_request_timeout(secs);
    }

    Ok(config)
}

fn spawn_load(service: &SyncService) {
    let service = service.clone();
    tokio::spawn(async move {
        // Failures reach the UI as SyncEvent::LoadFailed
        let _ = service.load_all().await;
    });
}

fn spawn_send(
    service: &SyncService,
    draft: msgboard::Message,
    outcome_tx: mpsc::UnboundedSender<Result<SendOutcome, SyncError>>,
) {
    let service = service.clone();
    tokio::spawn(async move {
        let result = service.send(draft).await;
        if outcome_tx.send(result).is_err() {
            warn!("Send finished after the board closed");
        }
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { LevelFilter::Debug } else { LevelFilter::Info };
    utils::setup_logging(args.log_file.to_str(), level)?;
    info!("Logging to file: {}", args.log_file.display());

    if let Some(path) = &args.config {
        config::set_config_path_override(path.clone());
    }
    let config = resolve_config(&args)?;
    if args.save_config {
        config::save_config(&config)?;
    }
    info!("Using message service at {}", config.base_url);

    let service = SyncService::from_config(&config, MessageStore::new())?;

    let mut terminal = ui::setup_terminal()?;
    let mut board = BoardUI::new();

    let result = run_main_loop(&mut board, &mut terminal, &service).await;

    ui::restore_terminal(terminal)?;
    result
}

/// Run the main event loop
async fn run_main_loop(
    board: &mut BoardUI,
    terminal: &mut ui::Terminal<ui::CrosstermBackend<io::Stdout>>,
    service: &SyncService,
) -> Result<()> {
    let mut events = service.subscribe();
    let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel();
    let store = service.store();

    spawn_load(service);

    loop {
        terminal.draw(|f| board.draw(f))?;

        while let Ok(event) = events.try_recv() {
            board.apply_event(&event);
            if matches!(event, SyncEvent::Loaded { .. } | SyncEvent::Appended { .. }) {
                board.set_messages(store.snapshot());
            }
        }

        while let Ok(result) = outcome_rx.try_recv() {
            board.finish_send(result);
        }

        match board.handle_input()? {
            Some(UiAction::Quit) => {
                if board.is_sending() {
                    warn!("Quitting with a send still in flight");
                }
                break;
            }
            Some(UiAction::Reload) => spawn_load(service),
            Some(UiAction::Submit(draft)) => spawn_send(service, draft, outcome_tx.clone()),
            None => {}
        }

        tokio::task::yield_now().await;
    }

    info!("Board closed with {} messages", store.len());
    Ok(())
}
