//! Tinted Notes - scripted demo session
//!
//! Entry point for the binary. Handles CLI argument parsing, logging
//! initialization, and drives a short editing session against the
//! in-memory backend, printing autosave status transitions.

use anyhow::Context;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tinted_notes::backend::{FileStorage, LocalStorage, MemoryBackend, MemoryStorage, Operation};
use tinted_notes::config::Config;
use tinted_notes::error::StoreError;
use tinted_notes::message::{AuthMessage, EditorMessage, NoteMessage};
use tinted_notes::NotesApp;

/// Application name for logging
const APP_NAME: &str = "tinted-notes";

/// Options from the command line
#[derive(Debug, Clone, Default)]
struct Flags {
    /// Override for the autosave delay
    delay_ms: Option<u64>,

    /// Make the first autosave write fail
    fail_next_save: bool,

    /// Alternative configuration file
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    init_logging();

    log::info!("Starting Tinted Notes");

    let flags = parse_args();

    let mut config = match &flags.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::load().unwrap_or_else(|e| {
            log::warn!("Using default configuration: {}", e);
            Config::default()
        }),
    };
    if let Some(delay_ms) = flags.delay_ms {
        config.autosave.delay_ms = delay_ms;
    }
    config.validate().context("invalid configuration")?;

    let storage: Arc<dyn LocalStorage> = match FileStorage::open_default() {
        Ok(storage) => Arc::new(storage),
        Err(e) => {
            log::warn!("Durable storage unavailable, themes will not persist: {}", e);
            Arc::new(MemoryStorage::new())
        }
    };

    run_demo(config, storage, &flags).await
}

async fn run_demo(
    config: Config,
    storage: Arc<dyn LocalStorage>,
    flags: &Flags,
) -> anyhow::Result<()> {
    let delay = config.autosave.delay();
    let settle = delay + Duration::from_millis(200);

    let backend = Arc::new(MemoryBackend::new(MemoryBackend::demo_user()));
    let mut app = NotesApp::new(config, Arc::clone(&backend), storage);
    app.start();
    println!("Theme: {}", app.state.themes.active().name);

    app.update(AuthMessage::SignIn);
    app.run_for(Duration::from_millis(50)).await;
    let user = app
        .state
        .user
        .clone()
        .context("sign-in did not complete")?;
    println!("Signed in as {} <{}>", user.display_name, user.email);

    app.update(NoteMessage::Create);
    app.run_for(Duration::from_millis(50)).await;
    let note_id = app
        .state
        .notes
        .iter()
        .next()
        .map(|n| n.id.clone())
        .context("note was not created")?;
    app.update(NoteMessage::Select(note_id.clone()));
    println!("Created {:?} ({})", app.state.editor.title(), note_id);

    if flags.fail_next_save {
        backend
            .fail_next(Operation::Update, StoreError::Network("simulated outage".into()))
            .await;
    }

    for content in ["<p>Hello</p>", "<p>Hello world</p>"] {
        app.update(EditorMessage::ContentChanged(content.to_string()));
        println!("typed {:<24} status: {}", content, app.save_status());
    }
    app.run_for(settle).await;
    println!("after {:?}: status: {}", settle, app.save_status());

    if let Some(notification) = app.state.latest_notification() {
        println!("notification: {}", notification.text);
        app.update(EditorMessage::ContentChanged("<p>Hello world!</p>".to_string()));
        app.run_for(settle).await;
        println!("after retry: status: {}", app.save_status());
    }

    app.update(EditorMessage::StatsTick);
    println!(
        "{} word(s), {} remote write(s)",
        app.state.stats.word_count(),
        backend.updates().await.len()
    );

    app.update(AuthMessage::SignOut);
    app.run_for(Duration::from_millis(50)).await;
    Ok(())
}

/// Initialize the logging system
fn init_logging() {
    // Set default log level if not specified
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info,tinted_notes=debug");
    }

    env_logger::Builder::from_default_env()
        .format_timestamp_millis()
        .init();
}

/// Parse command line arguments
fn parse_args() -> Flags {
    let args: Vec<String> = std::env::args().collect();
    let mut flags = Flags::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                std::process::exit(0);
            }
            "--delay" => {
                match args.get(i + 1).and_then(|v| v.parse::<u64>().ok()) {
                    Some(ms) => flags.delay_ms = Some(ms),
                    None => {
                        eprintln!("Error: --delay requires a number of milliseconds");
                        std::process::exit(1);
                    }
                }
                i += 1;
            }
            "--fail-next-save" => flags.fail_next_save = true,
            "--config" => {
                if i + 1 < args.len() {
                    flags.config = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                } else {
                    eprintln!("Error: --config requires a path argument");
                    std::process::exit(1);
                }
            }
            arg => {
                eprintln!("Unknown option: {}", arg);
                eprintln!("Use --help for usage information");
                std::process::exit(1);
            }
        }
        i += 1;
    }

    flags
}

/// Print help message
fn print_help() {
    println!(
        r#"Tinted Notes - note autosave demo

USAGE:
    tinted-notes [OPTIONS]

OPTIONS:
    -h, --help          Show this help message
    -v, --version       Show version information
    --delay <MS>        Autosave debounce delay in milliseconds
    --fail-next-save    Make the first autosave write fail
    --config <PATH>     Read configuration from PATH

EXAMPLES:
    tinted-notes                        Run the demo session
    tinted-notes --delay 250            Save after 250 ms of inactivity
    tinted-notes --fail-next-save       Show the error and retry path
"#
    );
}

/// Print version information
fn print_version() {
    println!("{} {}", APP_NAME, env!("CARGO_PKG_VERSION"));
}
