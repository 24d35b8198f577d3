use std::sync::Arc;

use citechat::config;
use citechat::controller::ConversationController;
use citechat::credentials::{ConfigCredentials, CredentialLookup};
use citechat::grouping::BubbleCorner;
use citechat::keyboard::{Key, KeyboardHub};
use citechat::query::{DocumentQuery, HttpQueryClient};
use citechat::visibility::Visibility;
use clap::{Parser, Subcommand};

const EXCERPT_CHARS: usize = 120;

#[derive(Parser)]
#[command(name = "citechat")]
#[command(about = "Ask questions about your documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the configuration directory and a default config file.
    Init {
        /// Config file path (default: CITECHAT_CONFIG_PATH or ~/.citechat/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },

    /// Open the chat panel in the terminal (interactive). `/esc` closes it, `/open` reopens, `/quit` exits.
    Chat {
        /// Config file path (default: CITECHAT_CONFIG_PATH or ~/.citechat/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// Collection that scopes every question (overrides panel.selectedCollection).
        #[arg(long, value_name = "NAME")]
        collection: Option<String>,

        /// Question submitted automatically once the panel opens.
        #[arg(long, value_name = "TEXT")]
        ask: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("citechat {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Init { config }) => {
            if let Err(e) = run_init(config) {
                log::error!("init failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Chat {
            config,
            collection,
            ask,
        }) => {
            if let Err(e) = run_chat(config, collection, ask).await {
                log::error!("chat failed: {}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

fn run_init(config_path: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(config::default_config_path);
    let dir = citechat::init::init_config_dir(&path)?;
    println!("initialized configuration at {}", dir.display());
    Ok(())
}

async fn run_chat(
    config_path: Option<std::path::PathBuf>,
    collection: Option<String>,
    ask: Option<String>,
) -> anyhow::Result<()> {
    use std::io::{self, Write};

    let (mut config, path) = config::load_config(config_path)?;
    if collection.is_some() {
        config.panel.selected_collection = collection;
    }
    if ask.is_some() {
        config.panel.pending_message = ask;
    }
    log::info!("using config {} (query endpoint {})", path.display(), config.query.base_url);

    let credentials = ConfigCredentials::new(config.clone());
    if credentials.user_id().is_none() {
        eprintln!("no user id: set CITECHAT_USER_ID or auth.userId; questions will not be sent");
    }

    let keyboard = KeyboardHub::new();
    let (close_tx, mut close_rx) = tokio::sync::mpsc::unbounded_channel();
    let controller = ConversationController::new(
        credentials,
        HttpQueryClient::from_config(&config.query),
        &config.panel,
        keyboard.clone(),
        Arc::new(move || {
            let _ = close_tx.send(());
        }),
    );

    controller.open_with_transition().await;
    let mut printed = render(&controller, 0).await;

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        let prompt = match controller.visibility().await {
            Visibility::Open => "> ",
            _ => "(closed) ",
        };
        write!(stdout, "{}", prompt)?;
        stdout.flush()?;
        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("/exit") || input.eq_ignore_ascii_case("/quit") {
            break;
        }

        if input.eq_ignore_ascii_case("/esc") {
            keyboard.dispatch(Key::Escape);
        } else if input.eq_ignore_ascii_case("/close") {
            controller.request_close().await;
        } else if input.eq_ignore_ascii_case("/open") {
            controller.open_with_transition().await;
        } else if controller.visibility().await == Visibility::Open {
            controller.submit(input).await;
        } else {
            println!("the panel is closed; /open to reopen it");
        }

        while close_rx.try_recv().is_ok() {
            if controller.visibility().await != Visibility::Closed {
                controller.close().await;
                println!("(panel closed)");
            }
        }
        printed = render(&controller, printed).await;
    }

    Ok(())
}

/// Print messages appended since `printed`; returns the new count.
async fn render<C, Q>(controller: &ConversationController<C, Q>, printed: usize) -> usize
where
    C: CredentialLookup,
    Q: DocumentQuery,
{
    let view = controller.view().await;
    if let Some(req) = controller.take_scroll_request().await {
        log::trace!("scroll to message {}", req.target_index);
    }
    for (message, corner) in view.messages.iter().zip(&view.corners).skip(printed) {
        let who = if message.is_user() { "you" } else { "assistant" };
        let marker = match corner {
            BubbleCorner::Trailing => "*",
            BubbleCorner::Rounded => " ",
        };
        let time = message.timestamp.as_deref().unwrap_or("");
        println!("{} [{}] {}: {}", marker, time, who, message.content().trim());
        for (i, source) in message.display_sources().iter().enumerate() {
            let excerpt: String = source.content.chars().take(EXCERPT_CHARS).collect();
            println!(
                "      [{}] {} ({}, {}%): {}",
                i + 1,
                source.collection_name,
                source.data_type,
                source.score_percent(),
                excerpt
            );
        }
        let hidden = message.sources().len() - message.display_sources().len();
        if hidden > 0 {
            println!("      (+{} more)", hidden);
        }
    }
    view.messages.len()
}

