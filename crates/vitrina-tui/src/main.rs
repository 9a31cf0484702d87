use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};
use vitrina_core::{ChatRole, ChatSession, ReplyTiming, Router, LIST_COMMAND};

mod app;
mod config;
mod handler;
mod tui;
mod ui;

use app::App;
use config::Config;

#[derive(Parser, Debug)]
#[command(name = "vitrina", version)]
#[command(about = "Chat with a mock store assistant about its product catalog")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to a config file (defaults to the user config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Send one message and print the bot's reply
    Ask {
        /// Message text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Print the product catalog
    List,
    /// Show the effective configuration
    Config {
        /// Write the default configuration to disk
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let interactive = cli.command.is_none();

    init_logging(cli.verbose, interactive)?;
    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    let result = match cli.command {
        None => run_chat(cli.config.as_deref()).await,
        Some(Commands::Ask { text }) => ask(&text.join(" ")),
        Some(Commands::List) => ask(LIST_COMMAND),
        Some(Commands::Config { init }) => show_config(cli.config.as_deref(), init),
    };

    if let Err(e) = result {
        tracing::error!("Command execution failed: {:?}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// The TUI owns the terminal, so interactive sessions log to a file.
fn init_logging(verbose: u8, interactive: bool) -> Result<()> {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let builder = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact();

    if interactive {
        let log_path = log_file_path()?;
        if let Some(parent) = log_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("Failed to open log file {}", log_path.display()))?;
        builder.with_ansi(false).with_writer(Mutex::new(file)).init();
    } else {
        builder.with_writer(std::io::stderr).init();
    }

    Ok(())
}

fn log_file_path() -> Result<PathBuf> {
    let cache_dir = dirs::cache_dir()
        .ok_or_else(|| anyhow!("Could not determine cache directory"))?;
    Ok(cache_dir.join("vitrina").join("vitrina.log"))
}

async fn run_chat(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;

    tui::install_panic_hook();
    let mut terminal = tui::init().context("Failed to initialize terminal")?;

    let mut app = App::new(Router::builtin(), config.reply_timing());
    let mut events = tui::EventHandler::new(config.tick_rate());

    let result = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::render(&mut app, frame))?;

            match events.next().await {
                Some(event) => handler::handle_event(&mut app, event)?,
                None => break,
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    tui::restore().context("Failed to restore terminal")?;
    result
}

/// Route a single message without the TUI and print every reply in order.
fn ask(text: &str) -> Result<()> {
    // Delays only matter for the interactive shell
    let mut session = ChatSession::new(Router::builtin(), ReplyTiming::default());
    session.submit(text, std::time::Instant::now());
    session.flush();

    for message in session.transcript().iter().filter(|m| m.role == ChatRole::Bot) {
        println!("bot> {}", message.content);
    }
    Ok(())
}

fn show_config(config_path: Option<&Path>, init: bool) -> Result<()> {
    let path = Config::resolve_path(config_path)?;

    let config = if init {
        let config = Config::new();
        config.save_to(&path)?;
        tracing::info!(path = %path.display(), "wrote default config");
        config
    } else {
        Config::load_from(&path)?
    };

    println!("# {}", path.display());
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_ask_joins_words() {
        let cli = Cli::parse_from(["vitrina", "ask", "mochila", "ejecutiva"]);
        match cli.command {
            Some(Commands::Ask { text }) => assert_eq!(text.join(" "), "mochila ejecutiva"),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_no_subcommand_starts_chat() {
        let cli = Cli::parse_from(["vitrina", "-vv"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 2);
    }
}
