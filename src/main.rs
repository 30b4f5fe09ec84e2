//! groqchat CLI - chat with an LLM from the terminal.

use clap::{Parser, Subcommand};
use groqchat::cli;
use groqchat::config::{LogLevel, load_config};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::FmtSubscriber;

/// Get the version string.
///
/// - Release builds (on a git tag): "0.1.0"
/// - Development builds: "0.1.0-dev (abc1234)"
fn version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GROQCHAT_GIT_HASH");
    const IS_RELEASE: &str = env!("GROQCHAT_IS_RELEASE");

    static VERSION_STRING: std::sync::OnceLock<String> = std::sync::OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" {
            VERSION.to_string()
        } else {
            format!("{VERSION}-dev ({GIT_HASH})")
        }
    })
}

#[derive(Parser)]
#[command(name = "groqchat")]
#[command(author, version = version(), about = "Chat with an LLM from the terminal", long_about = None)]
struct Cli {
    /// Log debug details to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat session.
    Chat,

    /// Send one message in the current chat and print the reply.
    Send {
        /// Message text.
        message: String,
    },

    /// Start a new chat. Saved chats are kept.
    New,

    /// List saved chats, most recent first.
    History,

    /// Open a saved chat and print it.
    Load {
        /// Chat ID (from `groqchat history`).
        id: u64,
    },

    /// Delete all saved chats.
    ClearHistory {
        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },

    /// Save the current chat as plain text.
    Export {
        /// Output file. Defaults to groqchat-chat-<timestamp>.txt.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Manage the API key.
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },

    /// Show or change chat settings.
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
enum KeyAction {
    /// Save the API key.
    Set {
        /// The key.
        key: String,
    },

    /// Show whether a key is saved.
    Status {
        /// Print the key in clear.
        #[arg(long)]
        show: bool,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print current settings.
    Show,

    /// Change one setting (model, temperature, max-tokens, dark-mode, sound-effects).
    Set {
        /// Setting name.
        field: String,

        /// New value.
        value: String,
    },
}

fn init_logging(level: LogLevel) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level.as_tracing())
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("groqchat: warning: logging disabled: {e}");
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("groqchat: error: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_logging(if cli.verbose {
        LogLevel::Debug
    } else {
        config.log.level
    });

    let result = match cli.command {
        Commands::Chat => cli::chat::run(&config),
        Commands::Send { message } => cli::send::run(&config, &message),
        Commands::New => cli::session::run_new(&config),
        Commands::History => cli::history::run_list(&config),
        Commands::Load { id } => cli::session::run_load(&config, id),
        Commands::ClearHistory { yes } => cli::history::run_clear(&config, yes),
        Commands::Export { output } => cli::session::run_export(&config, output),
        Commands::Key { action } => match action {
            KeyAction::Set { key } => cli::credential::run_set(&config, &key),
            KeyAction::Status { show } => cli::credential::run_status(&config, show),
        },
        Commands::Settings { action } => match action {
            SettingsAction::Show => cli::settings::run_show(&config),
            SettingsAction::Set { field, value } => {
                cli::settings::run_set(&config, &field, &value)
            }
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("groqchat: error: {e}");
            ExitCode::FAILURE
        }
    }
}
