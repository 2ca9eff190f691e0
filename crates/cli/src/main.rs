mod auth_commands;

use std::path::PathBuf;

use {
    anyhow::Context,
    channel_auth_config::{ConfigSources, load_layered},
    channel_auth_core::SecretStore,
    clap::{Parser, Subcommand},
    tracing::debug,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(
    name = "channel-auth",
    version,
    about = "Log in to and out of authenticated package channels"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Extra config file, taking precedence over all others.
    #[arg(long, global = true, env = "CHANNEL_AUTH_CONFIG")]
    config: Option<PathBuf>,

    /// Custom config directory (overrides default ~/.config/channel-auth/).
    /// Stored secrets live here too.
    #[arg(long, global = true, env = "CHANNEL_AUTH_CONFIG_DIR")]
    config_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in to a channel.
    Login(auth_commands::LoginArgs),
    /// Log out of a channel, removing its stored secret.
    Logout {
        /// Channel name or URL (e.g. "conda-forge").
        channel: String,
    },
    /// Show every configured channel and whether a secret is stored.
    Status,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    // stdout carries prompts and command output.
    if cli.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_telemetry(&cli);

    debug!(version = env!("CARGO_PKG_VERSION"), "channel-auth starting");

    let sources = ConfigSources::discover(cli.config.clone(), cli.config_dir.clone());
    let config = load_layered(&sources)?;
    let store_dir = sources
        .config_dir
        .clone()
        .context("no config directory found; pass --config-dir")?;
    let store = SecretStore::new(&store_dir);

    match cli.command {
        Commands::Login(args) => auth_commands::login(&config, store, args),
        Commands::Logout { channel } => auth_commands::logout(&config, store, &channel),
        Commands::Status => auth_commands::status(&config, store),
    }
}
