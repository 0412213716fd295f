mod config_commands;
mod db_commands;

use std::{path::PathBuf, sync::Arc};

use {
    anyhow::Context,
    clap::{Parser, Subcommand},
    tracing::{error, info, warn},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use {
    joingate_config::{JoingateConfig, Severity},
    joingate_store::{SqliteUserStore, UserStore},
};

#[derive(Parser)]
#[command(name = "joingate", about = "Joingate, a channel membership gate for Telegram")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file to load instead of searching the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Custom data directory (overrides default data dir).
    #[arg(long, global = true, env = "JOINGATE_DATA_DIR")]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot (default when no subcommand is provided).
    Run,
    /// Validate the configuration and report errors/warnings.
    CheckConfig,
    /// Show how many users are stored and verified.
    Users,
    /// Database management (migrate, reset).
    Db {
        #[command(subcommand)]
        action: db_commands::DbAction,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<JoingateConfig> {
    joingate_config::load(cli.config.as_deref()).context("failed to load config")
}

fn database_path(cli: &Cli, config: &JoingateConfig) -> PathBuf {
    let data_dir = cli.data_dir.clone().unwrap_or_else(joingate_config::data_dir);
    joingate_config::database_path(config, &data_dir)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_telemetry(&cli);

    let config = load_config(&cli)?;
    let db_path = database_path(&cli, &config);

    match cli.command {
        None | Some(Commands::Run) => run(config, db_path).await,
        Some(Commands::CheckConfig) => config_commands::check(&config),
        Some(Commands::Users) => db_commands::print_users(&db_path).await,
        Some(Commands::Db { action }) => db_commands::handle_db(action, &db_path).await,
    }
}

/// Validate, open storage, connect and poll until Ctrl-C.
async fn run(config: JoingateConfig, db_path: PathBuf) -> anyhow::Result<()> {
    info!(version = env!("CARGO_PKG_VERSION"), "joingate starting");

    let report = joingate_config::validate(&config);
    for d in &report.diagnostics {
        match d.severity {
            Severity::Error => error!(path = %d.path, "{}", d.message),
            Severity::Warning => warn!(path = %d.path, "{}", d.message),
        }
    }
    if report.has_errors() {
        anyhow::bail!(
            "invalid configuration: {} error(s), run `joingate check-config` for details",
            report.count(Severity::Error)
        );
    }

    let pool = db_commands::open_pool(&db_path).await?;
    info!(path = %db_path.display(), "database ready");
    let store: Arc<dyn UserStore> = Arc::new(SqliteUserStore::with_pool(pool.clone()));

    let bot = joingate_telegram::build_bot(&config.telegram)?;
    let connection = joingate_telegram::connect(bot)
        .await
        .context("failed to connect to Telegram")?;
    let polling = joingate_telegram::start_polling(connection, config.telegram, store);
    let stopped = polling.token();

    tokio::select! {
        result = tokio::signal::ctrl_c() => match result {
            Ok(()) => info!("shutdown requested"),
            Err(e) => error!(error = %e, "failed to listen for ctrl-c"),
        },
        _ = stopped.cancelled() => warn!("telegram polling stopped, shutting down"),
    }

    polling.shutdown().await;
    pool.close().await;
    info!("joingate stopped");
    Ok(())
}
