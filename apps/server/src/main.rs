use anyhow::Context;
use clap::{Parser, Subcommand};
use huddle_config::load as load_config;
use huddle_domain::RoomStore;
use huddle_runtime::{shutdown_signal, spawn_expiry_sweeper, telemetry, BackendServices};
use huddle_storage::{initialize_database, SqliteRoomStore};
use tracing::info;

#[derive(Parser)]
#[command(name = "huddle-server")]
#[command(about = "Huddle meeting backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the backend services (default)
    Serve,
    /// Remove expired rooms once and exit
    Sweep,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server().await,
        Commands::Sweep => run_sweep().await,
    }
}

async fn run_server() -> anyhow::Result<()> {
    telemetry::init_tracing().context("failed to initialise tracing")?;

    info!("starting Huddle backend");

    let config = load_config().context("failed to load configuration")?;

    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    let sweeper = spawn_expiry_sweeper(
        SqliteRoomStore::new(services.db_pool.clone()),
        std::time::Duration::from_secs(config.rooms.sweep_interval_seconds),
    );
    info!(
        interval_seconds = config.rooms.sweep_interval_seconds,
        "expiry sweeper running"
    );

    shutdown_signal().await;
    sweeper.abort();

    info!("backend shut down");
    Ok(())
}

async fn run_sweep() -> anyhow::Result<()> {
    telemetry::init_tracing().context("failed to initialise tracing")?;

    let config = load_config().context("failed to load configuration")?;
    let pool = initialize_database(&config.database)
        .await
        .context("failed to initialise database")?;

    let store = SqliteRoomStore::new(pool);
    let removed = store
        .cleanup_expired_rooms()
        .await
        .context("failed to sweep expired rooms")?;

    println!("removed {removed} expired rooms");
    Ok(())
}
