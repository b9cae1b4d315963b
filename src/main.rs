use clap::Parser;
use donation_gateway::cli::{self, Cli, Commands, DbCommands};
use donation_gateway::config::Config;
use donation_gateway::db::{self, PoolSlot, PostgresDonationRepository};
use donation_gateway::razorpay::RazorpayClient;
use donation_gateway::{create_app, startup, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    // Setup logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(config.log_json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!config.log_json).then(|| tracing_subscriber::fmt::layer()))
        .init();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Db(DbCommands::Migrate) => cli::handle_db_migrate(&config).await,
        Commands::Config => cli::handle_config_validate(&config),
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let report = startup::validate_config(&config);
    report.log(&config);
    if !report.is_valid() {
        anyhow::bail!("Configuration is invalid, refusing to start");
    }

    // The server starts before the database is reachable; handlers report 503
    // until the connector publishes the pool.
    let slot = PoolSlot::new();
    tokio::spawn(db::connect_with_retry(
        config.database_url.clone(),
        slot.clone(),
        config.db_retry_interval,
    ));

    let gateway = RazorpayClient::new(
        config.razorpay_api_url.clone(),
        config.razorpay_key_id.clone(),
        config.razorpay_key_secret.clone(),
    );
    tracing::info!("Razorpay client initialized with URL: {}", config.razorpay_api_url);

    let state = AppState::new(
        &config,
        Arc::new(PostgresDonationRepository::new(slot)),
        Arc::new(gateway),
    );
    let app = create_app(state, &config)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
