use clap::{Parser, Subcommand};
use std::path::Path;

use crate::config::Config;
use crate::db::{self, mask_password};
use crate::startup;

#[derive(Parser)]
#[command(name = "donation-gateway")]
#[command(about = "Donation Gateway - Razorpay donation backend", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Database management commands
    #[command(subcommand)]
    Db(DbCommands),

    /// Configuration validation
    Config,
}

#[derive(Subcommand)]
pub enum DbCommands {
    /// Run database migrations
    Migrate,
}

pub async fn handle_db_migrate(config: &Config) -> anyhow::Result<()> {
    let pool = db::create_pool(&config.database_url).await?;

    tracing::info!("Running database migrations...");
    db::run_migrations(&pool, Path::new(db::MIGRATIONS_DIR)).await?;

    println!("✓ Database migrations completed");

    Ok(())
}

pub fn handle_config_validate(config: &Config) -> anyhow::Result<()> {
    tracing::info!("Validating configuration...");

    println!("Configuration:");
    println!("  Port: {}", config.server_port);
    println!("  Database URL: {}", mask_password(&config.database_url));
    println!("  Razorpay API URL: {}", config.razorpay_api_url);
    println!("  Razorpay Key ID: {}", config.razorpay_key_id);
    println!(
        "  Razorpay Plan ID: {}",
        config.razorpay_plan_id.as_deref().unwrap_or("(not set)")
    );
    println!(
        "  Subscription cycles: {}",
        config
            .razorpay_subscription_cycles
            .map(|c| c.to_string())
            .unwrap_or_else(|| "(default)".to_string())
    );
    println!("  Minor unit multiplier: {}", config.minor_unit_multiplier);
    println!("  CORS origins: {}", config.cors_allowed_origins.join(", "));

    let report = startup::validate_config(config);
    report.print();

    if !report.is_valid() {
        anyhow::bail!("Configuration is invalid");
    }

    tracing::info!("Configuration is valid");
    Ok(())
}
