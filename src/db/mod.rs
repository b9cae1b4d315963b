use arc_swap::ArcSwapOption;
use sqlx::migrate::Migrator;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub mod postgres_donation_repository;

pub use postgres_donation_repository::PostgresDonationRepository;

pub const MIGRATIONS_DIR: &str = "./migrations";
pub const MAX_CONNECTIONS: u32 = 10;
pub const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared slot the connector publishes the pool into once the database is up.
#[derive(Clone, Default)]
pub struct PoolSlot {
    inner: Arc<ArcSwapOption<PgPool>>,
}

impl PoolSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connected(pool: PgPool) -> Self {
        let slot = Self::new();
        slot.install(pool);
        slot
    }

    pub fn install(&self, pool: PgPool) {
        self.inner.store(Some(Arc::new(pool)));
    }

    pub fn get(&self) -> Option<PgPool> {
        self.inner
            .load_full()
            .map(|pool| pool.as_ref().clone())
            .filter(|pool| !pool.is_closed())
    }

    pub fn is_ready(&self) -> bool {
        self.get().is_some()
    }
}

pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool, dir: &Path) -> anyhow::Result<()> {
    let migrator = Migrator::new(dir).await?;
    migrator.run(pool).await?;
    tracing::info!("Database migrations completed");
    Ok(())
}

/// Connects, migrates and publishes the pool, retrying on a fixed interval
/// until it succeeds.
pub async fn connect_with_retry(database_url: String, slot: PoolSlot, interval: Duration) {
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        tracing::info!(
            attempt,
            url = %mask_password(&database_url),
            "Attempting database connection"
        );

        match connect_and_migrate(&database_url).await {
            Ok(pool) => {
                slot.install(pool);
                tracing::info!(attempt, "Database connected successfully");
                return;
            }
            Err(e) => {
                tracing::error!(
                    attempt,
                    error = %e,
                    hint = connection_hint(&e.to_string()),
                    "Database connection failed, retrying in {:?}",
                    interval
                );
                tokio::time::sleep(interval).await;
            }
        }
    }
}

async fn connect_and_migrate(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = create_pool(database_url).await?;
    run_migrations(&pool, Path::new(MIGRATIONS_DIR)).await?;
    Ok(pool)
}

fn connection_hint(message: &str) -> &'static str {
    let message = message.to_lowercase();
    if message.contains("password authentication failed") || message.contains("authentication") {
        "check the database user credentials"
    } else if message.contains("failed to lookup address") || message.contains("name or service not known") {
        "check the database hostname"
    } else if message.contains("timed out") || message.contains("timeout") {
        "check that the database accepts connections from this host"
    } else if message.contains("connection refused") {
        "check that the database is running and the port is correct"
    } else {
        "see error for details"
    }
}

pub fn mask_password(url: &str) -> String {
    if let Some(at_pos) = url.rfind('@') {
        if let Some(colon_pos) = url[..at_pos].rfind(':') {
            if let Some(slash_pos) = url[..colon_pos].rfind("//") {
                let prefix = &url[..slash_pos + 2];
                let user = &url[slash_pos + 2..colon_pos];
                let suffix = &url[at_pos..];
                return format!("{}{}:****{}", prefix, user, suffix);
            }
        }
    }
    url.to_string()
}
