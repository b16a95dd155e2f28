use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::info;
use twitter_config::AppConfig;
use twitter_database::{prepare_database, run_migrations, UnitOfWork};
use twitter_users::AppUserService;

pub mod telemetry {
    use anyhow::Result;
    use tracing::Level;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_max_level(Level::INFO)
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

#[derive(Clone)]
pub struct BackendServices {
    pub db_pool: SqlitePool,
    pub unit_of_work: UnitOfWork,
    pub users: AppUserService,
}

impl BackendServices {
    pub async fn initialise(config: &AppConfig) -> Result<Self> {
        let db_pool = prepare_database(&config.database).await?;
        run_migrations(&db_pool)
            .await
            .context("failed to prepare database schema")?;

        let unit_of_work = UnitOfWork::from_config(db_pool.clone(), &config.database);
        let users = AppUserService::new(unit_of_work.clone(), config);

        info!(
            page_size = unit_of_work.page_size(),
            avatar_dir = %config.storage.avatar_dir,
            "backend services ready"
        );

        Ok(Self {
            db_pool,
            unit_of_work,
            users,
        })
    }
}
