//! Application state for WordGen API

use anyhow::Result;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::path::PathBuf;

pub struct AppState {
    pub db: SqlitePool,
    /// HMAC secret the access tokens are signed with.
    pub secret_key: String,
    /// Path of the report template the generator fills.
    pub template_path: PathBuf,
}

impl AppState {
    pub async fn new() -> Result<Self> {
        // Get database path from env or use default
        let db_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| {
            let data_dir = dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("wordgen-api");
            std::fs::create_dir_all(&data_dir).ok();
            format!("sqlite:{}/wordgen.db?mode=rwc", data_dir.display())
        });

        let secret_key =
            std::env::var("SECRET_KEY").unwrap_or_else(|_| "your-secret-key".to_string());
        let template_path = std::env::var("TEMPLATE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("templates/report_template.docx"));

        Self::with_options(&db_url, secret_key, template_path).await
    }

    /// Build state against explicit options; tests point this at an
    /// in-memory database and a scratch template file.
    pub async fn with_options(
        db_url: &str,
        secret_key: String,
        template_path: PathBuf,
    ) -> Result<Self> {
        tracing::info!("Connecting to database: {}", db_url);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(db_url)
            .await?;

        // Run migrations
        Self::run_migrations(&pool).await?;

        Ok(Self {
            db: pool,
            secret_key,
            template_path,
        })
    }

    async fn run_migrations(pool: &SqlitePool) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS generations (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                filename TEXT NOT NULL,
                market_name TEXT,
                input_json TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'completed',
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
            "#,
        )
        .execute(pool)
        .await?;

        // Index for per-user history lookups
        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_generations_user_id ON generations(user_id)
            "#,
        )
        .execute(pool)
        .await?;

        tracing::info!("Migrations complete");
        Ok(())
    }
}

/// Get platform-specific data directory
mod dirs {
    use std::path::PathBuf;

    pub fn data_dir() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join("Library/Application Support"))
        }
        #[cfg(target_os = "linux")]
        {
            std::env::var("XDG_DATA_HOME")
                .ok()
                .map(PathBuf::from)
                .or_else(|| {
                    std::env::var("HOME")
                        .ok()
                        .map(|h| PathBuf::from(h).join(".local/share"))
                })
        }
        #[cfg(target_os = "windows")]
        {
            std::env::var("APPDATA").ok().map(PathBuf::from)
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            None
        }
    }
}
