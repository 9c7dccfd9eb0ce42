//! SQLite connection pools and schema

use std::str::FromStr;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

/// Writer and reader pools; both point at the same database unless configured apart
#[derive(Clone)]
pub struct SqliteConnection {
    writer: SqlitePool,
    reader: SqlitePool,
}

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS characters (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        tv_series TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT,
        deleted_at TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS houses (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        region TEXT NOT NULL,
        foundation_year TEXT NOT NULL,
        current_lord TEXT NOT NULL DEFAULT '',
        created_at TEXT NOT NULL,
        updated_at TEXT,
        deleted_at TEXT
    )
    "#,
    // Live house names are unique even if two creates race past the service check
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS uq_houses_name_active
        ON houses (name) WHERE deleted_at IS NULL
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_houses_current_lord ON houses (current_lord)
    "#,
];

impl SqliteConnection {
    pub async fn connect(writer_url: &str, reader_url: &str, max_connections: u32) -> Result<Self> {
        let writer = open_pool(writer_url, max_connections).await?;
        let reader = if reader_url == writer_url || is_in_memory(writer_url) {
            writer.clone()
        } else {
            open_pool(reader_url, max_connections).await?
        };
        tracing::info!("Connected to SQLite database: {}", writer_url);
        Ok(Self { writer, reader })
    }

    pub fn from_pools(writer: SqlitePool, reader: SqlitePool) -> Self {
        Self { writer, reader }
    }

    pub fn writer(&self) -> &SqlitePool {
        &self.writer
    }

    pub fn reader(&self) -> &SqlitePool {
        &self.reader
    }

    pub async fn initialize_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(*statement)
                .execute(&self.writer)
                .await
                .context("Failed to initialize SQLite schema")?;
        }
        Ok(())
    }
}

/// Every connection to an in-memory URL opens its own private database
fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

async fn open_pool(url: &str, max_connections: u32) -> Result<SqlitePool> {
    let in_memory = is_in_memory(url);

    // Ensure data directory exists
    if let Some(path) = url.strip_prefix("sqlite:").map(|p| p.trim_start_matches("//")) {
        if !in_memory {
            if let Some(parent) = std::path::Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .context("Failed to create database directory")?;
                }
            }
        }
    }

    let options = SqliteConnectOptions::from_str(url)
        .with_context(|| format!("Invalid SQLite URL: {url}"))?
        .create_if_missing(true);

    let mut pool = SqlitePoolOptions::new().max_connections(max_connections);
    if in_memory {
        if max_connections > 1 {
            tracing::warn!(
                "In-memory SQLite database limited to one connection (requested {})",
                max_connections
            );
        }
        // The database lives only as long as its single connection
        pool = pool
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }

    pool.connect_with(options)
        .await
        .with_context(|| format!("Failed to connect to SQLite database: {url}"))
}
