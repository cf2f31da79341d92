//! # Database Migration Management
//!
//! Applies the SQL files in `migrations/` in filename order. Each file runs in
//! its own transaction and is recorded in `_edgeplane_migrations`.

use crate::errors::{EdgeplaneError, Result};
use crate::storage::DbPool;
use serde::{Deserialize, Serialize};
use sqlx::Row;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Migration information structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationInfo {
    pub version: i64,
    pub description: String,
    pub installed_on: chrono::DateTime<chrono::Utc>,
    pub execution_time: i64,
}

/// Locate the migrations directory: working directory first, then next to the executable.
fn get_migrations_dir() -> PathBuf {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let migrations_dir = cwd.join("migrations");

    if migrations_dir.exists() {
        migrations_dir
    } else {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."));
        exe_dir.join("migrations")
    }
}

fn load_migrations() -> Result<Vec<(String, String)>> {
    let migrations_dir = get_migrations_dir();

    if !migrations_dir.exists() {
        return Err(EdgeplaneError::config(format!(
            "Migrations directory not found: {}",
            migrations_dir.display()
        )));
    }

    let mut migrations = Vec::new();
    for entry in std::fs::read_dir(&migrations_dir)? {
        let path = entry?.path();
        if path.extension().and_then(|s| s.to_str()) != Some("sql") {
            continue;
        }

        let filename = path.file_stem().and_then(|s| s.to_str()).ok_or_else(|| {
            EdgeplaneError::config(format!("Invalid migration filename: {}", path.display()))
        })?;
        let content = std::fs::read_to_string(&path)?;
        migrations.push((filename.to_string(), content));
    }

    migrations.sort_by(|a, b| a.0.cmp(&b.0));

    if migrations.is_empty() {
        return Err(EdgeplaneError::config(format!(
            "No migration files found in {}",
            migrations_dir.display()
        )));
    }

    info!("Loaded {} migration files from {}", migrations.len(), migrations_dir.display());
    Ok(migrations)
}

/// Run all pending database migrations
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    info!("Starting database migration process");

    create_migration_table(pool).await?;
    let migrations = load_migrations()?;
    let applied = get_applied_migration_versions(pool).await?;

    let mut migrations_run = 0;
    for (filename, sql) in &migrations {
        let version = extract_version_from_filename(filename)?;

        if applied.contains(&version) {
            info!(version = version, "Migration already applied: {}", filename);
            continue;
        }

        info!(version = version, "Running migration: {}", filename);
        let start_time = std::time::Instant::now();

        let mut tx = pool
            .begin()
            .await
            .map_err(|e| EdgeplaneError::database(e, "Failed to start migration transaction"))?;

        sqlx::raw_sql(sql).execute(&mut *tx).await.map_err(|e| {
            error!(error = %e, migration = filename, "Migration failed");
            EdgeplaneError::database(e, format!("Migration failed: {}", filename))
        })?;

        let execution_time = start_time.elapsed().as_millis() as i64;
        sqlx::query(
            "INSERT INTO _edgeplane_migrations (version, description, execution_time, installed_on) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(version)
        .bind(filename)
        .bind(execution_time)
        .bind(chrono::Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!(error = %e, migration = filename, "Failed to record migration");
            EdgeplaneError::database(e, format!("Failed to record migration: {}", filename))
        })?;

        tx.commit()
            .await
            .map_err(|e| EdgeplaneError::database(e, "Failed to commit migration transaction"))?;

        migrations_run += 1;
        info!(version = version, execution_time_ms = execution_time, "Migration completed: {}", filename);
    }

    if migrations_run > 0 {
        info!(count = migrations_run, "Database migrations completed");
    } else {
        info!("No pending migrations");
    }

    Ok(())
}

async fn create_migration_table(pool: &DbPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS _edgeplane_migrations (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            execution_time INTEGER NOT NULL,
            installed_on TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
    "#,
    )
    .execute(pool)
    .await
    .map_err(|e| EdgeplaneError::database(e, "Failed to create migration tracking table"))?;

    Ok(())
}

async fn get_applied_migration_versions(pool: &DbPool) -> Result<Vec<i64>> {
    let rows = sqlx::query("SELECT version FROM _edgeplane_migrations ORDER BY version")
        .fetch_all(pool)
        .await
        .map_err(|e| EdgeplaneError::database(e, "Failed to get applied migrations"))?;

    Ok(rows.into_iter().map(|row| row.get::<i64, _>("version")).collect())
}

fn extract_version_from_filename(filename: &str) -> Result<i64> {
    let version_str = filename.split('_').next().unwrap_or_default();
    version_str.parse::<i64>().map_err(|_| {
        EdgeplaneError::config(format!("Invalid version in migration filename: {}", filename))
    })
}

/// Check that exactly the migrations on disk have been applied
pub async fn validate_migrations(pool: &DbPool) -> Result<bool> {
    let expected: Vec<i64> = load_migrations()?
        .iter()
        .map(|(filename, _)| extract_version_from_filename(filename))
        .collect::<Result<Vec<_>>>()?;
    let applied = get_applied_migration_versions(pool).await?;

    if let Some(missing) = expected.iter().find(|v| !applied.contains(v)) {
        warn!(version = missing, "Missing migration");
        return Ok(false);
    }
    if let Some(unexpected) = applied.iter().find(|v| !expected.contains(v)) {
        warn!(version = unexpected, "Unexpected migration found");
        return Ok(false);
    }

    Ok(true)
}

/// List all applied migrations
pub async fn list_applied_migrations(pool: &DbPool) -> Result<Vec<MigrationInfo>> {
    let rows = sqlx::query(
        "SELECT version, description, execution_time, installed_on FROM _edgeplane_migrations ORDER BY version",
    )
    .fetch_all(pool)
    .await
    .map_err(|e| EdgeplaneError::database(e, "Failed to list applied migrations"))?;

    Ok(rows
        .into_iter()
        .map(|row| MigrationInfo {
            version: row.get("version"),
            description: row.get("description"),
            installed_on: row.get("installed_on"),
            execution_time: row.get("execution_time"),
        })
        .collect())
}
