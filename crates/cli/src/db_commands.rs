use std::path::{Path, PathBuf};

use {
    anyhow::Context,
    clap::Subcommand,
    sqlx::{SqlitePool, sqlite::SqlitePoolOptions},
};

use joingate_store::{SqliteUserStore, UserStore};

#[derive(Subcommand)]
pub enum DbAction {
    /// Run all pending database migrations.
    Migrate,
    /// Delete the database file completely.
    Reset,
}

pub async fn handle_db(action: DbAction, db_path: &Path) -> anyhow::Result<()> {
    match action {
        DbAction::Migrate => {
            let pool = open_pool(db_path).await?;
            pool.close().await;
            println!("Migrations applied to {}", db_path.display());
            Ok(())
        },
        DbAction::Reset => reset_database(db_path),
    }
}

/// Open (creating if needed) the SQLite file and bring its schema up to date.
pub async fn open_pool(db_path: &Path) -> anyhow::Result<SqlitePool> {
    if let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await
        .with_context(|| format!("failed to open database {}", db_path.display()))?;
    joingate_store::run_migrations(&pool)
        .await
        .context("database migrations failed")?;
    Ok(pool)
}

/// Print user counts.
pub async fn print_users(db_path: &Path) -> anyhow::Result<()> {
    let pool = open_pool(db_path).await?;
    let stats = SqliteUserStore::with_pool(pool.clone()).stats().await?;
    pool.close().await;

    println!("total:    {}", stats.total);
    println!("verified: {}", stats.verified);
    Ok(())
}

/// The database file plus the WAL and SHM files SQLite may leave beside it.
fn database_files(db_path: &Path) -> Vec<PathBuf> {
    let mut files = vec![db_path.to_path_buf()];
    for suffix in ["-wal", "-shm"] {
        let mut name = db_path.as_os_str().to_owned();
        name.push(suffix);
        files.push(PathBuf::from(name));
    }
    files
}

fn reset_database(db_path: &Path) -> anyhow::Result<()> {
    let mut deleted = false;
    for path in database_files(db_path) {
        if path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("failed to delete {}", path.display()))?;
            println!("Deleted: {}", path.display());
            deleted = true;
        }
    }

    if deleted {
        println!("Database deleted. It is recreated on the next start.");
    } else {
        println!("No database found at {}", db_path.display());
    }
    Ok(())
}
