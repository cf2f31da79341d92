//! # Command Line Interface
//!
//! Serve the routing API, render a routing document once, or manage the
//! database schema.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::api::{start_api_server, ApiState};
use crate::config::{load_config, AppConfig, DatabaseConfig};
use crate::domain::{ExitNodeId, SiteType};
use crate::observability::{init_observability, log_config_info};
use crate::routing::ConfigSynthesizer;
use crate::storage::{
    create_pool, list_applied_migrations, run_migrations, validate_migrations, MigrationInfo,
    ResourceRepository, SnapshotQuery, SnapshotReader, SqliteSnapshotReader,
    StaticSnapshotReader,
};

#[derive(Parser)]
#[command(name = "edgeplane")]
#[command(about = "Routing configuration control plane for edge reverse proxies")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, default_value = "config.yml")]
    pub config: String,

    /// Database URL override
    #[arg(long)]
    pub database_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the routing API server
    Serve,

    /// Print the routing document for one exit node
    Render {
        /// Exit node to render for
        #[arg(long)]
        exit_node: i64,

        /// Site types to include, comma separated
        #[arg(long, value_delimiter = ',')]
        site_types: Vec<SiteType>,

        /// Leave out TCP/UDP resources
        #[arg(long)]
        http_only: bool,

        /// Leave out resources on shared namespace domains
        #[arg(long)]
        filter_namespace_domains: bool,

        /// Read rows from a JSON fixture instead of the database
        #[arg(long)]
        fixture: Option<PathBuf>,
    },

    /// Database management commands
    Database {
        #[command(subcommand)]
        command: DatabaseCommands,
    },
}

#[derive(Subcommand)]
pub enum DatabaseCommands {
    /// Run pending migrations
    Migrate,

    /// List all applied migrations
    List,

    /// Validate database schema
    Validate,
}

/// Run CLI commands
pub async fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    let mut config = load_config(&cli.config)?;
    if let Some(url) = cli.database_url {
        config.database.url = url;
    }
    if cli.verbose {
        config.observability.log_level = "debug".to_string();
    }

    init_observability(&config.observability)?;

    match cli.command {
        Some(Commands::Serve) | None => serve(config).await?,

        Some(Commands::Render {
            exit_node,
            site_types,
            http_only,
            filter_namespace_domains,
            fixture,
        }) => {
            let mut query = SnapshotQuery::new(ExitNodeId::new(exit_node));
            if !site_types.is_empty() {
                query.site_types = site_types;
            }
            query.allow_raw_resources = !http_only;
            query.filter_namespace_domains = filter_namespace_domains;

            render(config, query, fixture).await?;
        }

        Some(Commands::Database { command }) => {
            handle_database_command(command, &config.database).await?;
        }
    }

    Ok(())
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    log_config_info(&config);

    let pool = create_pool(&config.database).await?;
    let state = ApiState::new(
        ConfigSynthesizer::new(config.routing.clone()),
        Arc::new(SqliteSnapshotReader::new(pool.clone())),
        Arc::new(ResourceRepository::new(pool)),
    );

    tracing::info!(
        address = %config.server.bind_address(),
        "Starting edgeplane routing API"
    );
    start_api_server(&config.server, state).await?;
    Ok(())
}

async fn render(
    config: AppConfig,
    query: SnapshotQuery,
    fixture: Option<PathBuf>,
) -> anyhow::Result<()> {
    let reader: Box<dyn SnapshotReader> = match fixture {
        Some(path) => Box::new(StaticSnapshotReader::from_json_file(path)?),
        None => Box::new(SqliteSnapshotReader::new(create_pool(&config.database).await?)),
    };

    let synthesizer = ConfigSynthesizer::new(config.routing);
    let document = synthesizer.generate(reader.as_ref(), &query).await?;
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}

/// Handle database management commands
async fn handle_database_command(
    command: DatabaseCommands,
    config: &DatabaseConfig,
) -> anyhow::Result<()> {
    let pool = create_pool(config).await?;

    match command {
        DatabaseCommands::Migrate => {
            println!("Running database migrations...");
            run_migrations(&pool).await?;
            println!("Migrations completed successfully!");
        }

        DatabaseCommands::List => {
            let migrations = list_applied_migrations(&pool).await?;
            if migrations.is_empty() {
                println!("No migrations have been applied");
            } else {
                println!("Applied migrations:");
                print_migrations_table(&migrations);
            }
        }

        DatabaseCommands::Validate => {
            println!("Validating database schema...");
            if validate_migrations(&pool).await? {
                println!("Database schema validation passed");
            } else {
                println!("Database schema has missing or unexpected migrations");
                process::exit(1);
            }
        }
    }

    Ok(())
}

/// Print migrations in a formatted table
fn print_migrations_table(migrations: &[MigrationInfo]) {
    println!();
    println!("{:<15} {:<40} {:<25} {:<10}", "Version", "Description", "Applied On", "Time (ms)");
    println!("{}", "-".repeat(90));

    for migration in migrations {
        println!(
            "{:<15} {:<40} {:<25} {:<10}",
            migration.version,
            truncate_string(&migration.description, 38),
            migration.installed_on.format("%Y-%m-%d %H:%M:%S"),
            migration.execution_time
        );
    }
    println!();
}

/// Truncate string to fit in table column
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
