use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sqlprobe_catalog::{ConnectorOptions, SqlConnector};
use sqlprobe_core::{ColumnInfo, Config, QueryOutput, SecretSource};

const DEFAULT_CONFIG_FILE: &str = "sqlprobe.toml";

/// sqlprobe - Inspect MySQL and PostgreSQL schemas from a connection string
#[derive(Parser)]
#[command(name = "sqlprobe")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: sqlprobe.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Read the connection string from this environment variable
    #[arg(long, global = true, value_name = "VAR")]
    connection_env: Option<String>,

    /// Read the connection string from this file
    #[arg(long, global = true, value_name = "PATH")]
    connection_file: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the detected dialect and database name
    Classify,

    /// List tables
    Tables {
        /// Schema to list (PostgreSQL only; default from config)
        #[arg(short, long)]
        schema: Option<String>,
    },

    /// List the columns of a table
    Columns {
        table: String,

        /// Only print column names
        #[arg(long)]
        names_only: bool,
    },

    /// Show type and nullability of one column
    Column { table: String, column: String },

    /// Run a query and print every row
    Query {
        sql: String,

        /// Exit with an error when the query returns no rows
        #[arg(long)]
        fail_on_empty: bool,
    },

    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    if let Commands::Init { force } = cli.command {
        let path = cli.config.as_deref().unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
        return init_command(path, force);
    }

    let config = load_config(cli.config.as_deref(), cli.verbose)?;
    let secret = secret_source(&cli, &config)?;
    tracing::debug!(source = %secret.describe(), "Resolved connection source");
    if cli.verbose {
        eprintln!("{} {}", "Connection from".cyan(), secret.describe());
    }

    let mut options = ConnectorOptions::from(&config.query);
    if let Commands::Query { fail_on_empty: true, .. } = cli.command {
        options.empty_result_is_error = true;
    }
    let connector = SqlConnector::new(secret).with_options(options);

    match &cli.command {
        Commands::Classify => classify_command(&connector, cli.json),
        Commands::Tables { schema } => tables_command(&connector, schema.as_deref(), cli.json).await,
        Commands::Columns { table, names_only } => {
            columns_command(&connector, table, *names_only, cli.json).await
        }
        Commands::Column { table, column } => {
            column_command(&connector, table, column, cli.json).await
        }
        Commands::Query { sql, .. } => query_command(&connector, sql, cli.json).await,
        Commands::Init { .. } => Ok(()),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(path: Option<&Path>, verbose: bool) -> Result<Config> {
    if let Some(path) = path {
        tracing::debug!(path = %path.display(), "Loading config");
        return Ok(Config::from_file(path)?);
    }

    let default_path = Path::new(DEFAULT_CONFIG_FILE);
    if default_path.exists() {
        tracing::debug!(path = %default_path.display(), "Loading config");
        return Ok(Config::from_file(default_path)?);
    }

    if verbose {
        eprintln!("{}", "No config file found, using defaults".yellow());
    }
    Ok(Config::default())
}

/// Flags beat the config file, which falls back to `DATABASE_URL`
fn secret_source(cli: &Cli, config: &Config) -> Result<SecretSource> {
    if let Some(path) = &cli.connection_file {
        return Ok(SecretSource::File(path.clone()));
    }
    if let Some(var) = &cli.connection_env {
        return Ok(SecretSource::Env(var.clone()));
    }
    Ok(config.connection.secret_source()?)
}

fn init_command(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(anyhow::anyhow!(
            "{} already exists. Use --force to overwrite it.",
            path.display()
        ));
    }

    Config::default().save_to_file(path)?;
    tracing::info!(path = %path.display(), "Wrote default config");
    println!("{} {}", "✓ Wrote".green(), path.display());
    Ok(())
}

fn classify_command(connector: &SqlConnector, json: bool) -> Result<()> {
    let descriptor = connector.describe()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&descriptor)?);
    } else {
        println!("{} {}", "Dialect:".bold(), descriptor.dialect());
        println!("{} {}", "Database:".bold(), descriptor.database_name());
    }
    Ok(())
}

async fn tables_command(connector: &SqlConnector, schema: Option<&str>, json: bool) -> Result<()> {
    let tables = connector.list_tables(schema).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tables)?);
        return Ok(());
    }

    if tables.is_empty() {
        eprintln!("{}", "No tables found".yellow());
    }
    for table in &tables {
        println!("{}", table);
    }
    Ok(())
}

async fn columns_command(
    connector: &SqlConnector,
    table: &str,
    names_only: bool,
    json: bool,
) -> Result<()> {
    if names_only {
        let names = connector.list_column_names(table).await?;
        if json {
            println!("{}", serde_json::to_string_pretty(&names)?);
        } else {
            for name in &names {
                println!("{}", name);
            }
        }
        return Ok(());
    }

    let columns = connector.list_columns(table).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&columns)?);
        return Ok(());
    }

    let width = columns.iter().map(|c| c.name.len()).max().unwrap_or(0);
    for column in &columns {
        println!("{}", format_column(column, width));
    }
    Ok(())
}

async fn column_command(
    connector: &SqlConnector,
    table: &str,
    column: &str,
    json: bool,
) -> Result<()> {
    let info = connector.column_details(table, column).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("{}", format_column(&info, info.name.len()));
    }
    Ok(())
}

async fn query_command(connector: &SqlConnector, sql: &str, json: bool) -> Result<()> {
    let output = connector.run_query(sql).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if output.is_empty() {
        eprintln!("{}", "(0 rows)".dimmed());
        return Ok(());
    }

    println!("{}", format_header(&output).bold());
    println!("{}", output.to_text());
    Ok(())
}

fn format_column(column: &ColumnInfo, width: usize) -> String {
    let nullability = if column.nullable {
        "NULL".dimmed().to_string()
    } else {
        "NOT NULL".yellow().to_string()
    };
    format!(
        "{:<width$}  {}  {}",
        column.name,
        column.data_type.cyan(),
        nullability,
        width = width
    )
}

fn format_header(output: &QueryOutput) -> String {
    output.columns.join(",")
}
