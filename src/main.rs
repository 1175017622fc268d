use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use datatables_view::config::{AppConfig, DEFAULT_CONFIG_FILE};
use datatables_view::usecase::services::import_service::ImportService;
use datatables_view::{Datatable, DatatableRequest, JsonResponder, SqliteTable};

/// Answer table widget requests from a SQLite table
#[derive(Parser, Debug)]
#[command(name = "datatables", author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: datatables.toml when present)
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// SQLite database, overriding the config file
    #[arg(long, global = true, value_name = "PATH", env = "DATATABLES_DB")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one widget request and print the JSON response
    Query {
        /// Table or view to read, overriding the config file
        #[arg(short, long)]
        table: Option<String>,

        /// Form-encoded request body, merged over the query string
        #[arg(long, default_value = "")]
        body: String,

        /// Query string, e.g. "draw=1&start=0&length=10"
        #[arg(default_value = "")]
        params: String,
    },

    /// Import a CSV file into a new table
    Import {
        #[arg(short, long)]
        table: String,

        csv: PathBuf,
    },
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load(path),
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            AppConfig::load(Path::new(DEFAULT_CONFIG_FILE))
        }
        None => Ok(AppConfig::default()),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("datatables_view=info,warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let db_path = match cli.db {
        Some(path) => path,
        None => config.database_path()?,
    };

    match cli.command {
        Command::Query {
            table,
            body,
            params,
        } => {
            let table = table
                .or_else(|| config.table.clone())
                .ok_or_else(|| anyhow!("no table given; pass --table or set `table` in config"))?;
            let mut source = SqliteTable::new(&db_path, table);
            if let Some(template) = &config.url_template {
                source = source.with_url_template(template.clone());
            }

            let view = Datatable::with_source(config.datatable.clone(), source);
            let request = DatatableRequest::from_http(&params, &body);
            let response = JsonResponder::new(config.debug)
                .respond(&view, &request)
                .context("datatable view is misconfigured")?;
            println!("{}", response.body);
        }
        Command::Import { table, csv } => {
            let imported = ImportService::new(db_path).import_csv(&csv, &table)?;
            println!(
                "imported {} rows into {}",
                imported.row_count, imported.table
            );
        }
    }

    Ok(())
}
