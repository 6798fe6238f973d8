//! tabsql - tabular snapshot utilities for SQL workflows

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use tabsql::config::DiffOptions;
use tabsql::connect::{create_connection, Backend, ConnectParams};
use tabsql::diff::diff_snapshots;
use tabsql::export::{save_table, ExportOptions};
use tabsql::parser::ReaderFactory;

#[derive(Parser, Debug)]
#[command(name = "tabsql")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare two tabular snapshots keyed by primary-key columns
    Diff {
        /// Old snapshot file (.csv or .parquet)
        old_file: PathBuf,

        /// New snapshot file (.csv or .parquet)
        new_file: PathBuf,

        /// Primary-key column(s), comma-separated
        #[arg(short, long, value_delimiter = ',', required = true)]
        key: Vec<String>,

        /// Relative tolerance for float comparisons
        #[arg(long)]
        rel_tol: Option<f64>,

        /// Absolute tolerance for float comparisons
        #[arg(long)]
        abs_tol: Option<f64>,

        /// Skip the duplicate-key check
        #[arg(long)]
        allow_duplicate_keys: bool,

        /// Print the summary as JSON instead of plain text
        #[arg(long)]
        json: bool,

        /// Write changed rows here (.csv or .parquet)
        #[arg(long)]
        out_changed: Option<PathBuf>,

        /// Write added rows here
        #[arg(long)]
        out_added: Option<PathBuf>,

        /// Write removed keys here
        #[arg(long)]
        out_removed: Option<PathBuf>,

        /// Omit the header row in CSV outputs
        #[arg(long)]
        no_header: bool,

        /// Omit the leading index column in CSV outputs
        #[arg(long)]
        no_index: bool,
    },

    /// Re-save a tabular file in another format
    Export {
        /// Source file (.csv or .parquet)
        src: PathBuf,

        /// Destination file; format chosen by extension
        dest: PathBuf,

        /// Omit the header row in CSV output
        #[arg(long)]
        no_header: bool,

        /// Omit the leading index column in CSV output
        #[arg(long)]
        no_index: bool,
    },

    /// Resolve a database connection, walking the driver fallback ladder
    Check {
        /// Backend: mssql, postgresql, oracle, mysql, or sqlite
        backend: Backend,

        /// Server address, optionally host:port
        server: String,

        /// Database name
        database: String,

        #[arg(short, long)]
        username: Option<String>,

        #[arg(short, long)]
        password: Option<String>,

        /// Per-attempt connection timeout in seconds
        #[arg(long, default_value_t = 5)]
        timeout_secs: u64,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        })
        .init();

    match run(cli.command) {
        Ok(has_changes) => {
            if has_changes {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run(command: Command) -> Result<bool> {
    match command {
        Command::Diff {
            old_file,
            new_file,
            key,
            rel_tol,
            abs_tol,
            allow_duplicate_keys,
            json,
            out_changed,
            out_added,
            out_removed,
            no_header,
            no_index,
        } => {
            let factory = ReaderFactory::new();
            let old = factory
                .read(&old_file)
                .with_context(|| format!("failed to read old snapshot: {}", old_file.display()))?;
            let new = factory
                .read(&new_file)
                .with_context(|| format!("failed to read new snapshot: {}", new_file.display()))?;

            let mut options =
                DiffOptions::default().with_allow_duplicate_keys(allow_duplicate_keys);
            if let Some(rtol) = rel_tol {
                options = options.with_rel_tolerance(rtol);
            }
            if let Some(atol) = abs_tol {
                options = options.with_abs_tolerance(atol);
            }

            let result = diff_snapshots(&old, &new, &key, &options)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result.stats)?);
            } else {
                println!(
                    "Old: {} ({} rows)",
                    old_file.display(),
                    result.stats.old_row_count
                );
                println!(
                    "New: {} ({} rows)",
                    new_file.display(),
                    result.stats.new_row_count
                );
                println!();
                println!("Changed:   {}", result.stats.rows_changed);
                println!("Added:     {}", result.stats.rows_added);
                println!("Removed:   {}", result.stats.rows_removed);
                println!("Unchanged: {}", result.stats.rows_unchanged);
            }

            let export_options = ExportOptions {
                index: !no_index,
                header: !no_header,
            };
            if let Some(path) = out_changed {
                save_table(&result.changed, &path, &export_options)
                    .with_context(|| format!("failed to save changed rows: {}", path.display()))?;
            }
            if let Some(path) = out_added {
                save_table(&result.added, &path, &export_options)
                    .with_context(|| format!("failed to save added rows: {}", path.display()))?;
            }
            if let Some(path) = out_removed {
                save_table(&result.removed, &path, &export_options)
                    .with_context(|| format!("failed to save removed keys: {}", path.display()))?;
            }

            Ok(result.has_changes())
        }

        Command::Export {
            src,
            dest,
            no_header,
            no_index,
        } => {
            let table = ReaderFactory::new()
                .read(&src)
                .with_context(|| format!("failed to read {}", src.display()))?;
            let options = ExportOptions {
                index: !no_index,
                header: !no_header,
            };
            save_table(&table, &dest, &options)
                .with_context(|| format!("failed to save {}", dest.display()))?;
            println!(
                "Saved {} rows x {} columns to {}",
                table.row_count(),
                table.column_count(),
                dest.display()
            );
            Ok(false)
        }

        Command::Check {
            backend,
            server,
            database,
            username,
            password,
            timeout_secs,
        } => {
            let mut params = ConnectParams::new(backend, server, database)
                .with_timeout(Duration::from_secs(timeout_secs));
            if let Some(user) = username {
                params = params.with_credentials(user, password);
            }
            let conn = create_connection(&params)?;
            println!("Connected via driver '{}': {}", conn.driver, conn.url);
            Ok(false)
        }
    }
}
