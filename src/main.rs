use table_loader::{
    read_dataset, test_connection, upload_file, ConnectionConfig, Dialect, InsertPlan, TableSchema,
};

use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "table-loader")]
#[command(about = "Create a database table from a CSV or Excel file and load its rows")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Overrides for the DB_* environment variables.
#[derive(ClapArgs)]
struct ConnectionArgs {
    /// mysql or postgres (or set DB_DIALECT)
    #[arg(long)]
    dialect: Option<String>,

    #[arg(long)]
    host: Option<String>,

    #[arg(long)]
    user: Option<String>,

    #[arg(long)]
    password: Option<String>,

    #[arg(long)]
    database: Option<String>,

    #[arg(long)]
    port: Option<u16>,
}

impl ConnectionArgs {
    fn resolve(&self) -> table_loader::Result<ConnectionConfig> {
        ConnectionConfig::from_lookup(|key| {
            let flag = match key {
                "DB_DIALECT" => self.dialect.clone(),
                "DB_HOST" => self.host.clone(),
                "DB_USER" => self.user.clone(),
                "DB_PASSWORD" => self.password.clone(),
                "DB_NAME" => self.database.clone(),
                "DB_PORT" => self.port.map(|p| p.to_string()),
                _ => None,
            };
            flag.or_else(|| env::var(key).ok())
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the configured database accepts connections
    TestConnection {
        #[command(flatten)]
        connection: ConnectionArgs,
    },
    /// Create the table (if missing) and insert every row of the file
    Upload {
        /// CSV, XLSX or XLS file
        file: PathBuf,

        /// Target table name (sanitized before use)
        #[arg(short, long)]
        table: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        connection: ConnectionArgs,
    },
    /// Print the DDL and first INSERT for a file without connecting
    Plan {
        file: PathBuf,

        #[arg(short, long)]
        table: String,

        #[arg(long, default_value = "mysql")]
        dialect: Dialect,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    match args.command {
        Commands::TestConnection { connection } => run_test_connection(connection).await,
        Commands::Upload {
            file,
            table,
            json,
            connection,
        } => run_upload(file, table, json, connection).await,
        Commands::Plan {
            file,
            table,
            dialect,
        } => run_plan(file, table, dialect),
    }
}

async fn run_test_connection(connection: ConnectionArgs) -> Result<ExitCode> {
    let config = connection.resolve()?;
    if test_connection(&config).await {
        println!("Connected to {} database successfully!", config.dialect);
        Ok(ExitCode::SUCCESS)
    } else {
        println!("Failed to connect to {} database.", config.dialect);
        Ok(ExitCode::FAILURE)
    }
}

async fn run_upload(
    file: PathBuf,
    table: String,
    json: bool,
    connection: ConnectionArgs,
) -> Result<ExitCode> {
    let config = connection.resolve()?;
    info!("Uploading {:?} to {} table '{}'", file, config.dialect, table);

    let result = upload_file(&config, &file, &table).await;
    if json {
        println!("{}", serde_json::to_string(&result)?);
    } else {
        println!("{}", result.summary(&table));
    }

    Ok(if result.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn run_plan(file: PathBuf, table: String, dialect: Dialect) -> Result<ExitCode> {
    let dataset = read_dataset(&file)?;
    let schema = TableSchema::from_dataset(&dataset, &table)?;
    let adapter = dialect.adapter();
    let plan = InsertPlan::new(adapter, &schema, dataset.row_count());

    println!("{};", schema.create_table_sql(adapter));
    match plan.statements().first() {
        Some(first) => println!("{};", first.sql),
        None => println!("-- no rows to insert"),
    }
    if plan.statements().len() > 1 {
        println!(
            "-- {} INSERT statements for {} rows",
            plan.statements().len(),
            plan.row_count()
        );
    }
    Ok(ExitCode::SUCCESS)
}
