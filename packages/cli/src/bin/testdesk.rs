// ABOUTME: Command-line entry point for the Testdesk server
// ABOUTME: Parses arguments, loads .env, installs logging and starts the API server

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use testdesk_cli::{run_server, Config};

#[derive(Parser)]
#[command(name = "testdesk")]
#[command(about = "Testdesk - requirement-driven test case management")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Port to listen on (overrides TESTDESK_PORT)
        #[arg(long)]
        port: Option<u16>,
        /// SQLite database file (overrides TESTDESK_DATABASE_PATH)
        #[arg(long)]
        database: Option<PathBuf>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .init();
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve { port, database } => serve(port, database).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

async fn serve(port: Option<u16>, database: Option<PathBuf>) -> anyhow::Result<()> {
    let mut config = Config::from_env()?;
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(database) = database {
        config.database_path = database;
    }

    run_server(config).await
}
