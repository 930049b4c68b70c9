//! docuvault CLI - run the member records and document vault service.
//!
//! `serve` initializes the data directory (database schema, upload vault,
//! default admin account) and then binds the HTTP listener; `init` runs
//! the same initialization and exits, for deployments that want first-run
//! setup separated from serving.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use docuvault_server::{AppState, DocuvaultServer, ServerConfig};

#[derive(Parser)]
#[command(name = "docuvault")]
#[command(about = "docuvault - member records and document vault")]
#[command(version)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory and exit.
    Init {
        #[command(flatten)]
        opts: ServiceOpts,
    },

    /// Run the HTTP service.
    Serve {
        #[command(flatten)]
        opts: ServiceOpts,
    },
}

#[derive(Args)]
struct ServiceOpts {
    /// Data directory holding the record database and the upload vault.
    #[arg(short, long, default_value = "./data")]
    data_dir: PathBuf,

    /// Address to bind the HTTP listener to.
    #[arg(short, long, default_value = "127.0.0.1:5001")]
    bind: SocketAddr,

    /// Bearer token required on API routes; the guard is disabled when
    /// omitted.
    #[arg(long)]
    api_token: Option<String>,

    /// Username for the seeded default admin account.
    #[arg(long, default_value = "admin")]
    admin_username: String,

    /// Password for the seeded default admin account.
    #[arg(long, default_value = "admin123")]
    admin_password: String,
}

impl ServiceOpts {
    fn into_config(self) -> ServerConfig {
        ServerConfig {
            bind_addr: self.bind,
            data_dir: self.data_dir,
            api_token: self.api_token,
            admin_username: self.admin_username,
            admin_password: self.admin_password,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Init { opts } => {
            let config = opts.into_config();
            AppState::initialize(&config)?;
            info!(data_dir = %config.data_dir.display(), "Initialization complete");
        }
        Commands::Serve { opts } => {
            DocuvaultServer::new(opts.into_config()).serve().await?;
        }
    }

    Ok(())
}
