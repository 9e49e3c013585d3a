//! OrganLink: organ donor/recipient matching service.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use organlink_lib::config::{self, ServerConfig};
use organlink_lib::models::enums::AdminRole;
use organlink_lib::{admin, db};

#[derive(Parser, Debug)]
#[command(name = "organlink", version)]
#[command(about = "Matches confirmed organ donor requests with compatible recipients")]
struct Args {
    /// SQLite database path (overrides ORGANLINK_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API and the match scheduler (default)
    Serve,
    /// Manage admin accounts
    #[command(subcommand)]
    Admin(AdminCommand),
}

#[derive(Subcommand, Debug)]
enum AdminCommand {
    /// Create an admin and print its bearer token
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// admin, hospital or medical
        #[arg(long, default_value = "admin")]
        role: AdminRole,
    },
    /// Issue a new bearer token for an existing admin
    Token {
        #[arg(long)]
        email: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    organlink_lib::init_tracing();

    let args = Args::parse();
    let mut server_config = ServerConfig::from_env();
    if let Some(db) = args.db {
        server_config.db_path = db;
    }

    let result = match args.command.unwrap_or(Command::Serve) {
        Command::Serve => organlink_lib::run(server_config)
            .await
            .map_err(|e| e.to_string()),
        Command::Admin(cmd) => run_admin(&server_config, cmd).map_err(|e| e.to_string()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "{} failed", config::APP_NAME);
            ExitCode::FAILURE
        }
    }
}

fn run_admin(server_config: &ServerConfig, cmd: AdminCommand) -> Result<(), admin::AdminError> {
    if let Some(dir) = server_config.db_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if let Err(e) = std::fs::create_dir_all(dir) {
            tracing::warn!(dir = %dir.display(), error = %e, "Could not create data directory");
        }
    }
    let conn = db::open_database(&server_config.db_path)?;

    let (admin, token) = match cmd {
        AdminCommand::Create { name, email, role } => admin::create_admin(&conn, &name, &email, role)?,
        AdminCommand::Token { email } => admin::rotate_admin_token(&conn, &email)?,
    };

    println!("admin:  {} <{}> ({})", admin.name, admin.email, admin.role);
    println!("id:     {}", admin.id);
    println!("token:  {token}");
    Ok(())
}
