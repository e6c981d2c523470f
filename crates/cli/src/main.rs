//! Lotkeeper CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! lk-cli migrate
//!
//! # Seed the database with demo data
//! lk-cli seed
//!
//! # Create an admin user
//! lk-cli admin create -e admin@example.com -n "Admin Name" -p <password>
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "lk-cli")]
#[command(author, version, about = "Lotkeeper CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database with demo data (lots, drivers, sessions, tickets)
    Seed {
        /// Number of driver accounts to create
        #[arg(long, default_value_t = 60)]
        drivers: usize,

        /// Number of parking sessions to create
        #[arg(long, default_value_t = 200)]
        sessions: usize,

        /// Number of support tickets to create
        #[arg(long, default_value_t = 40)]
        tickets: usize,
    },
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin user
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin display name
        #[arg(short, long)]
        name: String,

        /// Admin password (min 8 characters)
        #[arg(short, long)]
        password: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed {
            drivers,
            sessions,
            tickets,
        } => commands::seed::run(drivers, sessions, tickets).await?,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                name,
                password,
            } => commands::admin::create_user(&email, &name, &password).await?,
        },
    }
    Ok(())
}
