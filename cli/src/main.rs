//! Folio CLI
//!
//! Command-line front end for the site's request forms.
//!
//! # Usage
//!
//! ```bash
//! folio contact --name "Ada" --email ada@example.com --message "Hello"
//! folio certificates list --format json
//! folio certificates request devops-ibm-2023 --name "Ada" --email ada@example.com
//! folio routes
//! folio config set relay.public_key <key>
//! ```

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod output;

#[derive(Parser)]
#[command(name = "folio")]
#[command(author = "Folio")]
#[command(version)]
#[command(about = "Folio Command Line Interface", long_about = None)]
struct Cli {
    /// Email relay public key
    #[arg(long, env = "FOLIO_RELAY_PUBLIC_KEY")]
    public_key: Option<String>,

    /// Site API endpoint URL
    #[arg(long, env = "FOLIO_API_URL")]
    api_url: Option<String>,

    /// API key for authentication
    #[arg(long, env = "FOLIO_API_KEY")]
    api_key: Option<String>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    format: output::OutputFormat,

    /// Profile name from config file
    #[arg(long, short)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a message through the contact form
    Contact {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        message: String,
    },
    /// Browse and request certificates
    Certificates {
        #[command(subcommand)]
        action: CertificateCommands,
    },
    /// Register an account with the site API
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "FOLIO_REGISTER_PASSWORD")]
        password: String,
    },
    /// Show which routes the current session can open
    Routes,
    /// Configure CLI
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum CertificateCommands {
    /// List all certificates
    List,
    /// Request a copy of a certificate
    Request {
        key: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Set configuration value
    Set { key: String, value: String },
    /// Get configuration value
    Get { key: String },
    /// List all configuration
    List,
    /// Initialize configuration
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let profile = cli.profile.as_deref();

    // Config commands run against a broken file too.
    let lenient = matches!(cli.command, Commands::Config { .. });
    let mut config = match config::or_defaults(config::load(profile), lenient) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    if let Some(key) = cli.public_key {
        config.relay.public_key = key;
    }
    config.api_url = cli.api_url.or(config.api_url);
    config.api_key = cli.api_key.or(config.api_key);

    let result = match cli.command {
        Commands::Contact { name, email, message } => {
            commands::contact::handle(&config, &name, &email, &message).await
        }
        Commands::Certificates { action } => commands::certificates::handle(action, &config, cli.format).await,
        Commands::Register { name, email, password } => {
            commands::register::handle(&config, name, email, password, cli.format).await
        }
        Commands::Routes => commands::routes::handle(&config, cli.format),
        Commands::Config { action } => commands::config::handle(action, profile),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
