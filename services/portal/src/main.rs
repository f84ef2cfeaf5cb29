use anyhow::Result;
use auth::{ProfileUpdate, Registration};
use clap::{Parser, Subcommand};
use common::alerts::AlertKind;
use common::config::ClientConfig;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};

mod pages;
mod render;
mod state;

use crate::state::AppState;

#[derive(Parser)]
#[command(name = "ocula", about = "Eye-image analysis portal", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and remember the session
    Login {
        /// Account email address
        email: String,
        #[arg(long, env = "OCULA_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create a new account
    Register {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "OCULA_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },
    /// Forget the stored session
    Logout,
    /// Classify an eye image
    Analyze {
        file: PathBuf,
        /// Also store the image in your files
        #[arg(long)]
        save: bool,
    },
    /// List previous analyses
    History,
    /// Download a stored image
    Download {
        /// Server-side file path, as listed by `history`
        path: String,
    },
    /// Show or update your profile
    Profile {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        user_name: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let state = AppState::new(ClientConfig::from_env()?)?;
    debug!(
        auth = %state.config.auth_base_url,
        inference = %state.config.inference_base_url,
        session = %state.config.session_file.display(),
        "Loaded configuration"
    );
    info!("Starting on {}", state.navigator.current());

    match cli.command {
        Commands::Login { email, password } => {
            pages::login::login(&state, &email, &password).await?
        }
        Commands::Register {
            first_name,
            last_name,
            email,
            password,
            confirm_password,
        } => {
            let registration = Registration {
                first_name,
                last_name,
                user_name: email,
                password,
                confirm_password,
            };
            pages::register::register(&state, registration).await?
        }
        Commands::Logout => pages::login::logout(&state).await?,
        Commands::Analyze { file, save } => pages::dashboard::analyze(&state, &file, save).await?,
        Commands::History => pages::dashboard::history(&state).await?,
        Commands::Download { path } => pages::dashboard::download(&state, &path).await?,
        Commands::Profile {
            first_name,
            last_name,
            user_name,
        } => {
            let update = ProfileUpdate {
                first_name,
                last_name,
                user_name,
            };
            if update.is_empty() {
                pages::profile::show(&state).await?
            } else {
                pages::profile::update(&state, update).await?
            }
        }
    }

    let alerts = state.alerts.alerts().await;
    render::alerts(&alerts);
    info!("Finished on {}", state.navigator.current());

    let failed = alerts.iter().any(|alert| {
        matches!(
            alert.kind,
            AlertKind::Error | AlertKind::Warning | AlertKind::Validation
        )
    });
    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
