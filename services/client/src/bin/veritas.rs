//! services/client/src/bin/veritas.rs
//!
//! Command-line front end for the Veritas library.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use client_lib::{
    app::{commands, AppState},
    config::Config,
    error::ClientError,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use veritas_core::{confirm_password, ContentPatch, ContentType, SearchFilter};

#[derive(Parser, Debug)]
#[command(name = "veritas", about = "Browse and administer the Veritas content library")]
struct Cli {
    #[arg(long, env = "VERITAS_EMAIL", global = true)]
    email: Option<String>,

    #[arg(long, env = "VERITAS_PASSWORD", global = true, hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in with email and password.
    Login,
    /// Create a new account.
    Register {
        #[arg(long)]
        confirm: Option<String>,
        #[arg(long)]
        admin_code: Option<String>,
    },
    /// Exchange an identity token from an external sign-in flow.
    Federated { id_token: String },
    /// List one category: document, audio or image.
    Browse {
        category: String,
        content_type: ContentType,
    },
    /// Search the whole library.
    Search {
        #[arg(long)]
        query: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
    /// Upload a file (administrators only).
    Upload {
        #[arg(long)]
        title: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        mime: Option<String>,
        file: PathBuf,
    },
    /// Change the title or category of an item (administrators only).
    Edit {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
    /// Remove an item (administrators only).
    Delete { id: i64 },
}

impl Cli {
    fn credentials(&self) -> Result<(&str, &str), ClientError> {
        match (self.email.as_deref(), self.password.as_deref()) {
            (Some(email), Some(password)) => Ok((email, password)),
            _ => Err(ClientError::Internal(
                "--email and --password (or VERITAS_EMAIL / VERITAS_PASSWORD) are required".to_string(),
            )),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let cli = Cli::parse();
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    info!("Configuration loaded.");

    // --- 2. Build the Shared AppState ---
    let state = AppState::from_config(config)?;

    // --- 3. Run the Command ---
    let output = run(&state, &cli).await?;
    println!("{output}");
    Ok(())
}

async fn run(state: &AppState, cli: &Cli) -> Result<String, ClientError> {
    match &cli.command {
        Command::Login => {
            let (email, password) = cli.credentials()?;
            let session = state.auth.login(email, password).await?;
            Ok(commands::render_session(&session))
        }
        Command::Register {
            confirm,
            admin_code,
        } => {
            let (email, password) = cli.credentials()?;
            if let Some(confirmation) = confirm {
                confirm_password(password, confirmation)?;
            }
            let session = state
                .auth
                .register(email, password, admin_code.as_deref())
                .await?;
            Ok(commands::render_session(&session))
        }
        Command::Federated { id_token } => {
            if let Some(client_id) = &state.config.federated_client_id {
                info!(client_id = %client_id, "Exchanging federated identity token");
            }
            let session = state.auth.sign_in_with_federated_token(id_token).await?;
            Ok(commands::render_session(&session))
        }
        Command::Browse {
            category,
            content_type,
        } => commands::browse(state, category, *content_type).await,
        Command::Search { query, category } => {
            commands::search(
                state,
                SearchFilter {
                    query: query.clone(),
                    category: category.clone(),
                },
            )
            .await
        }
        Command::Upload {
            title,
            category,
            mime,
            file,
        } => {
            let (email, password) = cli.credentials()?;
            let session = commands::admin_session(state, email, password).await?;
            let result = commands::upload(
                state,
                &session,
                title.clone(),
                category.clone(),
                file,
                mime.clone(),
            )
            .await;
            state.auth.sign_out().await;
            result
        }
        Command::Edit {
            id,
            title,
            category,
        } => {
            let (email, password) = cli.credentials()?;
            let session = commands::admin_session(state, email, password).await?;
            let patch = ContentPatch {
                title: title.clone(),
                category: category.clone(),
            };
            let result = commands::edit(state, &session, *id, patch).await;
            state.auth.sign_out().await;
            result
        }
        Command::Delete { id } => {
            let (email, password) = cli.credentials()?;
            let session = commands::admin_session(state, email, password).await?;
            let result = commands::delete(state, &session, *id).await;
            state.auth.sign_out().await;
            result
        }
    }
}
