use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use rentcar_db::{Database, DatabaseConfig};
use rentcar_server::admin::{NewAdmin, create_admin};
use rentcar_server::config::ServerConfig;
use rentcar_server::routes;
use rentcar_server::state::AppState;

/// Largest accepted request body.
const BODY_LIMIT_BYTES: usize = 1024 * 1024;

#[derive(Parser)]
#[command(name = "rentcar", version, about = "Car rental REST backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run migrations and serve the HTTP API (default)
    Serve,

    /// Apply pending database migrations and exit
    Migrate,

    /// Create an account with the admin role
    CreateAdmin {
        #[arg(long)]
        email: String,

        /// Reads from RENTCAR_ADMIN_PASSWORD if not provided
        #[arg(long, env = "RENTCAR_ADMIN_PASSWORD")]
        password: String,

        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        phone_number: String,

        #[arg(long, default_value = "")]
        address: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("rentcar=info".parse()?))
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve().await,
        Commands::Migrate => {
            let db = connect_db().await?;
            db.migrate().await?;
            tracing::info!("Migrations applied");
            Ok(())
        }
        Commands::CreateAdmin {
            email,
            password,
            name,
            phone_number,
            address,
        } => {
            let db = connect_db().await?;
            let admin = NewAdmin {
                email,
                password,
                name,
                phone_number,
                address,
            };
            let user = create_admin(&db.user_repo(), &db.role_repo(), admin)
                .await
                .context("Failed to create admin")?;
            println!("Created admin {} (id {})", user.email, user.id);
            Ok(())
        }
    }
}

async fn connect_db() -> anyhow::Result<Database> {
    let config = DatabaseConfig::from_env()?;
    Database::connect(&config)
        .await
        .context("Failed to connect to database")
}

async fn serve() -> anyhow::Result<()> {
    let config = ServerConfig::from_env()?;
    let db = connect_db().await?;
    db.migrate().await?;

    tracing::info!(denylist = %config.denylist, ttl_secs = config.jwt_ttl.as_secs(), "Token service configured");
    let state = Arc::new(AppState::from_database(&db, &config));

    let app = routes::router(state)
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.bind_addr();
    tracing::info!("Starting server on {addr}");
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install CTRL+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
