//! campus-messages server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use campus_api::{AppState, app};
use campus_common::Config;
use campus_core::{MessagingService, NoticeService, NotifierService, StoredNotifier, UserService};
use campus_db::repositories::{
    MessageRepository, NoticeRepository, OfferingRepository, UserRepository,
};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "campus=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting campus-messages server...");

    let config = Config::load().context("failed to load configuration")?;

    let db = Arc::new(
        campus_db::init(&config)
            .await
            .context("failed to connect to database")?,
    );
    info!("Connected to database");

    info!("Running database migrations...");
    campus_db::migrate(&db)
        .await
        .context("failed to run migrations")?;
    info!("Migrations completed");

    // Repositories
    let user_repo = UserRepository::new(Arc::clone(&db));
    let offering_repo = OfferingRepository::new(Arc::clone(&db));
    let message_repo = MessageRepository::new(Arc::clone(&db));
    let notice_repo = NoticeRepository::new(Arc::clone(&db));

    // Services
    let notifier: Option<NotifierService> = if config.messaging.notifications {
        Some(Arc::new(StoredNotifier::new(notice_repo.clone())))
    } else {
        info!("Message notifications disabled");
        None
    };

    let state = AppState {
        user_service: UserService::new(user_repo),
        messaging_service: MessagingService::new(
            message_repo,
            offering_repo,
            notifier,
            &config.messaging,
        ),
        notice_service: NoticeService::new(notice_repo, config.messaging.inbox_limit),
    };
    info!(fan_out = ?config.messaging.fan_out, "Messaging service ready");

    let app = app(state);

    let ip: std::net::IpAddr = config
        .server
        .host
        .parse()
        .with_context(|| format!("invalid server host: {}", config.server.host))?;
    let addr = SocketAddr::from((ip, config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
