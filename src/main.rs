use std::sync::Arc;
use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bulletin::{
    api,
    auth::AuthService,
    config::Settings,
    repository,
    service::{Mailer, ServiceContext},
    storage,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bulletin=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let settings = Settings::new().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {}. Using defaults.", e);
        Settings::default()
    });

    tracing::info!("Starting Bulletin server on {}:{}", settings.server.host, settings.server.port);

    // Initialize database
    let db_pool = SqlitePoolOptions::new()
        .max_connections(settings.database.max_connections)
        .connect(&settings.database.url)
        .await?;

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await?;

    // Initialize auth service
    let auth_service = Arc::new(AuthService::new(
        &settings.auth.token_secret,
        settings.auth.token_duration_minutes,
    ));

    // Initialize repositories
    let user_repo = Arc::new(repository::SqliteUserRepository::new(db_pool.clone()));
    let announcement_repo = Arc::new(repository::SqliteAnnouncementRepository::new(db_pool.clone()));
    let response_repo = Arc::new(repository::SqliteResponseRepository::new(db_pool.clone()));
    let notification_repo = Arc::new(repository::SqliteNotificationRepository::new(db_pool.clone()));
    let search_repo = Arc::new(repository::SqliteSearchRepository::new(db_pool.clone()));

    // File storage backend is fixed for the lifetime of the process
    let file_storage = storage::from_settings(&settings.storage)
        .map_err(|e| anyhow::anyhow!("Failed to initialize storage backend: {}", e))?;
    tracing::info!("File storage backend: {:?}", settings.storage.backend);

    let mailer = Arc::new(Mailer::new(settings.smtp.clone()));

    // Create service context
    let service_context = Arc::new(ServiceContext::new(
        user_repo,
        announcement_repo,
        response_repo,
        notification_repo,
        search_repo,
        auth_service,
        mailer,
        file_storage,
        db_pool.clone(),
    ));

    // Create API app
    let app = api::create_app(service_context, Arc::new(settings.clone()));

    let listener = tokio::net::TcpListener::bind(
        format!("{}:{}", settings.server.host, settings.server.port)
    ).await?;

    tracing::info!("Server listening on http://{}:{}", settings.server.host, settings.server.port);

    axum::serve(listener, app).await?;

    Ok(())
}
