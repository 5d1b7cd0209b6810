pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    Router,
    routing::{get, post, patch, delete},
};
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::TraceLayer,
};
use std::sync::Arc;

use crate::{
    config::Settings,
    service::ServiceContext,
};
use state::AppState;

pub fn create_app(service_context: Arc<ServiceContext>, settings: Arc<Settings>) -> Router {
    let app_state = AppState::new(service_context, settings);

    Router::new()
        // Root and health endpoints
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::root::health_check))

        // API routes
        .nest("/api/auth", auth_routes(app_state.clone()))
        .nest("/api/announcements", announcement_routes(app_state.clone()))
        .nest("/api/responses", response_routes(app_state.clone()))
        .nest("/api/notifications", notification_routes(app_state.clone()))
        .nest("/api/search", search_routes(app_state.clone()))
        .nest("/api/file", file_routes())

        // Add state to the router
        .with_state(app_state)

        // Middleware
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive()) // Configure properly for production
        .layer(TraceLayer::new_for_http())
}

fn auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/register", post(handlers::auth::register))
        .merge(
            Router::new()
                .route("/me", get(handlers::auth::me))
                .route("/send-email", post(handlers::auth::send_email))
                .route_layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    middleware::auth::require_auth,
                )),
        )
        .merge(
            Router::new()
                .route("/users", get(handlers::users::list))
                .route("/users/:id", patch(handlers::users::update))
                .route("/users/:id", delete(handlers::users::delete))
                .route("/users/:id/role", patch(handlers::users::update_role))
                .route("/users/:id/status", patch(handlers::users::update_status))
                .route_layer(axum::middleware::from_fn_with_state(
                    state,
                    middleware::auth::require_admin,
                )),
        )
}

fn announcement_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Public routes (no auth required for viewing)
        .route("/", get(handlers::announcements::list))
        .route("/:id", get(handlers::announcements::get))
        // Creating requires auth, deleting requires admin
        .merge(
            Router::new()
                .route("/", post(handlers::announcements::create))
                .route_layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    middleware::auth::require_auth,
                )),
        )
        .merge(
            Router::new()
                .route("/:id", delete(handlers::announcements::delete))
                .route_layer(axum::middleware::from_fn_with_state(
                    state,
                    middleware::auth::require_admin,
                )),
        )
}

fn response_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Response submission is open; see handlers::responses::create
        .route("/", post(handlers::responses::create))
        .route("/announcement/:id", get(handlers::responses::list_by_announcement))
        .route("/colleague/:name", get(handlers::responses::list_by_colleague))
        .merge(
            Router::new()
                .route("/", get(handlers::responses::list))
                .route_layer(axum::middleware::from_fn_with_state(
                    state,
                    middleware::auth::require_admin,
                )),
        )
}

fn notification_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::notifications::list))
        .route("/unread-count", get(handlers::notifications::unread_count))
        .route("/:id/read", post(handlers::notifications::mark_read))
        .route("/read-all", post(handlers::notifications::read_all))
        .route("/:id", delete(handlers::notifications::delete))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_auth,
        ))
}

fn search_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/announcements", get(handlers::search::announcements))
        .route("/responses", get(handlers::search::responses))
        .route("/all", get(handlers::search::all))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_auth,
        ))
}

fn file_routes() -> Router<AppState> {
    Router::new()
        .route("/download", get(handlers::files::download))
        .route("/preview", get(handlers::files::preview))
        .route("/local/*path", get(handlers::files::download_local))
}
