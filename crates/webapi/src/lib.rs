pub mod backend;
pub mod error;
pub mod routes;
pub mod state;

pub use backend::Backend;
pub use error::ApiError;
pub use state::AppState;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Assembles the full HTTP surface: auth, users, courses, lessons,
/// enrolments, homework, plus a health check. Mirrors the teacher's
/// `build_router` shape but with a single flat route set — this crate
/// has no protected/public split, since each handler pulls its own
/// `AuthContext` where it needs one.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .merge(routes::health::router())
        .merge(routes::auth::router())
        .merge(routes::users::router())
        .merge(routes::courses::router())
        .merge(routes::lessons::router())
        .merge(routes::enrolments::router())
        .merge(routes::homework::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub async fn serve_with_shutdown(
    state: AppState,
    addr: &str,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "webapi listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
}
