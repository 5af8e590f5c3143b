pub mod health;

use axum::{
    routing::{get, post},
    Router,
};
use tower::{Layer, ServiceBuilder};
use tower_http::{
    cors::CorsLayer,
    normalize_path::{NormalizePath, NormalizePathLayer},
    trace::TraceLayer,
};

use crate::auth::handlers as auth;
use crate::catalog::handlers as catalog;
use crate::dealers;
use crate::reviews::handlers as reviews;
use crate::state::AppState;

/// Routes the frontend calls, mounted both at the root and under `/djangoapp`.
fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication
        .route("/login", post(auth::handle_login))
        .route("/logout", get(auth::handle_logout).post(auth::handle_logout))
        .route("/register", post(auth::handle_register))
        // Dealers and reviews
        .route("/dealerships", get(dealers::handle_list_dealers))
        .route(
            "/dealerships/:state",
            get(dealers::handle_list_dealers_in_state),
        )
        .route("/dealer/:id", get(dealers::handle_dealer_details))
        .route("/dealer/:id/reviews", get(reviews::handle_dealer_reviews))
        .route("/add_review", post(reviews::handle_add_review))
        // Catalog
        .route("/cars", get(catalog::handle_list_cars))
        .route("/get_cars", get(catalog::handle_list_cars))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .merge(api_routes())
        .nest("/djangoapp", api_routes())
        .with_state(state)
}

/// The served application. Trailing slashes are trimmed before routing, so
/// `/djangoapp/add_review/` reaches the same handler as `/djangoapp/add_review`.
pub fn build_app(state: AppState) -> NormalizePath<Router> {
    let router = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );
    NormalizePathLayer::trim_trailing_slash().layer(router)
}
