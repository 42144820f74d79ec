use axum::{http::Method, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod airports;
pub mod crew;
pub mod error;
pub mod fleet;
pub mod flights;
pub mod media;
pub mod middleware;
pub mod orders;
pub mod routes;
pub mod state;
pub mod tickets;
pub mod users;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    // Every collection under /api/airport requires authentication; the
    // staff checks live in the write handlers.
    let airport_api = Router::new()
        .merge(airports::routes())
        .merge(fleet::routes())
        .merge(crew::routes())
        .merge(routes::routes())
        .merge(flights::routes())
        .merge(tickets::routes())
        .merge(orders::routes())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .nest("/api/airport", airport_api)
        .nest("/api/user", users::routes(state.clone()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
