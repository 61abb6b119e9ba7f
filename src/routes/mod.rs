use crate::state::AppState;
use axum::{routing::get, Router};

pub mod analytics;
pub mod property;
pub mod renovation;
pub mod sale;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .merge(property::router())
        .merge(sale::router())
        .merge(renovation::router())
        .merge(analytics::router())
}

async fn root() -> &'static str {
    "Portfolio backend is running"
}
