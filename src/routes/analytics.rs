use crate::commands;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/analytics/properties",
            get(commands::analytics::get_property_analytics),
        )
        .route(
            "/api/analytics/sales",
            get(commands::analytics::get_sale_analytics),
        )
        .route(
            "/api/analytics/renovations",
            get(commands::analytics::get_renovation_analytics),
        )
}
