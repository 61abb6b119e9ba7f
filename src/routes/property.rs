use crate::commands;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/properties",
            get(commands::property::list_properties).post(commands::property::create_property),
        )
        .route(
            "/api/properties/types",
            get(commands::property::list_property_types),
        )
        .route(
            "/api/properties/cities",
            get(commands::property::list_cities),
        )
        .route(
            "/api/properties/:id",
            get(commands::property::get_property)
                .put(commands::property::update_property)
                .delete(commands::property::delete_property),
        )
}
