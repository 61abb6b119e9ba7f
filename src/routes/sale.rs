use crate::commands;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/sales",
            get(commands::sale::list_sales).post(commands::sale::create_sale),
        )
        .route(
            "/api/sales/:id",
            get(commands::sale::get_sale)
                .put(commands::sale::update_sale)
                .delete(commands::sale::delete_sale),
        )
}
