use crate::commands;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/renovations",
            get(commands::renovation::list_renovations).post(commands::renovation::create_renovation),
        )
        .route(
            "/api/renovations/:id",
            get(commands::renovation::get_renovation)
                .put(commands::renovation::update_renovation)
                .delete(commands::renovation::delete_renovation),
        )
}
