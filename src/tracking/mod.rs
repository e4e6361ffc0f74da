use axum::{
    routing::{get, post, put},
    Router,
};

use crate::state::AppState;

mod dto;
pub mod handlers;
pub mod repo;
pub mod service;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/food-tracking/entries", post(handlers::create_entry))
        .route(
            "/food-tracking/entries/daily",
            get(handlers::list_daily_entries),
        )
        .route(
            "/food-tracking/entries/:id",
            put(handlers::update_entry).delete(handlers::delete_entry),
        )
        .route(
            "/food-tracking/nutrients/daily",
            get(handlers::get_daily_nutrients),
        )
}
