use crate::AppState;
use axum::{Router, routing::get};

pub mod cars;
pub mod dealers;
pub mod extract;
pub mod frontend;
pub mod reviews;

pub const WELCOME_MESSAGE: &str = "Welcome to the dealership reviews API";

// the api lives at the root, paths are the ones existing clients already call
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/", get(home_handler))
        .merge(reviews::reviews_router())
        .merge(dealers::dealers_router())
        .merge(cars::cars_router())
}

async fn home_handler() -> &'static str {
    WELCOME_MESSAGE
}
