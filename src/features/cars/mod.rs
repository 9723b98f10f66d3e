use crate::AppState;
use crate::domain::CarCatalog;
use crate::error::ApiError;
use axum::{Json, Router, extract::State, routing::get};

pub fn cars_router() -> Router<AppState> {
    Router::new().route("/fetchCars", get(list_cars_handler))
}

// `{"CarModels": [{"CarModel": .., "CarMake": ..}]}`, the shape the review form reads
async fn list_cars_handler(State(state): State<AppState>) -> Result<Json<CarCatalog>, ApiError> {
    let car_models = state
        .repos
        .cars
        .get_catalog()
        .await
        .map_err(ApiError::Fetch)?;

    Ok(Json(CarCatalog { car_models }))
}
