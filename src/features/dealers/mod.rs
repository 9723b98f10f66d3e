use crate::AppState;
use crate::domain::Dealership;
use crate::error::ApiError;
use crate::features::extract::ApiPath;
use axum::{
    Json, Router,
    extract::State,
    routing::get,
};

pub fn dealers_router() -> Router<AppState> {
    Router::new()
        .route("/fetchDealers", get(list_dealers_handler))
        .route("/fetchDealers/{state}", get(dealers_by_state_handler))
        .route("/fetchDealer/{id}", get(dealer_by_id_handler))
}

async fn list_dealers_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Dealership>>, ApiError> {
    let dealers = state
        .repos
        .dealerships
        .get_all()
        .await
        .map_err(ApiError::Fetch)?;

    Ok(Json(dealers))
}

async fn dealers_by_state_handler(
    State(state): State<AppState>,
    ApiPath(us_state): ApiPath<String>,
) -> Result<Json<Vec<Dealership>>, ApiError> {
    let dealers = state
        .repos
        .dealerships
        .get_by_state(&us_state)
        .await
        .map_err(ApiError::Fetch)?;

    Ok(Json(dealers))
}

// answers with an array (empty or a single dealer) so callers written against
// the list-shaped response keep working
async fn dealer_by_id_handler(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Vec<Dealership>>, ApiError> {
    let dealer = state
        .repos
        .dealerships
        .get_by_id(id)
        .await
        .map_err(ApiError::Fetch)?;

    Ok(Json(dealer.into_iter().collect()))
}
