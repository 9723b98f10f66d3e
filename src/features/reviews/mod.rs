use crate::AppState;
use crate::domain::{NewReview, Review};
use crate::error::ApiError;
use crate::features::extract::ApiPath;
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    routing::{get, post},
};
use tracing::info;

pub fn reviews_router() -> Router<AppState> {
    Router::new()
        .route("/fetchReviews", get(list_reviews_handler))
        .route("/fetchReviews/dealer/{id}", get(reviews_by_dealer_handler))
        .route("/insert_review", post(insert_review_handler))
}

async fn list_reviews_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Review>>, ApiError> {
    let reviews = state
        .repos
        .reviews
        .get_all()
        .await
        .map_err(ApiError::Fetch)?;

    Ok(Json(reviews))
}

async fn reviews_by_dealer_handler(
    State(state): State<AppState>,
    ApiPath(dealer_id): ApiPath<i64>,
) -> Result<Json<Vec<Review>>, ApiError> {
    let reviews = state
        .repos
        .reviews
        .get_by_dealership(dealer_id)
        .await
        .map_err(ApiError::Fetch)?;

    Ok(Json(reviews))
}

// takes the raw body instead of Json<_> so clients that don't send
// `Content-Type: application/json` are still accepted
async fn insert_review_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Review>, ApiError> {
    let new_review: NewReview = serde_json::from_slice(&body)
        .map_err(|e| ApiError::MalformedPayload(e.to_string()))?;

    let review = state
        .repos
        .reviews
        .insert(new_review)
        .await
        .map_err(ApiError::Insert)?;

    info!("Saved review {} for dealership {}", review.id, review.dealership);

    Ok(Json(review))
}
