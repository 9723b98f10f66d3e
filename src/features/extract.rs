use crate::error::ApiError;
use axum::extract::FromRequestParts;

// `Path` whose rejection is answered with the api's JSON error body
#[derive(FromRequestParts, Debug)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);
