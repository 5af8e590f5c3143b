use axum::{extract::State, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::models::catalog::CarListing;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CarsResponse {
    pub cars: Vec<CarListing>,
}

/// GET /cars
pub async fn handle_list_cars(
    State(state): State<AppState>,
) -> Result<Json<CarsResponse>, AppError> {
    let cars = state.catalog.list_cars().await?;
    Ok(Json(CarsResponse { cars }))
}
