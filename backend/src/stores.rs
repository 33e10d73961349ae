use axum::{
    extract::{Path, State},
    Json,
};
use common::StoreDto;

use crate::error::AppError;
use crate::web_server::AppState;

/// ## List salon locations
#[utoipa::path(
    get,
    path = "/api/stores",
    responses(
        (status = 200, description = "All salon locations", body = [StoreDto]),
    )
)]
pub async fn list_stores(State(state): State<AppState>) -> Result<Json<Vec<StoreDto>>, AppError> {
    let stores = sqlx::query_as::<_, StoreDto>(
        "SELECT id, name, address, phone FROM stores ORDER BY name",
    )
    .fetch_all(&state.db_pool)
    .await?;

    Ok(Json(stores))
}

/// ## Fetch a single salon location
#[utoipa::path(
    get,
    path = "/api/stores/{id}",
    params(("id" = i64, Path, description = "Store id")),
    responses(
        (status = 200, description = "The salon location", body = StoreDto),
        (status = 404, description = "No such store"),
    )
)]
pub async fn get_store(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<StoreDto>, AppError> {
    let store =
        sqlx::query_as::<_, StoreDto>("SELECT id, name, address, phone FROM stores WHERE id = ?")
            .bind(id)
            .fetch_optional(&state.db_pool)
            .await?
            .ok_or(AppError::NotFound)?;

    Ok(Json(store))
}
