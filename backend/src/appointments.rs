use axum::{extract::State, http::StatusCode, Json};
use uuid::Uuid;
use validator::Validate;

use common::{AppointmentDto, NewAppointment, Role};

use crate::error::AppError;
use crate::extractors::CurrentUser;
use crate::web_server::AppState;

/// ## Book an appointment
/// Customers book a service at a store; the server assigns the booking
/// reference.
#[utoipa::path(
    post,
    path = "/api/appointments",
    request_body = NewAppointment,
    responses(
        (status = 201, description = "Appointment booked", body = AppointmentDto),
        (status = 400, description = "Invalid data provided"),
        (status = 401, description = "No active session"),
        (status = 403, description = "Only customers can book"),
        (status = 404, description = "No such store"),
    )
)]
pub async fn create_appointment(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<NewAppointment>,
) -> Result<(StatusCode, Json<AppointmentDto>), AppError> {
    user.require_role(Role::Customer)?;
    payload.validate()?;

    let store_exists = sqlx::query_scalar::<_, i64>("SELECT id FROM stores WHERE id = ?")
        .bind(payload.store_id)
        .fetch_optional(&state.db_pool)
        .await?;
    if store_exists.is_none() {
        return Err(AppError::NotFound);
    }

    let reference = Uuid::new_v4().to_string();
    tracing::info!(
        store_id = payload.store_id,
        customer_id = user.id,
        "booking appointment {}",
        reference
    );

    let appointment = sqlx::query_as::<_, AppointmentDto>(
        "INSERT INTO appointments (reference, store_id, customer_id, service, starts_at) \
         VALUES (?, ?, ?, ?, ?) \
         RETURNING id, reference, store_id, customer_id, service, starts_at",
    )
    .bind(&reference)
    .bind(payload.store_id)
    .bind(user.id)
    .bind(&payload.service)
    .bind(payload.starts_at)
    .fetch_one(&state.db_pool)
    .await?;

    Ok((StatusCode::CREATED, Json(appointment)))
}

/// ## The signed-in customer's appointments
#[utoipa::path(
    get,
    path = "/api/appointments",
    responses(
        (status = 200, description = "Appointments, newest first", body = [AppointmentDto]),
        (status = 401, description = "No active session"),
    )
)]
pub async fn list_my_appointments(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<AppointmentDto>>, AppError> {
    let appointments = sqlx::query_as::<_, AppointmentDto>(
        "SELECT id, reference, store_id, customer_id, service, starts_at \
         FROM appointments WHERE customer_id = ? ORDER BY starts_at DESC",
    )
    .bind(user.id)
    .fetch_all(&state.db_pool)
    .await?;

    Ok(Json(appointments))
}

/// ## Appointments at the manager's store
#[utoipa::path(
    get,
    path = "/api/manage/appointments",
    responses(
        (status = 200, description = "Appointments at the manager's store", body = [AppointmentDto]),
        (status = 401, description = "No active session"),
        (status = 403, description = "Customer accounts cannot access the dashboard"),
    )
)]
pub async fn list_store_appointments(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<AppointmentDto>>, AppError> {
    user.require_role(Role::Manager)?;

    // A manager without an assigned store is a provisioning mistake.
    let store_id = user
        .store_id
        .ok_or_else(|| AppError::Internal("manager account has no store assigned".into()))?;

    let appointments = sqlx::query_as::<_, AppointmentDto>(
        "SELECT id, reference, store_id, customer_id, service, starts_at \
         FROM appointments WHERE store_id = ? ORDER BY starts_at DESC",
    )
    .bind(store_id)
    .fetch_all(&state.db_pool)
    .await?;

    Ok(Json(appointments))
}
