use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use rentcar_core::models::Car;
use rentcar_core::validation::{FieldErrors, Presence, Rules, integer_param, uuid_param};

use crate::dto::{CarRequest, JsonInput, parse_object};
use crate::envelope::Envelope;
use crate::error::{ApiError, INTERNAL_ERROR};
use crate::state::AppState;

const INVALID_ID: &str = "Invalid ID format";
const NO_DATA: &str = "No data provided to update";
const NO_SUCH_CAR: &str = "There is no car with this ID";
const DATA_NOT_FOUND: &str = "Data not found";
const CREATE_FAILED: &str = "Failed to add new car";
const UPDATE_FAILED: &str = "Failed to update car";
const DELETE_FAILED: &str = "Failed to delete car";
const INVALID_CATEGORY: &str = "Invalid category ID";
const INVALID_STATUS: &str = "Invalid status ID";

/// Mark `type_id` / `status_id` invalid when they reference no lookup row.
async fn check_references(
    state: &AppState,
    rules: &mut Rules<'_>,
    form: &CarRequest,
    failure: &str,
) -> Result<(), ApiError> {
    if let Some(type_id) = form.type_id {
        let exists = state
            .timed(state.catalog.car_type_exists(type_id))
            .await
            .map_err(|e| ApiError::internal(failure, e))?;
        if !exists {
            rules.invalid("type_id");
        }
    }
    if let Some(status_id) = form.status_id {
        let exists = state
            .timed(state.catalog.car_status_exists(status_id))
            .await
            .map_err(|e| ApiError::internal(failure, e))?;
        if !exists {
            rules.invalid("status_id");
        }
    }
    Ok(())
}

fn unknown_reference(message: &str) -> ApiError {
    ApiError::invalid(message, FieldErrors::single("id", "The selected id is invalid."))
}

#[utoipa::path(
    get,
    path = "/api/car/all",
    responses(
        (status = 200, description = "Every car", body = crate::envelope::EnvelopeDoc),
        (status = 204, description = "No cars"),
        (status = 401, description = "Unauthorized", body = crate::envelope::EnvelopeDoc),
    ),
    security(("bearer" = [])),
    tag = "car"
)]
pub async fn list(State(state): State<Arc<AppState>>) -> Result<Envelope<Vec<Car>>, ApiError> {
    let cars = state
        .timed(state.cars.list())
        .await
        .map_err(|e| ApiError::internal(INTERNAL_ERROR, e))?;

    if cars.is_empty() {
        return Ok(Envelope::new(StatusCode::NO_CONTENT, "No Content", None));
    }
    Ok(Envelope::ok("Success", cars))
}

#[utoipa::path(
    get,
    path = "/api/car/{id}",
    params(("id" = String, Path, description = "Car UUID")),
    responses(
        (status = 200, description = "The car", body = crate::envelope::EnvelopeDoc),
        (status = 404, description = "Not found", body = crate::envelope::EnvelopeDoc),
        (status = 401, description = "Unauthorized", body = crate::envelope::EnvelopeDoc),
    ),
    security(("bearer" = [])),
    tag = "car"
)]
pub async fn show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Envelope<Car>, ApiError> {
    let Ok(id) = uuid_param("id", &id) else {
        return Err(ApiError::not_found(DATA_NOT_FOUND));
    };

    state
        .timed(state.cars.find(id))
        .await
        .map_err(|e| ApiError::internal(INTERNAL_ERROR, e))?
        .map(|car| Envelope::ok("Success", car))
        .ok_or_else(|| ApiError::not_found(DATA_NOT_FOUND))
}

#[utoipa::path(
    get,
    path = "/api/car/category/{id}",
    params(("id" = i32, Path, description = "Car type id")),
    responses(
        (status = 200, description = "Cars of this type, or null data when none", body = crate::envelope::EnvelopeDoc),
        (status = 400, description = "Unknown or malformed category", body = crate::envelope::EnvelopeDoc),
        (status = 401, description = "Unauthorized", body = crate::envelope::EnvelopeDoc),
    ),
    security(("bearer" = [])),
    tag = "car"
)]
pub async fn by_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Envelope<Vec<Car>>, ApiError> {
    let type_id = integer_param("id", &id).map_err(|e| ApiError::invalid(INVALID_CATEGORY, e))?;

    let exists = state
        .timed(state.catalog.car_type_exists(type_id))
        .await
        .map_err(|e| ApiError::internal(INTERNAL_ERROR, e))?;
    if !exists {
        return Err(unknown_reference(INVALID_CATEGORY));
    }

    let cars = state
        .timed(state.cars.list_by_type(type_id))
        .await
        .map_err(|e| ApiError::internal(INTERNAL_ERROR, e))?;
    Ok(Envelope::list_or_null(
        "Success",
        "There is no car in this category",
        cars,
    ))
}

#[utoipa::path(
    get,
    path = "/api/car/status/{id}",
    params(("id" = i32, Path, description = "Car status id")),
    responses(
        (status = 200, description = "Cars with this status, or null data when none", body = crate::envelope::EnvelopeDoc),
        (status = 400, description = "Unknown or malformed status", body = crate::envelope::EnvelopeDoc),
        (status = 401, description = "Unauthorized", body = crate::envelope::EnvelopeDoc),
    ),
    security(("bearer" = [])),
    tag = "car"
)]
pub async fn by_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Envelope<Vec<Car>>, ApiError> {
    let status_id = integer_param("id", &id).map_err(|e| ApiError::invalid(INVALID_STATUS, e))?;

    let exists = state
        .timed(state.catalog.car_status_exists(status_id))
        .await
        .map_err(|e| ApiError::internal(INTERNAL_ERROR, e))?;
    if !exists {
        return Err(unknown_reference(INVALID_STATUS));
    }

    let cars = state
        .timed(state.cars.list_by_status(status_id))
        .await
        .map_err(|e| ApiError::internal(INTERNAL_ERROR, e))?;
    Ok(Envelope::list_or_null(
        "Success",
        "Currently there is no car with this status",
        cars,
    ))
}

#[utoipa::path(
    post,
    path = "/api/car/add",
    request_body = CarRequest,
    responses(
        (status = 201, description = "Car created", body = crate::envelope::EnvelopeDoc),
        (status = 400, description = "Validation failed", body = crate::envelope::EnvelopeDoc),
        (status = 403, description = "Not an admin", body = crate::envelope::EnvelopeDoc),
        (status = 500, description = "Store failure", body = crate::envelope::EnvelopeDoc),
    ),
    security(("bearer" = [])),
    tag = "car"
)]
pub async fn create(
    State(state): State<Arc<AppState>>,
    JsonInput(input): JsonInput,
) -> Result<Envelope<Car>, ApiError> {
    let mut rules = Rules::new(&input);
    let form = CarRequest::read(&input, &mut rules, Presence::Required);
    check_references(&state, &mut rules, &form, CREATE_FAILED).await?;
    let new_car = form.into_new_car(rules)?;

    let car = state
        .timed(state.cars.create(new_car))
        .await
        .map_err(|e| ApiError::internal(CREATE_FAILED, e))?;

    tracing::info!(car_id = %car.id, plate = %car.plate_number, "Car added");
    Ok(Envelope::created("New car added successfully", car))
}

#[utoipa::path(
    patch,
    path = "/api/car/update/{id}",
    params(("id" = String, Path, description = "Car UUID")),
    request_body = CarRequest,
    responses(
        (status = 200, description = "Car updated", body = crate::envelope::EnvelopeDoc),
        (status = 400, description = "Bad id, empty body or validation failure", body = crate::envelope::EnvelopeDoc),
        (status = 403, description = "Not an admin", body = crate::envelope::EnvelopeDoc),
        (status = 404, description = "Not found", body = crate::envelope::EnvelopeDoc),
    ),
    security(("bearer" = [])),
    tag = "car"
)]
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Envelope<Car>, ApiError> {
    let id = uuid_param("id", &id).map_err(|e| ApiError::invalid(INVALID_ID, e))?;

    let input = parse_object(&body)?;
    if input.is_empty() {
        return Err(ApiError::bad_request(NO_DATA));
    }

    let mut rules = Rules::new(&input);
    let form = CarRequest::read(&input, &mut rules, Presence::Sometimes);
    check_references(&state, &mut rules, &form, UPDATE_FAILED).await?;
    let update = form.into_update(rules)?;

    let existing = state
        .timed(state.cars.find(id))
        .await
        .map_err(|e| ApiError::internal(UPDATE_FAILED, e))?;
    if existing.is_none() {
        return Err(ApiError::not_found(NO_SUCH_CAR));
    }

    let car = state
        .timed(state.cars.update(id, update))
        .await
        .map_err(|e| ApiError::internal(UPDATE_FAILED, e))?
        .ok_or_else(|| ApiError::not_found(NO_SUCH_CAR))?;

    tracing::info!(car_id = %car.id, "Car updated");
    Ok(Envelope::ok("Car updated successfully", car))
}

#[utoipa::path(
    delete,
    path = "/api/car/delete/{id}",
    params(("id" = String, Path, description = "Car UUID")),
    responses(
        (status = 200, description = "Car deleted", body = crate::envelope::EnvelopeDoc),
        (status = 400, description = "Malformed id", body = crate::envelope::EnvelopeDoc),
        (status = 403, description = "Not an admin", body = crate::envelope::EnvelopeDoc),
        (status = 404, description = "Not found", body = crate::envelope::EnvelopeDoc),
    ),
    security(("bearer" = [])),
    tag = "car"
)]
pub async fn destroy(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Envelope<()>, ApiError> {
    let id = uuid_param("id", &id).map_err(|e| ApiError::invalid(INVALID_ID, e))?;

    let deleted = state
        .timed(state.cars.delete(id))
        .await
        .map_err(|e| ApiError::internal(DELETE_FAILED, e))?;
    if !deleted {
        return Err(ApiError::not_found(NO_SUCH_CAR));
    }

    tracing::info!(car_id = %id, "Car deleted");
    Ok(Envelope::empty(StatusCode::OK, "Car deleted successfully"))
}
