use std::sync::Arc;

use axum::extract::{Path, State};

use rentcar_core::models::Reservation;
use rentcar_core::validation::FieldErrors;

use crate::auth::AuthContext;
use crate::dto::{JsonInput, ReviewRequest, ReviewResponse};
use crate::envelope::Envelope;
use crate::error::{ApiError, INTERNAL_ERROR};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/reservation",
    responses(
        (status = 200, description = "The caller's reservations, or null data when none", body = crate::envelope::EnvelopeDoc),
        (status = 401, description = "Unauthorized", body = crate::envelope::EnvelopeDoc),
    ),
    security(("bearer" = [])),
    tag = "reservation"
)]
pub async fn list(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
) -> Result<Envelope<Vec<Reservation>>, ApiError> {
    let reservations = state
        .timed(state.reservations.list_for_user(auth.user.id))
        .await
        .map_err(|e| ApiError::internal(INTERNAL_ERROR, e))?;

    Ok(Envelope::list_or_null("Success", "Success", reservations))
}

/// Accepts a review of one of the caller's reservations. Reviews are
/// acknowledged but not stored.
#[utoipa::path(
    post,
    path = "/api/reservation/{id}/review",
    params(("id" = i64, Path, description = "Reservation id")),
    request_body = ReviewRequest,
    responses(
        (status = 200, description = "Review accepted", body = crate::envelope::EnvelopeDoc),
        (status = 400, description = "Validation failed", body = crate::envelope::EnvelopeDoc),
        (status = 404, description = "No such reservation for the caller", body = crate::envelope::EnvelopeDoc),
    ),
    security(("bearer" = [])),
    tag = "reservation"
)]
pub async fn review(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<String>,
    JsonInput(input): JsonInput,
) -> Result<Envelope<ReviewResponse>, ApiError> {
    let reservation_id: i64 = id.trim().parse().map_err(|_| {
        ApiError::invalid(
            "Invalid ID format",
            FieldErrors::single("id", "The id must be an integer."),
        )
    })?;
    let form = ReviewRequest::from_input(&input)?;

    let owned = state
        .timed(state.reservations.list_for_user(auth.user.id))
        .await
        .map_err(|e| ApiError::internal(INTERNAL_ERROR, e))?
        .iter()
        .any(|r| r.id == reservation_id);
    if !owned {
        return Err(ApiError::not_found("Data not found"));
    }

    tracing::info!(
        user_id = auth.user.id,
        reservation_id,
        rating = form.rating,
        "Review submitted"
    );
    Ok(Envelope::ok(
        "Review submitted successfully",
        ReviewResponse {
            reservation_id,
            review: form.review,
            rating: form.rating,
        },
    ))
}
