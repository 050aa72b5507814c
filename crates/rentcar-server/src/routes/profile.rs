use std::sync::Arc;

use axum::extract::State;

use rentcar_core::error::AppError;
use rentcar_core::models::User;
use rentcar_core::validation::{FieldErrors, Rules};

use crate::auth::{AuthContext, USER_NOT_FOUND};
use crate::dto::{JsonInput, ProfileUpdateRequest};
use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::state::AppState;

const UPDATED: &str = "Profile updated successfully";
const UPDATE_FAILED: &str = "Profile update failed";

#[utoipa::path(
    get,
    path = "/api/user/profile",
    responses(
        (status = 200, description = "The caller's profile", body = crate::envelope::EnvelopeDoc),
        (status = 401, description = "Unauthorized", body = crate::envelope::EnvelopeDoc),
    ),
    security(("bearer" = [])),
    tag = "user"
)]
pub async fn show(auth: AuthContext) -> Envelope<User> {
    Envelope::ok("Success", auth.user)
}

#[utoipa::path(
    patch,
    path = "/api/user/profile",
    request_body = ProfileUpdateRequest,
    responses(
        (status = 200, description = "Profile updated", body = crate::envelope::EnvelopeDoc),
        (status = 400, description = "Validation failed", body = crate::envelope::EnvelopeDoc),
        (status = 401, description = "Unauthorized", body = crate::envelope::EnvelopeDoc),
        (status = 500, description = "Store failure", body = crate::envelope::EnvelopeDoc),
    ),
    security(("bearer" = [])),
    tag = "user"
)]
pub async fn update(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    JsonInput(input): JsonInput,
) -> Result<Envelope<User>, ApiError> {
    let user_id = auth.user.id;
    let mut rules = Rules::new(&input);
    let update = ProfileUpdateRequest::read(&mut rules);
    if let Some(email) = ProfileUpdateRequest::email_to_check(&input, &rules) {
        let taken = state
            .timed(state.users.email_taken(&email, Some(user_id)))
            .await
            .map_err(|e| ApiError::internal(UPDATE_FAILED, e))?;
        if taken {
            rules.taken("email");
        }
    }
    rules.finish()?;

    if update.is_empty() {
        return Ok(Envelope::ok(UPDATED, auth.user));
    }

    match state.timed(state.users.update_profile(user_id, update)).await {
        Ok(Some(user)) => {
            tracing::info!(user_id, "Profile updated");
            Ok(Envelope::ok(UPDATED, user))
        }
        Ok(None) => Err(ApiError::unauthorized(USER_NOT_FOUND)),
        Err(AppError::Conflict(_)) => Err(ApiError::validation(FieldErrors::single(
            "email",
            "The email has already been taken.",
        ))),
        Err(e) => Err(ApiError::internal(UPDATE_FAILED, e)),
    }
}
