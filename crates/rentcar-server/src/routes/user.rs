use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;

use rentcar_core::error::AppError;
use rentcar_core::models::{DEFAULT_ROLE, NewUser, User};
use rentcar_core::password::{hash_password, verify_password};
use rentcar_core::token::TokenError;
use rentcar_core::validation::{FieldErrors, Rules};

use crate::auth::AuthContext;
use crate::dto::{JsonInput, LoginRequest, LoginResponse, RefreshResponse, RegisterRequest, TOKEN_TYPE};
use crate::envelope::Envelope;
use crate::error::{ApiError, INTERNAL_ERROR};
use crate::state::AppState;

const CREATE_FAILED: &str = "Failed to create user";
const BAD_CREDENTIALS: &str = "Email atau Password Salah";
const LOGOUT_FAILED: &str = "Failed to log out";
const TOKEN_CREATE_FAILED: &str = "Could not create token";

/// Run password hashing off the async workers.
async fn blocking<T: Send + 'static>(
    work: impl FnOnce() -> Result<T, AppError> + Send + 'static,
) -> Result<T, AppError> {
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::Generic(format!("password task failed: {e}")))?
}

/// Run a token service call under the store timeout; its denylist may be remote.
async fn within<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, TokenError>>,
) -> Result<Result<T, TokenError>, AppError> {
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| AppError::Timeout(limit.as_secs()))
}

#[utoipa::path(
    post,
    path = "/api/user/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = crate::envelope::EnvelopeDoc),
        (status = 400, description = "Validation failed", body = crate::envelope::EnvelopeDoc),
        (status = 500, description = "Store failure", body = crate::envelope::EnvelopeDoc),
    ),
    tag = "user"
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    JsonInput(input): JsonInput,
) -> Result<Envelope<User>, ApiError> {
    let mut rules = Rules::new(&input);
    let form = RegisterRequest::read(&mut rules);
    if let Some(email) = RegisterRequest::email_to_check(&input, &rules) {
        let taken = state
            .timed(state.users.email_taken(&email, None))
            .await
            .map_err(|e| ApiError::internal(CREATE_FAILED, e))?;
        if taken {
            rules.taken("email");
        }
    }
    let form = RegisterRequest::finish(rules, form)?;

    let role = state
        .timed(state.roles.find_by_name(DEFAULT_ROLE))
        .await
        .map_err(|e| ApiError::internal(CREATE_FAILED, e))?
        .ok_or_else(|| ApiError::internal(CREATE_FAILED, "default role is missing"))?;

    let password = form.password;
    let password_hash = blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::internal(CREATE_FAILED, e))?;

    let new_user = NewUser {
        email: form.email,
        password_hash,
        name: form.name,
        phone_number: form.phone_number,
        address: form.address,
        role_id: role.id,
    };
    let user = match state.timed(state.users.create(new_user)).await {
        Ok(user) => user,
        Err(AppError::Conflict(_)) => {
            let mut errors = FieldErrors::new();
            errors.add("email", "The email has already been taken.");
            return Err(ApiError::validation(errors));
        }
        Err(e) => return Err(ApiError::internal(CREATE_FAILED, e)),
    };

    tracing::info!(user_id = user.id, "Registered user");
    Ok(Envelope::created("User created successfully", user))
}

#[utoipa::path(
    post,
    path = "/api/user/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = crate::envelope::EnvelopeDoc),
        (status = 400, description = "Bad credentials or validation failure", body = crate::envelope::EnvelopeDoc),
    ),
    tag = "user"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    JsonInput(input): JsonInput,
) -> Result<Envelope<LoginResponse>, ApiError> {
    let form = LoginRequest::from_input(&input)?;

    let user = state
        .timed(state.users.find_by_email(&form.email))
        .await
        .map_err(|e| ApiError::internal(INTERNAL_ERROR, e))?;
    let Some(user) = user else {
        tracing::warn!("Login for unknown email");
        return Err(ApiError::bad_request(BAD_CREDENTIALS));
    };

    let password = form.password;
    let stored = user.password_hash.clone();
    let matches = blocking(move || verify_password(&password, &stored))
        .await
        .map_err(|e| ApiError::internal(INTERNAL_ERROR, e))?;
    if !matches {
        tracing::warn!(user_id = user.id, "Login with wrong password");
        return Err(ApiError::bad_request(BAD_CREDENTIALS));
    }

    let issued = state
        .tokens
        .issue(user.id)
        .map_err(|e| ApiError::internal(TOKEN_CREATE_FAILED, e))?;

    tracing::info!(user_id = user.id, "User logged in");
    Ok(Envelope::ok(
        "Success",
        LoginResponse {
            token: issued.token,
            token_type: TOKEN_TYPE,
            user,
        },
    ))
}

#[utoipa::path(
    post,
    path = "/api/user/logout",
    responses(
        (status = 200, description = "Token revoked", body = crate::envelope::EnvelopeDoc),
        (status = 401, description = "Unauthorized", body = crate::envelope::EnvelopeDoc),
        (status = 500, description = "Revocation failed", body = crate::envelope::EnvelopeDoc),
    ),
    security(("bearer" = [])),
    tag = "user"
)]
pub async fn logout(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
) -> Result<Envelope<()>, ApiError> {
    let revoked = within(state.store_timeout, state.tokens.invalidate(&auth.token))
        .await
        .map_err(|e| ApiError::internal(LOGOUT_FAILED, e))?;
    revoked.map_err(|e| ApiError::internal(LOGOUT_FAILED, e))?;

    tracing::info!(user_id = auth.user.id, "User logged out");
    Ok(Envelope::empty(StatusCode::OK, "successfully logged out"))
}

#[utoipa::path(
    post,
    path = "/api/user/refresh",
    responses(
        (status = 200, description = "New token issued", body = crate::envelope::EnvelopeDoc),
        (status = 401, description = "Unauthorized", body = crate::envelope::EnvelopeDoc),
    ),
    security(("bearer" = [])),
    tag = "user"
)]
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
) -> Result<Envelope<RefreshResponse>, ApiError> {
    let issued = within(state.store_timeout, state.tokens.refresh(&auth.token))
        .await
        .map_err(|e| ApiError::internal(TOKEN_CREATE_FAILED, e))??;

    if state.refresh_revokes_previous {
        within(state.store_timeout, state.tokens.invalidate(&auth.token))
            .await
            .map_err(|e| ApiError::internal(TOKEN_CREATE_FAILED, e))?
            .map_err(|e| ApiError::internal(TOKEN_CREATE_FAILED, e))?;
    }

    tracing::info!(user_id = auth.user.id, "Token refreshed");
    Ok(Envelope::ok(
        "Success",
        RefreshResponse {
            token: issued.token,
            token_type: TOKEN_TYPE,
            expires_in: state.tokens.expires_in(),
            user: auth.user,
        },
    ))
}

#[utoipa::path(
    get,
    path = "/api/user/current-user",
    responses(
        (status = 200, description = "The authenticated user", body = crate::envelope::EnvelopeDoc),
        (status = 401, description = "Unauthorized", body = crate::envelope::EnvelopeDoc),
        (status = 500, description = "Token could not be checked", body = crate::envelope::EnvelopeDoc),
    ),
    security(("bearer" = [])),
    tag = "user"
)]
pub async fn current_user(auth: AuthContext) -> Envelope<User> {
    Envelope::ok("User retrieved successfully", auth.user)
}
