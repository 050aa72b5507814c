//! Authentication and authorization layers.
//!
//! [`authenticate`] turns a bearer token into an [`AuthContext`] stored in the
//! request extensions. [`require_role`] reads that context and admits only the
//! route's declared role. [`Guard`] composes both onto a router in the only
//! valid order.

use std::sync::Arc;

use axum::Router;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::HeaderMap;
use axum::http::request::Parts;
use axum::middleware::{self, Next};
use axum::response::Response;

use rentcar_core::models::User;
use rentcar_core::token::Claims;

use crate::error::{ApiError, TOKEN_PARSE_FAILURE};
use crate::state::AppState;

pub const TOKEN_NOT_PROVIDED: &str = "Unauthorized: Token not provided";
pub const USER_NOT_FOUND: &str = "Unauthorized: User not found";

/// The verified caller, attached by [`authenticate`].
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: User,
    /// The raw bearer token, needed to revoke it on logout.
    pub token: String,
    pub claims: Claims,
}

impl<S: Send + Sync> FromRequestParts<S> for AuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized(TOKEN_NOT_PROVIDED))
    }
}

/// The token from `Authorization: Bearer <token>`, if there is one.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get("authorization")?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Middleware that verifies the bearer token and resolves the caller.
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = bearer_token(request.headers()).map(str::to_owned) else {
        tracing::warn!(path = %request.uri().path(), "Request without bearer token");
        return Err(ApiError::unauthorized(TOKEN_NOT_PROVIDED));
    };

    let claims = tokio::time::timeout(state.store_timeout, state.tokens.verify_claims(&token))
        .await
        .map_err(|_| ApiError::internal(TOKEN_PARSE_FAILURE, "token denylist lookup timed out"))??;
    let user_id = claims.user_id()?;

    let user = state
        .timed(state.users.find_by_id(user_id))
        .await
        .map_err(|e| ApiError::internal(TOKEN_PARSE_FAILURE, e))?
        .ok_or_else(|| {
            tracing::warn!(user_id, "Token subject no longer exists");
            ApiError::unauthorized(USER_NOT_FOUND)
        })?;

    request.extensions_mut().insert(AuthContext {
        user,
        token,
        claims,
    });
    Ok(next.run(request).await)
}

/// State for [`require_role`]: the app plus the one role name a route accepts.
#[derive(Clone)]
pub struct RoleRequirement {
    state: Arc<AppState>,
    role: Arc<str>,
}

/// Exact, case-sensitive comparison. No hierarchy: `admin` does not satisfy `user`.
pub fn role_matches(actual: &str, required: &str) -> bool {
    actual == required
}

/// Middleware that admits only callers whose role name equals the requirement.
/// Must run after [`authenticate`].
pub async fn require_role(
    State(requirement): State<RoleRequirement>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(context) = request.extensions().get::<AuthContext>() else {
        tracing::warn!("Role check reached without an authenticated caller");
        return Err(ApiError::forbidden());
    };
    let user_id = context.user.id;
    let role_id = context.user.role_id;

    let state = &requirement.state;
    let role = state
        .timed(state.roles.find_by_id(role_id))
        .await
        .map_err(|e| ApiError::internal(crate::error::INTERNAL_ERROR, e))?;

    match role {
        Some(role) if role_matches(&role.role_name, &requirement.role) => {
            Ok(next.run(request).await)
        }
        other => {
            tracing::warn!(
                user_id,
                role = other.as_ref().map(|r| r.role_name.as_str()).unwrap_or("<none>"),
                required = %requirement.role,
                "Role check failed"
            );
            Err(ApiError::forbidden())
        }
    }
}

/// Declares the protection for a group of routes.
///
/// ```ignore
/// let admin = Guard::new().authenticated().role("admin").apply(routes, &state);
/// ```
#[derive(Debug, Default, Clone)]
pub struct Guard {
    authenticated: bool,
    role: Option<String>,
}

impl Guard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn authenticated(mut self) -> Self {
        self.authenticated = true;
        self
    }

    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Layer the guard onto every route currently in `router`.
    ///
    /// # Panics
    ///
    /// If a role is required without authentication: the role check has no
    /// identity to read, so the router is refused at construction time.
    pub fn apply(
        self,
        router: Router<Arc<AppState>>,
        state: &Arc<AppState>,
    ) -> Router<Arc<AppState>> {
        if self.role.is_some() && !self.authenticated {
            panic!("a role guard requires .authenticated() on the same routes");
        }

        // route_layer wraps outward: the layer added last runs first.
        let mut router = router;
        if let Some(role) = self.role {
            let requirement = RoleRequirement {
                state: state.clone(),
                role: role.into(),
            };
            router = router.route_layer(middleware::from_fn_with_state(requirement, require_role));
        }
        if self.authenticated {
            router = router.route_layer(middleware::from_fn_with_state(state.clone(), authenticate));
        }
        router
    }
}
