//! Route table. Everything except `/health` and the docs lives under `/api`.

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, patch, post};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use rentcar_core::models::ADMIN_ROLE;

use crate::auth::Guard;
use crate::openapi::ApiDoc;
use crate::state::AppState;

pub mod car;
pub mod health;
pub mod profile;
pub mod reservation;
pub mod user;

/// Build the full router with all routes and middleware.
pub fn router(state: Arc<AppState>) -> Router {
    let public = Router::new()
        .route("/user/register", post(user::register))
        .route("/user/login", post(user::login));

    let authenticated = Guard::new().authenticated().apply(
        Router::new()
            .route("/user/logout", post(user::logout))
            .route("/user/refresh", post(user::refresh))
            .route("/user/current-user", get(user::current_user))
            .route("/user/profile", get(profile::show).patch(profile::update))
            .route("/car/all", get(car::list))
            .route("/car/{id}", get(car::show))
            .route("/car/category/{id}", get(car::by_category))
            .route("/car/status/{id}", get(car::by_status))
            .route("/reservation", get(reservation::list))
            .route("/reservation/{id}/review", post(reservation::review)),
        &state,
    );

    let admin = Guard::new().authenticated().role(ADMIN_ROLE).apply(
        Router::new()
            .route("/car/add", post(car::create))
            .route("/car/update/{id}", patch(car::update))
            .route("/car/delete/{id}", delete(car::destroy)),
        &state,
    );

    let api = public.merge(authenticated).merge(admin);

    Router::new()
        .route("/health", get(health::health))
        .nest("/api", api)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
}
