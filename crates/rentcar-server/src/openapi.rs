use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Rentcar API",
        version = "0.1.0",
        description = "Car rental backend: accounts, bearer tokens and the car inventory."
    ),
    paths(
        crate::routes::user::register,
        crate::routes::user::login,
        crate::routes::user::logout,
        crate::routes::user::refresh,
        crate::routes::user::current_user,
        crate::routes::profile::show,
        crate::routes::profile::update,
        crate::routes::car::list,
        crate::routes::car::show,
        crate::routes::car::by_category,
        crate::routes::car::by_status,
        crate::routes::car::create,
        crate::routes::car::update,
        crate::routes::car::destroy,
        crate::routes::reservation::list,
        crate::routes::reservation::review,
        crate::routes::health::health,
    ),
    components(schemas(
        crate::envelope::EnvelopeDoc,
        crate::envelope::EnvelopeStatus,
        crate::dto::RegisterRequest,
        crate::dto::LoginRequest,
        crate::dto::LoginResponse,
        crate::dto::RefreshResponse,
        crate::dto::ProfileUpdateRequest,
        crate::dto::CarRequest,
        crate::dto::ReviewRequest,
        crate::dto::ReviewResponse,
        crate::dto::HealthResponse,
    )),
    tags(
        (name = "user", description = "Registration, login and bearer tokens"),
        (name = "car", description = "Car inventory"),
        (name = "reservation", description = "The caller's reservations"),
        (name = "system", description = "Health and system status"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Adds Bearer token security scheme to the OpenAPI document.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token returned by POST /api/user/login."))
                        .build(),
                ),
            );
        }
    }
}
