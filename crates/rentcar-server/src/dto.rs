//! Request forms, response payloads and JSON body parsing.
//!
//! Bodies are read as loose JSON objects and checked field by field with
//! [`Rules`], so one response can report every invalid field at once.

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use serde::Serialize;
use serde_json::{Map, Value};

use rentcar_core::error::AppError;
use rentcar_core::models::{CarUpdate, NewCar, ProfileUpdate, Transmission, User};
use rentcar_core::validation::{FieldErrors, Presence, Rules};

use crate::error::ApiError;

pub type JsonObject = Map<String, Value>;

/// Parse a request body as a JSON object. An empty body is an empty object.
pub fn parse_object(body: &[u8]) -> Result<JsonObject, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(JsonObject::new());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(ApiError::validation(FieldErrors::single(
            "body",
            "The request body must be a valid JSON object.",
        ))),
    }
}

/// Extractor for a JSON object body, rejecting with a validation envelope.
#[derive(Debug, Clone, Default)]
pub struct JsonInput(pub JsonObject);

impl<S: Send + Sync> FromRequest<S> for JsonInput {
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(request, state)
            .await
            .map_err(|rejection| ApiError::new(rejection.status(), rejection.body_text()))?;
        parse_object(&body).map(JsonInput)
    }
}

/// Turn a finished rule set and the form it produced into a result.
fn validated<T>(rules: Rules<'_>, form: Option<T>) -> Result<T, AppError> {
    rules.finish()?;
    form.ok_or_else(|| AppError::Validation(FieldErrors::new()))
}

/// The lower-cased email if it passed its own rules so far.
fn checked_email(input: &JsonObject, rules: &Rules<'_>) -> Option<String> {
    if rules.has_error("email") {
        return None;
    }
    input
        .get("email")
        .and_then(Value::as_str)
        .map(str::to_lowercase)
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, utoipa::ToSchema)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    /// At least 6 characters.
    pub password: String,
    pub phone_number: String,
    pub address: String,
}

impl RegisterRequest {
    /// Apply the field rules. Uniqueness of `email` is checked by the caller
    /// through [`Self::email_to_check`] before [`Self::finish`].
    pub fn read(rules: &mut Rules<'_>) -> Option<Self> {
        let name = rules.string("name", Presence::Required);
        let email = rules
            .string("email", Presence::Required)
            .filter(|email| rules.email("email", email))
            .map(|email| email.to_lowercase());
        let password = rules
            .string("password", Presence::Required)
            .filter(|password| rules.min_chars("password", password, 6));
        let phone_number = rules.string("phone_number", Presence::Required);
        let address = rules.string("address", Presence::Required);

        Some(Self {
            name: name?,
            email: email?,
            password: password?,
            phone_number: phone_number?,
            address: address?,
        })
    }

    pub fn email_to_check(input: &JsonObject, rules: &Rules<'_>) -> Option<String> {
        checked_email(input, rules)
    }

    pub fn finish(rules: Rules<'_>, form: Option<Self>) -> Result<Self, AppError> {
        validated(rules, form)
    }
}

#[derive(Debug, Clone, PartialEq, utoipa::ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn from_input(input: &JsonObject) -> Result<Self, AppError> {
        let mut rules = Rules::new(input);
        let email = rules
            .string("email", Presence::Required)
            .filter(|email| rules.email("email", email))
            .map(|email| email.to_lowercase());
        let password = rules
            .string("password", Presence::Required)
            .filter(|password| rules.min_chars("password", password, 6));

        let form = email
            .zip(password)
            .map(|(email, password)| Self { email, password });
        validated(rules, form)
    }
}

/// Partial profile update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, utoipa::ToSchema)]
pub struct ProfileUpdateRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

impl ProfileUpdateRequest {
    pub fn read(rules: &mut Rules<'_>) -> ProfileUpdate {
        let name = rules
            .string("name", Presence::Sometimes)
            .filter(|name| rules.max_chars("name", name, 255));
        let email = rules
            .string("email", Presence::Sometimes)
            .filter(|email| rules.email("email", email) && rules.max_chars("email", email, 255))
            .map(|email| email.to_lowercase());
        let phone_number = rules
            .string("phone_number", Presence::Sometimes)
            .filter(|phone| rules.max_chars("phone_number", phone, 15));
        let address = rules
            .string("address", Presence::Sometimes)
            .filter(|address| rules.max_chars("address", address, 500));

        ProfileUpdate {
            name,
            email,
            phone_number,
            address,
        }
    }

    pub fn email_to_check(input: &JsonObject, rules: &Rules<'_>) -> Option<String> {
        checked_email(input, rules)
    }
}

/// Payload of a successful login.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    #[schema(value_type = Object)]
    pub user: User,
}

/// Payload of a successful refresh.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct RefreshResponse {
    pub token: String,
    pub token_type: &'static str,
    /// Seconds until the new token expires.
    pub expires_in: u64,
    #[schema(value_type = Object)]
    pub user: User,
}

pub const TOKEN_TYPE: &str = "bearer";

// ---------------------------------------------------------------------------
// Cars
// ---------------------------------------------------------------------------

/// Car fields as submitted, for create (all required) or update (sometimes).
#[derive(Debug, Clone, Default, utoipa::ToSchema)]
pub struct CarRequest {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub plate_number: Option<String>,
    /// Must reference an existing car type.
    pub type_id: Option<i32>,
    pub passenger_capacity: Option<i32>,
    pub daily_rate: Option<i64>,
    /// `null` clears the photo on update.
    #[schema(value_type = Option<String>)]
    pub photo_url: Option<Option<String>>,
    /// Must reference an existing car status.
    pub status_id: Option<i32>,
    #[schema(value_type = Option<String>, example = "manual")]
    pub transmission: Option<Transmission>,
}

impl CarRequest {
    /// Apply the field rules. `Presence::Required` for create,
    /// `Presence::Sometimes` for update.
    pub fn read(input: &JsonObject, rules: &mut Rules<'_>, presence: Presence) -> Self {
        let name = rules.string("name", presence);
        let year = rules.integer("year", presence);
        let plate_number = rules.string("plate_number", presence);
        let type_id = rules.integer("type_id", presence);
        let passenger_capacity = rules.integer("passenger_capacity", presence);
        let daily_rate = rules.integer("daily_rate", presence);
        let photo_url = input
            .contains_key("photo_url")
            .then(|| rules.string("photo_url", Presence::Nullable));
        let status_id = rules.integer("status_id", presence);
        let transmission = rules.string("transmission", presence).and_then(|raw| {
            if rules.one_of("transmission", &raw, &Transmission::ALL) {
                raw.parse::<Transmission>().ok()
            } else {
                None
            }
        });

        Self {
            name,
            year,
            plate_number,
            type_id,
            passenger_capacity,
            daily_rate,
            photo_url,
            status_id,
            transmission,
        }
    }

    pub fn into_new_car(self, rules: Rules<'_>) -> Result<NewCar, AppError> {
        let form = (|| {
            Some(NewCar {
                name: self.name?,
                year: self.year?,
                plate_number: self.plate_number?,
                type_id: self.type_id?,
                passenger_capacity: self.passenger_capacity?,
                daily_rate: self.daily_rate?,
                photo_url: self.photo_url.flatten(),
                status_id: self.status_id?,
                transmission: self.transmission?,
            })
        })();
        validated(rules, form)
    }

    pub fn into_update(self, rules: Rules<'_>) -> Result<CarUpdate, AppError> {
        rules.finish()?;
        Ok(CarUpdate {
            name: self.name,
            year: self.year,
            plate_number: self.plate_number,
            type_id: self.type_id,
            passenger_capacity: self.passenger_capacity,
            daily_rate: self.daily_rate,
            photo_url: self.photo_url,
            status_id: self.status_id,
            transmission: self.transmission,
        })
    }
}

// ---------------------------------------------------------------------------
// Reservations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct ReviewRequest {
    /// At most 500 characters.
    pub review: String,
    /// 1 to 5.
    pub rating: i64,
}

impl ReviewRequest {
    pub fn from_input(input: &JsonObject) -> Result<Self, AppError> {
        let mut rules = Rules::new(input);
        let review = rules
            .string("review", Presence::Required)
            .filter(|review| rules.max_chars("review", review, 500));
        let rating = rules
            .integer::<i64>("rating", Presence::Required)
            .filter(|rating| rules.between("rating", *rating, 1, 5));

        let form = review.zip(rating).map(|(review, rating)| Self { review, rating });
        validated(rules, form)
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ReviewResponse {
    pub reservation_id: i64,
    pub review: String,
    pub rating: i64,
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
}
