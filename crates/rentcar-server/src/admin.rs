//! Operator-side account provisioning. Registration only ever creates
//! `user` accounts, so admins are created from the command line.

use rentcar_core::error::AppError;
use rentcar_core::models::{ADMIN_ROLE, NewUser, User};
use rentcar_core::password::hash_password;
use rentcar_core::traits::{RoleStore, UserStore};
use rentcar_core::validation::{FieldErrors, Presence, Rules};
use serde_json::{Map, Value};

#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone_number: String,
    pub address: String,
}

/// Create an account holding the `admin` role, applying the same email and
/// password rules as registration.
pub async fn create_admin(
    users: &dyn UserStore,
    roles: &dyn RoleStore,
    admin: NewAdmin,
) -> Result<User, AppError> {
    let mut input = Map::new();
    input.insert("email".into(), Value::String(admin.email.clone()));
    input.insert("password".into(), Value::String(admin.password.clone()));
    input.insert("name".into(), Value::String(admin.name.clone()));

    let mut rules = Rules::new(&input);
    if let Some(email) = rules.string("email", Presence::Required) {
        rules.email("email", &email);
    }
    if let Some(password) = rules.string("password", Presence::Required) {
        rules.min_chars("password", &password, 6);
    }
    rules.string("name", Presence::Required);
    rules.finish()?;

    let email = admin.email.to_lowercase();
    if users.email_taken(&email, None).await? {
        return Err(AppError::Validation(FieldErrors::single(
            "email",
            "The email has already been taken.",
        )));
    }

    let role = roles
        .find_by_name(ADMIN_ROLE)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("role '{ADMIN_ROLE}'")))?;

    let user = users
        .create(NewUser {
            email,
            password_hash: hash_password(&admin.password)?,
            name: admin.name,
            phone_number: admin.phone_number,
            address: admin.address,
            role_id: role.id,
        })
        .await?;

    tracing::info!(user_id = user.id, email = %user.email, "Created admin account");
    Ok(user)
}
