pub mod denylist;
pub mod error;
pub mod models;
pub mod password;
pub mod token;
pub mod traits;
pub mod validation;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

pub use denylist::MemoryDenylist;
pub use error::AppError;
pub use models::{Car, NewCar, Role, Transmission, User};
pub use token::{Claims, IssuedToken, TokenError, TokenService};
pub use validation::{FieldErrors, Presence, Rules};
