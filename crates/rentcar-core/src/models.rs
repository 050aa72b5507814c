use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role assigned to every self-registered account.
pub const DEFAULT_ROLE: &str = "user";

/// Role required by inventory write endpoints.
pub const ADMIN_ROLE: &str = "admin";

/// A registered account.
///
/// The password hash never leaves the process: it is skipped on serialization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub phone_number: String,
    pub address: String,
    pub role_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for inserting a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Already lower-cased.
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub phone_number: String,
    pub address: String,
    pub role_id: i32,
}

/// Partial profile update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone_number.is_none()
            && self.address.is_none()
    }
}

/// Named access class looked up by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Role {
    pub id: i32,
    pub role_name: String,
}

/// Row of the car category lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CarType {
    pub id: i32,
    pub name: String,
}

/// Row of the car availability lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CarStatus {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transmission {
    Manual,
    Automatic,
}

impl Transmission {
    pub const ALL: [&'static str; 2] = ["manual", "automatic"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Transmission::Manual => "manual",
            Transmission::Automatic => "automatic",
        }
    }
}

impl fmt::Display for Transmission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Transmission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(Transmission::Manual),
            "automatic" => Ok(Transmission::Automatic),
            other => Err(format!("Unknown transmission: {other}")),
        }
    }
}

/// A car in the rental inventory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Car {
    pub id: Uuid,
    pub name: String,
    pub year: i32,
    pub plate_number: String,
    pub type_id: i32,
    pub passenger_capacity: i32,
    pub daily_rate: i64,
    pub photo_url: Option<String>,
    pub status_id: i32,
    pub transmission: Transmission,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for inserting a new car.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCar {
    pub name: String,
    pub year: i32,
    pub plate_number: String,
    pub type_id: i32,
    pub passenger_capacity: i32,
    pub daily_rate: i64,
    pub photo_url: Option<String>,
    pub status_id: i32,
    pub transmission: Transmission,
}

/// Partial car update. `photo_url: Some(None)` clears the photo.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CarUpdate {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub plate_number: Option<String>,
    pub type_id: Option<i32>,
    pub passenger_capacity: Option<i32>,
    pub daily_rate: Option<i64>,
    pub photo_url: Option<Option<String>>,
    pub status_id: Option<i32>,
    pub transmission: Option<Transmission>,
}

impl CarUpdate {
    /// Apply this update to a car in place, bumping `updated_at`.
    pub fn apply_to(&self, car: &mut Car) {
        if let Some(name) = &self.name {
            car.name = name.clone();
        }
        if let Some(year) = self.year {
            car.year = year;
        }
        if let Some(plate_number) = &self.plate_number {
            car.plate_number = plate_number.clone();
        }
        if let Some(type_id) = self.type_id {
            car.type_id = type_id;
        }
        if let Some(capacity) = self.passenger_capacity {
            car.passenger_capacity = capacity;
        }
        if let Some(rate) = self.daily_rate {
            car.daily_rate = rate;
        }
        if let Some(photo_url) = &self.photo_url {
            car.photo_url = photo_url.clone();
        }
        if let Some(status_id) = self.status_id {
            car.status_id = status_id;
        }
        if let Some(transmission) = self.transmission {
            car.transmission = transmission;
        }
        car.updated_at = Utc::now();
    }
}

/// A booking made by a user, joined with the booked car.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reservation {
    pub id: i64,
    pub user_id: i64,
    pub car_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub car: Option<Car>,
}
