//! Test utilities: an in-memory implementation of every storage trait.
//!
//! `MemoryStore` keeps all tables behind one `Arc<Mutex<_>>`, so clones share
//! state and tests can seed rows directly and assert on what handlers wrote.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{
    ADMIN_ROLE, Car, CarStatus, CarType, CarUpdate, DEFAULT_ROLE, NewCar, NewUser, ProfileUpdate,
    Reservation, Role, User,
};
use crate::password::hash_password;
use crate::traits::{
    CarStore, CatalogStore, HealthCheck, ReservationStore, RoleStore, TokenDenylist, UserStore,
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    roles: Vec<Role>,
    car_types: Vec<CarType>,
    car_statuses: Vec<CarStatus>,
    cars: Vec<Car>,
    reservations: Vec<Reservation>,
    next_user_id: i64,
    next_reservation_id: i64,
    failing: bool,
}

/// In-memory store seeded with the same reference data as the migrations:
/// roles `admin`(1) and `user`(2), car types 1..=3 and car statuses 1..=3.
#[derive(Clone)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let tables = Tables {
            roles: vec![
                Role {
                    id: 1,
                    role_name: ADMIN_ROLE.into(),
                },
                Role {
                    id: 2,
                    role_name: DEFAULT_ROLE.into(),
                },
            ],
            car_types: ["SUV", "MPV", "Sedan"]
                .iter()
                .zip(1..)
                .map(|(name, id)| CarType {
                    id,
                    name: name.to_string(),
                })
                .collect(),
            car_statuses: ["available", "rented", "maintenance"]
                .iter()
                .zip(1..)
                .map(|(name, id)| CarStatus {
                    id,
                    name: name.to_string(),
                })
                .collect(),
            next_user_id: 1,
            next_reservation_id: 1,
            ..Default::default()
        };
        Self {
            tables: Arc::new(Mutex::new(tables)),
        }
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, AppError> {
        let tables = self
            .tables
            .lock()
            .map_err(|_| AppError::DatabaseError("memory store poisoned".into()))?;
        if tables.failing {
            return Err(AppError::DatabaseError("simulated store outage".into()));
        }
        Ok(tables)
    }

    /// Make every subsequent store call fail with a database error.
    pub fn set_failing(&self, failing: bool) {
        self.tables.lock().unwrap().failing = failing;
    }

    /// Add an extra role row (e.g. one whose name differs only by case).
    pub fn add_role(&self, id: i32, role_name: &str) {
        self.tables.lock().unwrap().roles.push(Role {
            id,
            role_name: role_name.to_string(),
        });
    }

    /// Insert a user with a real argon2 hash of `password`.
    pub fn seed_user(&self, email: &str, password: &str, role_id: i32) -> User {
        let new_user = NewUser {
            email: email.to_lowercase(),
            password_hash: hash_password(password).unwrap(),
            name: "Seed User".into(),
            phone_number: "081234567890".into(),
            address: "Jl. Merdeka 1".into(),
            role_id,
        };
        insert_user(&mut self.tables.lock().unwrap(), new_user)
    }

    /// Remove a user row, simulating deletion after a token was issued.
    pub fn remove_user(&self, id: i64) {
        self.tables.lock().unwrap().users.retain(|u| u.id != id);
    }

    pub fn seed_car(&self, car: NewCar) -> Car {
        insert_car(&mut self.tables.lock().unwrap(), car)
    }

    pub fn seed_reservation(&self, user_id: i64, car_id: Uuid, start: NaiveDate, end: NaiveDate) {
        let mut tables = self.tables.lock().unwrap();
        let id = tables.next_reservation_id;
        tables.next_reservation_id += 1;
        tables.reservations.push(Reservation {
            id,
            user_id,
            car_id,
            start_date: start,
            end_date: end,
            created_at: Utc::now(),
            car: None,
        });
    }

    pub fn car_count(&self) -> usize {
        self.tables.lock().unwrap().cars.len()
    }

    pub fn user_by_email(&self, email: &str) -> Option<User> {
        self.tables
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned()
    }
}

fn insert_user(tables: &mut Tables, user: NewUser) -> User {
    let now = Utc::now();
    let id = tables.next_user_id;
    tables.next_user_id += 1;
    let user = User {
        id,
        email: user.email,
        password_hash: user.password_hash,
        name: user.name,
        phone_number: user.phone_number,
        address: user.address,
        role_id: user.role_id,
        created_at: now,
        updated_at: now,
    };
    tables.users.push(user.clone());
    user
}

fn insert_car(tables: &mut Tables, car: NewCar) -> Car {
    let now = Utc::now();
    let car = Car {
        id: Uuid::new_v4(),
        name: car.name,
        year: car.year,
        plate_number: car.plate_number,
        type_id: car.type_id,
        passenger_capacity: car.passenger_capacity,
        daily_rate: car.daily_rate,
        photo_url: car.photo_url,
        status_id: car.status_id,
        transmission: car.transmission,
        created_at: now,
        updated_at: now,
    };
    tables.cars.push(car.clone());
    car
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let mut tables = self.tables()?;
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(AppError::Conflict(format!("email {} exists", user.email)));
        }
        Ok(insert_user(&mut tables, user))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.tables()?.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .tables()?
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn email_taken(&self, email: &str, except: Option<i64>) -> Result<bool, AppError> {
        Ok(self
            .tables()?
            .users
            .iter()
            .any(|u| u.email == email && Some(u.id) != except))
    }

    async fn update_profile(
        &self,
        id: i64,
        update: ProfileUpdate,
    ) -> Result<Option<User>, AppError> {
        let mut tables = self.tables()?;
        let Some(user) = tables.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(email) = update.email {
            user.email = email;
        }
        if let Some(phone_number) = update.phone_number {
            user.phone_number = phone_number;
        }
        if let Some(address) = update.address {
            user.address = address;
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }
}

#[async_trait]
impl RoleStore for MemoryStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<Role>, AppError> {
        Ok(self.tables()?.roles.iter().find(|r| r.id == id).cloned())
    }

    async fn find_by_name(&self, role_name: &str) -> Result<Option<Role>, AppError> {
        Ok(self
            .tables()?
            .roles
            .iter()
            .find(|r| r.role_name == role_name)
            .cloned())
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn car_type_exists(&self, id: i32) -> Result<bool, AppError> {
        Ok(self.tables()?.car_types.iter().any(|t| t.id == id))
    }

    async fn car_status_exists(&self, id: i32) -> Result<bool, AppError> {
        Ok(self.tables()?.car_statuses.iter().any(|s| s.id == id))
    }
}

#[async_trait]
impl CarStore for MemoryStore {
    async fn create(&self, car: NewCar) -> Result<Car, AppError> {
        let mut tables = self.tables()?;
        Ok(insert_car(&mut tables, car))
    }

    async fn find(&self, id: Uuid) -> Result<Option<Car>, AppError> {
        Ok(self.tables()?.cars.iter().find(|c| c.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Car>, AppError> {
        Ok(self.tables()?.cars.clone())
    }

    async fn list_by_type(&self, type_id: i32) -> Result<Vec<Car>, AppError> {
        Ok(self
            .tables()?
            .cars
            .iter()
            .filter(|c| c.type_id == type_id)
            .cloned()
            .collect())
    }

    async fn list_by_status(&self, status_id: i32) -> Result<Vec<Car>, AppError> {
        Ok(self
            .tables()?
            .cars
            .iter()
            .filter(|c| c.status_id == status_id)
            .cloned()
            .collect())
    }

    async fn update(&self, id: Uuid, update: CarUpdate) -> Result<Option<Car>, AppError> {
        let mut tables = self.tables()?;
        let Some(car) = tables.cars.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        update.apply_to(car);
        Ok(Some(car.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables()?;
        let before = tables.cars.len();
        tables.cars.retain(|c| c.id != id);
        Ok(tables.cars.len() != before)
    }
}

#[async_trait]
impl ReservationStore for MemoryStore {
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Reservation>, AppError> {
        let tables = self.tables()?;
        let mut reservations: Vec<Reservation> = tables
            .reservations
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| Reservation {
                car: tables.cars.iter().find(|c| c.id == r.car_id).cloned(),
                ..r.clone()
            })
            .collect();
        reservations.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(reservations)
    }
}

#[async_trait]
impl HealthCheck for MemoryStore {
    async fn health_check(&self) -> Result<(), AppError> {
        self.tables().map(|_| ())
    }
}

/// Denylist that records revocations but reports an outage on demand.
#[derive(Clone, Default)]
pub struct FlakyDenylist {
    revoked: Arc<Mutex<HashSet<Uuid>>>,
    failing: Arc<AtomicBool>,
    failing_writes: Arc<AtomicBool>,
}

impl FlakyDenylist {
    /// Fail every call.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Fail only `revoke`; lookups keep working.
    pub fn set_failing_writes(&self, failing: bool) {
        self.failing_writes.store(failing, Ordering::SeqCst);
    }

    fn check(&self, flag: &AtomicBool) -> Result<(), AppError> {
        if self.failing.load(Ordering::SeqCst) || flag.load(Ordering::SeqCst) {
            Err(AppError::DatabaseError("denylist unreachable".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl TokenDenylist for FlakyDenylist {
    async fn revoke(&self, jti: Uuid, _expires_at: DateTime<Utc>) -> Result<(), AppError> {
        self.check(&self.failing_writes)?;
        self.revoked.lock().unwrap().insert(jti);
        Ok(())
    }

    async fn is_revoked(&self, jti: Uuid) -> Result<bool, AppError> {
        self.check(&self.failing)?;
        Ok(self.revoked.lock().unwrap().contains(&jti))
    }
}
