use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use testcontainers::core::{ContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage, ImageExt};

use rentcar_core::models::{NewCar, NewUser, Transmission};
use rentcar_db::Database;

/// Spin up a PostgreSQL container, run the workspace migrations, and return
/// the migrated database plus the container handle (drop it to stop).
pub async fn setup_test_db() -> (Database, ContainerAsync<GenericImage>) {
    let container = GenericImage::new("postgres", "16")
        .with_exposed_port(ContainerPort::Tcp(5432))
        .with_wait_for(WaitFor::message_on_stderr(
            "database system is ready to accept connections",
        ))
        .with_env_var("POSTGRES_PASSWORD", "postgres")
        .with_env_var("POSTGRES_DB", "rentcar_test")
        .start()
        .await
        .expect("Failed to start PostgreSQL container");

    let host = container.get_host().await.expect("Failed to get host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("Failed to get port");

    let url = format!("postgresql://postgres:postgres@{host}:{port}/rentcar_test");
    let db = Database::from_pool(retry_connect(&url).await);
    db.migrate().await.expect("Failed to run migrations");

    (db, container)
}

async fn retry_connect(url: &str) -> PgPool {
    for _ in 0..30 {
        if let Ok(pool) = PgPoolOptions::new().max_connections(5).connect(url).await {
            return pool;
        }
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    }
    panic!("Failed to connect to test database");
}

pub fn new_user(email: &str) -> NewUser {
    NewUser {
        email: email.to_string(),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
        name: "Budi".to_string(),
        phone_number: "081234567890".to_string(),
        address: "Jl. Asia Afrika 8, Bandung".to_string(),
        role_id: 2,
    }
}

pub fn new_car(type_id: i32, status_id: i32) -> NewCar {
    NewCar {
        name: "Toyota Avanza".to_string(),
        year: 2022,
        plate_number: "D 1234 ABC".to_string(),
        type_id,
        passenger_capacity: 7,
        daily_rate: 350_000,
        photo_url: None,
        status_id,
        transmission: Transmission::Manual,
    }
}
