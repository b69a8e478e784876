//! Postgres store tests. They need a running Postgres reachable with the
//! settings in `configuration.yaml`, so they are ignored by default:
//! `cargo test -- --ignored`

use fintrack::configuration::{get_configuration, DatabaseSettings};
use fintrack::error::DatabaseError;
use fintrack::store::{NewUser, PgUserStore, UserStore};
use sqlx::{Connection, Executor, PgConnection, PgPool};
use std::sync::Arc;

pub async fn configure_database(config: &DatabaseSettings) -> PgPool {
    // Create database
    let mut connection = PgConnection::connect(&config.connection_string_without_db())
        .await
        .expect("Failed to connect to Postgres");
    connection
        .execute(&*format!(r#"CREATE DATABASE "{}";"#, config.database_name))
        .await
        .expect("Failed to create database.");
    // Migrate database
    let connection_pool = PgPool::connect(&config.connection_string())
        .await
        .expect("Failed to connect to Postgres.");
    sqlx::migrate!("./migrations")
        .run(&connection_pool)
        .await
        .expect("Failed to migrate the database.");
    connection_pool
}

async fn spawn_store() -> PgUserStore {
    let mut configuration = get_configuration().expect("Failed to read configuration.");
    configuration.database.database_name = uuid::Uuid::new_v4().to_string();
    PgUserStore::new(configure_database(&configuration.database).await)
}

fn new_user(email: &str) -> NewUser {
    NewUser {
        name: "A".to_string(),
        email: email.to_string(),
        password_hash: "$2b$04$notarealdigestbutlongenoughtostore".to_string(),
        currency: "USD".to_string(),
    }
}

#[tokio::test]
#[ignore]
async fn create_then_find_by_email_and_id() {
    let store = spawn_store().await;

    let created = store.create(new_user("a@x.com")).await.expect("Failed to create user");

    let by_email = store
        .find_by_email("a@x.com")
        .await
        .expect("Query failed")
        .expect("User missing");
    assert_eq!(by_email.id, created.id);
    assert_eq!(by_email.password_hash, created.password_hash);

    let by_id = store
        .find_by_id(created.id)
        .await
        .expect("Query failed")
        .expect("User missing");
    assert_eq!(by_id.email, "a@x.com");
    assert_eq!(by_id.currency, "USD");

    assert!(store.find_by_email("A@x.com").await.unwrap().is_none());
}

#[tokio::test]
#[ignore]
async fn unique_index_rejects_duplicate_email() {
    let store = spawn_store().await;

    store.create(new_user("a@x.com")).await.expect("Failed to create user");
    let result = store.create(new_user("a@x.com")).await;

    assert!(matches!(result, Err(DatabaseError::DuplicateEmail)));
}

#[tokio::test]
#[ignore]
async fn concurrent_creates_only_one_wins() {
    let store = Arc::new(spawn_store().await);

    let mut handles = Vec::new();
    for _ in 0..10 {
        let store = store.clone();
        handles.push(tokio::spawn(async move { store.create(new_user("race@x.com")).await }));
    }

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(DatabaseError::DuplicateEmail) => (),
            Err(e) => panic!("unexpected error: {}", e),
        }
    }
    assert_eq!(successes, 1);
}
