//! Tests against a fresh in-memory database per case.

mod auth;
mod patients;

use jsonwebtoken::{DecodingKey, EncodingKey};
use sqlx::{migrate, sqlite::SqlitePoolOptions, SqlitePool};

use crate::{
    config::{Config, DefaultAdmin},
    models::{PatientInput, Sex},
};

/// A fully migrated in-memory database.
///
/// One connection only: every pooled connection would otherwise get its own
/// private in-memory database.
pub(crate) async fn test_pool() -> SqlitePool {
    let db = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("cannot open in-memory database");

    migrate!("./migrations")
        .run(&db)
        .await
        .expect("migrations failed");

    db
}

pub(crate) fn test_config() -> Config {
    Config {
        listen: "127.0.0.1:0".parse().unwrap(),
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: (
            EncodingKey::from_secret(b"test secret"),
            DecodingKey::from_secret(b"test secret"),
        ),
        default_admin: DefaultAdmin {
            username: "admin".to_string(),
            password: "admin123".to_string(),
        },
    }
}

pub(crate) fn sample_patient() -> PatientInput {
    PatientInput {
        name: "Jean Dupont".to_string(),
        age: 45,
        sex: Sex::Male,
        phone: "0712345678".to_string(),
        weight: 82.5,
        height: 178.0,
    }
}
