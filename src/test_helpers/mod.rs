// SPDX-License-Identifier: GPL-3.0-only
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::Arc;

use crate::config::Config;
use crate::registry::SpotRegistry;
use crate::store::{SpotInput, SqliteSpotStore};

/// Create an in-memory SQLite store for testing.
///
/// A single connection that is never recycled, otherwise every new
/// connection would see its own empty database.
pub async fn setup_test_store() -> SqliteSpotStore {
    let options = SqliteConnectOptions::from_str("sqlite::memory:").expect("valid sqlite url");
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .expect("Failed to open in-memory database");

    SqliteSpotStore::from_pool(pool)
        .await
        .expect("Failed to initialize schema")
}

pub async fn setup_test_registry() -> SpotRegistry {
    SpotRegistry::new(Arc::new(setup_test_store().await))
}

/// Input whose business keys are all derived from `n`, so distinct `n`
/// never collide
pub fn sample_input(n: u32) -> SpotInput {
    SpotInput {
        spot_number: format!("A-{:03}", n),
        license_plate: format!("ABC{:04}", n),
        brand: "Volkswagen".to_string(),
        model: "Gol".to_string(),
        color: "Silver".to_string(),
        responsible_name: format!("Resident {}", n),
        apartment: format!("{}", 100 + n),
        block: format!("B{}", n),
    }
}

/// Create a test configuration with a temporary database path
pub fn create_test_config() -> Config {
    let temp_dir = std::env::temp_dir().join(format!("parking-test-{}", uuid::Uuid::new_v4()));

    Config {
        database_path: temp_dir.join("test_parking.db"),
        log_level: "error".to_string(), // Reduce log noise in tests
        ..Config::default()
    }
}
