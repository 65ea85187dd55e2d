// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::path::Path;
use tracing::{debug, info};
use uuid::Uuid;

use crate::store::{
    errors::{StoreError, UniqueKey},
    models::{Sort, SpotRecord},
    traits::SpotStore,
};

const TABLE: &str = "parking_spots";

pub struct SqliteSpotStore {
    pool: SqlitePool,
}

impl SqliteSpotStore {
    /// Open (creating if missing) the database file and make sure the schema exists
    pub async fn new(db_path: &Path, max_connections: u32) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> anyhow::Result<Self> {
        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> anyhow::Result<()> {
        // The unique constraints are the source of truth for the business keys
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS parking_spots (
                id TEXT PRIMARY KEY,
                spot_number TEXT NOT NULL,
                license_plate TEXT NOT NULL,
                brand TEXT NOT NULL,
                model TEXT NOT NULL,
                color TEXT NOT NULL,
                responsible_name TEXT NOT NULL,
                apartment TEXT NOT NULL,
                block TEXT NOT NULL,
                registered_at TEXT NOT NULL,
                CONSTRAINT uq_spot_number UNIQUE (spot_number),
                CONSTRAINT uq_license_plate UNIQUE (license_plate),
                CONSTRAINT uq_apartment_block UNIQUE (apartment, block)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        info!("Initialized SQLite spot store schema");
        Ok(())
    }

    fn spot_from_row(row: &SqliteRow) -> Result<SpotRecord, StoreError> {
        let raw_id: String = row.try_get("id")?;
        let id = Uuid::parse_str(&raw_id)
            .map_err(|e| StoreError::Decode(format!("invalid id '{}': {}", raw_id, e)))?;

        let raw_registered_at: String = row.try_get("registered_at")?;
        let registered_at = DateTime::parse_from_rfc3339(&raw_registered_at)
            .map_err(|e| {
                StoreError::Decode(format!(
                    "invalid registered_at '{}' for spot {}: {}",
                    raw_registered_at, id, e
                ))
            })?
            .with_timezone(&Utc);

        Ok(SpotRecord {
            id,
            spot_number: row.try_get("spot_number")?,
            license_plate: row.try_get("license_plate")?,
            brand: row.try_get("brand")?,
            model: row.try_get("model")?,
            color: row.try_get("color")?,
            responsible_name: row.try_get("responsible_name")?,
            apartment: row.try_get("apartment")?,
            block: row.try_get("block")?,
            registered_at,
        })
    }

    fn spots_from_rows(rows: &[SqliteRow]) -> Result<Vec<SpotRecord>, StoreError> {
        rows.iter().map(Self::spot_from_row).collect()
    }
}

/// Fixed-width RFC 3339 so that text order matches time order
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Classify a failed write, pulling unique violations on business keys out
/// of the generic database error.
fn map_write_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            if let Some(key) = unique_key_from_message(db_err.message()) {
                return StoreError::UniqueViolation(key);
            }
        }
    }
    StoreError::Database(err)
}

/// SQLite reports e.g. `UNIQUE constraint failed: parking_spots.apartment, parking_spots.block`
fn unique_key_from_message(message: &str) -> Option<UniqueKey> {
    let (_, columns) = message.split_once("UNIQUE constraint failed:")?;
    let columns: Vec<&str> = columns
        .split(',')
        .map(|column| column.trim().rsplit('.').next().unwrap_or_default())
        .collect();

    match columns.as_slice() {
        ["license_plate"] => Some(UniqueKey::LicensePlate),
        ["spot_number"] => Some(UniqueKey::SpotNumber),
        ["apartment", "block"] => Some(UniqueKey::ApartmentBlock),
        _ => None,
    }
}

#[async_trait]
impl SpotStore for SqliteSpotStore {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<SpotRecord>, StoreError> {
        let row = sqlx::query("SELECT * FROM parking_spots WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::spot_from_row).transpose()
    }

    async fn get_all(&self) -> Result<Vec<SpotRecord>, StoreError> {
        let rows = sqlx::query("SELECT * FROM parking_spots ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;

        Self::spots_from_rows(&rows)
    }

    async fn get_page(
        &self,
        offset: u64,
        limit: u32,
        sort: Sort,
    ) -> Result<(Vec<SpotRecord>, u64), StoreError> {
        let query = format!(
            "SELECT * FROM {} ORDER BY {} {}, id ASC LIMIT ?1 OFFSET ?2",
            TABLE,
            sort.key.column(),
            sort.direction.as_sql()
        );

        // Count and window come from the same read snapshot
        let mut tx = self.pool.begin().await?;
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM parking_spots")
            .fetch_one(&mut *tx)
            .await?;
        let rows = sqlx::query(&query)
            .bind(i64::from(limit))
            .bind(i64::try_from(offset).unwrap_or(i64::MAX))
            .fetch_all(&mut *tx)
            .await?;
        tx.commit().await?;

        let spots = Self::spots_from_rows(&rows)?;
        Ok((spots, u64::try_from(total).unwrap_or_default()))
    }

    async fn exists_by_license_plate(
        &self,
        license_plate: &str,
        excluding: Option<Uuid>,
    ) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM parking_spots WHERE license_plate = ?1 AND (?2 IS NULL OR id <> ?2))",
        )
        .bind(license_plate)
        .bind(excluding.map(|id| id.to_string()))
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn exists_by_spot_number(
        &self,
        spot_number: &str,
        excluding: Option<Uuid>,
    ) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM parking_spots WHERE spot_number = ?1 AND (?2 IS NULL OR id <> ?2))",
        )
        .bind(spot_number)
        .bind(excluding.map(|id| id.to_string()))
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn exists_by_apartment_and_block(
        &self,
        apartment: &str,
        block: &str,
        excluding: Option<Uuid>,
    ) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM parking_spots
                WHERE apartment = ?1 AND block = ?2 AND (?3 IS NULL OR id <> ?3)
            )
            "#,
        )
        .bind(apartment)
        .bind(block)
        .bind(excluding.map(|id| id.to_string()))
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn insert(&self, record: &SpotRecord) -> Result<SpotRecord, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO parking_spots (id, spot_number, license_plate, brand, model, color, responsible_name, apartment, block, registered_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(record.id.to_string())
        .bind(&record.spot_number)
        .bind(&record.license_plate)
        .bind(&record.brand)
        .bind(&record.model)
        .bind(&record.color)
        .bind(&record.responsible_name)
        .bind(&record.apartment)
        .bind(&record.block)
        .bind(format_timestamp(&record.registered_at))
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        debug!(spot_id = %record.id, spot_number = %record.spot_number, "Inserted spot");
        Ok(record.clone())
    }

    async fn update(&self, record: &SpotRecord) -> Result<SpotRecord, StoreError> {
        // registered_at is never rewritten
        let result = sqlx::query(
            r#"
            UPDATE parking_spots
            SET spot_number = ?2, license_plate = ?3, brand = ?4, model = ?5, color = ?6, responsible_name = ?7, apartment = ?8, block = ?9
            WHERE id = ?1
            "#,
        )
        .bind(record.id.to_string())
        .bind(&record.spot_number)
        .bind(&record.license_plate)
        .bind(&record.brand)
        .bind(&record.model)
        .bind(&record.color)
        .bind(&record.responsible_name)
        .bind(&record.apartment)
        .bind(&record.block)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::RowNotFound(record.id));
        }

        debug!(spot_id = %record.id, "Updated spot");
        Ok(record.clone())
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM parking_spots WHERE id = ?1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        let removed = result.rows_affected() > 0;
        if removed {
            debug!(spot_id = %id, "Deleted spot");
        } else {
            debug!(spot_id = %id, "Delete matched no spot");
        }
        Ok(removed)
    }
}
