// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use uuid::Uuid;

use crate::store::errors::StoreError;
use crate::store::models::{Sort, SpotRecord};

/// Persistence operations the spot registry relies on.
///
/// The `excluding` argument of the existence checks names a spot whose own
/// row is ignored, so a spot never collides with itself on update.
#[async_trait]
pub trait SpotStore: Send + Sync {
    /// Get a spot by ID
    async fn get_by_id(&self, id: Uuid) -> Result<Option<SpotRecord>, StoreError>;

    /// List every spot, ordered by ID
    async fn get_all(&self) -> Result<Vec<SpotRecord>, StoreError>;

    /// Fetch one window of spots together with the total spot count
    async fn get_page(
        &self,
        offset: u64,
        limit: u32,
        sort: Sort,
    ) -> Result<(Vec<SpotRecord>, u64), StoreError>;

    async fn exists_by_license_plate(
        &self,
        license_plate: &str,
        excluding: Option<Uuid>,
    ) -> Result<bool, StoreError>;

    async fn exists_by_spot_number(
        &self,
        spot_number: &str,
        excluding: Option<Uuid>,
    ) -> Result<bool, StoreError>;

    async fn exists_by_apartment_and_block(
        &self,
        apartment: &str,
        block: &str,
        excluding: Option<Uuid>,
    ) -> Result<bool, StoreError>;

    /// Insert a new spot.
    /// Fails with `StoreError::UniqueViolation` if a business key is taken.
    async fn insert(&self, record: &SpotRecord) -> Result<SpotRecord, StoreError>;

    /// Overwrite an existing spot.
    /// Fails with `StoreError::RowNotFound` if no row has the record's ID.
    async fn update(&self, record: &SpotRecord) -> Result<SpotRecord, StoreError>;

    /// Delete a spot, returning whether a row was removed
    async fn delete_by_id(&self, id: Uuid) -> Result<bool, StoreError>;
}
