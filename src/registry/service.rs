// SPDX-License-Identifier: GPL-3.0-only
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::registry::errors::{ConflictError, RegistryError};
use crate::store::{Page, PageRequest, SpotInput, SpotRecord, SpotStore, StoreError};

/// Uniqueness-checked operations over parking spot registrations.
///
/// Holds no state besides the store handle. The store's unique constraints
/// are authoritative: the pre-checks here only decide which conflict gets
/// reported (license plate, then spot number, then apartment/block), and a
/// unique violation raised by a concurrent writer after the pre-checks is
/// mapped into the same conflict.
#[derive(Clone)]
pub struct SpotRegistry {
    store: Arc<dyn SpotStore>,
}

impl SpotRegistry {
    pub fn new(store: Arc<dyn SpotStore>) -> Self {
        Self { store }
    }

    /// Register a new spot
    pub async fn create(&self, input: SpotInput) -> Result<SpotRecord, RegistryError> {
        let record = SpotRecord::new(input);
        self.ensure_unique(&record, None).await?;

        let stored = match self.store.insert(&record).await {
            Ok(stored) => stored,
            Err(e) => return Err(self.write_failure(e, &record, None).await),
        };

        info!(spot_id = %stored.id, spot_number = %stored.spot_number, "Spot registered");
        Ok(stored)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<SpotRecord, RegistryError> {
        self.store
            .get_by_id(id)
            .await?
            .ok_or(RegistryError::NotFound { id })
    }

    /// Every spot, ascending by ID
    pub async fn find_all(&self) -> Result<Vec<SpotRecord>, RegistryError> {
        Ok(self.store.get_all().await?)
    }

    pub async fn find_all_paged(
        &self,
        request: PageRequest,
    ) -> Result<Page<SpotRecord>, RegistryError> {
        let (content, total) = self
            .store
            .get_page(request.offset(), request.size, request.sort)
            .await?;
        Ok(Page::new(content, &request, total))
    }

    /// Replace the mutable fields of an existing spot.
    /// The spot's own current values never count as a conflict.
    pub async fn update(&self, id: Uuid, input: SpotInput) -> Result<SpotRecord, RegistryError> {
        let mut record = self.find_by_id(id).await?;
        record.apply(input);
        self.ensure_unique(&record, Some(id)).await?;

        let stored = match self.store.update(&record).await {
            Ok(stored) => stored,
            Err(e) => return Err(self.write_failure(e, &record, Some(id)).await),
        };

        info!(spot_id = %id, "Spot updated");
        Ok(stored)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), RegistryError> {
        self.find_by_id(id).await?;

        // Another request may have removed it since the lookup
        if !self.store.delete_by_id(id).await? {
            return Err(RegistryError::NotFound { id });
        }

        info!(spot_id = %id, "Spot deleted");
        Ok(())
    }

    /// Another writer committed a key after the pre-checks ran. Checking again
    /// reports its conflict in the usual precedence, falling back to the
    /// violated constraint when the re-check comes back clean.
    async fn write_failure(
        &self,
        err: StoreError,
        record: &SpotRecord,
        excluding: Option<Uuid>,
    ) -> RegistryError {
        if !matches!(err, StoreError::UniqueViolation(_)) {
            return RegistryError::from_write(err, record);
        }

        match self.ensure_unique(record, excluding).await {
            Err(conflict @ RegistryError::Conflict(_)) => conflict,
            _ => RegistryError::from_write(err, record),
        }
    }

    async fn ensure_unique(
        &self,
        record: &SpotRecord,
        excluding: Option<Uuid>,
    ) -> Result<(), RegistryError> {
        let conflict = if self
            .store
            .exists_by_license_plate(&record.license_plate, excluding)
            .await?
        {
            ConflictError::LicensePlateInUse {
                license_plate: record.license_plate.clone(),
            }
        } else if self
            .store
            .exists_by_spot_number(&record.spot_number, excluding)
            .await?
        {
            ConflictError::SpotNumberInUse {
                spot_number: record.spot_number.clone(),
            }
        } else if self
            .store
            .exists_by_apartment_and_block(&record.apartment, &record.block, excluding)
            .await?
        {
            ConflictError::ApartmentBlockInUse {
                apartment: record.apartment.clone(),
                block: record.block.clone(),
            }
        } else {
            return Ok(());
        };

        warn!(conflict = %conflict, "Rejected spot mutation");
        Err(conflict.into())
    }
}
