// SPDX-License-Identifier: GPL-3.0-only
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::store::{SpotRecord, StoreError, UniqueKey};

/// Discriminant of a conflict, for callers that must branch on it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictKind {
    LicensePlateInUse,
    SpotNumberInUse,
    ApartmentBlockInUse,
}

/// A mutation that would break one of the uniqueness invariants
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConflictError {
    #[error("License Plate Car {license_plate} is already in use")]
    LicensePlateInUse { license_plate: String },

    #[error("Parking Spot {spot_number} is already in use")]
    SpotNumberInUse { spot_number: String },

    #[error("Parking Spot already registered for apartment {apartment} and block {block}")]
    ApartmentBlockInUse { apartment: String, block: String },
}

impl ConflictError {
    pub fn kind(&self) -> ConflictKind {
        match self {
            ConflictError::LicensePlateInUse { .. } => ConflictKind::LicensePlateInUse,
            ConflictError::SpotNumberInUse { .. } => ConflictKind::SpotNumberInUse,
            ConflictError::ApartmentBlockInUse { .. } => ConflictKind::ApartmentBlockInUse,
        }
    }

    /// Conflict on `key`, described with the values the record tried to claim
    pub fn for_key(key: UniqueKey, record: &SpotRecord) -> Self {
        match key {
            UniqueKey::LicensePlate => ConflictError::LicensePlateInUse {
                license_plate: record.license_plate.clone(),
            },
            UniqueKey::SpotNumber => ConflictError::SpotNumberInUse {
                spot_number: record.spot_number.clone(),
            },
            UniqueKey::ApartmentBlock => ConflictError::ApartmentBlockInUse {
                apartment: record.apartment.clone(),
                block: record.block.clone(),
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Object with identifier {id} not found.")]
    NotFound { id: Uuid },

    #[error(transparent)]
    Conflict(#[from] ConflictError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RegistryError {
    /// Turn a failed write into the registry taxonomy. Unique violations that
    /// slipped past the pre-checks become conflicts, a row that vanished
    /// becomes not-found.
    pub fn from_write(err: StoreError, record: &SpotRecord) -> Self {
        match err {
            StoreError::UniqueViolation(key) => ConflictError::for_key(key, record).into(),
            StoreError::RowNotFound(id) => RegistryError::NotFound { id },
            other => RegistryError::Store(other),
        }
    }
}
