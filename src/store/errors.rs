// SPDX-License-Identifier: GPL-3.0-only
use thiserror::Error;
use uuid::Uuid;

/// Business key guarded by a unique constraint in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueKey {
    LicensePlate,
    SpotNumber,
    ApartmentBlock,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Unique constraint violated on {0:?}")]
    UniqueViolation(UniqueKey),

    #[error("Spot {0} does not exist")]
    RowNotFound(Uuid),

    #[error("Corrupt spot row: {0}")]
    Decode(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
