// SPDX-License-Identifier: GPL-3.0-only
pub mod errors;
pub mod models;
pub mod traits;
pub mod sqlite;

pub use errors::{StoreError, UniqueKey};
pub use models::{Page, PageRequest, Sort, SortDirection, SortKey, SpotInput, SpotRecord};
pub use traits::SpotStore;
pub use sqlite::SqliteSpotStore;
