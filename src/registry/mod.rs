// SPDX-License-Identifier: GPL-3.0-only
pub mod errors;
pub mod service;

pub use errors::{ConflictKind, RegistryError};
pub use service::SpotRegistry;
