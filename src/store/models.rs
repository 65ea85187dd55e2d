// SPDX-License-Identifier: GPL-3.0-only
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Mutable part of a parking spot registration, as submitted by clients.
///
/// Missing JSON fields deserialize to empty strings so that validation can
/// report them as blank instead of failing the whole body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotInput {
    #[serde(rename = "parkingSpotNumber")]
    pub spot_number: String,

    #[serde(rename = "licensePlateCar")]
    pub license_plate: String,

    #[serde(rename = "brandCar")]
    pub brand: String,

    #[serde(rename = "modelCar")]
    pub model: String,

    #[serde(rename = "colorCar")]
    pub color: String,

    #[serde(rename = "responsibleName")]
    pub responsible_name: String,

    pub apartment: String,

    pub block: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotRecord {
    /// Generated at creation, never changes
    pub id: Uuid,

    /// Unique among all records
    #[serde(rename = "parkingSpotNumber")]
    pub spot_number: String,

    /// Unique among all records, at most 7 characters
    #[serde(rename = "licensePlateCar")]
    pub license_plate: String,

    #[serde(rename = "brandCar")]
    pub brand: String,

    #[serde(rename = "modelCar")]
    pub model: String,

    #[serde(rename = "colorCar")]
    pub color: String,

    #[serde(rename = "responsibleName")]
    pub responsible_name: String,

    /// Unique together with `block`
    pub apartment: String,

    pub block: String,

    /// Registration timestamp, set once at creation
    #[serde(rename = "registrationDate")]
    pub registered_at: DateTime<Utc>,
}

impl SpotRecord {
    /// Build a fresh record with a new id, registered now.
    ///
    /// The timestamp is truncated to microseconds, the precision the store
    /// keeps, so a stored record compares equal to the one returned here.
    pub fn new(input: SpotInput) -> Self {
        Self::with_identity(Uuid::new_v4(), Utc::now().trunc_subsecs(6), input)
    }

    pub fn with_identity(id: Uuid, registered_at: DateTime<Utc>, input: SpotInput) -> Self {
        Self {
            id,
            spot_number: input.spot_number,
            license_plate: input.license_plate,
            brand: input.brand,
            model: input.model,
            color: input.color,
            responsible_name: input.responsible_name,
            apartment: input.apartment,
            block: input.block,
            registered_at,
        }
    }

    /// Replace every mutable field. `id` and `registered_at` are kept.
    pub fn apply(&mut self, input: SpotInput) {
        *self = Self::with_identity(self.id, self.registered_at, input);
    }

    /// The mutable fields of this record as an input.
    #[cfg(test)]
    pub fn to_input(&self) -> SpotInput {
        SpotInput {
            spot_number: self.spot_number.clone(),
            license_plate: self.license_plate.clone(),
            brand: self.brand.clone(),
            model: self.model.clone(),
            color: self.color.clone(),
            responsible_name: self.responsible_name.clone(),
            apartment: self.apartment.clone(),
            block: self.block.clone(),
        }
    }
}

/// Field a listing can be ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Id,
    SpotNumber,
    LicensePlate,
    Brand,
    Model,
    Color,
    ResponsibleName,
    Apartment,
    Block,
    RegisteredAt,
}

impl SortKey {
    /// Resolve a sort key from its JSON field name
    pub fn from_field(field: &str) -> Option<Self> {
        let key = match field {
            "id" => SortKey::Id,
            "parkingSpotNumber" => SortKey::SpotNumber,
            "licensePlateCar" => SortKey::LicensePlate,
            "brandCar" => SortKey::Brand,
            "modelCar" => SortKey::Model,
            "colorCar" => SortKey::Color,
            "responsibleName" => SortKey::ResponsibleName,
            "apartment" => SortKey::Apartment,
            "block" => SortKey::Block,
            "registrationDate" => SortKey::RegisteredAt,
            _ => return None,
        };
        Some(key)
    }

    /// Column backing this key. Only these names ever reach an ORDER BY.
    pub fn column(self) -> &'static str {
        match self {
            SortKey::Id => "id",
            SortKey::SpotNumber => "spot_number",
            SortKey::LicensePlate => "license_plate",
            SortKey::Brand => "brand",
            SortKey::Model => "model",
            SortKey::Color => "color",
            SortKey::ResponsibleName => "responsible_name",
            SortKey::Apartment => "apartment",
            SortKey::Block => "block",
            SortKey::RegisteredAt => "registered_at",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sort {
    pub key: SortKey,
    pub direction: SortDirection,
}

/// Offset pagination request: zero-based page index and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort: Sort,
}

impl PageRequest {
    pub fn new(page: u32, size: u32, sort: Sort) -> Self {
        Self { page, size: size.max(1), sort }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }
}

/// One page of results plus the totals clients need to navigate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u64,
    pub number: u32,
    pub size: u32,
    pub number_of_elements: usize,
    pub first: bool,
    pub last: bool,
    pub empty: bool,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        let size = u64::from(request.size);
        let total_pages = if size == 0 { 0 } else { total_elements.div_ceil(size) };
        let number = request.page;
        Self {
            number_of_elements: content.len(),
            empty: content.is_empty(),
            first: number == 0,
            last: u64::from(number) + 1 >= total_pages,
            content,
            total_elements,
            total_pages,
            number,
            size: request.size,
        }
    }

    /// A single page holding every element
    pub fn unpaged(content: Vec<T>) -> Self {
        let total = content.len() as u64;
        Self {
            number_of_elements: content.len(),
            empty: content.is_empty(),
            first: true,
            last: true,
            size: u32::try_from(content.len()).unwrap_or(u32::MAX),
            content,
            total_elements: total,
            total_pages: 1,
            number: 0,
        }
    }
}
