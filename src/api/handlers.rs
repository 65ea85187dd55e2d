// SPDX-License-Identifier: GPL-3.0-only
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::config::Config;
use crate::registry::SpotRegistry;
use crate::store::{Page, PageRequest, Sort, SortDirection, SortKey, SpotInput, SpotRecord};
use crate::validation::validate_spot_input;

/// Listing query string: `?page=0&size=10&sort=id,asc` or `?unpaged=true`
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub sort: Option<String>,
    #[serde(default)]
    pub unpaged: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

pub struct ApiHandlers {
    registry: SpotRegistry,
    default_page_size: u32,
    max_page_size: u32,
}

impl ApiHandlers {
    pub fn new(registry: SpotRegistry, config: &Config) -> Self {
        Self {
            registry,
            default_page_size: config.default_page_size,
            max_page_size: config.max_page_size,
        }
    }
}

impl ApiHandlers {
    pub async fn health() -> Json<ApiResponse<&'static str>> {
        Json(ApiResponse::success("ok"))
    }

    pub async fn list_spots(&self, params: PageParams) -> Result<Json<Page<SpotRecord>>, ApiError> {
        if params.unpaged {
            let spots = self.registry.find_all().await?;
            return Ok(Json(Page::unpaged(spots)));
        }

        let request = self.page_request(&params)?;
        let page = self.registry.find_all_paged(request).await?;
        Ok(Json(page))
    }

    pub async fn get_spot(&self, id: &str) -> Result<Json<SpotRecord>, ApiError> {
        let id = parse_id(id)?;
        Ok(Json(self.registry.find_by_id(id).await?))
    }

    pub async fn create_spot(
        &self,
        input: SpotInput,
    ) -> Result<(StatusCode, Json<SpotRecord>), ApiError> {
        validate_spot_input(&input)?;

        let spot = self.registry.create(input).await?;
        debug!(spot_id = %spot.id, "Spot created via API");
        Ok((StatusCode::CREATED, Json(spot)))
    }

    pub async fn update_spot(
        &self,
        id: &str,
        input: SpotInput,
    ) -> Result<Json<SpotRecord>, ApiError> {
        let id = parse_id(id)?;
        validate_spot_input(&input)?;

        Ok(Json(self.registry.update(id, input).await?))
    }

    pub async fn delete_spot(&self, id: &str) -> Result<StatusCode, ApiError> {
        let id = parse_id(id)?;
        self.registry.delete(id).await?;
        Ok(StatusCode::NO_CONTENT)
    }

    /// Missing or zero size falls back to the default; oversized pages are clamped
    fn page_request(&self, params: &PageParams) -> Result<PageRequest, ApiError> {
        let size = match params.size {
            None | Some(0) => self.default_page_size,
            Some(size) => size.min(self.max_page_size),
        };
        let sort = match params.sort.as_deref().map(str::trim) {
            None | Some("") => Sort::default(),
            Some(raw) => parse_sort(raw)?,
        };

        Ok(PageRequest::new(params.page.unwrap_or(0), size, sort))
    }
}

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request(format!("Invalid identifier: {}", raw)))
}

/// Parse `field` or `field,direction`, where field is a JSON field name
fn parse_sort(raw: &str) -> Result<Sort, ApiError> {
    let (field, direction) = match raw.split_once(',') {
        Some((field, direction)) => (field.trim(), direction.trim()),
        None => (raw, ""),
    };

    let key = SortKey::from_field(field)
        .ok_or_else(|| ApiError::bad_request(format!("Unknown sort property: {}", field)))?;
    let direction = if direction.is_empty() {
        SortDirection::Asc
    } else {
        SortDirection::parse(direction)
            .ok_or_else(|| ApiError::bad_request(format!("Unknown sort direction: {}", direction)))?
    };

    Ok(Sort { key, direction })
}
