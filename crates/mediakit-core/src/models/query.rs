//! Query, patch and result shapes for media listing and lifecycle operations.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::media::{MediaType, Placement};

pub const DEFAULT_PAGE_LIMIT: u64 = 20;
pub const MAX_PAGE_LIMIT: u64 = 100;

/// Conjunctive filter over media records.
///
/// `is_active: Some(true)` is the default visibility. `None` matches records in any
/// state and is reserved for administrative reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaFilter {
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub field_name: Option<String>,
    pub uploaded_by: Option<String>,
    #[serde(rename = "type")]
    pub media_type: Option<MediaType>,
    pub is_active: Option<bool>,
}

impl Default for MediaFilter {
    fn default() -> Self {
        Self::active()
    }
}

impl MediaFilter {
    /// Filter matching only active records.
    pub fn active() -> Self {
        Self {
            entity_type: None,
            entity_id: None,
            field_name: None,
            uploaded_by: None,
            media_type: None,
            is_active: Some(true),
        }
    }

    /// Filter matching records regardless of soft-delete state.
    pub fn any() -> Self {
        Self {
            is_active: None,
            ..Self::active()
        }
    }

    /// Active records attached to one owner, optionally narrowed to one field.
    pub fn for_placement(entity_type: &str, entity_id: &str, field_name: Option<&str>) -> Self {
        Self {
            entity_type: Some(entity_type.to_string()),
            entity_id: Some(entity_id.to_string()),
            field_name: field_name.map(str::to_string),
            ..Self::active()
        }
    }

    pub fn with_placement(mut self, placement: &Placement) -> Self {
        self.entity_type = Some(placement.entity_type.clone());
        self.entity_id = Some(placement.entity_id.clone());
        self.field_name = Some(placement.field_name.clone());
        self
    }

    pub fn with_uploaded_by(mut self, uploaded_by: impl Into<String>) -> Self {
        self.uploaded_by = Some(uploaded_by.into());
        self
    }

    pub fn with_media_type(mut self, media_type: MediaType) -> Self {
        self.media_type = Some(media_type);
        self
    }

    pub fn with_active(mut self, is_active: Option<bool>) -> Self {
        self.is_active = is_active;
        self
    }
}

/// Partial update of record status flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaPatch {
    pub is_active: Option<bool>,
    pub is_processed: Option<bool>,
}

impl MediaPatch {
    pub fn deactivate() -> Self {
        Self {
            is_active: Some(false),
            is_processed: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.is_active.is_none() && self.is_processed.is_none()
    }
}

/// Offset-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl Pagination {
    /// Page numbers start at 1; the limit is clamped to `1..=MAX_PAGE_LIMIT`.
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_PAGE_LIMIT),
        }
    }

    /// Records before this page, saturating at `i64::MAX` (the largest OFFSET
    /// Postgres accepts).
    pub fn skip(&self) -> u64 {
        self.page
            .saturating_sub(1)
            .saturating_mul(self.limit)
            .min(i64::MAX as u64)
    }
}

/// One page of results plus totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> PagedResult<T> {
    pub fn new(data: Vec<T>, total: u64, pagination: Pagination) -> Self {
        Self {
            data,
            total,
            page: pagination.page,
            limit: pagination.limit,
            total_pages: total.div_ceil(pagination.limit),
        }
    }
}

/// Outcome of a bulk lifecycle operation. Unknown ids land in `failed`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkResult {
    pub deleted: u64,
    pub failed: Vec<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_is_active_only() {
        assert_eq!(MediaFilter::default().is_active, Some(true));
        assert_eq!(MediaFilter::any().is_active, None);
    }

    #[test]
    fn test_pagination_clamps_and_skips() {
        let p = Pagination::new(0, 0);
        assert_eq!(p.page, 1);
        assert_eq!(p.limit, 1);
        assert_eq!(p.skip(), 0);

        let p = Pagination::new(3, 10);
        assert_eq!(p.skip(), 20);

        let p = Pagination::new(2, 1000);
        assert_eq!(p.limit, MAX_PAGE_LIMIT);
    }

    #[test]
    fn test_pagination_skip_saturates_for_huge_pages() {
        let p = Pagination::new(u64::MAX, 100);
        assert_eq!(p.skip(), i64::MAX as u64);

        let p = Pagination::new(u64::MAX / 2, MAX_PAGE_LIMIT);
        assert_eq!(p.skip(), i64::MAX as u64);
    }

    #[test]
    fn test_paged_result_total_pages_rounds_up() {
        let page: PagedResult<u8> = PagedResult::new(vec![], 21, Pagination::new(1, 10));
        assert_eq!(page.total_pages, 3);

        let empty: PagedResult<u8> = PagedResult::new(vec![], 0, Pagination::new(1, 10));
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn test_placement_filter_optional_field() {
        let filter = MediaFilter::for_placement("property", "7", None);
        assert_eq!(filter.entity_type.as_deref(), Some("property"));
        assert_eq!(filter.field_name, None);
        assert_eq!(filter.is_active, Some(true));
    }
}
