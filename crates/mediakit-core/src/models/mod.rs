pub mod media;
pub mod query;

pub use media::{
    Dimensions, MediaMetadata, MediaRecord, MediaType, NewMediaRecord, Placement, Thumbnail,
};
pub use query::{
    BulkResult, MediaFilter, MediaPatch, PagedResult, Pagination, DEFAULT_PAGE_LIMIT,
    MAX_PAGE_LIMIT,
};
