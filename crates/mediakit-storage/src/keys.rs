//! Shared key derivation for storage backends.
//!
//! Key format: `{entityType}/{entityId}/{fieldName}/{fileName}` for the primary object and
//! `{entityType}/{entityId}/{fieldName}/thumbnails/{fileName}` for its thumbnail.

use crate::traits::{StorageError, StorageResult};
use mediakit_core::models::Placement;

const THUMBNAIL_DIR: &str = "thumbnails";

/// Derive the storage key for a generated file name under a placement.
///
/// Each placement segment must be non-empty, limited to `[A-Za-z0-9._@-]` and must
/// not be `.` or contain `..`, which keeps keys of distinct placements disjoint on
/// every backend and in every URL built from them.
pub fn storage_path(placement: &Placement, file_name: &str) -> StorageResult<String> {
    validate_segment("entityType", &placement.entity_type)?;
    validate_segment("entityId", &placement.entity_id)?;
    validate_segment("fieldName", &placement.field_name)?;
    validate_segment("fileName", file_name)?;

    Ok(format!(
        "{}/{}/{}/{}",
        placement.entity_type, placement.entity_id, placement.field_name, file_name
    ))
}

/// Derive the thumbnail key belonging to a primary storage key.
pub fn thumbnail_key(storage_path: &str) -> String {
    match storage_path.rsplit_once('/') {
        Some((dir, file_name)) => format!("{}/{}/{}", dir, THUMBNAIL_DIR, file_name),
        None => format!("{}/{}", THUMBNAIL_DIR, storage_path),
    }
}

fn validate_segment(name: &str, value: &str) -> StorageResult<()> {
    if value.trim().is_empty() {
        return Err(StorageError::InvalidKey(format!("{} must not be empty", name)));
    }
    if value == "." || value.contains("..") {
        return Err(StorageError::InvalidKey(format!(
            "{} must not be a relative path component: {}",
            name, value
        )));
    }
    if !value.chars().all(is_key_char) {
        return Err(StorageError::InvalidKey(format!(
            "{} may only contain ASCII letters, digits, '-', '_', '.' and '@': {}",
            name, value
        )));
    }
    Ok(())
}

/// Characters that pass through object-store keys, URL paths and file names unchanged.
fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_path_layout() {
        let placement = Placement::new("property", "p-17", "gallery");
        assert_eq!(
            storage_path(&placement, "1700000000000-0a1b2c3d.jpg").unwrap(),
            "property/p-17/gallery/1700000000000-0a1b2c3d.jpg"
        );
    }

    #[test]
    fn test_storage_path_distinct_per_placement() {
        let a = storage_path(&Placement::new("user", "1", "avatar"), "f.jpg").unwrap();
        let b = storage_path(&Placement::new("user", "2", "avatar"), "f.jpg").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_storage_path_rejects_unsafe_segments() {
        for placement in [
            Placement::new("user", "../etc", "avatar"),
            Placement::new("user/admin", "1", "avatar"),
            Placement::new("user", "1", ""),
            Placement::new("user", "1\\2", "avatar"),
            Placement::new("user", ".", "avatar"),
        ] {
            assert!(matches!(
                storage_path(&placement, "f.jpg"),
                Err(StorageError::InvalidKey(_))
            ));
        }
    }

    #[test]
    fn test_storage_path_rejects_url_delimiters() {
        for entity_id in ["a?b", "a#b", "a%2Fb", "a b", "a;b", "caf\u{e9}"] {
            let placement = Placement::new("user", entity_id, "avatar");
            assert!(
                matches!(
                    storage_path(&placement, "f.jpg"),
                    Err(StorageError::InvalidKey(_))
                ),
                "accepted {:?}",
                entity_id
            );
        }
    }

    #[test]
    fn test_storage_path_accepts_common_identifiers() {
        let placement = Placement::new("org_unit", "jane.doe@example.com", "cover-photo");
        assert_eq!(
            storage_path(&placement, "f.jpg").unwrap(),
            "org_unit/jane.doe@example.com/cover-photo/f.jpg"
        );
    }

    #[test]
    fn test_thumbnail_key() {
        assert_eq!(
            thumbnail_key("user/1/avatar/f.jpg"),
            "user/1/avatar/thumbnails/f.jpg"
        );
        assert_eq!(thumbnail_key("f.jpg"), "thumbnails/f.jpg");
    }
}
