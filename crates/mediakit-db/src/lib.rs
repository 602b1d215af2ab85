//! Media metadata persistence.
//!
//! [`MediaStore`] is the document-store contract. [`PgMediaStore`] persists to
//! PostgreSQL and [`MemoryMediaStore`] keeps records in process. Callers go through
//! [`MediaRepository`], which makes the soft-delete visibility rule explicit:
//! `find_active` for user-facing reads, `find_any` for administrative ones.

pub mod memory;
pub mod pg;
pub mod repository;
pub mod store;

pub use memory::MemoryMediaStore;
pub use pg::PgMediaStore;
pub use repository::MediaRepository;
pub use store::{MediaStore, Visibility};
