pub mod service;
pub mod types;

pub use service::MediaService;
pub use types::UploadFile;
