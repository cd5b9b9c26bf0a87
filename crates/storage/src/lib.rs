#![forbid(unsafe_code)]

pub mod document;
pub mod json_file;
pub mod repository;

pub use document::{Layout, StudyDocument};
pub use json_file::JsonFileRepository;
pub use repository::{InMemoryRepository, Storage, StorageError, StudyRepository};
