#![forbid(unsafe_code)]

pub mod app_services;
pub mod cache;
pub mod error;
pub mod remote;
pub mod store_service;
pub mod sync;

pub use tracker_core::Clock;

pub use app_services::{AppServices, Backend};
pub use cache::{DerivedProgress, LocalCache, Selection};
pub use error::{AppServicesError, CacheError, RemoteError, SyncError};
pub use remote::{HttpRemoteStore, RemoteStore};
pub use store_service::StoreService;
pub use sync::{LoadStatus, Notice, NoticeLevel, SyncController, SyncOutcome};
