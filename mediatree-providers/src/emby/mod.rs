//! Emby/Jellyfin client

pub mod client;
pub mod error;
pub mod types;

pub use client::{build_http_client, DeviceInfo, EmbyClient};
pub use error::EmbyError;
pub use types::{Item, ItemsQuery, SystemInfo, UserData};
