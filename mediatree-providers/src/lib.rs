//! mediatree provider clients
//!
//! Pure HTTP client for Emby/Jellyfin media servers. The client knows nothing
//! about navigation or caching; mediatree-core adapts it to its `ItemSource`
//! trait.

pub mod emby;

pub use emby::EmbyClient;
pub use emby::error::EmbyError;
