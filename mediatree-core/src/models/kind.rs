//! Classification of raw server items into navigation kinds

use std::sync::Arc;

use super::{ItemId, RawItem};

/// What a navigation node represents.
///
/// Every variant except `Root` and `Unknown` carries the raw item it was
/// classified from. The payload is shared and never mutated; fresher detail
/// replaces the whole kind.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Root,
    Movie(Arc<RawItem>),
    Video(Arc<RawItem>),
    MusicVideo(Arc<RawItem>),
    Episode(Arc<RawItem>),
    Series(Arc<RawItem>),
    Season(Arc<RawItem>),
    Collection(Arc<RawItem>),
    BoxSet(Arc<RawItem>),
    Unknown,
}

/// Classify a raw item. `None` is the library root.
///
/// Total and pure: an unrecognised or missing type tag yields `Unknown`.
#[must_use]
pub fn classify(raw: Option<&RawItem>) -> NodeKind {
    let Some(raw) = raw else {
        return NodeKind::Root;
    };
    let item = || Arc::new(raw.clone());

    match raw.item_type.to_ascii_lowercase().as_str() {
        "movie" => NodeKind::Movie(item()),
        "video" => NodeKind::Video(item()),
        "musicvideo" => NodeKind::MusicVideo(item()),
        "episode" => NodeKind::Episode(item()),
        "series" => NodeKind::Series(item()),
        "season" => NodeKind::Season(item()),
        "boxset" => NodeKind::BoxSet(item()),
        "collectionfolder" | "userview" | "folder" | "playlist" => NodeKind::Collection(item()),
        _ => NodeKind::Unknown,
    }
}

impl NodeKind {
    /// The raw item behind this kind, if any.
    #[must_use]
    pub fn raw(&self) -> Option<&Arc<RawItem>> {
        match self {
            Self::Movie(raw)
            | Self::Video(raw)
            | Self::MusicVideo(raw)
            | Self::Episode(raw)
            | Self::Series(raw)
            | Self::Season(raw)
            | Self::Collection(raw)
            | Self::BoxSet(raw) => Some(raw),
            Self::Root | Self::Unknown => None,
        }
    }

    #[must_use]
    pub fn item_id(&self) -> Option<ItemId> {
        self.raw().map(|raw| ItemId::from(raw.id.as_str()))
    }

    /// Kinds whose children are listed through the loader.
    #[must_use]
    pub const fn is_container(&self) -> bool {
        matches!(
            self,
            Self::Root | Self::Series(_) | Self::Season(_) | Self::Collection(_) | Self::BoxSet(_)
        )
    }

    /// Playable kinds. Their playback detail is fetched separately, never as children.
    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        matches!(
            self,
            Self::Movie(_) | Self::Episode(_) | Self::Video(_) | Self::MusicVideo(_)
        )
    }

    /// Whether the collection only holds movies (listed recursively).
    #[must_use]
    pub fn is_movie_collection(&self) -> bool {
        match self {
            Self::Collection(raw) => raw
                .collection_type
                .as_deref()
                .is_some_and(|ct| ct.eq_ignore_ascii_case("movies")),
            _ => false,
        }
    }

    /// Whether the item lacks the fields shown on a detail screen.
    #[must_use]
    pub fn lacks_display_detail(&self) -> bool {
        self.raw().is_some_and(|raw| {
            raw.overview.as_deref().is_none_or(str::is_empty) || raw.image_tags.is_empty()
        })
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Movie(_) => "movie",
            Self::Video(_) => "video",
            Self::MusicVideo(_) => "music video",
            Self::Episode(_) => "episode",
            Self::Series(_) => "series",
            Self::Season(_) => "season",
            Self::Collection(_) => "collection",
            Self::BoxSet(_) => "box set",
            Self::Unknown => "unknown",
        }
    }
}
