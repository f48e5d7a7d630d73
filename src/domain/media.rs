//! Photos and videos attached to a business listing.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use serde::Deserialize;

use crate::domain::types::MediaUrl;

/// Kind of media a form field accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Repeated multipart key under which new files of this kind are sent.
    pub const fn multipart_key(self) -> &'static str {
        match self {
            MediaKind::Image => "photos[]",
            MediaKind::Video => "videos[]",
        }
    }

    /// Human label used in field messages.
    pub const fn label(self) -> &'static str {
        match self {
            MediaKind::Image => "photo",
            MediaKind::Video => "video",
        }
    }
}

/// A file selected or dropped by the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaFile {
    pub name: String,
    pub mime: String,
    pub data: Bytes,
}

impl MediaFile {
    #[must_use]
    pub fn new(name: impl Into<String>, mime: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into().to_lowercase(),
            data: data.into(),
        }
    }

    /// Size of the binary in bytes.
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Allocator of revocable, local preview handles (object URLs).
pub trait PreviewRegistry: Send + Sync {
    /// Allocates a fresh preview URL for the binary.
    fn create(&self, file: &MediaFile) -> String;
    /// Releases a previously allocated preview URL.
    fn revoke(&self, url: &str);
}

/// Preview URL owned by exactly one new [`MediaItem`].
///
/// The handle is not `Clone`; dropping it revokes the URL, so a URL is
/// released exactly once whether the item is removed, the batch turns out to
/// be stale, or the whole form is discarded.
pub struct PreviewUrl {
    url: String,
    registry: Arc<dyn PreviewRegistry>,
}

impl PreviewUrl {
    /// Allocates a preview for `file` from `registry`.
    pub fn allocate(registry: &Arc<dyn PreviewRegistry>, file: &MediaFile) -> Self {
        Self {
            url: registry.create(file),
            registry: Arc::clone(registry),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }
}

impl Drop for PreviewUrl {
    fn drop(&mut self) {
        self.registry.revoke(&self.url);
    }
}

impl fmt::Debug for PreviewUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PreviewUrl").field(&self.url).finish()
    }
}

/// One attached photo or video.
#[derive(Debug)]
pub enum MediaItem {
    /// Added in this session; carries the (possibly compressed) binary.
    New {
        file: MediaFile,
        preview: PreviewUrl,
        valid: bool,
    },
    /// Already persisted by the backend and known by URL only.
    Existing { url: MediaUrl },
}

impl MediaItem {
    pub fn is_new(&self) -> bool {
        matches!(self, MediaItem::New { .. })
    }

    /// Existing items are always valid; new ones carry the size verdict.
    pub fn is_valid(&self) -> bool {
        match self {
            MediaItem::New { valid, .. } => *valid,
            MediaItem::Existing { .. } => true,
        }
    }

    /// URL the UI renders for this item.
    pub fn display_url(&self) -> &str {
        match self {
            MediaItem::New { preview, .. } => preview.as_str(),
            MediaItem::Existing { url } => url.as_str(),
        }
    }

    pub fn file(&self) -> Option<&MediaFile> {
        match self {
            MediaItem::New { file, .. } => Some(file),
            MediaItem::Existing { .. } => None,
        }
    }
}

/// What happens to a file that breaks the size or format rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OversizePolicy {
    /// Keep the file in the batch but mark it invalid.
    Flag,
    /// Leave the file out of the batch entirely.
    Exclude,
}

/// Size and format rules for one media field.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct MediaPolicy {
    pub kind: MediaKind,
    /// Upper bound in bytes, checked after compression for images.
    pub max_bytes: u64,
    /// Accepted MIME types; `type/*` entries match a whole family.
    pub accepted_mime: Vec<String>,
    pub oversize: OversizePolicy,
    /// Whether at least one item must remain attached.
    pub required: bool,
}

const MB: u64 = 1024 * 1024;

impl MediaPolicy {
    /// Photos: compressed, kept but flagged when still too large.
    pub fn photos() -> Self {
        Self {
            kind: MediaKind::Image,
            max_bytes: 5 * MB,
            accepted_mime: vec!["image/*".to_string()],
            oversize: OversizePolicy::Flag,
            required: true,
        }
    }

    /// Videos: never compressed, excluded from the batch when rejected.
    pub fn videos() -> Self {
        Self {
            kind: MediaKind::Video,
            max_bytes: 50 * MB,
            accepted_mime: vec![
                "video/mp4".to_string(),
                "video/webm".to_string(),
                "video/quicktime".to_string(),
            ],
            oversize: OversizePolicy::Exclude,
            required: false,
        }
    }

    pub fn accepts_mime(&self, mime: &str) -> bool {
        let mime = mime.to_lowercase();
        self.accepted_mime.iter().any(|accepted| {
            match accepted.strip_suffix("/*") {
                Some(family) => mime
                    .split_once('/')
                    .is_some_and(|(prefix, _)| prefix == family),
                None => accepted == &mime,
            }
        })
    }

    pub fn within_size(&self, file: &MediaFile) -> bool {
        file.size() <= self.max_bytes
    }

    /// Limit in whole megabytes for messages.
    pub fn max_megabytes(&self) -> u64 {
        self.max_bytes / MB
    }
}

/// Generation stamp of a media field, captured when a batch starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchTicket(pub(crate) u64);

/// Files processed off the form state, waiting to be committed.
#[derive(Debug)]
pub struct PreparedBatch {
    pub kind: MediaKind,
    pub ticket: BatchTicket,
    pub items: Vec<MediaItem>,
    /// Names of files left out of `items`.
    pub rejected: Vec<String>,
    /// Names of files kept in `items` but marked invalid.
    pub flagged: Vec<String>,
    /// Field message describing `rejected` and `flagged`, if any.
    pub error: Option<String>,
}
