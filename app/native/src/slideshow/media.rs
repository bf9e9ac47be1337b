//! Media entries and playlist filters.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Kind of media a catalog entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    /// A still image.
    Image,
    /// A video clip.
    Video,
    /// A web page.
    Html,
    /// An animated GIF.
    Gif,
    /// An interactive application.
    Application,
}

impl MediaType {
    /// All media types in declaration order.
    pub const ALL: [Self; 5] = [Self::Image, Self::Video, Self::Html, Self::Gif, Self::Application];

    /// Classifies a file extension (case-insensitive, without the dot).
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" | "png" | "bmp" | "webp" | "tif" | "tiff" | "heic" => Some(Self::Image),
            "gif" => Some(Self::Gif),
            "mp4" | "m4v" | "mkv" | "webm" | "mov" | "avi" | "wmv" => Some(Self::Video),
            "html" | "htm" => Some(Self::Html),
            "exe" | "app" | "appimage" => Some(Self::Application),
            _ => None,
        }
    }

    /// Returns the lowercase name used in config files and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Html => "html",
            Self::Gif => "gif",
            Self::Application => "application",
        }
    }

    /// Whether the entry can be applied as a static desktop background.
    #[must_use]
    pub const fn is_still(self) -> bool { matches!(self, Self::Image | Self::Gif) }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim())).ok_or_else(
            || format!("Invalid media type '{s}'. Use image, video, html, gif or application"),
        )
    }
}

/// A single item of the media catalog.
///
/// Entries are immutable once loaded; only the catalog creates or removes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaEntry {
    /// Unique identifier within the catalog.
    pub id: String,
    /// Location of the media on disk.
    pub path: PathBuf,
    /// Kind of media.
    #[serde(rename = "type")]
    pub media_type: MediaType,
    /// Display name.
    pub name: String,
    /// Free-form tags.
    pub tags: BTreeSet<String>,
}

impl MediaEntry {
    /// Creates an untagged entry.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        path: impl Into<PathBuf>,
        media_type: MediaType,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            media_type,
            name: name.into(),
            tags: BTreeSet::new(),
        }
    }

    /// Returns the entry with the given tags added.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }
}

/// Playlist filter. All present criteria must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Filter {
    /// Only entries of this media type.
    #[serde(rename = "type")]
    pub media_type: Option<MediaType>,

    /// Only entries carrying this tag (case-insensitive).
    pub tag: Option<String>,

    /// Only entries whose name or any tag contains this text (case-insensitive).
    pub keyword: Option<String>,
}

impl Filter {
    /// Returns whether the filter lets every entry through.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.media_type.is_none() && self.tag().is_none() && self.keyword().is_none()
    }

    /// Returns whether `entry` satisfies every criterion.
    #[must_use]
    pub fn matches(&self, entry: &MediaEntry) -> bool {
        if self.media_type.is_some_and(|kind| kind != entry.media_type) {
            return false;
        }

        if let Some(tag) = self.tag()
            && !entry.tags.iter().any(|candidate| candidate.eq_ignore_ascii_case(tag))
        {
            return false;
        }

        if let Some(keyword) = self.keyword() {
            let keyword = keyword.to_lowercase();
            let in_name = entry.name.to_lowercase().contains(&keyword);
            let in_tags = entry.tags.iter().any(|tag| tag.to_lowercase().contains(&keyword));
            if !in_name && !in_tags {
                return false;
            }
        }

        true
    }

    fn tag(&self) -> Option<&str> { non_blank(self.tag.as_deref()) }

    fn keyword(&self) -> Option<&str> { non_blank(self.keyword.as_deref()) }
}

/// Blank criteria count as absent.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
