//! Shared domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Description shown when the upstream record carries none.
pub const DEFAULT_SUMMARY: &str = "No description available.";

/// Artwork path used when the upstream record has no usable image.
pub const PLACEHOLDER_IMAGE: &str = "/placeholder-game.jpg";

/// A catalog entry normalized from an upstream record.
///
/// Every field is always populated: missing upstream data resolves to a
/// documented default during [`Game::from_raw`], never to an absent value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    /// Unique identifier from the source catalog.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// URL-safe identifier.
    pub slug: String,
    /// Free-text description.
    pub summary: String,
    /// Icon artwork reference.
    pub logo_url: String,
    /// Cover artwork reference.
    pub cover_url: String,
    /// Category label. A constant for live records; the upstream taxonomy
    /// is not queried.
    pub category: String,
    /// Last-modified timestamp, falling back to creation time.
    pub created_at: DateTime<Utc>,
    /// Public site derived from the slug.
    pub website_url: String,
    /// Upstream status code, opaque to this application.
    pub status: i64,
    /// Upstream API status code, opaque to this application.
    pub api_status: i64,
    /// Original unnormalized upstream record, retained for traceability.
    /// `Null` for offline entries, which have no upstream record.
    #[serde(default)]
    pub raw: Value,
}

impl Game {
    /// Normalize one upstream record into the application shape.
    ///
    /// Total by contract: a missing or malformed field resolves to its
    /// documented default rather than failing the whole record.
    pub fn from_raw(raw: Value) -> Self {
        let record: RawGame = serde_json::from_value(raw.clone()).unwrap_or_default();
        let assets = record.assets.unwrap_or_default();
        let slug = non_empty(record.slug).unwrap_or_default();
        let tile = non_empty(assets.tile_url);

        Self {
            id: record.id,
            name: non_empty(record.name).unwrap_or_default(),
            summary: non_empty(record.summary).unwrap_or_else(|| DEFAULT_SUMMARY.to_string()),
            logo_url: non_empty(assets.icon_url)
                .or_else(|| tile.clone())
                .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
            cover_url: non_empty(assets.cover_url)
                .or(tile)
                .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
            category: "Game".to_string(),
            created_at: record
                .date_modified
                .or(record.date_created)
                .unwrap_or_else(Utc::now),
            website_url: format!("https://www.curseforge.com/{slug}"),
            slug,
            status: record.status.unwrap_or(0),
            api_status: record.api_status.unwrap_or(0),
            raw,
        }
    }
}

/// Optional query parameters for a catalog listing call, serialized
/// camelCase into the request query string.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    /// Zero-based offset into the upstream listing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    /// Upstream page-size hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl ListParams {
    /// Listing parameters carrying only a page-size hint.
    pub fn with_page_size(size: u32) -> Self {
        Self {
            index: None,
            page_size: Some(size),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawGame {
    id: i64,
    name: Option<String>,
    slug: Option<String>,
    summary: Option<String>,
    assets: Option<RawAssets>,
    date_modified: Option<DateTime<Utc>>,
    date_created: Option<DateTime<Utc>>,
    status: Option<i64>,
    api_status: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawAssets {
    icon_url: Option<String>,
    tile_url: Option<String>,
    cover_url: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}
