use anyhow::{Context, Result};
use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    Client, StatusCode,
};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

use crate::{
    client::offline_catalog,
    config::AppConfig,
    models::{Game, ListParams},
    store::CatalogSource,
};

/// Number of entries served by the featured listing.
pub const FEATURED_COUNT: usize = 6;

/// Failure raised by a single upstream call, before fallback handling.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure: connect, timeout, or body read/decode.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// Upstream answered with a non-success status.
    #[error("upstream returned {0}")]
    Status(StatusCode),
}

#[derive(Debug, Deserialize)]
struct ListEnvelope {
    #[serde(default)]
    data: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct ItemEnvelope {
    #[serde(default)]
    data: Option<Value>,
}

/// Client for the upstream game catalog API.
///
/// Every public operation resolves even when the upstream is unreachable:
/// a failed call is logged and answered from the offline dataset, so the
/// caller always has something to render. There are no retries and no
/// backoff; a single failure degrades immediately.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: Client,
    base_url: String,
}

impl CatalogClient {
    /// Build a client from configuration. The API key travels in the
    /// `x-api-key` header on every request; an empty key omits the header.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if !config.api_key.is_empty() {
            let mut key = HeaderValue::from_str(&config.api_key)
                .context("API key is not a valid header value")?;
            key.set_sensitive(true);
            headers.insert("x-api-key", key);
        }

        let http = Client::builder()
            .default_headers(headers)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Full catalog listing. Serves the offline dataset on any failure.
    pub async fn list_games(&self, params: &ListParams) -> Vec<Game> {
        match self.fetch_games(params).await {
            Ok(games) => games,
            Err(err) => {
                log_fetch_error("games listing", &err);
                offline_catalog()
            }
        }
    }

    /// Featured subset: a listing with a page-size hint, truncated to
    /// [`FEATURED_COUNT`] entries on both the live and fallback paths.
    pub async fn list_featured_games(&self) -> Vec<Game> {
        let params = ListParams::with_page_size(FEATURED_COUNT as u32);
        let mut games = match self.fetch_games(&params).await {
            Ok(games) => games,
            Err(err) => {
                log_fetch_error("featured listing", &err);
                offline_catalog()
            }
        };
        games.truncate(FEATURED_COUNT);
        games
    }

    /// Single game lookup. `None` when the upstream has no such record;
    /// on failure the offline dataset is searched for a matching id.
    pub async fn game_by_id(&self, id: i64) -> Option<Game> {
        match self.fetch_game(id).await {
            Ok(game) => game,
            Err(err) => {
                log_fetch_error("game lookup", &err);
                offline_catalog().into_iter().find(|game| game.id == id)
            }
        }
    }

    /// Client-side search over the full listing. The upstream API has no
    /// search endpoint, so the catalog is fetched and filtered here on
    /// name or slug, case-insensitively. On failure the offline dataset
    /// is filtered by name only.
    pub async fn search_games(&self, query: &str) -> Vec<Game> {
        let needle = query.to_lowercase();
        match self.fetch_games(&ListParams::default()).await {
            Ok(games) => games
                .into_iter()
                .filter(|game| {
                    game.name.to_lowercase().contains(&needle)
                        || game.slug.to_lowercase().contains(&needle)
                })
                .collect(),
            Err(err) => {
                log_fetch_error("game search", &err);
                offline_catalog()
                    .into_iter()
                    .filter(|game| game.name.to_lowercase().contains(&needle))
                    .collect()
            }
        }
    }

    async fn fetch_games(&self, params: &ListParams) -> Result<Vec<Game>, FetchError> {
        let url = format!("{}/games", self.base_url);
        debug!(%url, "GET catalog listing");
        let response = self.http.get(&url).query(params).send().await?;
        let response = check_status(response)?;
        let envelope: ListEnvelope = response.json().await?;
        Ok(envelope.data.into_iter().map(Game::from_raw).collect())
    }

    async fn fetch_game(&self, id: i64) -> Result<Option<Game>, FetchError> {
        let url = format!("{}/games/{id}", self.base_url);
        debug!(%url, "GET game record");
        let response = self.http.get(&url).send().await?;
        let response = check_status(response)?;
        let envelope: ItemEnvelope = response.json().await?;
        Ok(envelope.data.map(Game::from_raw))
    }
}

impl CatalogSource for CatalogClient {
    async fn list_games(&self, params: ListParams) -> Result<Vec<Game>> {
        Ok(CatalogClient::list_games(self, &params).await)
    }

    async fn list_featured_games(&self) -> Result<Vec<Game>> {
        Ok(CatalogClient::list_featured_games(self).await)
    }

    async fn game_by_id(&self, id: i64) -> Result<Option<Game>> {
        Ok(CatalogClient::game_by_id(self, id).await)
    }
}

fn check_status(response: reqwest::Response) -> Result<reqwest::Response, FetchError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(FetchError::Status(status))
    }
}

fn log_fetch_error(operation: &str, err: &FetchError) {
    if let FetchError::Status(status) = err {
        if *status == StatusCode::UNAUTHORIZED {
            error!(operation, "authentication failed: check your API key; serving offline data");
            return;
        }
        if *status == StatusCode::TOO_MANY_REQUESTS {
            error!(operation, "rate limit exceeded; serving offline data");
            return;
        }
    }
    error!(operation, %err, "catalog request failed; serving offline data");
}
