use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use super::AniListError;
use crate::models::AnimeRecord;

pub const ANILIST_ENDPOINT: &str = "https://graphql.anilist.co";

/// AniList caps `perPage` at 50, which bounds the chunk size.
pub const MAX_PER_PAGE: usize = 50;

const MAX_ERROR_BODY_CHARS: usize = 300;

// Keep this query stable and explicit; the snapshot schema is whatever it selects.
const DUBBED_PAGE_QUERY: &str = r#"
query ($page: Int, $perPage: Int, $idMal_in: [Int]) {
  Page(page: $page, perPage: $perPage) {
    pageInfo { hasNextPage }
    media(type: ANIME, idMal_in: $idMal_in, sort: POPULARITY_DESC, isAdult: false) {
      id
      idMal
      title { romaji english }
      coverImage { large color }
      startDate { year }
      episodes
      averageScore
      popularity
      genres
      description(asHtml: false)
      format
      relations {
        edges {
          relationType
          node { id idMal type title { romaji english } coverImage { large } startDate { year } episodes averageScore popularity }
        }
      }
    }
  }
}
"#;

#[derive(Debug, Clone)]
pub struct AniListClient {
    client: Client,
    endpoint: String,
}

impl AniListClient {
    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self> {
        let user_agent = format!("anime-finder/{}", env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .user_agent(user_agent)
            .build()
            .context("Failed to build AniList HTTP client")?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetches the first page of non-adult anime whose MAL id is in `mal_ids`.
    pub async fn fetch_page_by_mal_ids(
        &self,
        mal_ids: &[i32],
    ) -> Result<Vec<AnimeRecord>, AniListError> {
        #[derive(Deserialize)]
        struct GraphQlResponse<T> {
            data: Option<T>,
            errors: Option<Vec<GraphQlError>>,
        }

        #[derive(Deserialize)]
        struct GraphQlError {
            message: String,
            status: Option<i32>,
        }

        #[derive(Deserialize)]
        struct Data {
            #[serde(rename = "Page")]
            page: Option<Page>,
        }

        #[derive(Deserialize)]
        struct Page {
            media: Option<Vec<AnimeRecord>>,
        }

        let body = json!({
            "query": DUBBED_PAGE_QUERY,
            "variables": { "page": 1, "perPage": MAX_PER_PAGE, "idMal_in": mal_ids }
        });

        let res = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AniListError::RateLimited);
        }

        let bytes = res.bytes().await?;
        if !status.is_success() {
            return Err(AniListError::Http {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes)
                    .chars()
                    .take(MAX_ERROR_BODY_CHARS)
                    .collect(),
            });
        }

        let parsed: GraphQlResponse<Data> = serde_json::from_slice(&bytes)?;
        if let Some(errors) = parsed.errors.filter(|e| !e.is_empty()) {
            let msg = errors
                .into_iter()
                .map(|e| match e.status {
                    Some(s) => format!("{} (status {})", e.message, s),
                    None => e.message,
                })
                .collect::<Vec<_>>()
                .join("; ");
            return Err(AniListError::GraphQl(msg));
        }

        Ok(parsed
            .data
            .and_then(|d| d.page)
            .and_then(|p| p.media)
            .unwrap_or_default())
    }
}
