use async_trait::async_trait;

mod client;
mod error;

pub use client::{AniListClient, ANILIST_ENDPOINT, MAX_PER_PAGE};
pub use error::AniListError;

use crate::models::AnimeRecord;

/// The one AniList operation the batch fetcher depends on.
#[async_trait]
pub trait AniListApi: Send + Sync {
    async fn fetch_dubbed_page(&self, mal_ids: &[i32]) -> Result<Vec<AnimeRecord>, AniListError>;
}

#[async_trait]
impl AniListApi for AniListClient {
    async fn fetch_dubbed_page(&self, mal_ids: &[i32]) -> Result<Vec<AnimeRecord>, AniListError> {
        self.fetch_page_by_mal_ids(mal_ids).await
    }
}
