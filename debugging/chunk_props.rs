//! Fetch one chunk of MyAnimeList ids from AniList and print each record's fields.
//! Usage:
//!   cargo run --bin chunk_props -- <mal_id> [<mal_id> ...]
//! ANILIST_ENDPOINT overrides the API URL (.env supported).

use anime_finder::anilist::{AniListClient, ANILIST_ENDPOINT, MAX_PER_PAGE};
use anime_finder::catalog::card::{format_popularity, format_score};
use anime_finder::logging::init_tracing;
use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use tracing::{info, warn};

fn usage() -> ! {
    eprintln!("Usage: cargo run --bin chunk_props -- <mal_id> [<mal_id> ...]");
    std::process::exit(2);
}

fn parse_args() -> Result<Vec<i32>> {
    let ids = env::args()
        .skip(1)
        .map(|raw| {
            raw.parse::<i32>()
                .with_context(|| format!("not a MyAnimeList id: {raw}"))
        })
        .collect::<Result<Vec<_>>>()?;
    if ids.is_empty() || ids.len() > MAX_PER_PAGE {
        usage();
    }
    Ok(ids)
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenv();
    init_tracing();

    let ids = parse_args()?;
    let endpoint = env::var("ANILIST_ENDPOINT").unwrap_or_else(|_| ANILIST_ENDPOINT.to_string());
    info!("AniList fetch: {} ids from {}", ids.len(), endpoint);

    let client = AniListClient::with_endpoint(endpoint)?;
    let records = client.fetch_page_by_mal_ids(&ids).await?;
    if records.len() < ids.len() {
        warn!("{} of {} ids came back", records.len(), ids.len());
    }

    for record in &records {
        info!("--- {} ---", record.display_title());
        info!("id: {}", record.id);
        info!("id_mal: {:?}", record.id_mal);
        if let Some(title) = &record.title {
            info!("romaji: {}", title.romaji.as_deref().unwrap_or("<none>"));
            info!("english: {}", title.english.as_deref().unwrap_or("<none>"));
        }
        info!("year: {:?}", record.year());
        info!("format: {}", record.format.as_deref().unwrap_or("<none>"));
        info!("episodes: {:?}", record.episodes);
        info!("score: {}", format_score(record.average_score));
        info!("popularity: {}", format_popularity(record.popularity));
        info!("genres: {:?}", record.genres());
        info!("color: {}", record.accent_color().unwrap_or("<none>"));
        for edge in record.relation_edges() {
            let kind = edge.relation_type.as_ref().map_or("<none>", |k| k.as_str());
            match &edge.node {
                Some(node) => info!(
                    "relation: {} -> {} ({})",
                    kind,
                    node.id,
                    node.media_type.as_deref().unwrap_or("?")
                ),
                None => info!("relation: {} -> <no node>", kind),
            }
        }
        info!(
            "franchise links: {:?}",
            record.franchise_links().collect::<Vec<_>>()
        );
    }
    Ok(())
}
