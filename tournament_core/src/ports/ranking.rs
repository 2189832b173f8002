//! `RankingPort`: downloads a ranked CSV for seeding (spec.md §1, §4.5).

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum RankingFetchError {
    #[error("ranking source unavailable: {0}")]
    Unavailable(String),
}

pub type RankingFetchResult<T> = Result<T, RankingFetchError>;

/// fetches one page of a paginated ranking CSV mapping player-name to
/// integer points. The engine pages `1..=N` and stops early when a page is
/// byte-identical to the previous one (spec.md §4.5, §8).
#[async_trait]
pub trait RankingPort: Send + Sync {
    async fn fetch_ranking_page(
        &self,
        league_id: &str,
        page: u32,
    ) -> RankingFetchResult<String>;
}
