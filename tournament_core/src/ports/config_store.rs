//! `ConfigStorePort`: provides and persists a tournament's settings
//! snapshot and serialized runtime state (spec.md §1, §6).
//!
//! The engine does not own general-purpose persistence (Non-goals); this
//! port is still a named interface rather than a hand-rolled stand-in,
//! grounded on `app_core::ports::database::DatabasePort`'s shape.

use crate::config::TournamentConfig;
use crate::snapshot::TournamentSnapshot;
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Error)]
pub enum ConfigStoreError {
    #[error("not found")]
    NotFound,
    #[error("backing store error: {0}")]
    Other(String),
}

pub type ConfigStoreResult<T> = Result<T, ConfigStoreError>;

impl From<anyhow::Error> for ConfigStoreError {
    fn from(e: anyhow::Error) -> Self {
        ConfigStoreError::Other(e.to_string())
    }
}

#[async_trait]
pub trait ConfigStorePort: Send + Sync {
    async fn load_settings(&self, tournament_guild_id: Uuid) -> ConfigStoreResult<TournamentConfig>;
    async fn save_settings(
        &self,
        tournament_guild_id: Uuid,
        config: &TournamentConfig,
    ) -> ConfigStoreResult<()>;

    async fn load_snapshot(
        &self,
        tournament_guild_id: Uuid,
    ) -> ConfigStoreResult<Option<TournamentSnapshot>>;
    async fn save_snapshot(
        &self,
        tournament_guild_id: Uuid,
        snapshot: &TournamentSnapshot,
    ) -> ConfigStoreResult<()>;
}
