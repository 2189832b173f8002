//! [`ProviderPort`] implementation over the Challonge v1 REST API
//! (spec.md §4.1, §7), grounded on `db_postgres`'s adapter shape (a single
//! struct wrapping a pooled client, `#[instrument]`'d public methods, and a
//! private `map_*_err` translating the backend's error vocabulary into the
//! port's error type).

use crate::config::ChallongeConfig;
use crate::wire::{
    MatchEnvelope, MatchUpdateEnvelope, MatchUpdateWire, ParticipantCreateEnvelope,
    ParticipantCreateWire, ParticipantEnvelope, TournamentEnvelope,
};
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use std::time::Duration;
use tournament_core::errors::ProviderError;
use tournament_core::ports::provider::{
    ProviderPort, ProviderResult, RemoteMatch, RemoteParticipant, RemoteTournamentInfo,
};
use tournament_core::RemoteId;
use tracing::{instrument, warn};

/// small fixed backoff before the single retry attempt (spec.md §7: "retry
/// once after a small backoff").
const RETRY_BACKOFF: Duration = Duration::from_millis(500);

pub struct ChallongeProvider {
    client: reqwest::Client,
    config: ChallongeConfig,
}

impl ChallongeProvider {
    pub fn new(config: ChallongeConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/tournaments/{}/{}", self.config.base_url, self.config.tournament, path)
    }

    fn authed(&self, rb: RequestBuilder) -> RequestBuilder {
        rb.basic_auth(&self.config.username, Some(&self.config.api_key))
    }

    /// sends `rb`, retrying once after [`RETRY_BACKOFF`] if the first
    /// attempt came back with a gateway-class (>=500) status (spec.md §7).
    async fn execute(&self, rb: RequestBuilder) -> ProviderResult<Response> {
        let retry_rb = rb.try_clone();
        let resp = rb
            .send()
            .await
            .map_err(|e| ProviderError::new(0, e.to_string()))?;

        if resp.status().is_server_error() {
            if let Some(retry_rb) = retry_rb {
                warn!(status = %resp.status(), "challonge request failed, retrying once");
                tokio::time::sleep(RETRY_BACKOFF).await;
                let resp = retry_rb
                    .send()
                    .await
                    .map_err(|e| ProviderError::new(0, e.to_string()))?;
                return Self::finish(resp).await;
            }
        }
        Self::finish(resp).await
    }

    async fn finish(resp: Response) -> ProviderResult<Response> {
        let status = resp.status();
        if status.is_success() {
            Ok(resp)
        } else {
            let message = resp.text().await.unwrap_or_default();
            Err(ProviderError::new(status.as_u16(), message))
        }
    }

    async fn decode<T: serde::de::DeserializeOwned>(resp: Response) -> ProviderResult<T> {
        resp.json()
            .await
            .map_err(|e| ProviderError::new(0, format!("invalid response body: {e}")))
    }
}

#[async_trait]
impl ProviderPort for ChallongeProvider {
    #[instrument(name = "challonge.show_tournament", skip(self))]
    async fn show_tournament(&self, tournament_ref: &str) -> ProviderResult<RemoteTournamentInfo> {
        let url = format!("{}/tournaments/{}.json", self.config.base_url, tournament_ref);
        let resp = self.execute(self.authed(self.client.get(url))).await?;
        let env: TournamentEnvelope = Self::decode(resp).await?;
        Ok(env.tournament.into())
    }

    #[instrument(name = "challonge.start_tournament", skip(self))]
    async fn start_tournament(&self) -> ProviderResult<()> {
        let url = self.url("start.json");
        self.execute(self.authed(self.client.post(url))).await?;
        Ok(())
    }

    #[instrument(name = "challonge.finalize_tournament", skip(self))]
    async fn finalize_tournament(&self) -> ProviderResult<()> {
        let url = self.url("finalize.json");
        self.execute(self.authed(self.client.post(url))).await?;
        Ok(())
    }

    #[instrument(name = "challonge.reset_tournament", skip(self))]
    async fn reset_tournament(&self) -> ProviderResult<()> {
        let url = self.url("reset.json");
        self.execute(self.authed(self.client.post(url))).await?;
        Ok(())
    }

    #[instrument(name = "challonge.list_participants", skip(self))]
    async fn list_participants(&self) -> ProviderResult<Vec<RemoteParticipant>> {
        let url = self.url("participants.json");
        let resp = self.execute(self.authed(self.client.get(url))).await?;
        let envs: Vec<ParticipantEnvelope> = Self::decode(resp).await?;
        Ok(envs.into_iter().map(|e| e.participant.into()).collect())
    }

    #[instrument(name = "challonge.create_participant", skip(self))]
    async fn create_participant(&self, name: &str, seed: u32) -> ProviderResult<RemoteId> {
        let url = self.url("participants.json");
        let body = ParticipantCreateEnvelope {
            participant: ParticipantCreateWire { name, seed },
        };
        let resp = self
            .execute(self.authed(self.client.post(url)).json(&body))
            .await?;
        let env: ParticipantEnvelope = Self::decode(resp).await?;
        Ok(RemoteId::new(env.participant.id.to_string()))
    }

    #[instrument(name = "challonge.destroy_participant", skip(self))]
    async fn destroy_participant(&self, id: &RemoteId) -> ProviderResult<()> {
        let url = self.url(&format!("participants/{id}.json"));
        self.execute(self.authed(self.client.delete(url))).await?;
        Ok(())
    }

    #[instrument(name = "challonge.list_matches", skip(self))]
    async fn list_matches(&self) -> ProviderResult<Vec<RemoteMatch>> {
        let url = self.url("matches.json");
        let resp = self.execute(self.authed(self.client.get(url))).await?;
        let envs: Vec<MatchEnvelope> = Self::decode(resp).await?;
        Ok(envs.into_iter().map(|e| e.match_.into()).collect())
    }

    #[instrument(name = "challonge.update_match", skip(self))]
    async fn update_match(
        &self,
        id: &RemoteId,
        scores_csv: &str,
        winner_id: &RemoteId,
    ) -> ProviderResult<()> {
        let url = self.url(&format!("matches/{id}.json"));
        let winner_id = winner_id.to_string();
        let body = MatchUpdateEnvelope {
            match_: MatchUpdateWire {
                scores_csv,
                winner_id: &winner_id,
            },
        };
        self.execute(self.authed(self.client.put(url)).json(&body))
            .await?;
        Ok(())
    }

    #[instrument(name = "challonge.mark_match_underway", skip(self))]
    async fn mark_match_underway(&self, id: &RemoteId) -> ProviderResult<()> {
        let url = self.url(&format!("matches/{id}/mark_as_underway.json"));
        self.execute(self.authed(self.client.post(url))).await?;
        Ok(())
    }

    #[instrument(name = "challonge.unmark_match_underway", skip(self))]
    async fn unmark_match_underway(&self, id: &RemoteId) -> ProviderResult<()> {
        let url = self.url(&format!("matches/{id}/unmark_as_underway.json"));
        self.execute(self.authed(self.client.post(url))).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> ChallongeProvider {
        ChallongeProvider::new(ChallongeConfig::new("user", "key", "my_event"))
    }

    #[test]
    fn builds_tournament_scoped_urls() {
        let p = provider();
        assert_eq!(
            p.url("matches.json"),
            "https://api.challonge.com/v1/tournaments/my_event/matches.json"
        );
    }

    #[test]
    fn builds_nested_resource_urls() {
        let p = provider();
        let id = RemoteId::new("42");
        assert_eq!(
            p.url(&format!("matches/{id}/mark_as_underway.json")),
            "https://api.challonge.com/v1/tournaments/my_event/matches/42/mark_as_underway.json"
        );
    }
}
