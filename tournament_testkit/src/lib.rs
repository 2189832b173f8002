//! in-memory mock implementations of the engine's ports, for driving
//! `tournament_core` tests without a real bracket provider, chat layer or
//! config store.
//!
//! Grounded on the `ClientRegistryMock` shape in the teacher's `cr_mock`
//! crate (a plain struct behind `Arc::new`), generalized to carry mutable
//! state behind a `Mutex` since reconciliation tests need the provider's
//! roster and match list to change between calls.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use tournament_core::config::TournamentConfig;
use tournament_core::errors::ProviderError;
use tournament_core::identifiers::{CategoryHandle, ChannelHandle, MatchId, RemoteId, UserRef};
use tournament_core::ports::config_store::{ConfigStoreError, ConfigStorePort, ConfigStoreResult};
use tournament_core::ports::notifier::{
    AnnouncementKind, MatchChannelRoles, MatchNotifyKind, NotifierPort, ToKind, UserNotifyKind,
};
use tournament_core::ports::provider::{
    ProviderPort, ProviderResult, RemoteMatch, RemoteMatchState, RemoteParticipant,
    RemoteTournamentInfo,
};
use tournament_core::ports::ranking::{RankingFetchError, RankingFetchResult, RankingPort};
use tournament_core::snapshot::TournamentSnapshot;

/// in-memory bracket provider. Panics are never used; state is plain
/// `Vec`s behind a `Mutex` so tests can both drive the port and inspect
/// what ended up on the "remote" side afterwards.
#[derive(Default)]
pub struct MockProvider {
    inner: Mutex<MockProviderState>,
}

struct MockProviderState {
    participants: Vec<RemoteParticipant>,
    matches: Vec<RemoteMatch>,
    next_id: u64,
    started: bool,
    finalized: bool,
    reset_count: u32,
    status: String,
    start_at: i64,
}

impl Default for MockProviderState {
    fn default() -> Self {
        Self {
            participants: Vec::new(),
            matches: Vec::new(),
            next_id: 0,
            started: false,
            finalized: false,
            reset_count: 0,
            status: "pending".to_string(),
            start_at: 0,
        }
    }
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// overrides the status/start time [`ProviderPort::show_tournament`]
    /// reports, simulating a bracket an operator already started on the
    /// remote before the engine attached to it.
    pub fn set_tournament_info(&self, status: impl Into<String>, start_at: i64) {
        let mut inner = self.inner.lock().unwrap();
        inner.status = status.into();
        inner.start_at = start_at;
    }

    fn next_remote_id(state: &mut MockProviderState) -> RemoteId {
        state.next_id += 1;
        RemoteId::new(format!("mock-{}", state.next_id))
    }

    /// seeds a remote match directly, bypassing `create_participant`, for
    /// tests that want to simulate an operator editing the bracket
    /// out-of-band before a reconciliation pass.
    pub fn push_match(&self, m: RemoteMatch) {
        self.inner.lock().unwrap().matches.push(m);
    }

    pub fn set_match_state(&self, id: &RemoteId, state: RemoteMatchState) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(m) = inner.matches.iter_mut().find(|m| &m.id == id) {
            m.state = state;
        }
    }

    pub fn remove_participant(&self, id: &RemoteId) {
        let mut inner = self.inner.lock().unwrap();
        inner.participants.retain(|p| &p.id != id);
    }

    pub fn was_started(&self) -> bool {
        self.inner.lock().unwrap().started
    }

    pub fn reset_count(&self) -> u32 {
        self.inner.lock().unwrap().reset_count
    }
}

#[async_trait]
impl ProviderPort for MockProvider {
    async fn show_tournament(&self, tournament_ref: &str) -> ProviderResult<RemoteTournamentInfo> {
        let inner = self.inner.lock().unwrap();
        Ok(RemoteTournamentInfo {
            id: RemoteId::new(tournament_ref),
            name: tournament_ref.to_string(),
            game: "mock".to_string(),
            url: tournament_ref.to_string(),
            limit: None,
            status: inner.status.clone(),
            start_at: inner.start_at,
        })
    }

    async fn start_tournament(&self) -> ProviderResult<()> {
        self.inner.lock().unwrap().started = true;
        Ok(())
    }

    async fn finalize_tournament(&self) -> ProviderResult<()> {
        self.inner.lock().unwrap().finalized = true;
        Ok(())
    }

    async fn reset_tournament(&self) -> ProviderResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.matches.clear();
        inner.started = false;
        inner.reset_count += 1;
        Ok(())
    }

    async fn list_participants(&self) -> ProviderResult<Vec<RemoteParticipant>> {
        Ok(self.inner.lock().unwrap().participants.clone())
    }

    async fn create_participant(&self, name: &str, _seed: u32) -> ProviderResult<RemoteId> {
        let mut inner = self.inner.lock().unwrap();
        let id = Self::next_remote_id(&mut inner);
        inner.participants.push(RemoteParticipant {
            id: id.clone(),
            name: name.to_string(),
            active: true,
        });
        Ok(id)
    }

    async fn destroy_participant(&self, id: &RemoteId) -> ProviderResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.participants.retain(|p| &p.id != id);
        Ok(())
    }

    async fn list_matches(&self) -> ProviderResult<Vec<RemoteMatch>> {
        Ok(self.inner.lock().unwrap().matches.clone())
    }

    async fn update_match(
        &self,
        id: &RemoteId,
        scores_csv: &str,
        winner_id: &RemoteId,
    ) -> ProviderResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let m = inner
            .matches
            .iter_mut()
            .find(|m| &m.id == id)
            .ok_or_else(|| ProviderError::new(404, format!("unknown match {id}")))?;
        m.state = RemoteMatchState::Complete;
        m.scores_csv = Some(scores_csv.to_string());
        m.winner_id = Some(winner_id.clone());
        Ok(())
    }

    async fn mark_match_underway(&self, id: &RemoteId) -> ProviderResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(m) = inner.matches.iter_mut().find(|m| &m.id == id) {
            m.underway_at = Some(0);
        }
        Ok(())
    }

    async fn unmark_match_underway(&self, id: &RemoteId) -> ProviderResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(m) = inner.matches.iter_mut().find(|m| &m.id == id) {
            m.underway_at = None;
        }
        Ok(())
    }
}

/// records every call instead of rendering anything, so tests can assert
/// on what the engine tried to announce.
#[derive(Default)]
pub struct MockNotifier {
    pub announcements: Mutex<Vec<(AnnouncementKind, Value)>>,
    pub to_notifications: Mutex<Vec<(ToKind, Value)>>,
    pub match_notifications: Mutex<Vec<(MatchId, MatchNotifyKind, Value)>>,
    pub user_notifications: Mutex<Vec<(UserRef, UserNotifyKind, Value)>>,
    categories: Mutex<Vec<CategoryHandle>>,
    channels: Mutex<Vec<ChannelHandle>>,
    users_by_name: Mutex<HashMap<String, UserRef>>,
    next_message_id: Mutex<u64>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// registers a name so `resolve_user_by_name` can find it, mimicking
    /// the chat layer's member cache.
    pub fn register_user(&self, name: &str, user: UserRef) {
        self.users_by_name
            .lock()
            .unwrap()
            .insert(name.to_string(), user);
    }
}

#[async_trait]
impl NotifierPort for MockNotifier {
    async fn notify_announcement(
        &self,
        kind: AnnouncementKind,
        payload: Value,
        existing_message_id: Option<&str>,
    ) -> Option<String> {
        self.announcements.lock().unwrap().push((kind, payload));
        Some(match existing_message_id {
            Some(id) => id.to_string(),
            None => {
                let mut next = self.next_message_id.lock().unwrap();
                *next += 1;
                format!("msg-{next}")
            }
        })
    }

    async fn notify_to(&self, kind: ToKind, payload: Value) {
        self.to_notifications.lock().unwrap().push((kind, payload));
    }

    async fn notify_match(&self, match_id: MatchId, kind: MatchNotifyKind, payload: Value) {
        self.match_notifications
            .lock()
            .unwrap()
            .push((match_id, kind, payload));
    }

    async fn notify_user(&self, user: &UserRef, kind: UserNotifyKind, payload: Value) {
        self.user_notifications
            .lock()
            .unwrap()
            .push((user.clone(), kind, payload));
    }

    async fn create_category(&self, name: &str) -> anyhow::Result<CategoryHandle> {
        let handle = CategoryHandle(name.to_string());
        self.categories.lock().unwrap().push(handle.clone());
        Ok(handle)
    }

    async fn create_match_channel(
        &self,
        _category: &CategoryHandle,
        match_id: MatchId,
        _allowed: &MatchChannelRoles,
    ) -> anyhow::Result<ChannelHandle> {
        let handle = ChannelHandle(format!("match-{}", match_id.0));
        self.channels.lock().unwrap().push(handle.clone());
        Ok(handle)
    }

    async fn delete_channel(&self, handle: &ChannelHandle) -> anyhow::Result<()> {
        self.channels.lock().unwrap().retain(|c| c != handle);
        Ok(())
    }

    async fn set_channel_permissions(&self, _handle: &ChannelHandle, _user: &UserRef) -> anyhow::Result<()> {
        Ok(())
    }

    async fn resolve_user_by_name(&self, name: &str) -> Option<UserRef> {
        self.users_by_name.lock().unwrap().get(name).cloned()
    }
}

/// serves pre-seeded CSV pages in order, simulating a paginated ranking
/// endpoint; returns [`RankingFetchError::Unavailable`] past the end.
#[derive(Default)]
pub struct MockRanking {
    pages: Mutex<HashMap<u32, String>>,
}

impl MockRanking {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_page(&self, page: u32, csv: impl Into<String>) {
        self.pages.lock().unwrap().insert(page, csv.into());
    }
}

#[async_trait]
impl RankingPort for MockRanking {
    async fn fetch_ranking_page(&self, _league_id: &str, page: u32) -> RankingFetchResult<String> {
        self.pages
            .lock()
            .unwrap()
            .get(&page)
            .cloned()
            .ok_or_else(|| RankingFetchError::Unavailable(format!("no page {page}")))
    }
}

/// keyed by the guild/tournament id the embedding application would use;
/// holds both the settings snapshot and the persisted runtime state.
#[derive(Default)]
pub struct MockConfigStore {
    settings: Mutex<HashMap<Uuid, TournamentConfig>>,
    snapshots: Mutex<HashMap<Uuid, TournamentSnapshot>>,
}

impl MockConfigStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConfigStorePort for MockConfigStore {
    async fn load_settings(&self, tournament_guild_id: Uuid) -> ConfigStoreResult<TournamentConfig> {
        self.settings
            .lock()
            .unwrap()
            .get(&tournament_guild_id)
            .cloned()
            .ok_or(ConfigStoreError::NotFound)
    }

    async fn save_settings(
        &self,
        tournament_guild_id: Uuid,
        config: &TournamentConfig,
    ) -> ConfigStoreResult<()> {
        self.settings
            .lock()
            .unwrap()
            .insert(tournament_guild_id, config.clone());
        Ok(())
    }

    async fn load_snapshot(
        &self,
        tournament_guild_id: Uuid,
    ) -> ConfigStoreResult<Option<TournamentSnapshot>> {
        Ok(self
            .snapshots
            .lock()
            .unwrap()
            .get(&tournament_guild_id)
            .cloned())
    }

    async fn save_snapshot(
        &self,
        tournament_guild_id: Uuid,
        snapshot: &TournamentSnapshot,
    ) -> ConfigStoreResult<()> {
        self.snapshots
            .lock()
            .unwrap()
            .insert(tournament_guild_id, snapshot.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn provider_round_trips_a_participant() {
        let provider = MockProvider::new();
        let id = provider.create_participant("Alice", 1).await.unwrap();
        let roster = provider.list_participants().await.unwrap();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].id, id);
    }

    #[tokio::test]
    async fn notifier_records_announcements() {
        let notifier = MockNotifier::new();
        let id = notifier
            .notify_announcement(AnnouncementKind::RegistrationOpen, Value::Null, None)
            .await;
        assert_eq!(notifier.announcements.lock().unwrap().len(), 1);
        assert!(id.is_some());
    }

    #[tokio::test]
    async fn ranking_reports_missing_pages() {
        let ranking = MockRanking::new();
        ranking.set_page(1, "Alice,100\n");
        assert!(ranking.fetch_ranking_page("league", 1).await.is_ok());
        assert!(ranking.fetch_ranking_page("league", 2).await.is_err());
    }
}
