//! `NotifierPort`: the chat/presentation collaborator (spec.md §1, §6).
//!
//! The engine never formats chat messages itself; it emits a notification
//! record naming a `kind` and a JSON payload, which the embedding chat
//! layer renders. Grounded on `app_core::ports::client_registry::ClientRegistryPort`'s
//! async-trait publish shape, generalized from a pub/sub bus to a direct
//! emitter interface since the engine has exactly one consumer per kind.

use crate::identifiers::{CategoryHandle, ChannelHandle, MatchId, UserRef};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnnouncementKind {
    RegistrationOpen,
    RegistrationClosed,
    CheckinOpen,
    CheckinReminder,
    TournamentStart,
    BracketChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToKind {
    TaskErrorBudgetExceeded,
    ManualFixRequired,
    ResumeTimeoutsCancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchNotifyKind {
    Launched,
    ForcedEnd,
    Disqualified,
    Forfeited,
    Relaunched,
    WarnLength,
    WarnTimeout,
    StreamStarted,
    StreamCancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserNotifyKind {
    CheckinReminder,
    Disqualified,
    Unregistered,
}

/// roles that should be granted access to a freshly created match channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchChannelRoles {
    pub player1: UserRef,
    pub player2: UserRef,
}

#[async_trait]
pub trait NotifierPort: Send + Sync {
    /// `existing_message_id` lets the caller edit a previously posted
    /// announcement in place instead of posting a new one (spec.md §4.2
    /// `startRegistration`: "updates the pinned registration record").
    /// Pass `None` to always post fresh. Returns the id of the message that
    /// now holds this announcement, so the caller can pass it back in on
    /// the next call; implementations that don't support editing may just
    /// return a fresh id every time.
    async fn notify_announcement(
        &self,
        kind: AnnouncementKind,
        payload: Value,
        existing_message_id: Option<&str>,
    ) -> Option<String>;
    async fn notify_to(&self, kind: ToKind, payload: Value);
    async fn notify_match(&self, match_id: MatchId, kind: MatchNotifyKind, payload: Value);
    /// best-effort; failures must be swallowed by the implementation, never
    /// propagated to the engine (spec.md §7).
    async fn notify_user(&self, user: &UserRef, kind: UserNotifyKind, payload: Value);

    async fn create_category(&self, name: &str) -> anyhow::Result<CategoryHandle>;
    async fn create_match_channel(
        &self,
        category: &CategoryHandle,
        match_id: MatchId,
        allowed: &MatchChannelRoles,
    ) -> anyhow::Result<ChannelHandle>;
    async fn delete_channel(&self, handle: &ChannelHandle) -> anyhow::Result<()>;
    async fn set_channel_permissions(&self, handle: &ChannelHandle, user: &UserRef) -> anyhow::Result<()>;

    async fn resolve_user_by_name(&self, name: &str) -> Option<UserRef>;
}
