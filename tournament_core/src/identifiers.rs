//! stable identifiers used across the engine
//!
//! Entities are owned by value inside `Tournament`; everything that would
//! otherwise be a pointer (participant <-> match, match <-> streamer) is a
//! `Uuid`-keyed lookup instead, resolved through `Tournament::find_*` helpers.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// locally-generated id of a [`crate::Participant`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticipantId(pub Uuid);

impl ParticipantId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ParticipantId {
    fn default() -> Self {
        Self::new()
    }
}

/// locally-generated id of a [`crate::Match`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchId(pub Uuid);

impl MatchId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MatchId {
    fn default() -> Self {
        Self::new()
    }
}

/// locally-generated id of a [`crate::Streamer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamerId(pub Uuid);

impl StreamerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for StreamerId {
    fn default() -> Self {
        Self::new()
    }
}

/// id assigned by the remote bracket provider. Providers such as Challonge
/// use integers, but the engine only ever round-trips these opaquely.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteId(pub String);

impl RemoteId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

impl std::fmt::Display for RemoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// opaque reference to a chat user, carried by the chat/presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserRef {
    pub id: String,
    pub display_name: String,
}

/// opaque handle to a chat room/channel, created through [`crate::NotifierPort`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelHandle(pub String);

/// opaque handle to a channel category, created through [`crate::NotifierPort`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryHandle(pub String);
