//! `registerParticipant` / `unregisterParticipant` (spec.md §4.2).
//!
//! These touch the remote provider (incremental upload, destroy-on-unregister,
//! disqualification of an in-progress match) so, unlike the plain phase
//! transitions in `lifecycle.rs`, they are `async` and take a
//! [`ProviderPort`] the way `tournament_provider_challonge` implements it.

use super::Tournament;
use crate::errors::{EngineError, EngineResult};
use crate::identifiers::{ParticipantId, UserRef};
use crate::participant::Participant;
use crate::phase::SubPhase;
use crate::ports::provider::ProviderPort;
use crate::timing::TzInstant;

/// outcome of a successful `registerParticipant` call, for the caller to
/// react to (spec.md §4.2: incremental upload, autostop, pre-checked-in).
#[derive(Debug, Clone, Default)]
pub struct RegisterOutcome {
    pub participant_id: Option<ParticipantId>,
    /// set when the tail participant was already uploaded and this one was
    /// uploaded immediately rather than deferred to the batch upload.
    pub uploaded_seed: Option<u32>,
    /// set when `autostop_register` just filled the last slot; the caller
    /// must follow up with `end_registration()`.
    pub should_autostop: bool,
}

impl Tournament {
    /// registers `user`, uploading them immediately to the remote bracket
    /// when the tail participant is already uploaded (incremental upload
    /// path), otherwise leaving them for the batch upload run at
    /// registration close (spec.md §9 Open Question, resolved in
    /// DESIGN.md).
    pub async fn register_participant(
        &mut self,
        provider: &dyn ProviderPort,
        user: UserRef,
    ) -> EngineResult<RegisterOutcome> {
        if self.register_phase != SubPhase::Ongoing {
            return Err(EngineError::WrongPhase {
                operation: "register_participant".to_string(),
                allowed: vec!["Ongoing".to_string()],
                actual: format!("{:?}", self.register_phase),
            });
        }
        if self.find_participant_by_user_id(&user.id).is_some() {
            return Err(EngineError::AlreadyRegistered);
        }
        if let Some(limit) = self.limit {
            if self.participants.len() as u32 >= limit {
                return Err(EngineError::LimitReached);
            }
        }

        let mut participant = Participant::new(user);
        // check-in already past PENDING: new registrants are pre-checked,
        // they joined after the gate opened.
        if !matches!(self.checkin_phase, SubPhase::Manual | SubPhase::Pending) {
            participant.checked_in = true;
        }

        let tail_uploaded = self
            .participants
            .last()
            .map(|p| p.is_uploaded())
            .unwrap_or(false);

        let id = participant.id;
        self.participants.push(participant);

        let mut outcome = RegisterOutcome {
            participant_id: Some(id),
            uploaded_seed: None,
            should_autostop: false,
        };

        if tail_uploaded {
            let seed = self.participants.len() as u32;
            let name = self
                .find_participant(id)
                .map(|p| p.user.display_name.clone())
                .expect("just inserted");
            let remote_id = provider.create_participant(&name, seed).await?;
            if let Some(p) = self.find_participant_mut(id) {
                p.player_id = Some(remote_id);
            }
            outcome.uploaded_seed = Some(seed);
        }

        if self.config.autostop_register
            && self.register_phase == SubPhase::Ongoing
            && self.limit == Some(self.participants.len() as u32)
        {
            outcome.should_autostop = true;
        }

        Ok(outcome)
    }

    /// unregisters `user_id`. If they were uploaded, destroys them on the
    /// remote; if they were in a materialized match, that match is ended
    /// via the disqualification path with the opponent winning by forfeit.
    pub async fn unregister_participant(
        &mut self,
        provider: &dyn ProviderPort,
        user_id: &str,
        now: TzInstant,
    ) -> EngineResult<()> {
        let idx = self
            .participants
            .iter()
            .position(|p| p.user.id == user_id)
            .ok_or(EngineError::NotRegistered)?;

        let participant_id = self.participants[idx].id;
        let player_id = self.participants[idx].player_id.clone();
        let match_id = self.participants[idx].match_id;

        if let Some(match_id) = match_id {
            // disqualify without uploading if the participant was never
            // uploaded (no remote match to reconcile against yet).
            let upload = player_id.is_some();
            let _ = self
                .disqualify(provider, match_id, participant_id, now, upload)
                .await?;
        }

        if let Some(player_id) = player_id {
            provider.destroy_participant(&player_id).await?;
        }

        self.participants.remove(idx);
        Ok(())
    }
}
