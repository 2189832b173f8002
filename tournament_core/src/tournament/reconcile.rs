//! reconciliation: pull remote participants/matches and fold them onto local
//! state (spec.md §4.2, §4.3).
//!
//! Grounded on `app_core`'s repository-sync pattern (fetch remote, diff
//! against local by id, apply deltas) generalized from a database table to
//! a [`crate::ports::ProviderPort`] round-trip.

use super::Tournament;
use crate::errors::{EngineError, EngineResult};
use crate::identifiers::{MatchId, RemoteId};
use crate::match_::{Match, MatchPhase};
use crate::ports::provider::{parse_scores_csv, ProviderPort, RemoteMatchState};
use crate::timing::TzInstant;
use std::collections::HashSet;

/// what changed during one reconciliation pass, for the caller to announce.
#[derive(Debug, Clone, Default)]
pub struct ReconcileReport {
    pub new_matches: Vec<MatchId>,
    pub completed_matches: Vec<MatchId>,
    pub lost_participants: Vec<RemoteId>,
}

impl Tournament {
    /// syncs `participants[].player_id` against the provider's roster.
    /// Participants whose `player_id` no longer appears remotely are
    /// reported via [`EngineError::LostParticipant`] rather than silently
    /// dropped, since that can only happen from a manual edit out-of-band.
    pub async fn reconcile_participants(
        &mut self,
        provider: &dyn ProviderPort,
    ) -> EngineResult<()> {
        let remote = provider.list_participants().await?;
        let remote_ids: HashSet<&RemoteId> = remote.iter().map(|r| &r.id).collect();

        for p in &self.participants {
            if let Some(player_id) = &p.player_id {
                if !remote_ids.contains(player_id) {
                    return Err(EngineError::LostParticipant(player_id.clone()));
                }
            }
        }
        Ok(())
    }

    /// pulls the full match list and folds it onto local state: creates
    /// [`Match`] records for sets that appeared remotely, and closes out
    /// any whose score was set directly on the bracket without going
    /// through [`Tournament::force_end_match`] (spec.md §8, "scores set
    /// directly on the remote bracket").
    pub async fn reconcile_matches(
        &mut self,
        provider: &dyn ProviderPort,
        now: TzInstant,
    ) -> EngineResult<ReconcileReport> {
        let remote = provider.list_matches().await?;
        let mut report = ReconcileReport::default();

        for rm in &remote {
            let local_idx = self.matches.iter().position(|m| m.remote_id == rm.id);

            if local_idx.is_none() && rm.state == RemoteMatchState::Open {
                let (player1, player2) = match (&rm.player1_id, &rm.player2_id) {
                    (Some(a), Some(b)) => (
                        self.find_participant_by_player_id(a).map(|p| p.id),
                        self.find_participant_by_player_id(b).map(|p| p.id),
                    ),
                    _ => (None, None),
                };

                let (Some(p1), Some(p2)) = (player1, player2) else {
                    // one side could not be resolved locally (disqualified or
                    // unknown participant): force the remote score in favour
                    // of whichever side did resolve and skip local creation.
                    let (winner, scores) = match player1 {
                        Some(p) => (p, super::matches::FORFEIT_SCORES_CSV),
                        None => match player2 {
                            Some(p) => (p, super::matches::FORFEIT_SCORES_CSV_REVERSED),
                            None => continue,
                        },
                    };
                    if let Some(winner_remote) =
                        self.find_participant(winner).and_then(|p| p.player_id.clone())
                    {
                        provider.update_match(&rm.id, scores, &winner_remote).await?;
                    }
                    continue;
                };
                let created = Match::new(rm.id.clone(), rm.round, rm.set, p1, p2, &self.top_8);
                let created_id = created.id;
                report.new_matches.push(created_id);
                self.matches.push(created);
                if let Some(p) = self.find_participant_mut(p1) {
                    p.match_id = Some(created_id);
                }
                if let Some(p) = self.find_participant_mut(p2) {
                    p.match_id = Some(created_id);
                }
                let idx = self.matches.len() - 1;
                self.fold_remote_match(idx, rm, provider, now, &mut report).await?;
                continue;
            }

            let Some(idx) = local_idx else { continue };
            self.fold_remote_match(idx, rm, provider, now, &mut report).await?;
        }
        Ok(report)
    }

    async fn fold_remote_match(
        &mut self,
        idx: usize,
        rm: &crate::ports::provider::RemoteMatch,
        provider: &dyn ProviderPort,
        now: TzInstant,
        report: &mut ReconcileReport,
    ) -> EngineResult<()> {
        let phase = self.matches[idx].phase;
        match (phase, rm.state) {
            (MatchPhase::Ongoing, RemoteMatchState::Complete) => {
                // the provider reports the winner's score first; reorder to
                // the player1/player2 convention before handing off to
                // `end_match`, which applies the documented arg-max /
                // player1-on-tie rule (spec.md §4.2, §6).
                let id = self.matches[idx].id;
                let (player1, player2) = (self.matches[idx].player1, self.matches[idx].player2);
                let winner = rm
                    .winner_id
                    .as_ref()
                    .and_then(|w| self.find_participant_by_player_id(w).map(|p| p.id));
                let (score1, score2) = match rm.scores_csv.as_deref().and_then(parse_scores_csv) {
                    Some((winner_score, loser_score)) => {
                        let winner_score = winner_score.max(0) as u32;
                        let loser_score = loser_score.max(0) as u32;
                        if winner == Some(player2) {
                            (loser_score, winner_score)
                        } else {
                            (winner_score, loser_score)
                        }
                    }
                    None => match winner {
                        Some(w) if w == player2 => (0, 1),
                        _ => (1, 0),
                    },
                };
                self.end_match(provider, id, score1, score2, now, false).await?;
                report.completed_matches.push(id);
            }
            // an upstream bracket modification invalidated an in-progress
            // match: treat it as over rather than let it hang forever.
            (MatchPhase::Ongoing, RemoteMatchState::Pending) => {
                let id = self.matches[idx].id;
                self.force_end(id, now)?;
                report.completed_matches.push(id);
            }
            // operator removed a score on the remote: reopen it locally.
            (MatchPhase::Done, RemoteMatchState::Open) => {
                let id = self.matches[idx].id;
                self.relaunch(id, now)?;
                report.new_matches.push(id);
            }
            (_, RemoteMatchState::Open) if !self.matches[idx].underway => {
                self.matches[idx].underway = rm.underway_at.is_some();
            }
            _ => {}
        }
        Ok(())
    }

    /// rounds currently present among local matches, used to (re)derive
    /// `top_8` at bracket start.
    pub fn local_rounds(&self) -> Vec<i32> {
        self.matches.iter().map(|m| m.round).collect()
    }
}
