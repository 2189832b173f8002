//! participant seeding and upload (spec.md §4.5).
//!
//! Ranking CSVs are paged through [`RankingPort`]; parsing is a small
//! hand-rolled line splitter rather than a dependency, since the format is
//! two comma-separated fields per line and nothing the format crates in the
//! rest of the stack buy anything for.

use super::Tournament;
use crate::errors::{EngineError, EngineResult};
use crate::identifiers::{ParticipantId, RemoteId};
use crate::ports::provider::ProviderPort;
use crate::ports::ranking::RankingPort;
use crate::timing::TzInstant;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

const RANKING_FETCH_COOLDOWN: Duration = Duration::from_secs(300);
const MAX_RANKING_PAGES: u32 = 5;

/// one row of a parsed ranking CSV: player display name to integer points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingEntry {
    pub name: String,
    pub points: i64,
}

/// splits `"name,points"` lines, skipping blank lines and anything that
/// doesn't parse, rather than failing the whole page on one bad row.
pub fn parse_ranking_csv(raw: &str) -> Vec<RankingEntry> {
    let mut rows = Vec::new();
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some((name, points)) = line.rsplit_once(',') else {
            continue;
        };
        let Ok(points) = points.trim().parse::<i64>() else {
            continue;
        };
        rows.push(RankingEntry {
            name: name.trim().to_string(),
            points,
        });
    }
    rows
}

impl Tournament {
    /// downloads every page of the configured ranking source, stopping
    /// early when a page is byte-identical to the previous one (a common
    /// "last page repeats" pagination quirk), and bounded by
    /// [`MAX_RANKING_PAGES`] as a hard backstop. Respects the 5-minute
    /// fetch cooldown (spec.md §4.5, §8).
    pub async fn fetch_full_ranking(
        &mut self,
        ranking: &dyn RankingPort,
        now: TzInstant,
    ) -> EngineResult<Vec<RankingEntry>> {
        let league_id = self
            .config
            .ranking
            .league_id
            .clone()
            .ok_or_else(|| EngineError::Invariant("no ranking source configured".to_string()))?;

        if let Some(last) = self.last_ranking_fetch {
            if last.elapsed_since(now) < RANKING_FETCH_COOLDOWN {
                return Err(EngineError::Invariant("ranking fetch on cooldown".to_string()));
            }
        }

        let mut rows = Vec::new();
        let mut previous_page: Option<String> = None;
        for page in 1..=MAX_RANKING_PAGES {
            let body = ranking
                .fetch_ranking_page(&league_id, page)
                .await
                .map_err(|e| EngineError::Invariant(e.to_string()))?;
            if previous_page.as_deref() == Some(body.as_str()) {
                break;
            }
            if body.trim().is_empty() {
                break;
            }
            rows.extend(parse_ranking_csv(&body));
            previous_page = Some(body);
        }

        self.last_ranking_fetch = Some(now);
        Ok(rows)
    }

    /// maps ranking rows onto registered participants by display name,
    /// setting `elo` to the matched entry or, absent a match, to
    /// `min(points)` across the ranking (spec.md §4.5). Returns the ids of
    /// participants actually found in the ranking — that set, not the
    /// `elo` field itself, is what separates "ranked" from "unranked" in
    /// [`Tournament::seed_order`], since an absent participant still gets
    /// an `elo` value (grounded on original_source's `_seed_participants`,
    /// which keeps `ranked`/`not_ranked` as lists distinct from the elo it
    /// assigns to either).
    pub fn apply_ranking(&mut self, rows: &[RankingEntry]) -> HashSet<ParticipantId> {
        let by_name: HashMap<&str, i64> = rows.iter().map(|r| (r.name.as_str(), r.points)).collect();
        let base_elo = rows.iter().map(|r| r.points).min();
        let mut ranked = HashSet::new();
        for p in &mut self.participants {
            match by_name.get(p.user.display_name.as_str()) {
                Some(points) => {
                    p.elo = Some(*points);
                    ranked.insert(p.id);
                }
                None => p.elo = base_elo,
            }
        }
        ranked
    }

    /// orders participants for seeding: the ids in `ranked` first (by
    /// descending `elo`), everyone else shuffled into the tail. `shuffle`
    /// is injected so the caller supplies randomness (engine itself never
    /// calls into a RNG directly, see `rand` usage in the workspace for
    /// the caller's implementation).
    pub fn seed_order(
        &self,
        ranked: &HashSet<ParticipantId>,
        shuffle: impl FnOnce(&mut Vec<ParticipantId>),
    ) -> Vec<ParticipantId> {
        let mut sorted: Vec<ParticipantId> = self
            .participants
            .iter()
            .filter(|p| ranked.contains(&p.id))
            .map(|p| p.id)
            .collect();
        sorted.sort_by_key(|id| std::cmp::Reverse(self.find_participant(*id).and_then(|p| p.elo).unwrap_or(0)));

        let mut unranked: Vec<ParticipantId> = self
            .participants
            .iter()
            .filter(|p| !ranked.contains(&p.id))
            .map(|p| p.id)
            .collect();
        shuffle(&mut unranked);

        sorted.extend(unranked);
        sorted
    }

    /// reorders `self.participants` to match `order` — spec.md §3's "seed
    /// implicit from position in `Tournament.participants`" — without
    /// touching anything else. `order` must be a permutation of the
    /// current participant ids; any id it omits keeps its relative place
    /// at the end, defensively.
    fn apply_participant_order(&mut self, order: &[ParticipantId]) {
        let position: HashMap<ParticipantId, usize> =
            order.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        self.participants
            .sort_by_key(|p| position.get(&p.id).copied().unwrap_or(usize::MAX));
    }

    /// computes the seed order and applies it to `self.participants`, then
    /// uploads to the remote. If the upload fails partway, the participant
    /// order is rolled back to what it was before this call before the
    /// error propagates (spec.md §4.5: "On any failure, the previous
    /// participant ordering is rolled back before the exception
    /// propagates."), mirroring original_source's `seed_participants`.
    pub async fn seed_and_upload_participants(
        &mut self,
        provider: &dyn ProviderPort,
        ranked: &HashSet<ParticipantId>,
        shuffle: impl FnOnce(&mut Vec<ParticipantId>),
        force: bool,
    ) -> EngineResult<()> {
        let previous_order: Vec<ParticipantId> = self.participants.iter().map(|p| p.id).collect();
        let order = self.seed_order(ranked, shuffle);
        self.apply_participant_order(&order);
        if let Err(e) = self.upload_participants(provider, &order, force).await {
            self.apply_participant_order(&previous_order);
            return Err(e);
        }
        Ok(())
    }

    /// uploads participants not yet on the remote bracket, in seed order.
    /// `force` re-uploads everyone, first destroying their existing remote
    /// entry, which is needed after [`Tournament::reset_bracket`] changes
    /// the seeding (spec.md §4.5).
    ///
    /// On any single upload failure the already-created remote entries for
    /// this call are rolled back (destroyed) before the error is returned,
    /// so a partial upload never leaves the remote roster half-seeded.
    pub async fn upload_participants(
        &mut self,
        provider: &dyn ProviderPort,
        order: &[ParticipantId],
        force: bool,
    ) -> EngineResult<()> {
        let mut created: Vec<RemoteId> = Vec::new();

        for (seed, id) in order.iter().enumerate() {
            let seed = seed as u32 + 1;
            let already_uploaded = self.find_participant(*id).map(|p| p.is_uploaded()).unwrap_or(false);
            if already_uploaded && !force {
                continue;
            }
            if force {
                if let Some(old) = self.find_participant(*id).and_then(|p| p.player_id.clone()) {
                    if let Err(e) = provider.destroy_participant(&old).await {
                        self.rollback_upload(provider, &created).await;
                        return Err(e.into());
                    }
                }
            }
            let name = self
                .find_participant(*id)
                .map(|p| p.user.display_name.clone())
                .ok_or_else(|| EngineError::Invariant("seed order references unknown participant".to_string()))?;

            match provider.create_participant(&name, seed).await {
                Ok(remote_id) => {
                    created.push(remote_id.clone());
                    if let Some(p) = self.find_participant_mut(*id) {
                        p.player_id = Some(remote_id);
                    }
                }
                Err(e) => {
                    self.rollback_upload(provider, &created).await;
                    return Err(e.into());
                }
            }
        }
        Ok(())
    }

    async fn rollback_upload(&mut self, provider: &dyn ProviderPort, created: &[RemoteId]) {
        for remote_id in created {
            let _ = provider.destroy_participant(remote_id).await;
            if let Some(p) = self.participants.iter_mut().find(|p| p.player_id.as_ref() == Some(remote_id)) {
                p.player_id = None;
            }
        }
    }
}
