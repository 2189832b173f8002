//! the background `seedAndUpload` job fired when the register/check-in
//! schedule is exhausted and the tournament transitions to `AWAITING`
//! (spec.md §4.2 `endRegistration`, §4.5).

use crate::handle::TournamentHandle;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use std::time::Duration;
use tournament_core::TzInstant;

/// fetches the configured ranking source (if any), seeds participants, and
/// uploads whoever isn't already on the remote bracket. `force` re-uploads
/// everyone after destroying their existing remote entry, used by
/// `reset_bracket` flows rather than the automatic background trigger.
pub async fn seed_and_upload(handle: &TournamentHandle, force: bool) -> anyhow::Result<()> {
    let mut t = handle.tournament.lock().await;
    let now = TzInstant::from_utc_now(t.tournament_start.tz_offset_seconds());

    let mut ranked = HashSet::new();
    if t.config.ranking.league_id.is_some() {
        match t.fetch_full_ranking(handle.ranking.as_ref(), now).await {
            Ok(rows) => ranked = t.apply_ranking(&rows),
            // a cold cooldown or unreachable source falls back to pure
            // shuffle seeding rather than aborting the upload entirely.
            Err(err) => tracing::warn!(error = %err, "ranking fetch skipped"),
        }
    }

    t.seed_and_upload_participants(
        handle.provider.as_ref(),
        &ranked,
        |unranked| unranked.shuffle(&mut rand::thread_rng()),
        force,
    )
    .await?;
    Ok(())
}

/// confirms the seeded bracket and transitions `AWAITING -> ONGOING`: reads
/// every round number back from the remote to (re)derive `top_8`, announces
/// the start, and spawns the periodic [`crate::loop_task`] (spec.md §4.2
/// `start()`). Distinct from [`seed_and_upload`] since starting the bracket
/// is a deliberate operator action, not an automatic side effect of seeding.
pub async fn start_tournament(
    handle: &TournamentHandle,
    registry: &crate::registry::LoopTaskRegistry,
    tick_interval: Duration,
) -> anyhow::Result<()> {
    let rounds = {
        let remote_matches = handle.provider.list_matches().await?;
        remote_matches.iter().map(|m| m.round).collect::<Vec<_>>()
    };

    {
        let mut t = handle.tournament.lock().await;
        t.start(&rounds)?;
    }
    handle
        .notifier
        .notify_announcement(
            tournament_core::ports::notifier::AnnouncementKind::TournamentStart,
            serde_json::Value::Null,
            None,
        )
        .await;

    crate::loop_task::spawn(handle.clone(), registry.clone(), tick_interval);
    Ok(())
}
