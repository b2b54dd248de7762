use uuid::Uuid;

use crate::{
    aggregate::leaderboard::{participant_leaderboard, team_leaderboard},
    dto::leaderboard::{LeaderboardKind, LeaderboardResponse},
    error::ServiceError,
    state::SharedState,
};

/// Compute the standings of `event_id` from the responses stored so far.
pub async fn leaderboard(
    state: &SharedState,
    event_id: Uuid,
    kind: LeaderboardKind,
) -> Result<LeaderboardResponse, ServiceError> {
    let store = state.require_trivia_store().await?;
    store
        .find_event(event_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("event `{event_id}` not found")))?;

    let teams = store.list_teams(event_id).await?;
    let participants = store.list_participants(event_id).await?;
    let responses = store.responses_for_event(event_id).await?;

    Ok(match kind {
        LeaderboardKind::Teams => {
            LeaderboardResponse::Teams(team_leaderboard(&teams, &participants, &responses))
        }
        LeaderboardKind::Participants => LeaderboardResponse::Participants(
            participant_leaderboard(&participants, &teams, &responses),
        ),
    })
}
