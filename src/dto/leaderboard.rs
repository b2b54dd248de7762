use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::aggregate::leaderboard::{ParticipantStanding, TeamStanding};

/// Which standings to compute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardKind {
    /// Teams ranked by the points of their members.
    #[default]
    Teams,
    /// Active participants ranked by their own points.
    Participants,
}

/// Query string of `GET /events/{event_id}/leaderboard`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeaderboardQuery {
    /// Defaults to `teams`.
    #[serde(default)]
    pub kind: LeaderboardKind,
}

/// Ranked standings of one event.
#[derive(Debug, Serialize, ToSchema)]
#[serde(tag = "kind", content = "entries", rename_all = "snake_case")]
pub enum LeaderboardResponse {
    /// Team standings.
    Teams(Vec<TeamStanding>),
    /// Individual standings.
    Participants(Vec<ParticipantStanding>),
}
