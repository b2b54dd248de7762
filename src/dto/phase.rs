use serde::Serialize;
use utoipa::ToSchema;

use crate::state::state_machine::{SessionPhase, StandingsOrigin};

/// Session phase as exposed to presenter and participant clients.
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisiblePhase {
    /// Nothing shown yet.
    Idle,
    /// Rules and instructions.
    Briefing,
    /// A question with its countdown.
    Active,
    /// The correct answer of the current question.
    Revealed,
    /// The leaderboard.
    Standings,
    /// All questions done.
    Finished,
}

impl From<&SessionPhase> for VisiblePhase {
    fn from(value: &SessionPhase) -> Self {
        match value {
            SessionPhase::Idle => VisiblePhase::Idle,
            SessionPhase::Briefing => VisiblePhase::Briefing,
            SessionPhase::Active => VisiblePhase::Active,
            SessionPhase::Revealed => VisiblePhase::Revealed,
            SessionPhase::Standings(_) => VisiblePhase::Standings,
            SessionPhase::Finished => VisiblePhase::Finished,
        }
    }
}

/// Where the leaderboard was opened from; decides what `continue` does.
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisibleStandingsOrigin {
    /// Mid-question; continuing resumes the countdown.
    Active,
    /// After a reveal; continuing moves on.
    Revealed,
}

impl VisibleStandingsOrigin {
    /// Origin of `phase` when it is the standings phase.
    pub fn of(phase: &SessionPhase) -> Option<Self> {
        match phase {
            SessionPhase::Standings(StandingsOrigin::Active) => Some(Self::Active),
            SessionPhase::Standings(StandingsOrigin::Revealed) => Some(Self::Revealed),
            _ => None,
        }
    }
}
