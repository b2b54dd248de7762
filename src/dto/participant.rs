use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::dao::models::ParticipantEntity;

use super::format_system_time;

/// Move a participant to another team, or out of any team with `null`.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SwitchTeamRequest {
    pub team_id: Option<Uuid>,
}

/// Participant as returned after a team switch.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ParticipantView {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub team_id: Option<Uuid>,
    pub can_switch_team: bool,
    pub is_active: bool,
    /// RFC 3339 timestamp.
    pub last_active_at: String,
}

impl From<ParticipantEntity> for ParticipantView {
    fn from(participant: ParticipantEntity) -> Self {
        Self {
            id: participant.id,
            event_id: participant.event_id,
            name: participant.name,
            team_id: participant.team_id,
            can_switch_team: participant.can_switch_team,
            is_active: participant.is_active,
            last_active_at: format_system_time(participant.last_active_at),
        }
    }
}
