use tracing::info;
use uuid::Uuid;

use crate::{
    dto::participant::ParticipantView,
    error::ServiceError,
    state::SharedState,
};

/// Move a participant to `team_id`, or out of any team when `None`.
///
/// Refused with [`ServiceError::Locked`] once the event has shown its first
/// question. The store re-checks the participant's flag on write, so a switch
/// racing the lock cannot slip through.
pub async fn switch_team(
    state: &SharedState,
    participant_id: Uuid,
    team_id: Option<Uuid>,
) -> Result<ParticipantView, ServiceError> {
    let store = state.require_trivia_store().await?;

    let participant = store
        .find_participant(participant_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("participant `{participant_id}` not found")))?;
    let event = store
        .find_event(participant.event_id)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!("event `{}` not found", participant.event_id))
        })?;

    if event.team_switch_locked || !participant.can_switch_team {
        return Err(locked(participant_id));
    }

    if participant.team_id == team_id {
        return Ok(participant.into());
    }

    if let Some(team_id) = team_id {
        let team = store
            .find_team(team_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("team `{team_id}` not found")))?;
        if team.event_id != participant.event_id {
            return Err(ServiceError::InvalidInput(format!(
                "team `{team_id}` belongs to another event"
            )));
        }

        if let Some(capacity) = team.max_members.or(state.config().default_team_capacity()) {
            let members = store
                .list_participants(participant.event_id)
                .await?
                .into_iter()
                .filter(|other| other.team_id == Some(team_id) && other.id != participant_id)
                .count();
            if members >= capacity as usize {
                return Err(ServiceError::InvalidState(format!(
                    "team `{}` is full ({capacity} members)",
                    team.name
                )));
            }
        }
    }

    if !store.assign_team(participant_id, team_id).await? {
        return Err(locked(participant_id));
    }

    info!(
        participant_id = %participant_id,
        from = ?participant.team_id,
        to = ?team_id,
        "participant switched team"
    );

    let updated = store
        .find_participant(participant_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("participant `{participant_id}` not found")))?;
    Ok(updated.into())
}

fn locked(participant_id: Uuid) -> ServiceError {
    ServiceError::Locked(format!(
        "participant `{participant_id}` can no longer switch teams"
    ))
}
