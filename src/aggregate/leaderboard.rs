use std::{cmp::Reverse, collections::HashMap};

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dao::models::{ParticipantEntity, ResponseEntity, TeamEntity};

use super::{Tally, mean, tally_by_participant};

/// One row of the team standings.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TeamStanding {
    /// 1-based position; ties keep the order the teams were listed in.
    pub rank: u32,
    /// Team identifier.
    pub team_id: Uuid,
    /// Team display name.
    pub name: String,
    /// Venue table, when known.
    pub table_number: Option<u32>,
    /// Members currently assigned to the team, active or not.
    pub member_count: u32,
    /// Points earned by all members.
    pub total_points: u64,
    /// Responses submitted by all members.
    pub total_responses: u64,
    /// Correct responses submitted by all members.
    pub correct_responses: u64,
    /// Percentage of correct responses, 0 when the team has not answered.
    pub accuracy: f64,
    /// Total points divided by member count.
    pub average_points_per_member: f64,
}

/// One row of the individual standings.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ParticipantStanding {
    /// 1-based position; ties keep the order the participants were listed in.
    pub rank: u32,
    /// Participant identifier.
    pub participant_id: Uuid,
    /// Participant display name.
    pub name: String,
    /// Current team, if any.
    pub team_id: Option<Uuid>,
    /// Name of the current team, if any.
    pub team_name: Option<String>,
    /// Points earned.
    pub total_points: u64,
    /// Responses submitted.
    pub total_responses: u64,
    /// Correct responses submitted.
    pub correct_responses: u64,
    /// Percentage of correct responses.
    pub accuracy: f64,
}

/// Rank every team by the points of its current members.
///
/// Members are taken from each participant's present `team_id`, so a response
/// follows its author to a new team after a switch.
/// Inactive members still count: their points stay with the team even though
/// the participant board leaves them out.
pub fn team_leaderboard(
    teams: &[TeamEntity],
    participants: &[ParticipantEntity],
    responses: &[ResponseEntity],
) -> Vec<TeamStanding> {
    let by_participant = tally_by_participant(responses);

    let mut members: HashMap<Uuid, (u32, Tally)> = HashMap::new();
    for participant in participants {
        let Some(team_id) = participant.team_id else {
            continue;
        };
        let slot = members.entry(team_id).or_default();
        slot.0 += 1;
        if let Some(tally) = by_participant.get(&participant.id) {
            slot.1.merge(*tally);
        }
    }

    let mut standings: Vec<TeamStanding> = teams
        .iter()
        .map(|team| {
            let (member_count, tally) = members.get(&team.id).copied().unwrap_or_default();
            TeamStanding {
                rank: 0,
                team_id: team.id,
                name: team.name.clone(),
                table_number: team.table_number,
                member_count,
                total_points: tally.points,
                total_responses: tally.responses,
                correct_responses: tally.correct,
                accuracy: tally.accuracy(),
                average_points_per_member: mean(tally.points as f64, u64::from(member_count)),
            }
        })
        .collect();

    standings.sort_by_key(|standing| Reverse(standing.total_points));
    assign_ranks(&mut standings, |standing, rank| standing.rank = rank);
    standings
}

/// Rank active participants by their own points.
pub fn participant_leaderboard(
    participants: &[ParticipantEntity],
    teams: &[TeamEntity],
    responses: &[ResponseEntity],
) -> Vec<ParticipantStanding> {
    let by_participant = tally_by_participant(responses);
    let team_names: HashMap<Uuid, &str> = teams
        .iter()
        .map(|team| (team.id, team.name.as_str()))
        .collect();

    let mut standings: Vec<ParticipantStanding> = participants
        .iter()
        .filter(|participant| participant.is_active)
        .map(|participant| {
            let tally = by_participant
                .get(&participant.id)
                .copied()
                .unwrap_or_default();
            ParticipantStanding {
                rank: 0,
                participant_id: participant.id,
                name: participant.name.clone(),
                team_id: participant.team_id,
                team_name: participant
                    .team_id
                    .and_then(|id| team_names.get(&id))
                    .map(|name| name.to_string()),
                total_points: tally.points,
                total_responses: tally.responses,
                correct_responses: tally.correct,
                accuracy: tally.accuracy(),
            }
        })
        .collect();

    standings.sort_by_key(|standing| Reverse(standing.total_points));
    assign_ranks(&mut standings, |standing, rank| standing.rank = rank);
    standings
}

fn assign_ranks<T>(rows: &mut [T], mut set: impl FnMut(&mut T, u32)) {
    for (index, row) in rows.iter_mut().enumerate() {
        set(row, index as u32 + 1);
    }
}
