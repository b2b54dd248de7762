use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dao::models::{ParticipantEntity, QuestionEntity, ResponseEntity, TeamEntity},
    services::scoring::MAX_POINTS_PER_QUESTION,
};

use super::{
    Tally,
    leaderboard::{TeamStanding, team_leaderboard},
    mean, percentage,
};

/// Bucket used for responses whose answer text is blank.
pub const NO_ANSWER: &str = "No Answer";

/// How often one answer text was submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AnswerCount {
    /// Submitted text, case preserved.
    pub answer: String,
    /// Number of responses carrying this text.
    pub count: u64,
}

/// Per-question figures.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct QuestionSummary {
    /// Question identifier.
    pub question_id: Uuid,
    /// Position within the event.
    pub ordinal: u32,
    /// Prompt text.
    pub prompt: String,
    /// Designated correct answer.
    pub correct_answer: String,
    /// Responses recorded for the question.
    pub total_responses: u64,
    /// Responses marked correct.
    pub correct_responses: u64,
    /// Responses marked incorrect.
    pub incorrect_responses: u64,
    /// Percentage of correct responses.
    pub accuracy: f64,
    /// Points awarded across all responses.
    pub total_points: u64,
    /// Mean points per response.
    pub average_points: f64,
    /// Best possible total: every response earning the top award.
    pub max_points: u64,
    /// Shortest reported response time in seconds.
    pub fastest_response_secs: Option<f64>,
    /// Longest reported response time in seconds.
    pub slowest_response_secs: Option<f64>,
    /// Mean reported response time in seconds.
    pub average_response_secs: Option<f64>,
    /// Answer texts in the order they were first seen.
    pub answer_distribution: Vec<AnswerCount>,
}

/// Event-wide totals.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EventTotals {
    /// Questions defined for the event.
    pub question_count: u64,
    /// Participants registered for the event.
    pub participant_count: u64,
    /// Participants with at least one response.
    pub responding_participants: u64,
    /// Responses recorded for the event.
    pub total_responses: u64,
    /// Responses marked correct.
    pub correct_responses: u64,
    /// Percentage of correct responses.
    pub accuracy: f64,
    /// Points awarded across the event.
    pub total_points: u64,
    /// Mean points per response.
    pub average_points_per_response: f64,
}

/// Full analytics view of one event.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EventAnalytics {
    /// Event identifier.
    pub event_id: Uuid,
    /// Event-wide totals.
    pub totals: EventTotals,
    /// One summary per question, by ordinal.
    pub questions: Vec<QuestionSummary>,
    /// Team standings.
    pub teams: Vec<TeamStanding>,
}

/// Summarise the responses recorded for `question`.
///
/// Responses belonging to other questions are ignored.
pub fn summarize_question(question: &QuestionEntity, responses: &[ResponseEntity]) -> QuestionSummary {
    let mut tally = Tally::default();
    let mut distribution: IndexMap<String, u64> = IndexMap::new();
    let mut timing = TimingStats::default();

    for response in responses.iter().filter(|r| r.question_id == question.id) {
        tally.record(response);
        let bucket = if response.answer.trim().is_empty() {
            NO_ANSWER.to_string()
        } else {
            response.answer.clone()
        };
        *distribution.entry(bucket).or_insert(0) += 1;
        if let Some(secs) = response.response_time_secs {
            timing.record(secs);
        }
    }

    QuestionSummary {
        question_id: question.id,
        ordinal: question.ordinal,
        prompt: question.prompt.clone(),
        correct_answer: question.correct_answer.clone(),
        total_responses: tally.responses,
        correct_responses: tally.correct,
        incorrect_responses: tally.responses - tally.correct,
        accuracy: tally.accuracy(),
        total_points: tally.points,
        average_points: mean(tally.points as f64, tally.responses),
        max_points: tally.responses * u64::from(MAX_POINTS_PER_QUESTION),
        fastest_response_secs: timing.fastest,
        slowest_response_secs: timing.slowest,
        average_response_secs: timing.average(),
        answer_distribution: distribution
            .into_iter()
            .map(|(answer, count)| AnswerCount { answer, count })
            .collect(),
    }
}

/// Build the analytics view of one event from its full row set.
pub fn summarize_event(
    event_id: Uuid,
    questions: &[QuestionEntity],
    teams: &[TeamEntity],
    participants: &[ParticipantEntity],
    responses: &[ResponseEntity],
) -> EventAnalytics {
    let mut tally = Tally::default();
    let mut responders = HashSet::new();
    for response in responses {
        tally.record(response);
        responders.insert(response.participant_id);
    }

    EventAnalytics {
        event_id,
        totals: EventTotals {
            question_count: questions.len() as u64,
            participant_count: participants.len() as u64,
            responding_participants: responders.len() as u64,
            total_responses: tally.responses,
            correct_responses: tally.correct,
            accuracy: percentage(tally.correct, tally.responses),
            total_points: tally.points,
            average_points_per_response: mean(tally.points as f64, tally.responses),
        },
        questions: questions
            .iter()
            .map(|question| summarize_question(question, responses))
            .collect(),
        teams: team_leaderboard(teams, participants, responses),
    }
}

#[derive(Default)]
struct TimingStats {
    fastest: Option<f64>,
    slowest: Option<f64>,
    sum: f64,
    count: u64,
}

impl TimingStats {
    fn record(&mut self, secs: f64) {
        self.fastest = Some(self.fastest.map_or(secs, |current| current.min(secs)));
        self.slowest = Some(self.slowest.map_or(secs, |current| current.max(secs)));
        self.sum += secs;
        self.count += 1;
    }

    fn average(&self) -> Option<f64> {
        (self.count > 0).then(|| mean(self.sum, self.count))
    }
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use super::*;
    use crate::dao::models::QuestionKind;

    fn question() -> QuestionEntity {
        QuestionEntity {
            id: Uuid::new_v4(),
            event_id: Uuid::nil(),
            ordinal: 1,
            prompt: "Capital of France?".into(),
            kind: QuestionKind::MultipleChoice,
            options: vec!["Paris".into(), "Lyon".into()],
            correct_answer: "Paris".into(),
            time_limit_secs: 30,
            explanation: None,
            difficulty: None,
            category: None,
        }
    }

    fn answer(question_id: Uuid, text: &str, points: u32, took: Option<f64>) -> ResponseEntity {
        ResponseEntity {
            id: Uuid::new_v4(),
            event_id: Uuid::nil(),
            participant_id: Uuid::new_v4(),
            question_id,
            answer: text.into(),
            is_correct: points > 0,
            points,
            time_remaining_secs: None,
            response_time_secs: took,
            submitted_at: SystemTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn question_summary_counts_points_and_timing() {
        let q = question();
        let responses = vec![
            answer(q.id, "Paris", 20, Some(3.5)),
            answer(q.id, "Paris", 10, Some(12.0)),
            answer(q.id, "Lyon", 0, Some(7.0)),
            answer(Uuid::new_v4(), "Elsewhere", 20, Some(1.0)),
        ];

        let summary = summarize_question(&q, &responses);

        assert_eq!(summary.total_responses, 3);
        assert_eq!(summary.correct_responses, 2);
        assert_eq!(summary.incorrect_responses, 1);
        assert_eq!(summary.total_points, 30);
        assert_eq!(summary.average_points, 10.0);
        assert_eq!(summary.max_points, 60);
        assert_eq!(summary.fastest_response_secs, Some(3.5));
        assert_eq!(summary.slowest_response_secs, Some(12.0));
        assert_eq!(summary.average_response_secs, Some(7.5));
    }

    #[test]
    fn distribution_keeps_case_and_buckets_blank_answers() {
        let q = question();
        let responses = vec![
            answer(q.id, "Paris", 20, None),
            answer(q.id, "paris", 20, None),
            answer(q.id, "  ", 0, None),
            answer(q.id, "Paris", 15, None),
            answer(q.id, "", 0, None),
        ];

        let summary = summarize_question(&q, &responses);

        assert_eq!(
            summary.answer_distribution,
            vec![
                AnswerCount { answer: "Paris".into(), count: 2 },
                AnswerCount { answer: "paris".into(), count: 1 },
                AnswerCount { answer: NO_ANSWER.into(), count: 2 },
            ]
        );
    }

    #[test]
    fn unanswered_question_reports_zeroes() {
        let summary = summarize_question(&question(), &[]);

        assert_eq!(summary.total_responses, 0);
        assert_eq!(summary.accuracy, 0.0);
        assert_eq!(summary.average_points, 0.0);
        assert_eq!(summary.max_points, 0);
        assert_eq!(summary.average_response_secs, None);
        assert!(summary.answer_distribution.is_empty());
    }

    #[test]
    fn event_totals_cover_all_questions() {
        let first = question();
        let mut second = question();
        second.ordinal = 2;
        let responses = vec![
            answer(first.id, "Paris", 20, None),
            answer(second.id, "Lyon", 0, None),
        ];

        let analytics = summarize_event(
            Uuid::nil(),
            &[first.clone(), second.clone()],
            &[],
            &[],
            &responses,
        );

        assert_eq!(analytics.totals.question_count, 2);
        assert_eq!(analytics.totals.total_responses, 2);
        assert_eq!(analytics.totals.responding_participants, 2);
        assert_eq!(analytics.totals.accuracy, 50.0);
        assert_eq!(analytics.totals.average_points_per_response, 10.0);
        assert_eq!(analytics.questions.len(), 2);
        assert_eq!(analytics.questions[1].question_id, second.id);
        assert!(analytics.teams.is_empty());
    }
}
