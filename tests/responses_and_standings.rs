mod common;

use std::time::SystemTime;

use common::Fixture;
use trivia_night_back::{
    config::AppConfig,
    dao::trivia_store::TriviaStore,
    dto::{
        leaderboard::{LeaderboardKind, LeaderboardResponse},
        response::SubmitResponseRequest,
    },
    error::ServiceError,
    services::{analytics_service, leaderboard_service, submission_service, team_service},
};
use uuid::Uuid;

fn answer(participant_id: Uuid, question_id: Uuid, text: &str, remaining: f64) -> SubmitResponseRequest {
    SubmitResponseRequest {
        participant_id,
        question_id,
        answer: text.into(),
        time_remaining_secs: Some(remaining),
        response_time_secs: Some(30.0 - remaining),
    }
}

#[tokio::test]
async fn submissions_are_scored_by_speed() {
    let fx = Fixture::new(&[30]).await;
    let ada = fx.participant("Ada", Some(fx.team_a.id)).await;
    let q = fx.questions[0].id;

    let fast = submission_service::submit_response(&fx.state, answer(ada.id, q, " a ", 22.0))
        .await
        .unwrap();
    assert!(fast.is_correct);
    assert_eq!(fast.points, 20);

    let slow = submission_service::submit_response(&fx.state, answer(ada.id, q, "A", 7.0))
        .await
        .unwrap();
    assert_eq!(slow.points, 5);

    let wrong = submission_service::submit_response(&fx.state, answer(ada.id, q, "B", 25.0))
        .await
        .unwrap();
    assert!(!wrong.is_correct);
    assert_eq!(wrong.points, 0);

    let stored = fx.store.find_participant(ada.id).await.unwrap().unwrap();
    assert!(stored.last_active_at > SystemTime::UNIX_EPOCH);
}

#[tokio::test]
async fn repeated_answers_to_one_question_all_count() {
    let fx = Fixture::new(&[30]).await;
    let ada = fx.participant("Ada", None).await;
    let q = fx.questions[0].id;

    for _ in 0..2 {
        submission_service::submit_response(&fx.state, answer(ada.id, q, "A", 21.0))
            .await
            .unwrap();
    }

    let history = submission_service::participant_responses(&fx.state, ada.id)
        .await
        .unwrap();
    assert_eq!(history.len(), 2);

    let board =
        leaderboard_service::leaderboard(&fx.state, fx.event_id, LeaderboardKind::Participants)
            .await
            .unwrap();
    let LeaderboardResponse::Participants(rows) = board else {
        panic!("expected participant standings");
    };
    assert_eq!(rows[0].total_points, 40);
}

#[tokio::test]
async fn unknown_ids_and_foreign_questions_are_rejected() {
    let fx = Fixture::new(&[30]).await;
    let other = Fixture::new(&[30]).await;
    let ada = fx.participant("Ada", None).await;

    let err = submission_service::submit_response(
        &fx.state,
        answer(Uuid::new_v4(), fx.questions[0].id, "A", 10.0),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    let err = submission_service::submit_response(
        &fx.state,
        answer(ada.id, Uuid::new_v4(), "A", 10.0),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    fx.store.insert_question(other.questions[0].clone()).await;
    let err = submission_service::submit_response(
        &fx.state,
        answer(ada.id, other.questions[0].id, "A", 10.0),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));
}

#[tokio::test]
async fn team_leaderboard_and_analytics_follow_responses() {
    let fx = Fixture::new(&[30, 30]).await;
    let ann = fx.participant("Ann", Some(fx.team_a.id)).await;
    let abe = fx.participant("Abe", Some(fx.team_a.id)).await;
    let ben = fx.participant("Ben", Some(fx.team_b.id)).await;
    let (q1, q2) = (fx.questions[0].id, fx.questions[1].id);

    for request in [
        answer(ann.id, q1, "A", 25.0),
        answer(abe.id, q1, "A", 16.0),
        answer(abe.id, q2, "C", 12.0),
        answer(ben.id, q1, "A", 11.0),
    ] {
        submission_service::submit_response(&fx.state, request)
            .await
            .unwrap();
    }

    let board = leaderboard_service::leaderboard(&fx.state, fx.event_id, LeaderboardKind::Teams)
        .await
        .unwrap();
    let LeaderboardResponse::Teams(rows) = board else {
        panic!("expected team standings");
    };
    assert_eq!((rows[0].team_id, rows[0].total_points), (fx.team_a.id, 35));
    assert_eq!((rows[1].team_id, rows[1].total_points), (fx.team_b.id, 10));
    assert!((rows[0].accuracy - 200.0 / 3.0).abs() < 1e-9);
    assert_eq!(rows[1].accuracy, 100.0);

    let summary = analytics_service::question_analytics(&fx.state, q1).await.unwrap();
    assert_eq!(summary.total_responses, 3);
    assert_eq!(summary.max_points, 60);
    assert_eq!(summary.answer_distribution[0].count, 3);

    let analytics = analytics_service::event_analytics(&fx.state, fx.event_id)
        .await
        .unwrap();
    assert_eq!(analytics.totals.total_responses, 4);
    assert_eq!(analytics.totals.total_points, 45);
    assert_eq!(analytics.questions[1].correct_responses, 0);
    assert_eq!(analytics.teams[0].team_id, fx.team_a.id);
}

#[tokio::test]
async fn full_team_refuses_new_members() {
    let config = AppConfig::default().with_default_team_capacity(Some(1));
    let fx = Fixture::with_config(config, &[30]).await;
    fx.participant("Ann", Some(fx.team_a.id)).await;
    let ben = fx.participant("Ben", Some(fx.team_b.id)).await;

    let err = team_service::switch_team(&fx.state, ben.id, Some(fx.team_a.id))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));

    let left = team_service::switch_team(&fx.state, ben.id, None).await.unwrap();
    assert_eq!(left.team_id, None);
}

#[tokio::test]
async fn degraded_store_is_reported_as_retryable() {
    let fx = Fixture::new(&[30]).await;
    fx.state.clear_trivia_store().await;

    let err = leaderboard_service::leaderboard(&fx.state, fx.event_id, LeaderboardKind::Teams)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Degraded));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn simultaneous_submissions_are_all_recorded() {
    let fx = Fixture::new(&[30]).await;
    let ann = fx.participant("Ann", Some(fx.team_a.id)).await;
    let abe = fx.participant("Abe", Some(fx.team_a.id)).await;
    let ben = fx.participant("Ben", Some(fx.team_b.id)).await;
    let bea = fx.participant("Bea", Some(fx.team_b.id)).await;
    let q = fx.questions[0].id;

    let senders = [ann.id, ann.id, ann.id, ann.id, abe.id, abe.id, ben.id, ben.id, ben.id, bea.id];
    let tasks: Vec<_> = senders
        .iter()
        .map(|&participant_id| {
            let state = fx.state.clone();
            tokio::spawn(async move {
                submission_service::submit_response(&state, answer(participant_id, q, "A", 22.0))
                    .await
            })
        })
        .collect();

    let mut ids = Vec::new();
    for task in tasks {
        let response = task.await.unwrap().unwrap();
        assert_eq!(response.points, 20);
        ids.push(response.id);
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), senders.len());

    let stored = fx.store.responses_for_question(q).await.unwrap();
    assert_eq!(stored.len(), senders.len());

    let board = leaderboard_service::leaderboard(&fx.state, fx.event_id, LeaderboardKind::Teams)
        .await
        .unwrap();
    let LeaderboardResponse::Teams(rows) = board else {
        panic!("expected team standings");
    };
    assert_eq!((rows[0].team_id, rows[0].total_points), (fx.team_a.id, 120));
    assert_eq!((rows[1].team_id, rows[1].total_points), (fx.team_b.id, 80));

    let board =
        leaderboard_service::leaderboard(&fx.state, fx.event_id, LeaderboardKind::Participants)
            .await
            .unwrap();
    let LeaderboardResponse::Participants(rows) = board else {
        panic!("expected participant standings");
    };
    assert_eq!((rows[0].participant_id, rows[0].total_points), (ann.id, 80));
    assert_eq!(rows.iter().map(|row| row.total_points).sum::<u64>(), 200);
}

#[tokio::test]
async fn participant_history_is_oldest_first() {
    let fx = Fixture::new(&[30, 30]).await;
    let ada = fx.participant("Ada", None).await;
    let (q1, q2) = (fx.questions[0].id, fx.questions[1].id);

    for request in [
        answer(ada.id, q2, "C", 10.0),
        answer(ada.id, q1, "B", 10.0),
        answer(ada.id, q1, "A", 10.0),
    ] {
        submission_service::submit_response(&fx.state, request)
            .await
            .unwrap();
    }

    let history = submission_service::participant_responses(&fx.state, ada.id)
        .await
        .unwrap();
    let answers: Vec<_> = history.iter().map(|response| response.answer.as_str()).collect();
    assert_eq!(answers, ["C", "B", "A"]);
}
