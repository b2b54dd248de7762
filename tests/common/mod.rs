#![allow(dead_code)]

use std::{sync::Arc, time::SystemTime};

use trivia_night_back::{
    config::AppConfig,
    dao::{
        models::{EventEntity, ParticipantEntity, QuestionEntity, QuestionKind, TeamEntity},
        trivia_store::{MemoryTriviaStore, TriviaStore},
    },
    state::{AppState, SharedState},
};
use uuid::Uuid;

pub struct Fixture {
    pub state: SharedState,
    pub store: MemoryTriviaStore,
    pub event_id: Uuid,
    pub questions: Vec<QuestionEntity>,
    pub team_a: TeamEntity,
    pub team_b: TeamEntity,
}

impl Fixture {
    pub async fn new(time_limits: &[u32]) -> Self {
        Self::with_config(AppConfig::default(), time_limits).await
    }

    pub async fn with_config(config: AppConfig, time_limits: &[u32]) -> Self {
        let store = MemoryTriviaStore::new();
        let event_id = Uuid::new_v4();
        store
            .insert_event(EventEntity {
                id: event_id,
                name: "Quiz night".into(),
                team_switch_locked: false,
                created_at: SystemTime::now(),
            })
            .await;

        let mut questions = Vec::new();
        for (index, limit) in time_limits.iter().enumerate() {
            let question = QuestionEntity {
                id: Uuid::new_v4(),
                event_id,
                ordinal: index as u32 + 1,
                prompt: format!("Question {}", index + 1),
                kind: QuestionKind::MultipleChoice,
                options: vec!["A".into(), "B".into(), "C".into()],
                correct_answer: "A".into(),
                time_limit_secs: *limit,
                explanation: None,
                difficulty: None,
                category: None,
            };
            store.insert_question(question.clone()).await;
            questions.push(question);
        }

        let team_a = team(event_id, "Team A");
        let team_b = team(event_id, "Team B");
        store.insert_team(team_a.clone()).await;
        store.insert_team(team_b.clone()).await;

        let shared: Arc<dyn TriviaStore> = Arc::new(store.clone());
        let state = AppState::with_store(config, shared).await;

        Self {
            state,
            store,
            event_id,
            questions,
            team_a,
            team_b,
        }
    }

    pub async fn participant(&self, name: &str, team_id: Option<Uuid>) -> ParticipantEntity {
        let participant = ParticipantEntity {
            id: Uuid::new_v4(),
            event_id: self.event_id,
            name: name.into(),
            team_id,
            can_switch_team: true,
            is_active: true,
            last_active_at: SystemTime::UNIX_EPOCH,
        };
        self.store.insert_participant(participant.clone()).await;
        participant
    }
}

fn team(event_id: Uuid, name: &str) -> TeamEntity {
    TeamEntity {
        id: Uuid::new_v4(),
        event_id,
        name: name.into(),
        table_number: None,
        max_members: None,
    }
}
