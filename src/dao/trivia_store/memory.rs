//! In-process [`TriviaStore`] backed by insertion-ordered maps.
//!
//! Used when no external database is configured and by the test-suite. Events
//! can be seeded from a JSON fixture so the binary is usable on its own.

use std::{fs, path::Path, sync::Arc, time::SystemTime};

use futures::future::BoxFuture;
use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::dao::{
    models::{
        EventEntity, ParticipantEntity, QuestionEntity, QuestionKind, ResponseEntity, TeamEntity,
    },
    storage::StorageResult,
    trivia_store::TriviaStore,
};

/// Error raised while loading a seed fixture.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file `{path}`")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse seed file `{path}`")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Cloneable handle; clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryTriviaStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    events: RwLock<IndexMap<Uuid, EventEntity>>,
    questions: RwLock<IndexMap<Uuid, QuestionEntity>>,
    teams: RwLock<IndexMap<Uuid, TeamEntity>>,
    participants: RwLock<IndexMap<Uuid, ParticipantEntity>>,
    responses: RwLock<Vec<ResponseEntity>>,
}

impl MemoryTriviaStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with the events described in a JSON fixture.
    pub async fn from_seed_file(path: &Path) -> Result<Self, SeedError> {
        let display = path.display().to_string();
        let contents = fs::read_to_string(path).map_err(|source| SeedError::Read {
            path: display.clone(),
            source,
        })?;
        let seed: SeedFile = serde_json::from_str(&contents).map_err(|source| SeedError::Parse {
            path: display,
            source,
        })?;

        let store = Self::new();
        for event in seed.events {
            store.insert_seed_event(event).await;
        }
        Ok(store)
    }

    /// Insert or replace an event.
    pub async fn insert_event(&self, event: EventEntity) {
        self.inner.events.write().await.insert(event.id, event);
    }

    pub async fn insert_question(&self, question: QuestionEntity) {
        self.inner
            .questions
            .write()
            .await
            .insert(question.id, question);
    }

    pub async fn insert_team(&self, team: TeamEntity) {
        self.inner.teams.write().await.insert(team.id, team);
    }

    pub async fn insert_participant(&self, participant: ParticipantEntity) {
        self.inner
            .participants
            .write()
            .await
            .insert(participant.id, participant);
    }

    async fn insert_seed_event(&self, seed: SeedEvent) {
        let now = SystemTime::now();
        let event_id = seed.id;
        self.insert_event(EventEntity {
            id: event_id,
            name: seed.name,
            team_switch_locked: false,
            created_at: now,
        })
        .await;

        for (index, question) in seed.questions.into_iter().enumerate() {
            self.insert_question(QuestionEntity {
                id: question.id.unwrap_or_else(Uuid::new_v4),
                event_id,
                ordinal: question.ordinal.unwrap_or(index as u32 + 1),
                prompt: question.prompt,
                kind: question.kind,
                options: question.options,
                correct_answer: question.correct_answer,
                time_limit_secs: question.time_limit_secs,
                explanation: question.explanation,
                difficulty: question.difficulty,
                category: question.category,
            })
            .await;
        }

        for team in seed.teams {
            let team_id = team.id.unwrap_or_else(Uuid::new_v4);
            self.insert_team(TeamEntity {
                id: team_id,
                event_id,
                name: team.name,
                table_number: team.table_number,
                max_members: team.max_members,
            })
            .await;

            for name in team.members {
                self.insert_participant(seed_participant(event_id, name, Some(team_id), now))
                    .await;
            }
        }

        for name in seed.unassigned {
            self.insert_participant(seed_participant(event_id, name, None, now))
                .await;
        }
    }
}

fn seed_participant(
    event_id: Uuid,
    name: String,
    team_id: Option<Uuid>,
    now: SystemTime,
) -> ParticipantEntity {
    ParticipantEntity {
        id: Uuid::new_v4(),
        event_id,
        name,
        team_id,
        can_switch_team: true,
        is_active: true,
        last_active_at: now,
    }
}

impl TriviaStore for MemoryTriviaStore {
    fn find_event(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<EventEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move { Ok(inner.events.read().await.get(&id).cloned()) })
    }

    fn list_questions(
        &self,
        event_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut questions: Vec<QuestionEntity> = inner
                .questions
                .read()
                .await
                .values()
                .filter(|question| question.event_id == event_id)
                .cloned()
                .collect();
            questions.sort_by_key(|question| question.ordinal);
            Ok(questions)
        })
    }

    fn find_question(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<QuestionEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move { Ok(inner.questions.read().await.get(&id).cloned()) })
    }

    fn list_teams(&self, event_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            Ok(inner
                .teams
                .read()
                .await
                .values()
                .filter(|team| team.event_id == event_id)
                .cloned()
                .collect())
        })
    }

    fn find_team(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move { Ok(inner.teams.read().await.get(&id).cloned()) })
    }

    fn list_participants(
        &self,
        event_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<ParticipantEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            Ok(inner
                .participants
                .read()
                .await
                .values()
                .filter(|participant| participant.event_id == event_id)
                .cloned()
                .collect())
        })
    }

    fn find_participant(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<ParticipantEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move { Ok(inner.participants.read().await.get(&id).cloned()) })
    }

    fn assign_team(
        &self,
        participant_id: Uuid,
        team_id: Option<Uuid>,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut participants = inner.participants.write().await;
            match participants.get_mut(&participant_id) {
                Some(participant) if participant.can_switch_team => {
                    participant.team_id = team_id;
                    participant.last_active_at = SystemTime::now();
                    Ok(true)
                }
                _ => Ok(false),
            }
        })
    }

    fn touch_participant(&self, id: Uuid, at: SystemTime) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            if let Some(participant) = inner.participants.write().await.get_mut(&id) {
                participant.last_active_at = at;
            }
            Ok(())
        })
    }

    fn lock_team_switching(&self, event_id: Uuid) -> BoxFuture<'static, StorageResult<u64>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            if let Some(event) = inner.events.write().await.get_mut(&event_id) {
                event.team_switch_locked = true;
            }

            let mut changed = 0;
            for participant in inner.participants.write().await.values_mut() {
                if participant.event_id == event_id && participant.can_switch_team {
                    participant.can_switch_team = false;
                    changed += 1;
                }
            }
            Ok(changed)
        })
    }

    fn insert_response(&self, response: ResponseEntity) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            inner.responses.write().await.push(response);
            Ok(())
        })
    }

    fn responses_for_question(
        &self,
        question_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<ResponseEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            Ok(inner
                .responses
                .read()
                .await
                .iter()
                .filter(|response| response.question_id == question_id)
                .cloned()
                .collect())
        })
    }

    fn responses_for_participant(
        &self,
        participant_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<ResponseEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            Ok(inner
                .responses
                .read()
                .await
                .iter()
                .filter(|response| response.participant_id == participant_id)
                .cloned()
                .collect())
        })
    }

    fn responses_for_event(
        &self,
        event_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<ResponseEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            Ok(inner
                .responses
                .read()
                .await
                .iter()
                .filter(|response| response.event_id == event_id)
                .cloned()
                .collect())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

/// JSON fixture layout accepted by [`MemoryTriviaStore::from_seed_file`].
#[derive(Debug, Deserialize)]
struct SeedFile {
    events: Vec<SeedEvent>,
}

#[derive(Debug, Deserialize)]
struct SeedEvent {
    id: Uuid,
    name: String,
    #[serde(default)]
    questions: Vec<SeedQuestion>,
    #[serde(default)]
    teams: Vec<SeedTeam>,
    /// Participants registered without a team.
    #[serde(default)]
    unassigned: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SeedQuestion {
    #[serde(default)]
    id: Option<Uuid>,
    #[serde(default)]
    ordinal: Option<u32>,
    prompt: String,
    #[serde(default)]
    kind: QuestionKind,
    #[serde(default)]
    options: Vec<String>,
    correct_answer: String,
    time_limit_secs: u32,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default)]
    difficulty: Option<String>,
    #[serde(default)]
    category: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SeedTeam {
    #[serde(default)]
    id: Option<Uuid>,
    name: String,
    #[serde(default)]
    table_number: Option<u32>,
    #[serde(default)]
    max_members: Option<u32>,
    #[serde(default)]
    members: Vec<String>,
}
