use mongodb::bson::{DateTime, Document, Uuid as BsonUuid, doc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dao::models::{
    EventEntity, ParticipantEntity, QuestionEntity, QuestionKind, ResponseEntity, TeamEntity,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoEventDocument {
    #[serde(rename = "_id")]
    id: BsonUuid,
    name: String,
    #[serde(default)]
    team_switch_locked: bool,
    created_at: DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoQuestionDocument {
    #[serde(rename = "_id")]
    id: BsonUuid,
    event_id: BsonUuid,
    ordinal: u32,
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

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoTeamDocument {
    #[serde(rename = "_id")]
    id: BsonUuid,
    event_id: BsonUuid,
    name: String,
    #[serde(default)]
    table_number: Option<u32>,
    #[serde(default)]
    max_members: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoParticipantDocument {
    #[serde(rename = "_id")]
    id: BsonUuid,
    event_id: BsonUuid,
    name: String,
    #[serde(default)]
    team_id: Option<BsonUuid>,
    can_switch_team: bool,
    is_active: bool,
    last_active_at: DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoResponseDocument {
    #[serde(rename = "_id")]
    id: BsonUuid,
    event_id: BsonUuid,
    participant_id: BsonUuid,
    question_id: BsonUuid,
    answer: String,
    is_correct: bool,
    points: u32,
    #[serde(default)]
    time_remaining_secs: Option<f64>,
    #[serde(default)]
    response_time_secs: Option<f64>,
    submitted_at: DateTime,
}

pub fn to_bson_uuid(id: Uuid) -> BsonUuid {
    BsonUuid::from_bytes(id.into_bytes())
}

fn from_bson_uuid(id: BsonUuid) -> Uuid {
    Uuid::from_bytes(id.bytes())
}

pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": to_bson_uuid(id)}
}

impl From<MongoEventDocument> for EventEntity {
    fn from(value: MongoEventDocument) -> Self {
        Self {
            id: from_bson_uuid(value.id),
            name: value.name,
            team_switch_locked: value.team_switch_locked,
            created_at: value.created_at.to_system_time(),
        }
    }
}

impl From<MongoQuestionDocument> for QuestionEntity {
    fn from(value: MongoQuestionDocument) -> Self {
        Self {
            id: from_bson_uuid(value.id),
            event_id: from_bson_uuid(value.event_id),
            ordinal: value.ordinal,
            prompt: value.prompt,
            kind: value.kind,
            options: value.options,
            correct_answer: value.correct_answer,
            time_limit_secs: value.time_limit_secs,
            explanation: value.explanation,
            difficulty: value.difficulty,
            category: value.category,
        }
    }
}

impl From<MongoTeamDocument> for TeamEntity {
    fn from(value: MongoTeamDocument) -> Self {
        Self {
            id: from_bson_uuid(value.id),
            event_id: from_bson_uuid(value.event_id),
            name: value.name,
            table_number: value.table_number,
            max_members: value.max_members,
        }
    }
}

impl From<MongoParticipantDocument> for ParticipantEntity {
    fn from(value: MongoParticipantDocument) -> Self {
        Self {
            id: from_bson_uuid(value.id),
            event_id: from_bson_uuid(value.event_id),
            name: value.name,
            team_id: value.team_id.map(from_bson_uuid),
            can_switch_team: value.can_switch_team,
            is_active: value.is_active,
            last_active_at: value.last_active_at.to_system_time(),
        }
    }
}

impl From<ResponseEntity> for MongoResponseDocument {
    fn from(value: ResponseEntity) -> Self {
        Self {
            id: to_bson_uuid(value.id),
            event_id: to_bson_uuid(value.event_id),
            participant_id: to_bson_uuid(value.participant_id),
            question_id: to_bson_uuid(value.question_id),
            answer: value.answer,
            is_correct: value.is_correct,
            points: value.points,
            time_remaining_secs: value.time_remaining_secs,
            response_time_secs: value.response_time_secs,
            submitted_at: DateTime::from_system_time(value.submitted_at),
        }
    }
}

impl From<MongoResponseDocument> for ResponseEntity {
    fn from(value: MongoResponseDocument) -> Self {
        Self {
            id: from_bson_uuid(value.id),
            event_id: from_bson_uuid(value.event_id),
            participant_id: from_bson_uuid(value.participant_id),
            question_id: from_bson_uuid(value.question_id),
            answer: value.answer,
            is_correct: value.is_correct,
            points: value.points,
            time_remaining_secs: value.time_remaining_secs,
            response_time_secs: value.response_time_secs,
            submitted_at: value.submitted_at.to_system_time(),
        }
    }
}
