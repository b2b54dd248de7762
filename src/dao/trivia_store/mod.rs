pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use std::time::SystemTime;

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::models::{
    EventEntity, ParticipantEntity, QuestionEntity, ResponseEntity, TeamEntity,
};
use crate::dao::storage::StorageResult;

pub use memory::MemoryTriviaStore;

/// Abstraction over the persistence layer for events, memberships and responses.
///
/// Question and team definitions are owned by external CRUD tooling; this trait
/// only exposes what the live session core needs. Responses are append-only.
pub trait TriviaStore: Send + Sync {
    fn find_event(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<EventEntity>>>;
    /// Questions of an event, sorted by ordinal.
    fn list_questions(&self, event_id: Uuid)
    -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>>;
    fn find_question(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<QuestionEntity>>>;
    fn list_teams(&self, event_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>>;
    fn find_team(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>>;
    fn list_participants(
        &self,
        event_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<ParticipantEntity>>>;
    fn find_participant(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<ParticipantEntity>>>;
    /// Move a participant to `team_id` (or out of any team) if they may still switch.
    ///
    /// Returns `false` when the participant is unknown or no longer allowed to switch.
    fn assign_team(
        &self,
        participant_id: Uuid,
        team_id: Option<Uuid>,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    fn touch_participant(&self, id: Uuid, at: SystemTime) -> BoxFuture<'static, StorageResult<()>>;
    /// Freeze team membership for every participant of the event. Returns the
    /// number of participants whose flag changed.
    fn lock_team_switching(&self, event_id: Uuid) -> BoxFuture<'static, StorageResult<u64>>;
    fn insert_response(&self, response: ResponseEntity) -> BoxFuture<'static, StorageResult<()>>;
    // The response queries below return oldest submissions first.
    fn responses_for_question(
        &self,
        question_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<ResponseEntity>>>;
    fn responses_for_participant(
        &self,
        participant_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<ResponseEntity>>>;
    fn responses_for_event(
        &self,
        event_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<ResponseEntity>>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
