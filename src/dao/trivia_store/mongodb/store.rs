use std::{sync::Arc, time::SystemTime};

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, Collection, Database,
    bson::{DateTime, Document, doc},
    options::{FindOptions, IndexOptions},
};
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{
        MongoEventDocument, MongoParticipantDocument, MongoQuestionDocument,
        MongoResponseDocument, MongoTeamDocument, doc_id, to_bson_uuid,
    },
};
use crate::dao::{
    models::{EventEntity, ParticipantEntity, QuestionEntity, ResponseEntity, TeamEntity},
    storage::StorageResult,
    trivia_store::TriviaStore,
};

const EVENT_COLLECTION_NAME: &str = "events";
const QUESTION_COLLECTION_NAME: &str = "questions";
const TEAM_COLLECTION_NAME: &str = "teams";
const PARTICIPANT_COLLECTION_NAME: &str = "participants";
const RESPONSE_COLLECTION_NAME: &str = "responses";

fn oldest_first() -> Option<Document> {
    Some(doc! {"submitted_at": 1})
}

#[derive(Clone)]
pub struct MongoTriviaStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    #[allow(dead_code)]
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) = establish_connection(&self.config).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoTriviaStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) = establish_connection(&config).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let indexes: [(&'static str, &'static str, Document); 5] = [
            (QUESTION_COLLECTION_NAME, "event_id", doc! {"event_id": 1, "ordinal": 1}),
            (PARTICIPANT_COLLECTION_NAME, "event_id", doc! {"event_id": 1}),
            (
                RESPONSE_COLLECTION_NAME,
                "event_id_submitted_at",
                doc! {"event_id": 1, "submitted_at": 1},
            ),
            (
                RESPONSE_COLLECTION_NAME,
                "question_id_submitted_at",
                doc! {"question_id": 1, "submitted_at": 1},
            ),
            (
                RESPONSE_COLLECTION_NAME,
                "participant_id_submitted_at",
                doc! {"participant_id": 1, "submitted_at": 1},
            ),
        ];

        let database = self.database().await;
        for (collection, index, keys) in indexes {
            let model = mongodb::IndexModel::builder()
                .keys(keys)
                .options(
                    IndexOptions::builder()
                        .name(Some(format!("{collection}_{index}_idx")))
                        .build(),
                )
                .build();

            database
                .collection::<Document>(collection)
                .create_index(model)
                .await
                .map_err(|source| MongoDaoError::EnsureIndex {
                    collection,
                    index,
                    source,
                })?;
        }

        Ok(())
    }

    async fn database(&self) -> Database {
        let guard = self.inner.state.read().await;
        guard.database.clone()
    }

    async fn collection<T>(&self, name: &str) -> Collection<T>
    where
        T: Send + Sync,
    {
        let guard = self.inner.state.read().await;
        guard.database.collection::<T>(name)
    }

    async fn find_by_id<D, E>(
        &self,
        kind: &'static str,
        collection: &str,
        id: Uuid,
    ) -> MongoResult<Option<E>>
    where
        D: DeserializeOwned + Serialize + Send + Sync + Unpin,
        E: From<D>,
    {
        let collection = self.collection::<D>(collection).await;
        let document = collection
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::Load { kind, id, source })?;
        Ok(document.map(Into::into))
    }

    async fn find_many<D, E>(
        &self,
        kind: &'static str,
        collection: &str,
        owner: Uuid,
        filter: Document,
        sort: Option<Document>,
    ) -> MongoResult<Vec<E>>
    where
        D: DeserializeOwned + Serialize + Send + Sync + Unpin,
        E: From<D>,
    {
        let collection = self.collection::<D>(collection).await;
        let options = FindOptions::builder().sort(sort).build();
        let documents: Vec<D> = collection
            .find(filter)
            .with_options(options)
            .await
            .map_err(|source| MongoDaoError::List { kind, owner, source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::List { kind, owner, source })?;
        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn assign_team(&self, participant_id: Uuid, team_id: Option<Uuid>) -> MongoResult<bool> {
        let collection = self
            .collection::<MongoParticipantDocument>(PARTICIPANT_COLLECTION_NAME)
            .await;
        let mut filter = doc_id(participant_id);
        // Guarding on the flag makes the write lose any race against the lock.
        filter.insert("can_switch_team", true);

        let result = collection
            .update_one(
                filter,
                doc! {"$set": {
                    "team_id": team_id.map(to_bson_uuid),
                    "last_active_at": DateTime::now(),
                }},
            )
            .await
            .map_err(|source| MongoDaoError::UpdateParticipant {
                id: participant_id,
                source,
            })?;
        Ok(result.matched_count > 0)
    }

    async fn touch_participant(&self, id: Uuid, at: SystemTime) -> MongoResult<()> {
        let collection = self
            .collection::<MongoParticipantDocument>(PARTICIPANT_COLLECTION_NAME)
            .await;
        collection
            .update_one(
                doc_id(id),
                doc! {"$set": {"last_active_at": DateTime::from_system_time(at)}},
            )
            .await
            .map_err(|source| MongoDaoError::UpdateParticipant { id, source })?;
        Ok(())
    }

    async fn lock_team_switching(&self, event_id: Uuid) -> MongoResult<u64> {
        let events = self
            .collection::<MongoEventDocument>(EVENT_COLLECTION_NAME)
            .await;
        events
            .update_one(
                doc_id(event_id),
                doc! {"$set": {"team_switch_locked": true}},
            )
            .await
            .map_err(|source| MongoDaoError::LockTeams { event_id, source })?;

        let participants = self
            .collection::<MongoParticipantDocument>(PARTICIPANT_COLLECTION_NAME)
            .await;
        let result = participants
            .update_many(
                doc! {"event_id": to_bson_uuid(event_id), "can_switch_team": true},
                doc! {"$set": {"can_switch_team": false}},
            )
            .await
            .map_err(|source| MongoDaoError::LockTeams { event_id, source })?;
        Ok(result.modified_count)
    }

    async fn insert_response(&self, response: ResponseEntity) -> MongoResult<()> {
        let id = response.id;
        let document: MongoResponseDocument = response.into();
        let collection = self
            .collection::<MongoResponseDocument>(RESPONSE_COLLECTION_NAME)
            .await;
        collection
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::InsertResponse { id, source })?;
        Ok(())
    }
}

impl TriviaStore for MongoTriviaStore {
    fn find_event(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<EventEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_by_id::<MongoEventDocument, _>("event", EVENT_COLLECTION_NAME, id)
                .await
                .map_err(Into::into)
        })
    }

    fn list_questions(
        &self,
        event_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_many::<MongoQuestionDocument, _>(
                    "questions",
                    QUESTION_COLLECTION_NAME,
                    event_id,
                    doc! {"event_id": to_bson_uuid(event_id)},
                    Some(doc! {"ordinal": 1}),
                )
                .await
                .map_err(Into::into)
        })
    }

    fn find_question(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<QuestionEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_by_id::<MongoQuestionDocument, _>("question", QUESTION_COLLECTION_NAME, id)
                .await
                .map_err(Into::into)
        })
    }

    fn list_teams(&self, event_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_many::<MongoTeamDocument, _>(
                    "teams",
                    TEAM_COLLECTION_NAME,
                    event_id,
                    doc! {"event_id": to_bson_uuid(event_id)},
                    None,
                )
                .await
                .map_err(Into::into)
        })
    }

    fn find_team(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_by_id::<MongoTeamDocument, _>("team", TEAM_COLLECTION_NAME, id)
                .await
                .map_err(Into::into)
        })
    }

    fn list_participants(
        &self,
        event_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<ParticipantEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_many::<MongoParticipantDocument, _>(
                    "participants",
                    PARTICIPANT_COLLECTION_NAME,
                    event_id,
                    doc! {"event_id": to_bson_uuid(event_id)},
                    None,
                )
                .await
                .map_err(Into::into)
        })
    }

    fn find_participant(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<ParticipantEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_by_id::<MongoParticipantDocument, _>(
                    "participant",
                    PARTICIPANT_COLLECTION_NAME,
                    id,
                )
                .await
                .map_err(Into::into)
        })
    }

    fn assign_team(
        &self,
        participant_id: Uuid,
        team_id: Option<Uuid>,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .assign_team(participant_id, team_id)
                .await
                .map_err(Into::into)
        })
    }

    fn touch_participant(&self, id: Uuid, at: SystemTime) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.touch_participant(id, at).await.map_err(Into::into) })
    }

    fn lock_team_switching(&self, event_id: Uuid) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move { store.lock_team_switching(event_id).await.map_err(Into::into) })
    }

    fn insert_response(&self, response: ResponseEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_response(response).await.map_err(Into::into) })
    }

    fn responses_for_question(
        &self,
        question_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<ResponseEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_many::<MongoResponseDocument, _>(
                    "responses",
                    RESPONSE_COLLECTION_NAME,
                    question_id,
                    doc! {"question_id": to_bson_uuid(question_id)},
                    oldest_first(),
                )
                .await
                .map_err(Into::into)
        })
    }

    fn responses_for_participant(
        &self,
        participant_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<ResponseEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_many::<MongoResponseDocument, _>(
                    "responses",
                    RESPONSE_COLLECTION_NAME,
                    participant_id,
                    doc! {"participant_id": to_bson_uuid(participant_id)},
                    oldest_first(),
                )
                .await
                .map_err(Into::into)
        })
    }

    fn responses_for_event(
        &self,
        event_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<ResponseEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_many::<MongoResponseDocument, _>(
                    "responses",
                    RESPONSE_COLLECTION_NAME,
                    event_id,
                    doc! {"event_id": to_bson_uuid(event_id)},
                    oldest_first(),
                )
                .await
                .map_err(Into::into)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
