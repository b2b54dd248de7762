use mongodb::error::Error as MongoError;
use thiserror::Error;
use uuid::Uuid;

pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

#[derive(Debug, Error)]
pub enum MongoDaoError {
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        attempts: u32,
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping health check failed")]
    HealthPing {
        #[source]
        source: MongoError,
    },
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        collection: &'static str,
        index: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("failed to load {kind} `{id}`")]
    Load {
        kind: &'static str,
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to list {kind} for `{owner}`")]
    List {
        kind: &'static str,
        owner: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to update participant `{id}`")]
    UpdateParticipant {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to lock team switching for event `{event_id}`")]
    LockTeams {
        event_id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to insert response `{id}`")]
    InsertResponse {
        id: Uuid,
        #[source]
        source: MongoError,
    },
}
