/// Database model definitions.
pub mod models;
/// Storage abstraction layer for database operations.
pub mod storage;
/// Event, membership and response storage backends.
pub mod trivia_store;
