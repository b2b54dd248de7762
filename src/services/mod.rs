/// Event and question analytics.
pub mod analytics_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Team and participant standings.
pub mod leaderboard_service;
/// Answer scoring rules.
pub mod scoring;
/// Presenter session lifecycle and host commands.
pub mod session_service;
/// Storage connection supervisor with backoff.
pub mod storage_supervisor;
/// Answer submission and participant history.
pub mod submission_service;
/// Team membership changes.
pub mod team_service;
