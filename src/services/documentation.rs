use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Trivia Night Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::session::open_session,
        crate::routes::session::get_session,
        crate::routes::session::close_session,
        crate::routes::session::run_command,
        crate::routes::session::set_auto_advance,
        crate::routes::responses::submit_response,
        crate::routes::participants::participant_responses,
        crate::routes::participants::switch_team,
        crate::routes::leaderboard::leaderboard,
        crate::routes::analytics::event_analytics,
        crate::routes::analytics::question_analytics,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::phase::VisiblePhase,
            crate::dto::phase::VisibleStandingsOrigin,
            crate::dto::session::SessionCommand,
            crate::dto::session::SessionView,
            crate::dto::session::AutoAdvanceRequest,
            crate::dto::response::SubmitResponseRequest,
            crate::dto::response::ResponseView,
            crate::dto::participant::SwitchTeamRequest,
            crate::dto::participant::ParticipantView,
            crate::dto::leaderboard::LeaderboardKind,
            crate::dto::leaderboard::LeaderboardResponse,
            crate::aggregate::leaderboard::TeamStanding,
            crate::aggregate::leaderboard::ParticipantStanding,
            crate::aggregate::analytics::AnswerCount,
            crate::aggregate::analytics::QuestionSummary,
            crate::aggregate::analytics::EventTotals,
            crate::aggregate::analytics::EventAnalytics,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "session", description = "Presenter session lifecycle and host commands"),
        (name = "responses", description = "Answer submission"),
        (name = "participants", description = "Participant history and team membership"),
        (name = "leaderboard", description = "Team and participant standings"),
        (name = "analytics", description = "Post-event analytics"),
    )
)]
pub struct ApiDoc;
