//! Per-event session owner task.
//!
//! Each open event gets one task that owns its [`SessionStateMachine`]. Host
//! commands, the once-per-second tick and the auto-reveal deadline are all
//! handled on that task, so transitions for one event never interleave. Readers
//! poll the latest [`SessionSnapshot`] through a `watch` channel without
//! touching the task.

use std::{
    sync::{Arc, Weak},
    time::Duration,
};

use tokio::{
    sync::{mpsc, oneshot, watch},
    time::{Instant, Interval, MissedTickBehavior, interval_at, sleep_until, timeout},
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dao::{models::QuestionEntity, trivia_store::TriviaStore},
    error::ServiceError,
    state::{
        AppState, SharedState,
        state_machine::{
            Countdown, SessionEvent, SessionPhase, SessionStateMachine, Snapshot, TickOutcome,
        },
    },
};

const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Tunables applied to every session task.
#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    /// Delay between the countdown hitting zero and the automatic reveal.
    pub auto_reveal_grace: Duration,
    /// Upper bound on storage side effects performed during a transition.
    pub transition_timeout: Duration,
    /// Capacity of the command channel feeding the task.
    pub command_buffer: usize,
    /// Auto-advance preference for freshly opened sessions.
    pub default_auto_advance: bool,
}

impl From<&AppConfig> for SessionSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            auto_reveal_grace: config.auto_reveal_grace(),
            transition_timeout: config.transition_timeout(),
            command_buffer: config.session_command_buffer(),
            default_auto_advance: config.default_auto_advance(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

/// Point-in-time view of a session, safe to hand to any number of pollers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Event the session belongs to.
    pub event_id: Uuid,
    /// Current phase.
    pub phase: SessionPhase,
    /// Zero-based index of the current question.
    pub question_index: usize,
    /// Identifier of the current question once questions have begun.
    pub question_id: Option<Uuid>,
    /// Number of questions in the event.
    pub question_count: usize,
    /// Countdown of the current question.
    pub countdown: Countdown,
    /// Whether an expired countdown reveals the answer on its own.
    pub auto_advance: bool,
    /// Whether team membership is frozen for the event.
    pub team_switch_locked: bool,
    /// Monotonic change counter.
    pub version: u64,
}

impl SessionSnapshot {
    /// Snapshot reported for an event nobody has opened a presenter view for.
    pub fn unopened(event_id: Uuid, question_count: usize, team_switch_locked: bool) -> Self {
        Self {
            event_id,
            phase: SessionPhase::Idle,
            question_index: 0,
            question_id: None,
            question_count,
            countdown: Countdown::default(),
            auto_advance: false,
            team_switch_locked,
            version: 0,
        }
    }

    fn build(event_id: Uuid, question_ids: &[Uuid], snapshot: Snapshot) -> Self {
        let question_id = match snapshot.state.phase {
            SessionPhase::Idle | SessionPhase::Briefing => None,
            _ => question_ids.get(snapshot.state.question_index).copied(),
        };

        Self {
            event_id,
            phase: snapshot.state.phase,
            question_index: snapshot.state.question_index,
            question_id,
            question_count: snapshot.question_count,
            countdown: snapshot.state.countdown,
            auto_advance: snapshot.auto_advance,
            team_switch_locked: snapshot.team_switch_locked,
            version: snapshot.version,
        }
    }
}

enum SessionRequest {
    Transition {
        event: SessionEvent,
        reply: oneshot::Sender<Result<SessionSnapshot, ServiceError>>,
    },
    SetAutoAdvance {
        enabled: bool,
        reply: oneshot::Sender<SessionSnapshot>,
    },
}

/// Cloneable handle to a running session task.
///
/// The task stops once every handle has been dropped.
#[derive(Clone)]
pub struct SessionHandle {
    event_id: Uuid,
    commands: mpsc::Sender<SessionRequest>,
    snapshot: watch::Receiver<SessionSnapshot>,
}

impl SessionHandle {
    /// Spawn the owner task for `event_id` over its questions (sorted by ordinal).
    ///
    /// The task resolves the store through `state` on every side effect, so a
    /// backend swapped in by the storage supervisor is picked up by sessions
    /// that were already open. Only a weak reference is kept because the state
    /// itself holds the handle.
    pub fn spawn(
        event_id: Uuid,
        questions: &[QuestionEntity],
        team_switch_locked: bool,
        state: &SharedState,
        settings: SessionSettings,
    ) -> Self {
        let question_ids: Vec<Uuid> = questions.iter().map(|question| question.id).collect();
        let time_limits = questions
            .iter()
            .map(|question| question.time_limit_secs)
            .collect();
        let machine = SessionStateMachine::new(
            time_limits,
            settings.default_auto_advance,
            team_switch_locked,
        );

        let initial = SessionSnapshot::build(event_id, &question_ids, machine.snapshot());
        let (snapshot_tx, snapshot_rx) = watch::channel(initial);
        let (commands_tx, commands_rx) = mpsc::channel(settings.command_buffer.max(1));

        let actor = SessionActor {
            event_id,
            machine,
            question_ids,
            app: Arc::downgrade(state),
            settings,
            snapshot_tx,
            auto_reveal_at: None,
        };
        tokio::spawn(actor.run(commands_rx));

        Self {
            event_id,
            commands: commands_tx,
            snapshot: snapshot_rx,
        }
    }

    /// Event this session belongs to.
    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Receive every subsequent snapshot change.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot.clone()
    }

    /// Ask the owner task to apply `event`, returning the resulting snapshot.
    pub async fn send(&self, event: SessionEvent) -> Result<SessionSnapshot, ServiceError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(SessionRequest::Transition { event, reply })
            .await
            .map_err(|_| self.closed())?;
        response.await.map_err(|_| self.closed())?
    }

    /// Change the auto-advance preference.
    pub async fn set_auto_advance(&self, enabled: bool) -> Result<SessionSnapshot, ServiceError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(SessionRequest::SetAutoAdvance { enabled, reply })
            .await
            .map_err(|_| self.closed())?;
        response.await.map_err(|_| self.closed())
    }

    fn closed(&self) -> ServiceError {
        ServiceError::NotFound(format!("session for event `{}` is closed", self.event_id))
    }
}

struct SessionActor {
    event_id: Uuid,
    machine: SessionStateMachine,
    question_ids: Vec<Uuid>,
    app: Weak<AppState>,
    settings: SessionSettings,
    snapshot_tx: watch::Sender<SessionSnapshot>,
    auto_reveal_at: Option<Instant>,
}

impl SessionActor {
    async fn run(mut self, mut commands: mpsc::Receiver<SessionRequest>) {
        let mut ticker = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(event_id = %self.event_id, "session opened");

        loop {
            let auto_reveal_at = self.auto_reveal_at;
            tokio::select! {
                request = commands.recv() => match request {
                    Some(request) => self.handle_request(request, &mut ticker).await,
                    None => break,
                },
                _ = ticker.tick() => self.on_tick(),
                _ = sleep_until(auto_reveal_at.unwrap_or_else(Instant::now)), if auto_reveal_at.is_some() => {
                    self.on_auto_reveal(&mut ticker).await;
                }
            }
        }

        info!(event_id = %self.event_id, "session closed");
    }

    async fn handle_request(&mut self, request: SessionRequest, ticker: &mut Interval) {
        match request {
            SessionRequest::Transition { event, reply } => {
                let result = self.run_transition(event, ticker).await;
                let _ = reply.send(result);
            }
            SessionRequest::SetAutoAdvance { enabled, reply } => {
                self.machine.set_auto_advance(enabled);
                if enabled {
                    self.arm_auto_reveal();
                } else {
                    self.auto_reveal_at = None;
                }
                debug!(event_id = %self.event_id, enabled, "auto-advance updated");
                let _ = reply.send(self.publish());
            }
        }
    }

    /// Plan, perform side effects, then apply. A failed side effect aborts the
    /// transition and leaves the state untouched.
    async fn run_transition(
        &mut self,
        event: SessionEvent,
        ticker: &mut Interval,
    ) -> Result<SessionSnapshot, ServiceError> {
        let plan = self.machine.plan(event)?;

        if plan.locks_team_switching {
            let store = self.current_store().await?;
            match timeout(
                self.settings.transition_timeout,
                store.lock_team_switching(self.event_id),
            )
            .await
            {
                Ok(Ok(changed)) => {
                    info!(event_id = %self.event_id, participants = changed, "team switching locked");
                }
                Ok(Err(err)) => {
                    warn!(event_id = %self.event_id, ?event, error = %err, "aborting transition: team lock failed");
                    return Err(ServiceError::Unavailable(err));
                }
                Err(_) => {
                    warn!(event_id = %self.event_id, ?event, "aborting transition: team lock timed out");
                    return Err(ServiceError::Timeout);
                }
            }
        }

        let snapshot = self.machine.apply(plan)?;
        self.auto_reveal_at = None;
        self.arm_auto_reveal();
        if snapshot.state.phase == SessionPhase::Active && snapshot.state.countdown.running {
            ticker.reset();
        }

        info!(
            event_id = %self.event_id,
            ?event,
            phase = ?snapshot.state.phase,
            question_index = snapshot.state.question_index,
            "session transition applied"
        );
        Ok(self.publish())
    }

    fn on_tick(&mut self) {
        match self.machine.tick() {
            TickOutcome::Idle => {}
            TickOutcome::Decremented => {
                self.publish();
            }
            TickOutcome::Expired => {
                self.arm_auto_reveal();
                debug!(event_id = %self.event_id, auto_advance = self.auto_reveal_at.is_some(), "countdown expired");
                self.publish();
            }
        }
    }

    /// Schedule the automatic reveal when the question on screen has no time
    /// left and auto-advance is on. An already pending deadline is kept.
    fn arm_auto_reveal(&mut self) {
        if self.auto_reveal_at.is_some() {
            return;
        }
        let snapshot = self.machine.snapshot();
        if snapshot.auto_advance
            && snapshot.state.phase == SessionPhase::Active
            && snapshot.state.countdown.remaining_secs == 0
        {
            self.auto_reveal_at = Some(Instant::now() + self.settings.auto_reveal_grace);
        }
    }

    async fn current_store(&self) -> Result<Arc<dyn TriviaStore>, ServiceError> {
        let app = self.app.upgrade().ok_or(ServiceError::Degraded)?;
        app.require_trivia_store().await
    }

    async fn on_auto_reveal(&mut self, ticker: &mut Interval) {
        self.auto_reveal_at = None;
        if let Err(err) = self
            .run_transition(SessionEvent::CountdownExpired, ticker)
            .await
        {
            debug!(event_id = %self.event_id, error = %err, "automatic reveal skipped");
        }
    }

    fn publish(&self) -> SessionSnapshot {
        let snapshot =
            SessionSnapshot::build(self.event_id, &self.question_ids, self.machine.snapshot());
        self.snapshot_tx.send_replace(snapshot.clone());
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use super::*;
    use crate::dao::{
        models::{EventEntity, ParticipantEntity, QuestionKind},
        trivia_store::MemoryTriviaStore,
    };

    async fn app_with(store: MemoryTriviaStore) -> SharedState {
        AppState::with_store(AppConfig::default(), Arc::new(store)).await
    }

    fn question(event_id: Uuid, ordinal: u32, time_limit_secs: u32) -> QuestionEntity {
        QuestionEntity {
            id: Uuid::new_v4(),
            event_id,
            ordinal,
            prompt: format!("Question {ordinal}"),
            kind: QuestionKind::TrueFalse,
            options: Vec::new(),
            correct_answer: "True".into(),
            time_limit_secs,
            explanation: None,
            difficulty: None,
            category: None,
        }
    }

    fn settings(auto_advance: bool) -> SessionSettings {
        SessionSettings {
            auto_reveal_grace: Duration::from_secs(2),
            transition_timeout: Duration::from_secs(5),
            command_buffer: 8,
            default_auto_advance: auto_advance,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_ticks_once_per_second() {
        let event_id = Uuid::new_v4();
        let questions = vec![question(event_id, 1, 10)];
        let app = app_with(MemoryTriviaStore::new()).await;
        let handle = SessionHandle::spawn(event_id, &questions, false, &app, settings(false));

        handle.send(SessionEvent::Start).await.unwrap();
        let active = handle.send(SessionEvent::BeginQuestions).await.unwrap();
        assert_eq!(active.question_id, Some(questions[0].id));
        assert_eq!(active.countdown.remaining_secs, 10);

        tokio::time::sleep(Duration::from_millis(3_500)).await;
        assert_eq!(handle.snapshot().countdown.remaining_secs, 7);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_countdown_auto_reveals_after_grace() {
        let event_id = Uuid::new_v4();
        let questions = vec![question(event_id, 1, 3), question(event_id, 2, 3)];
        let app = app_with(MemoryTriviaStore::new()).await;
        let handle = SessionHandle::spawn(event_id, &questions, false, &app, settings(true));

        handle.send(SessionEvent::Start).await.unwrap();
        handle.send(SessionEvent::BeginQuestions).await.unwrap();

        tokio::time::sleep(Duration::from_millis(3_500)).await;
        let expired = handle.snapshot();
        assert_eq!(expired.phase, SessionPhase::Active);
        assert_eq!(expired.countdown.remaining_secs, 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(handle.snapshot().phase, SessionPhase::Revealed);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_countdown_waits_for_host_without_auto_advance() {
        let event_id = Uuid::new_v4();
        let questions = vec![question(event_id, 1, 2)];
        let app = app_with(MemoryTriviaStore::new()).await;
        let handle = SessionHandle::spawn(event_id, &questions, false, &app, settings(false));

        handle.send(SessionEvent::Start).await.unwrap();
        handle.send(SessionEvent::BeginQuestions).await.unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;

        let snapshot = handle.snapshot();
        assert_eq!(snapshot.phase, SessionPhase::Active);
        assert_eq!(snapshot.countdown.remaining_secs, 0);

        let revealed = handle.send(SessionEvent::Reveal).await.unwrap();
        assert_eq!(revealed.phase, SessionPhase::Revealed);
    }

    #[tokio::test(start_paused = true)]
    async fn host_reveal_during_grace_is_not_applied_twice() {
        let event_id = Uuid::new_v4();
        let questions = vec![question(event_id, 1, 1), question(event_id, 2, 30)];
        let app = app_with(MemoryTriviaStore::new()).await;
        let handle = SessionHandle::spawn(event_id, &questions, false, &app, settings(true));

        handle.send(SessionEvent::Start).await.unwrap();
        handle.send(SessionEvent::BeginQuestions).await.unwrap();
        tokio::time::sleep(Duration::from_millis(1_500)).await;

        let revealed = handle.send(SessionEvent::Reveal).await.unwrap();
        let next = handle.send(SessionEvent::Next).await.unwrap();
        assert_eq!(next.question_index, 1);

        tokio::time::sleep(Duration::from_secs(3)).await;
        let snapshot = handle.snapshot();
        assert_eq!(snapshot.phase, SessionPhase::Active);
        assert_eq!(snapshot.question_index, 1);
        assert!(snapshot.version > revealed.version);
    }

    #[tokio::test]
    async fn invalid_command_is_reported_without_changing_state() {
        let event_id = Uuid::new_v4();
        let questions = vec![question(event_id, 1, 30)];
        let app = app_with(MemoryTriviaStore::new()).await;
        let handle = SessionHandle::spawn(event_id, &questions, false, &app, settings(false));

        let err = handle.send(SessionEvent::Next).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidTransition(_)));
        assert_eq!(handle.snapshot().phase, SessionPhase::Idle);
        assert_eq!(handle.snapshot().version, 0);
    }

    #[tokio::test]
    async fn beginning_questions_locks_team_switching_in_store() {
        let event_id = Uuid::new_v4();
        let questions = vec![question(event_id, 1, 30)];
        let store = MemoryTriviaStore::new();
        let participant = ParticipantEntity {
            id: Uuid::new_v4(),
            event_id,
            name: "Ada".into(),
            team_id: None,
            can_switch_team: true,
            is_active: true,
            last_active_at: SystemTime::now(),
        };
        store.insert_participant(participant.clone()).await;

        let app = app_with(store.clone()).await;
        let handle = SessionHandle::spawn(event_id, &questions, false, &app, settings(false));
        handle.send(SessionEvent::Start).await.unwrap();
        assert!(
            store
                .find_participant(participant.id)
                .await
                .unwrap()
                .unwrap()
                .can_switch_team
        );

        let active = handle.send(SessionEvent::BeginQuestions).await.unwrap();
        assert!(active.team_switch_locked);
        assert!(
            !store
                .find_participant(participant.id)
                .await
                .unwrap()
                .unwrap()
                .can_switch_team
        );
    }

    #[tokio::test(start_paused = true)]
    async fn zero_limit_question_reveals_itself_when_auto_advance_is_on() {
        let event_id = Uuid::new_v4();
        let questions = vec![question(event_id, 1, 0), question(event_id, 2, 30)];
        let app = app_with(MemoryTriviaStore::new()).await;
        let handle = SessionHandle::spawn(event_id, &questions, false, &app, settings(true));

        handle.send(SessionEvent::Start).await.unwrap();
        let active = handle.send(SessionEvent::BeginQuestions).await.unwrap();
        assert_eq!(active.countdown.remaining_secs, 0);
        assert!(!active.countdown.running);

        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(handle.snapshot().phase, SessionPhase::Revealed);
    }

    #[tokio::test(start_paused = true)]
    async fn leaderboard_during_grace_still_reveals_after_continue() {
        let event_id = Uuid::new_v4();
        let questions = vec![question(event_id, 1, 2), question(event_id, 2, 30)];
        let app = app_with(MemoryTriviaStore::new()).await;
        let handle = SessionHandle::spawn(event_id, &questions, false, &app, settings(true));

        handle.send(SessionEvent::Start).await.unwrap();
        handle.send(SessionEvent::BeginQuestions).await.unwrap();
        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(handle.snapshot().countdown.remaining_secs, 0);

        handle.send(SessionEvent::ShowLeaderboard).await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(
            handle.snapshot().phase,
            SessionPhase::Standings(crate::state::StandingsOrigin::Active)
        );

        let resumed = handle.send(SessionEvent::Continue).await.unwrap();
        assert_eq!(resumed.phase, SessionPhase::Active);
        assert_eq!(resumed.countdown.remaining_secs, 0);

        tokio::time::sleep(Duration::from_millis(2_500)).await;
        let snapshot = handle.snapshot();
        assert_eq!(snapshot.phase, SessionPhase::Revealed);
        assert_eq!(snapshot.question_index, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn turning_auto_advance_off_cancels_pending_reveal() {
        let event_id = Uuid::new_v4();
        let questions = vec![question(event_id, 1, 1)];
        let app = app_with(MemoryTriviaStore::new()).await;
        let handle = SessionHandle::spawn(event_id, &questions, false, &app, settings(true));

        handle.send(SessionEvent::Start).await.unwrap();
        handle.send(SessionEvent::BeginQuestions).await.unwrap();
        tokio::time::sleep(Duration::from_millis(1_500)).await;

        handle.set_auto_advance(false).await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(handle.snapshot().phase, SessionPhase::Active);
    }

    #[tokio::test]
    async fn lock_is_written_to_the_store_installed_after_opening() {
        let event_id = Uuid::new_v4();
        let questions = vec![question(event_id, 1, 30)];
        let event = EventEntity {
            id: event_id,
            name: "Quiz night".into(),
            team_switch_locked: false,
            created_at: SystemTime::now(),
        };
        let first = MemoryTriviaStore::new();
        first.insert_event(event.clone()).await;
        let app = app_with(first.clone()).await;
        let handle = SessionHandle::spawn(event_id, &questions, false, &app, settings(false));
        handle.send(SessionEvent::Start).await.unwrap();

        let replacement = MemoryTriviaStore::new();
        replacement.insert_event(event).await;
        app.clear_trivia_store().await;
        app.set_trivia_store(Arc::new(replacement.clone())).await;

        handle.send(SessionEvent::BeginQuestions).await.unwrap();
        let locked = replacement.find_event(event_id).await.unwrap().unwrap();
        assert!(locked.team_switch_locked);
        let untouched = first.find_event(event_id).await.unwrap().unwrap();
        assert!(!untouched.team_switch_locked);
    }

    #[tokio::test]
    async fn degraded_store_keeps_session_in_briefing() {
        let event_id = Uuid::new_v4();
        let questions = vec![question(event_id, 1, 30)];
        let app = app_with(MemoryTriviaStore::new()).await;
        let handle = SessionHandle::spawn(event_id, &questions, false, &app, settings(false));
        handle.send(SessionEvent::Start).await.unwrap();

        app.clear_trivia_store().await;
        let err = handle.send(SessionEvent::BeginQuestions).await.unwrap_err();
        assert!(matches!(err, ServiceError::Degraded));

        let snapshot = handle.snapshot();
        assert_eq!(snapshot.phase, SessionPhase::Briefing);
        assert!(!snapshot.team_switch_locked);
    }

    #[tokio::test]
    async fn task_stops_when_last_handle_is_dropped() {
        let event_id = Uuid::new_v4();
        let app = app_with(MemoryTriviaStore::new()).await;
        let handle = SessionHandle::spawn(event_id, &[], false, &app, settings(false));
        let mut watcher = handle.subscribe();
        drop(handle);

        assert!(watcher.changed().await.is_err());
    }
}
