use thiserror::Error;

/// High-level phases a presenter session moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Session opened but not started; nothing shown yet.
    Idle,
    /// Rules and instructions are shown; the timer is inactive.
    Briefing,
    /// A question is displayed and its countdown is running or paused.
    Active,
    /// The correct answer for the current question is shown.
    Revealed,
    /// The leaderboard is shown.
    Standings(StandingsOrigin),
    /// The last question has been passed.
    Finished,
}

/// Remembers where the leaderboard was opened from so `continue` knows where to go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandingsOrigin {
    /// Opened mid-question; continuing resumes the same question.
    Active,
    /// Opened after a reveal; continuing moves to the next question.
    Revealed,
}

/// Commands and triggers that can be applied to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Host opens the briefing.
    Start,
    /// Host shows the first question.
    BeginQuestions,
    /// Host reveals the current answer.
    Reveal,
    /// Countdown reached zero and the auto-advance grace elapsed.
    CountdownExpired,
    /// Host moves on to the next question.
    Next,
    /// Host shows the leaderboard.
    ShowLeaderboard,
    /// Host leaves the leaderboard.
    Continue,
    /// Host rewinds the session to the start.
    Restart,
    /// Host pauses the countdown.
    Pause,
    /// Host resumes the countdown.
    Resume,
}

/// Whole-second countdown for the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Countdown {
    /// Seconds left; never negative.
    pub remaining_secs: u32,
    /// Whether ticks currently decrement the countdown.
    pub running: bool,
}

impl Countdown {
    fn started(limit_secs: u32) -> Self {
        Self {
            remaining_secs: limit_secs,
            running: limit_secs > 0,
        }
    }

    fn stopped(self) -> Self {
        Self {
            running: false,
            ..self
        }
    }
}

/// The part of the session state that transitions replace atomically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionState {
    /// Current phase.
    pub phase: SessionPhase,
    /// Zero-based index into the event's questions sorted by ordinal.
    pub question_index: usize,
    /// Countdown of the current question.
    pub countdown: Countdown,
}

impl SessionState {
    fn idle() -> Self {
        Self {
            phase: SessionPhase::Idle,
            question_index: 0,
            countdown: Countdown::default(),
        }
    }
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The phase the state machine was in when the invalid event was received.
    pub from: SessionPhase,
    /// The event that cannot be applied from this phase.
    pub event: SessionEvent,
}

/// Errors that can occur when planning a state machine transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    /// The requested transition is not valid from the current state.
    #[error(transparent)]
    InvalidTransition(InvalidTransition),
    /// Questions cannot begin because the event has none.
    #[error("event has no questions")]
    NoQuestions,
}

/// Errors that can occur when applying a planned state machine transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    /// State changed since the plan was created.
    #[error("state version mismatch (expected {expected}, got {actual})")]
    VersionMismatch {
        /// Version the plan expected to produce.
        expected: u64,
        /// Version that applying now would produce.
        actual: u64,
    },
}

/// A validated transition that has not been applied yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    /// State the plan was computed from.
    pub from: SessionState,
    /// State the machine will be in once applied.
    pub to: SessionState,
    /// Event that triggered this transition.
    pub event: SessionEvent,
    /// Version number after applying this transition.
    pub version_next: u64,
    /// Whether applying this plan is the first time questions are shown.
    pub locks_team_switching: bool,
}

/// Snapshot of the current state machine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    /// Phase, question index and countdown.
    pub state: SessionState,
    /// Number of questions in the event.
    pub question_count: usize,
    /// Whether an expired countdown reveals the answer on its own.
    pub auto_advance: bool,
    /// Whether team membership has been frozen for the event.
    pub team_switch_locked: bool,
    /// Version number of the state machine (increments on each change).
    pub version: u64,
}

/// Result of a once-per-second timer tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing to count down.
    Idle,
    /// One second elapsed; time remains.
    Decremented,
    /// The countdown just reached zero.
    Expired,
}

/// State machine driving one event's presenter session.
#[derive(Debug, Clone)]
pub struct SessionStateMachine {
    state: SessionState,
    time_limits: Vec<u32>,
    auto_advance: bool,
    team_switch_locked: bool,
    version: u64,
}

impl SessionStateMachine {
    /// Create a state machine in `Idle` for questions with the given time limits.
    pub fn new(time_limits: Vec<u32>, auto_advance: bool, team_switch_locked: bool) -> Self {
        Self {
            state: SessionState::idle(),
            time_limits,
            auto_advance,
            team_switch_locked,
            version: 0,
        }
    }

    /// Inspect the current phase.
    pub fn phase(&self) -> SessionPhase {
        self.state.phase
    }

    /// Create a snapshot of the current state machine state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state,
            question_count: self.time_limits.len(),
            auto_advance: self.auto_advance,
            team_switch_locked: self.team_switch_locked,
            version: self.version,
        }
    }

    /// Validate that `event` can be applied from the current state.
    pub fn plan(&self, event: SessionEvent) -> Result<Plan, PlanError> {
        let to = self.compute_transition(event)?;
        let locks_team_switching = !self.team_switch_locked
            && self.state.phase == SessionPhase::Briefing
            && to.phase == SessionPhase::Active;

        Ok(Plan {
            from: self.state,
            to,
            event,
            version_next: self.version + 1,
            locks_team_switching,
        })
    }

    /// Apply a planned transition, returning the resulting snapshot.
    pub fn apply(&mut self, plan: Plan) -> Result<Snapshot, ApplyError> {
        if self.version + 1 != plan.version_next || self.state != plan.from {
            return Err(ApplyError::VersionMismatch {
                expected: plan.version_next,
                actual: self.version + 1,
            });
        }

        self.state = plan.to;
        self.version = plan.version_next;
        if plan.locks_team_switching {
            self.team_switch_locked = true;
        }

        Ok(self.snapshot())
    }

    /// Advance the countdown by one second if a question is live.
    pub fn tick(&mut self) -> TickOutcome {
        let countdown = &mut self.state.countdown;
        if self.state.phase != SessionPhase::Active
            || !countdown.running
            || countdown.remaining_secs == 0
        {
            return TickOutcome::Idle;
        }

        countdown.remaining_secs -= 1;
        self.version += 1;
        if countdown.remaining_secs == 0 {
            countdown.running = false;
            TickOutcome::Expired
        } else {
            TickOutcome::Decremented
        }
    }

    /// Toggle the auto-advance preference. Allowed in every phase.
    pub fn set_auto_advance(&mut self, enabled: bool) -> Snapshot {
        if self.auto_advance != enabled {
            self.auto_advance = enabled;
            self.version += 1;
        }
        self.snapshot()
    }

    fn question_started(&self, question_index: usize) -> SessionState {
        let limit = self.time_limits.get(question_index).copied().unwrap_or(0);
        SessionState {
            phase: SessionPhase::Active,
            question_index,
            countdown: Countdown::started(limit),
        }
    }

    /// Move past the current question: either to the next one or to `Finished`.
    fn advance(&self) -> SessionState {
        let next_index = self.state.question_index + 1;
        if next_index < self.time_limits.len() {
            self.question_started(next_index)
        } else {
            SessionState {
                phase: SessionPhase::Finished,
                question_index: self.state.question_index,
                countdown: self.state.countdown.stopped(),
            }
        }
    }

    fn with_phase(&self, phase: SessionPhase) -> SessionState {
        SessionState {
            phase,
            ..self.state
        }
    }

    /// Compute a transition from an event if the transition is valid.
    fn compute_transition(&self, event: SessionEvent) -> Result<SessionState, PlanError> {
        use SessionEvent as E;
        use SessionPhase as P;

        let countdown = self.state.countdown;
        let next = match (self.state.phase, event) {
            (_, E::Restart) => SessionState::idle(),
            (P::Idle, E::Start) => self.with_phase(P::Briefing),
            (P::Briefing, E::BeginQuestions) => {
                if self.time_limits.is_empty() {
                    return Err(PlanError::NoQuestions);
                }
                self.question_started(0)
            }
            (P::Active, E::Reveal) => SessionState {
                phase: P::Revealed,
                countdown: countdown.stopped(),
                ..self.state
            },
            (P::Active, E::CountdownExpired) if countdown.remaining_secs == 0 => SessionState {
                phase: P::Revealed,
                countdown: countdown.stopped(),
                ..self.state
            },
            (P::Active, E::Pause) if countdown.running => SessionState {
                countdown: countdown.stopped(),
                ..self.state
            },
            (P::Active, E::Resume) if !countdown.running && countdown.remaining_secs > 0 => {
                SessionState {
                    countdown: Countdown {
                        running: true,
                        ..countdown
                    },
                    ..self.state
                }
            }
            (P::Active, E::ShowLeaderboard) => {
                self.with_phase(P::Standings(StandingsOrigin::Active))
            }
            (P::Revealed, E::ShowLeaderboard) => {
                self.with_phase(P::Standings(StandingsOrigin::Revealed))
            }
            (P::Revealed, E::Next | E::Continue) => self.advance(),
            (P::Standings(StandingsOrigin::Revealed), E::Next | E::Continue) => self.advance(),
            (P::Standings(StandingsOrigin::Active), E::Next | E::Continue) => {
                self.with_phase(P::Active)
            }
            (from, event) => {
                return Err(PlanError::InvalidTransition(InvalidTransition { from, event }));
            }
        };

        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(sm: &mut SessionStateMachine, event: SessionEvent) -> SessionState {
        let plan = sm.plan(event).unwrap();
        sm.apply(plan).unwrap().state
    }

    fn three_questions() -> SessionStateMachine {
        SessionStateMachine::new(vec![30, 20, 10], false, false)
    }

    #[test]
    fn initial_state_is_idle() {
        let sm = three_questions();
        assert_eq!(sm.phase(), SessionPhase::Idle);
        assert_eq!(sm.snapshot().question_count, 3);
    }

    #[test]
    fn full_happy_path_through_session() {
        let mut sm = three_questions();

        assert_eq!(apply(&mut sm, SessionEvent::Start).phase, SessionPhase::Briefing);

        let active = apply(&mut sm, SessionEvent::BeginQuestions);
        assert_eq!(active.phase, SessionPhase::Active);
        assert_eq!(active.question_index, 0);
        assert_eq!(
            active.countdown,
            Countdown {
                remaining_secs: 30,
                running: true
            }
        );

        let revealed = apply(&mut sm, SessionEvent::Reveal);
        assert_eq!(revealed.phase, SessionPhase::Revealed);
        assert!(!revealed.countdown.running);

        let second = apply(&mut sm, SessionEvent::Next);
        assert_eq!(second.phase, SessionPhase::Active);
        assert_eq!(second.question_index, 1);
        assert_eq!(second.countdown.remaining_secs, 20);

        apply(&mut sm, SessionEvent::Reveal);
        assert_eq!(
            apply(&mut sm, SessionEvent::ShowLeaderboard).phase,
            SessionPhase::Standings(StandingsOrigin::Revealed)
        );

        let third = apply(&mut sm, SessionEvent::Continue);
        assert_eq!(third.question_index, 2);
        assert_eq!(third.countdown.remaining_secs, 10);

        apply(&mut sm, SessionEvent::Reveal);
        assert_eq!(apply(&mut sm, SessionEvent::Next).phase, SessionPhase::Finished);
    }

    #[test]
    fn next_while_active_is_rejected_and_state_unchanged() {
        let mut sm = three_questions();
        apply(&mut sm, SessionEvent::Start);
        apply(&mut sm, SessionEvent::BeginQuestions);
        let before = sm.snapshot();

        let err = sm.plan(SessionEvent::Next).unwrap_err();
        assert_eq!(
            err,
            PlanError::InvalidTransition(InvalidTransition {
                from: SessionPhase::Active,
                event: SessionEvent::Next,
            })
        );
        assert_eq!(sm.snapshot(), before);
    }

    #[test]
    fn reveal_is_never_reachable_before_a_question_is_shown() {
        let mut sm = three_questions();
        for event in [SessionEvent::Reveal, SessionEvent::CountdownExpired] {
            assert!(sm.plan(event).is_err(), "{event:?} from Idle");
        }
        apply(&mut sm, SessionEvent::Start);
        for event in [
            SessionEvent::Reveal,
            SessionEvent::CountdownExpired,
            SessionEvent::Next,
            SessionEvent::ShowLeaderboard,
            SessionEvent::Continue,
        ] {
            assert!(sm.plan(event).is_err(), "{event:?} from Briefing");
        }
    }

    #[test]
    fn leaderboard_from_active_resumes_the_same_question() {
        let mut sm = three_questions();
        apply(&mut sm, SessionEvent::Start);
        apply(&mut sm, SessionEvent::BeginQuestions);
        for _ in 0..5 {
            sm.tick();
        }

        let standings = apply(&mut sm, SessionEvent::ShowLeaderboard);
        assert_eq!(
            standings.phase,
            SessionPhase::Standings(StandingsOrigin::Active)
        );
        assert_eq!(sm.tick(), TickOutcome::Idle);
        assert_eq!(standings.countdown.remaining_secs, 25);

        let resumed = apply(&mut sm, SessionEvent::Continue);
        assert_eq!(resumed.phase, SessionPhase::Active);
        assert_eq!(resumed.question_index, 0);
        assert_eq!(
            resumed.countdown,
            Countdown {
                remaining_secs: 25,
                running: true
            }
        );
    }

    #[test]
    fn continue_from_standings_at_last_question_finishes() {
        let mut sm = SessionStateMachine::new(vec![15], false, false);
        apply(&mut sm, SessionEvent::Start);
        apply(&mut sm, SessionEvent::BeginQuestions);
        apply(&mut sm, SessionEvent::Reveal);
        apply(&mut sm, SessionEvent::ShowLeaderboard);
        assert_eq!(apply(&mut sm, SessionEvent::Continue).phase, SessionPhase::Finished);
        assert!(sm.plan(SessionEvent::Next).is_err());
    }

    #[test]
    fn restart_is_accepted_from_every_phase() {
        let mut sm = three_questions();
        apply(&mut sm, SessionEvent::Start);
        apply(&mut sm, SessionEvent::BeginQuestions);
        apply(&mut sm, SessionEvent::Reveal);
        apply(&mut sm, SessionEvent::Next);

        let idle = apply(&mut sm, SessionEvent::Restart);
        assert_eq!(idle, SessionState::idle());
        assert_eq!(apply(&mut sm, SessionEvent::Restart), SessionState::idle());
    }

    #[test]
    fn pause_and_resume_only_while_active() {
        let mut sm = three_questions();
        assert!(sm.plan(SessionEvent::Pause).is_err());
        apply(&mut sm, SessionEvent::Start);
        apply(&mut sm, SessionEvent::BeginQuestions);

        let paused = apply(&mut sm, SessionEvent::Pause);
        assert!(!paused.countdown.running);
        assert!(sm.plan(SessionEvent::Pause).is_err());
        assert_eq!(sm.tick(), TickOutcome::Idle);

        let resumed = apply(&mut sm, SessionEvent::Resume);
        assert!(resumed.countdown.running);
        assert!(sm.plan(SessionEvent::Resume).is_err());

        apply(&mut sm, SessionEvent::Reveal);
        assert!(sm.plan(SessionEvent::Resume).is_err());
    }

    #[test]
    fn countdown_expires_once_and_never_goes_negative() {
        let mut sm = SessionStateMachine::new(vec![3], true, false);
        apply(&mut sm, SessionEvent::Start);
        apply(&mut sm, SessionEvent::BeginQuestions);

        assert!(sm.plan(SessionEvent::CountdownExpired).is_err());
        assert_eq!(sm.tick(), TickOutcome::Decremented);
        assert_eq!(sm.tick(), TickOutcome::Decremented);
        assert_eq!(sm.tick(), TickOutcome::Expired);
        assert_eq!(sm.tick(), TickOutcome::Idle);
        assert_eq!(sm.snapshot().state.countdown.remaining_secs, 0);
        assert!(sm.plan(SessionEvent::Resume).is_err());

        let revealed = apply(&mut sm, SessionEvent::CountdownExpired);
        assert_eq!(revealed.phase, SessionPhase::Revealed);
        assert!(sm.plan(SessionEvent::CountdownExpired).is_err());
    }

    #[test]
    fn only_first_question_start_locks_team_switching() {
        let mut sm = three_questions();
        apply(&mut sm, SessionEvent::Start);
        let plan = sm.plan(SessionEvent::BeginQuestions).unwrap();
        assert!(plan.locks_team_switching);
        sm.apply(plan).unwrap();
        assert!(sm.snapshot().team_switch_locked);

        apply(&mut sm, SessionEvent::Restart);
        assert!(sm.snapshot().team_switch_locked);
        apply(&mut sm, SessionEvent::Start);
        assert!(!sm.plan(SessionEvent::BeginQuestions).unwrap().locks_team_switching);
    }

    #[test]
    fn begin_questions_without_questions_is_rejected() {
        let mut sm = SessionStateMachine::new(Vec::new(), false, false);
        apply(&mut sm, SessionEvent::Start);
        assert_eq!(
            sm.plan(SessionEvent::BeginQuestions).unwrap_err(),
            PlanError::NoQuestions
        );
    }

    #[test]
    fn stale_plan_is_refused() {
        let mut sm = three_questions();
        apply(&mut sm, SessionEvent::Start);
        apply(&mut sm, SessionEvent::BeginQuestions);

        let plan = sm.plan(SessionEvent::Reveal).unwrap();
        sm.tick();
        assert!(matches!(
            sm.apply(plan),
            Err(ApplyError::VersionMismatch { .. })
        ));
        assert_eq!(sm.phase(), SessionPhase::Active);
    }
}
