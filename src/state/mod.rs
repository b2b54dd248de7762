pub mod session;
pub mod state_machine;

use std::sync::Arc;

use dashmap::{DashMap, mapref::entry::Entry};
use tokio::sync::{RwLock, watch};
use uuid::Uuid;

use crate::{config::AppConfig, dao::trivia_store::TriviaStore, error::ServiceError};

pub use self::session::{SessionHandle, SessionSettings, SessionSnapshot};
pub use self::state_machine::{
    ApplyError, Countdown, InvalidTransition, PlanError, SessionEvent, SessionPhase, Snapshot,
    StandingsOrigin,
};

pub type SharedState = Arc<AppState>;

/// Central application state: storage handle, degraded flag and the open
/// presenter sessions keyed by event.
///
/// Session state is process memory only; a restart drops every open session.
pub struct AppState {
    trivia_store: RwLock<Option<Arc<dyn TriviaStore>>>,
    sessions: DashMap<Uuid, SessionHandle>,
    degraded: watch::Sender<bool>,
    config: AppConfig,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            trivia_store: RwLock::new(None),
            sessions: DashMap::new(),
            degraded: degraded_tx,
            config,
        })
    }

    /// Build a state with `store` already installed.
    pub async fn with_store(config: AppConfig, store: Arc<dyn TriviaStore>) -> SharedState {
        let state = Self::new(config);
        state.set_trivia_store(store).await;
        state
    }

    /// Obtain a handle to the current store, if one is installed.
    pub async fn trivia_store(&self) -> Option<Arc<dyn TriviaStore>> {
        let guard = self.trivia_store.read().await;
        guard.as_ref().cloned()
    }

    /// Obtain the current store or fail with [`ServiceError::Degraded`].
    pub async fn require_trivia_store(&self) -> Result<Arc<dyn TriviaStore>, ServiceError> {
        if self.is_degraded().await {
            return Err(ServiceError::Degraded);
        }
        self.trivia_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new store implementation and leave degraded mode.
    pub async fn set_trivia_store(&self, store: Arc<dyn TriviaStore>) {
        {
            let mut guard = self.trivia_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false).await;
    }

    /// Remove the current store and enter degraded mode.
    pub async fn clear_trivia_store(&self) {
        {
            let mut guard = self.trivia_store.write().await;
            guard.take();
        }
        self.update_degraded(true).await;
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub async fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Session settings derived from the configuration.
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings::from(&self.config)
    }

    /// Handle to the open session of `event_id`, if any.
    pub fn session(&self, event_id: Uuid) -> Option<SessionHandle> {
        self.sessions.get(&event_id).map(|entry| entry.value().clone())
    }

    /// Register `handle` unless another view already opened the same event, in
    /// which case the existing handle wins and `handle` is dropped.
    pub fn register_session(&self, handle: SessionHandle) -> SessionHandle {
        match self.sessions.entry(handle.event_id()) {
            Entry::Occupied(existing) => existing.get().clone(),
            Entry::Vacant(slot) => slot.insert(handle).clone(),
        }
    }

    /// Forget the session of `event_id`; its task ends once outstanding handles drop.
    pub fn remove_session(&self, event_id: Uuid) -> Option<SessionHandle> {
        self.sessions.remove(&event_id).map(|(_, handle)| handle)
    }

    /// Number of sessions currently open.
    pub fn open_session_count(&self) -> usize {
        self.sessions.len()
    }
}
