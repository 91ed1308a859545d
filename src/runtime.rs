//! Runtime for interactive sessions
//!
//! Each session is owned by one tokio task that applies inbound events in
//! order. Readers see the session through a watch snapshot and a broadcast
//! event feed.

mod executor;
mod orchestrator;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::SessionRuntime;
#[allow(unused_imports)] // Public API re-exports
pub use orchestrator::{respond, ReplyObserver, ReplyOutcome};
#[allow(unused_imports)] // Public API re-exports
pub use traits::*;

use crate::llm::ModelRegistry;
use crate::session::{ConversationSession, SessionSnapshot, TripProfile, Turn};
use crate::state_machine::{Event, Notice};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch, RwLock};
use tokio::task::AbortHandle;

/// How long a session with no SSE subscribers survives without events
pub const SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Handle to interact with a running session
#[derive(Clone)]
pub struct SessionHandle {
    pub event_tx: mpsc::Sender<Event>,
    pub broadcast_tx: broadcast::Sender<SseEvent>,
    pub snapshot_rx: watch::Receiver<SessionSnapshot>,
    abort: AbortHandle,
}

impl SessionHandle {
    /// Latest published state
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot_rx.borrow().clone()
    }
}

/// Events sent to SSE clients
#[derive(Debug, Clone)]
pub enum SseEvent {
    /// Full state, sent first on every new subscription
    Init { snapshot: SessionSnapshot },
    TurnAppended { index: usize, turn: Turn },
    /// The in-flight assistant turn changed
    TurnUpdated { index: usize, turn: Turn },
    TurnsCleared,
    ProfileSaved { profile: TripProfile },
    Notice(Notice),
    ReplyDone { outcome: ReplyOutcome },
    Error { message: String },
}

/// Manager for all session runtimes
pub struct SessionManager {
    llm_registry: Arc<ModelRegistry>,
    sessions: RwLock<HashMap<String, SessionHandle>>,
    idle_timeout: Duration,
}

impl SessionManager {
    pub fn new(llm_registry: Arc<ModelRegistry>) -> Self {
        Self {
            llm_registry,
            sessions: RwLock::new(HashMap::new()),
            idle_timeout: SESSION_IDLE_TIMEOUT,
        }
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Start a new, empty session
    pub async fn create(&self, model_id: Option<String>) -> (String, SessionHandle) {
        let id = uuid::Uuid::new_v4().to_string();
        let model_id = model_id.unwrap_or_else(|| self.llm_registry.default_model_id().to_string());
        let llm_client = RegistryLlmClient::new(self.llm_registry.clone(), model_id.clone());

        let handle = spawn_session(ConversationSession::new(&id), llm_client, self.idle_timeout);
        let active = {
            let mut sessions = self.sessions.write().await;
            // Forget sessions whose runtime stopped on its own
            sessions.retain(|_, handle| !handle.event_tx.is_closed());
            sessions.insert(id.clone(), handle.clone());
            sessions.len()
        };

        tracing::info!(session_id = %id, model = %model_id, active, "Session created");
        (id, handle)
    }

    /// Look up a live session. Expired sessions are dropped on sight.
    pub async fn get(&self, session_id: &str) -> Option<SessionHandle> {
        let handle = self.sessions.read().await.get(session_id).cloned()?;
        if handle.event_tx.is_closed() {
            self.sessions.write().await.remove(session_id);
            tracing::info!(session_id = %session_id, "Session expired");
            return None;
        }
        Some(handle)
    }

    /// Stop a session and forget it. Returns false for unknown IDs.
    pub async fn destroy(&self, session_id: &str) -> bool {
        let Some(handle) = self.sessions.write().await.remove(session_id) else {
            return false;
        };
        handle.abort.abort();
        tracing::info!(session_id = %session_id, "Session destroyed");
        true
    }
}

/// Spawn the runtime task for a session and return its handle
pub(crate) fn spawn_session<L: LlmClient + 'static>(
    session: ConversationSession,
    llm_client: L,
    idle_timeout: Duration,
) -> SessionHandle {
    let (event_tx, event_rx) = mpsc::channel(32);
    let (broadcast_tx, _) = broadcast::channel(256);
    let (snapshot_tx, snapshot_rx) = watch::channel(session.snapshot(false));

    let runtime = SessionRuntime::new(
        session,
        llm_client,
        event_rx,
        broadcast_tx.clone(),
        snapshot_tx,
        idle_timeout,
    );
    let task = tokio::spawn(runtime.run());

    SessionHandle {
        event_tx,
        broadcast_tx,
        snapshot_rx,
        abort: task.abort_handle(),
    }
}
