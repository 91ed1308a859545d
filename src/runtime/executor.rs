//! Session runtime executor

use super::orchestrator::{respond, ReplyObserver};
use super::traits::LlmClient;
use super::SseEvent;

use crate::session::{ConversationSession, SessionSnapshot, Turn};
use crate::state_machine::{transition, Effect, Event, Notice};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};

/// Generic session runtime that can work with any LLM implementation
pub struct SessionRuntime<L: LlmClient + 'static> {
    session: ConversationSession,
    llm_client: Arc<L>,
    event_rx: mpsc::Receiver<Event>,
    broadcast_tx: broadcast::Sender<SseEvent>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
    idle_timeout: Duration,
}

impl<L: LlmClient + 'static> SessionRuntime<L> {
    pub fn new(
        session: ConversationSession,
        llm_client: L,
        event_rx: mpsc::Receiver<Event>,
        broadcast_tx: broadcast::Sender<SseEvent>,
        snapshot_tx: watch::Sender<SessionSnapshot>,
        idle_timeout: Duration,
    ) -> Self {
        Self {
            session,
            llm_client: Arc::new(llm_client),
            event_rx,
            broadcast_tx,
            snapshot_tx,
            idle_timeout,
        }
    }

    pub async fn run(mut self) {
        tracing::info!(session_id = %self.session.id(), "Starting session runtime");

        // One event at a time, each run to completion including any reply
        loop {
            tokio::select! {
                event = self.event_rx.recv() => {
                    let Some(event) = event else { break };
                    if let Err(e) = self.process_event(event).await {
                        tracing::error!(session_id = %self.session.id(), error = %e, "Error handling event");
                        let _ = self.broadcast_tx.send(SseEvent::Error { message: e });
                    }
                }
                () = tokio::time::sleep(self.idle_timeout) => {
                    // Only an unwatched session expires
                    if self.broadcast_tx.receiver_count() == 0 {
                        tracing::info!(session_id = %self.session.id(), "Session idle, stopping runtime");
                        break;
                    }
                }
            }
        }

        tracing::info!(session_id = %self.session.id(), "Session runtime stopped");
    }

    async fn process_event(&mut self, event: Event) -> Result<(), String> {
        tracing::debug!(session_id = %self.session.id(), event = event.name(), "Processing event");

        let result = transition(&self.session, event).map_err(|e| e.to_string())?;
        for effect in result.effects {
            self.execute_effect(effect)?;
        }
        self.publish_snapshot(false);

        if self.session.awaiting_reply() {
            self.reply().await;
        }
        Ok(())
    }

    fn execute_effect(&mut self, effect: Effect) -> Result<(), String> {
        let sse = match &effect {
            Effect::AppendTurn { role, text } => SseEvent::TurnAppended {
                index: self.session.turns().len(),
                turn: Turn::new(*role, text.clone()),
            },
            Effect::SaveProfile { profile } => SseEvent::ProfileSaved {
                profile: profile.clone().normalized(),
            },
            Effect::ClearTurns => SseEvent::TurnsCleared,
            Effect::Notify(notice) => SseEvent::Notice(notice.clone()),
        };

        effect.apply(&mut self.session).map_err(|e| e.to_string())?;
        let _ = self.broadcast_tx.send(sse);
        Ok(())
    }

    async fn reply(&mut self) {
        self.publish_snapshot(true);

        let mut observer = Broadcaster {
            broadcast_tx: &self.broadcast_tx,
            snapshot_tx: &self.snapshot_tx,
        };
        let outcome = respond(&mut self.session, &*self.llm_client, &mut observer).await;

        self.publish_snapshot(false);
        if let Some(outcome) = outcome {
            tracing::info!(session_id = %self.session.id(), outcome = outcome.as_str(), "Reply finished");
            let _ = self.broadcast_tx.send(SseEvent::ReplyDone { outcome });
        }
    }

    fn publish_snapshot(&self, replying: bool) {
        self.snapshot_tx.send_replace(self.session.snapshot(replying));
    }
}

/// Forwards reply progress to subscribers
struct Broadcaster<'a> {
    broadcast_tx: &'a broadcast::Sender<SseEvent>,
    snapshot_tx: &'a watch::Sender<SessionSnapshot>,
}

fn last_turn(session: &ConversationSession) -> Option<(usize, Turn)> {
    let index = session.turns().len().checked_sub(1)?;
    session.last().map(|turn| (index, turn.clone()))
}

impl ReplyObserver for Broadcaster<'_> {
    fn placeholder_added(&mut self, session: &ConversationSession) {
        if let Some((index, turn)) = last_turn(session) {
            let _ = self.broadcast_tx.send(SseEvent::TurnAppended { index, turn });
        }
        self.snapshot_tx.send_replace(session.snapshot(true));
    }

    fn reply_updated(&mut self, session: &ConversationSession) {
        if let Some((index, turn)) = last_turn(session) {
            let _ = self.broadcast_tx.send(SseEvent::TurnUpdated { index, turn });
        }
        self.snapshot_tx.send_replace(session.snapshot(true));
    }

    fn warning(&mut self, message: &str) {
        let _ = self.broadcast_tx.send(SseEvent::Notice(Notice::warning(message)));
    }
}
