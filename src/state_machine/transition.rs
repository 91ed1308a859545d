//! Pure transition function for session events

use super::{Effect, Event, Notice};
use crate::session::{ConversationSession, SessionError};
use crate::system_prompt::compose_itinerary_request;
use thiserror::Error;

pub const PROFILE_SAVED: &str = "Trip details saved.";
pub const CHAT_CLEARED: &str = "Chat cleared.";
pub const EMPTY_MESSAGE: &str = "Please write a message before sending.";

/// Result of a transition
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TransitionResult {
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Whether any effect adds a user turn
    #[cfg(test)]
    pub fn appends_user_turn(&self) -> bool {
        self.effects.iter().any(|e| {
            matches!(
                e,
                Effect::AppendTurn {
                    role: crate::session::Role::User,
                    ..
                }
            )
        })
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Invalid trip details: {0}")]
    InvalidProfile(#[from] SessionError),
}

/// Pure transition function
///
/// Given the same session and event it always yields the same effects and
/// performs no I/O.
pub fn transition(
    session: &ConversationSession,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match event {
        Event::SubmitProfile { profile } => {
            profile.validate()?;
            Ok(TransitionResult::new()
                .with_effect(Effect::SaveProfile { profile })
                .with_effect(Effect::Notify(Notice::success(PROFILE_SAVED))))
        }

        Event::SubmitUserMessage { text } => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(TransitionResult::new().with_effect(Effect::Notify(Notice::warning(EMPTY_MESSAGE))));
            }
            Ok(TransitionResult::new().with_effect(Effect::append_user(text)))
        }

        Event::PlanFullItinerary => {
            let request = compose_itinerary_request(session.profile());
            Ok(TransitionResult::new().with_effect(Effect::append_user(request)))
        }

        Event::ClearConversation => Ok(TransitionResult::new()
            .with_effect(Effect::ClearTurns)
            .with_effect(Effect::Notify(Notice::success(CHAT_CLEARED)))),
    }
}
