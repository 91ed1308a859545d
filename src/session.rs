//! Session state store
//!
//! Holds the ordered conversation turns and the trip profile for one
//! interactive session. Nothing here outlives the process.

mod profile;

pub use profile::{TravelStyle, TripProfile};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Speaker of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }

    #[cfg(test)]
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Conversation is empty, there is no turn to replace")]
    EmptyConversation,
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },
}

/// Conversation turns plus trip profile for one user interaction context
#[derive(Debug, Clone)]
pub struct ConversationSession {
    id: String,
    turns: Vec<Turn>,
    /// `None` until the trip form is first saved
    profile: Option<TripProfile>,
}

impl ConversationSession {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            turns: Vec::new(),
            profile: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Turns in display order
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn profile(&self) -> Option<&TripProfile> {
        self.profile.as_ref()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Add a turn at the end
    pub fn append(&mut self, role: Role, text: impl Into<String>) {
        self.turns.push(Turn::new(role, text));
    }

    /// Overwrite the final turn
    pub fn replace_last(&mut self, turn: Turn) -> Result<(), SessionError> {
        let last = self
            .turns
            .last_mut()
            .ok_or(SessionError::EmptyConversation)?;
        *last = turn;
        Ok(())
    }

    /// Drop every turn. The profile is kept.
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Replace the profile wholesale
    pub fn save_profile(&mut self, profile: TripProfile) -> Result<(), SessionError> {
        profile.validate()?;
        self.profile = Some(profile.normalized());
        Ok(())
    }

    /// Dispatch rule for the orchestrator: the newest turn is an
    /// unanswered user turn.
    pub fn awaiting_reply(&self) -> bool {
        self.last().is_some_and(|t| t.role == Role::User)
    }

    /// Text of the newest turn when it is an unanswered user turn
    pub fn pending_user_text(&self) -> Option<&str> {
        self.last()
            .filter(|t| t.role == Role::User)
            .map(|t| t.text.as_str())
    }

    pub fn snapshot(&self, replying: bool) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id.clone(),
            turns: self.turns.clone(),
            profile: self.profile.clone(),
            replying,
        }
    }
}

/// Read-only view handed to the UI layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub id: String,
    pub turns: Vec<Turn>,
    pub profile: Option<TripProfile>,
    /// An assistant reply is being produced
    pub replying: bool,
}
