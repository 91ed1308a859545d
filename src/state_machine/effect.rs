//! Effects produced by transitions

use crate::session::{ConversationSession, Role, SessionError, TripProfile};
use serde::Serialize;

/// Severity of a user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Warning,
}

/// Transient message shown to the user, never stored as a turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }
}

/// Effects to be applied after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Add a turn to the end of the conversation
    AppendTurn { role: Role, text: String },

    /// Replace the stored profile
    SaveProfile { profile: TripProfile },

    /// Drop all turns
    ClearTurns,

    /// Tell connected clients something
    Notify(Notice),
}

impl Effect {
    pub fn append_user(text: impl Into<String>) -> Self {
        Effect::AppendTurn {
            role: Role::User,
            text: text.into(),
        }
    }

    /// Apply a store effect to the session. Returns the notice for
    /// `Notify`, which leaves the session untouched.
    pub fn apply(self, session: &mut ConversationSession) -> Result<Option<Notice>, SessionError> {
        match self {
            Effect::AppendTurn { role, text } => session.append(role, text),
            Effect::SaveProfile { profile } => session.save_profile(profile)?,
            Effect::ClearTurns => session.clear(),
            Effect::Notify(notice) => return Ok(Some(notice)),
        }
        Ok(None)
    }
}
