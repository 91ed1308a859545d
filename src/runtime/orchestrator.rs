//! Reply production for a session
//!
//! When the newest turn is an unanswered user turn, a placeholder assistant
//! turn is appended and filled either from an incremental stream or, when
//! streaming is unavailable or breaks, from one blocking call.

use super::traits::LlmClient;
use crate::llm::{LlmError, LlmRequest};
use crate::session::{ConversationSession, Role, Turn};
use crate::system_prompt::build_request;
use futures::StreamExt;

pub const STREAM_WARNING: &str = "Streaming failed or not supported in this environment";

/// How the assistant turn was filled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyOutcome {
    Streamed,
    FellBack,
    /// Both paths failed; the turn holds an error message
    Failed,
}

impl ReplyOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            ReplyOutcome::Streamed => "streamed",
            ReplyOutcome::FellBack => "fell_back",
            ReplyOutcome::Failed => "failed",
        }
    }
}

/// Receives progress while a reply is produced
pub trait ReplyObserver: Send {
    /// The empty placeholder assistant turn was appended
    fn placeholder_added(&mut self, session: &ConversationSession);

    /// The last turn's text changed
    fn reply_updated(&mut self, session: &ConversationSession);

    /// Non-fatal problem worth showing to the user
    fn warning(&mut self, message: &str);
}

/// Text written into the assistant turn when the blocking call fails
pub fn failure_text(error: &LlmError) -> String {
    format!("Error calling Gemini API: {error}. Check your API key and network.")
}

/// Answer the pending user turn, if there is one.
///
/// Returns `None` without touching the session when the newest turn is not
/// an unanswered user turn.
pub async fn respond<L, O>(
    session: &mut ConversationSession,
    llm: &L,
    observer: &mut O,
) -> Option<ReplyOutcome>
where
    L: LlmClient + ?Sized,
    O: ReplyObserver,
{
    let request = build_request(session.pending_user_text()?);

    session.append(Role::Assistant, "");
    observer.placeholder_added(session);

    match stream_reply(session, llm, &request, observer).await {
        Ok(()) => {
            tracing::info!(session_id = %session.id(), model = %llm.model_id(), "Reply streamed");
            return Some(ReplyOutcome::Streamed);
        }
        Err(e) => {
            tracing::warn!(
                session_id = %session.id(),
                error = %e,
                error_kind = %e.kind.as_str(),
                "Streaming unavailable, falling back to single call"
            );
            observer.warning(&format!("{STREAM_WARNING}: {e}"));
        }
    }

    let result = llm.complete(&request).await.and_then(|response| {
        if response.text.trim().is_empty() {
            Err(LlmError::unknown("model returned an empty reply"))
        } else {
            Ok(response)
        }
    });
    let (text, outcome) = match result {
        Ok(response) => {
            if !response.end_turn {
                tracing::warn!(session_id = %session.id(), "Reply was cut short by the model");
            }
            (response.text, ReplyOutcome::FellBack)
        }
        Err(e) => {
            tracing::error!(
                session_id = %session.id(),
                error = %e,
                error_kind = %e.kind.as_str(),
                transient = e.kind.is_transient(),
                "Single-call fallback failed"
            );
            (failure_text(&e), ReplyOutcome::Failed)
        }
    };
    set_reply(session, text, observer);
    Some(outcome)
}

/// Fill the placeholder from the stream. Any error means "not streamed".
async fn stream_reply<L, O>(
    session: &mut ConversationSession,
    llm: &L,
    request: &LlmRequest,
    observer: &mut O,
) -> Result<(), LlmError>
where
    L: LlmClient + ?Sized,
    O: ReplyObserver,
{
    let mut stream = llm.open_stream(request).await?;
    let mut accumulated = String::new();

    while let Some(fragment) = stream.next().await {
        let fragment = fragment?;
        if fragment.is_empty() {
            continue;
        }
        accumulated.push_str(&fragment);
        set_reply(session, accumulated.clone(), observer);
    }

    if accumulated.trim().is_empty() {
        return Err(LlmError::unknown("stream closed without any text"));
    }
    Ok(())
}

fn set_reply<O: ReplyObserver>(session: &mut ConversationSession, text: String, observer: &mut O) {
    match session.replace_last(Turn::assistant(text)) {
        Ok(()) => observer.reply_updated(session),
        Err(e) => tracing::error!(session_id = %session.id(), error = %e, "Failed to update reply"),
    }
}
