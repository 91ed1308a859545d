//! Server-Sent Events support

use crate::runtime::SseEvent;
use crate::session::SessionSnapshot;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use serde_json::json;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

/// Convert broadcast stream to SSE stream
pub fn sse_stream(
    snapshot_rx: watch::Receiver<SessionSnapshot>,
    broadcast_rx: broadcast::Receiver<SseEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let events = event_stream(snapshot_rx, broadcast_rx).map(|event| Ok(sse_event_to_axum(event)));

    Sse::new(events).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

/// Current snapshot, then live events. A subscriber that falls behind the
/// broadcast buffer gets a fresh snapshot in place of the dropped events.
///
/// `broadcast_rx` must be subscribed before this is called.
pub(crate) fn event_stream(
    snapshot_rx: watch::Receiver<SessionSnapshot>,
    broadcast_rx: broadcast::Receiver<SseEvent>,
) -> impl Stream<Item = SseEvent> {
    let init = SseEvent::Init {
        snapshot: snapshot_rx.borrow().clone(),
    };

    let live = BroadcastStream::new(broadcast_rx).map(move |result| match result {
        Ok(event) => event,
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::debug!(skipped, "SSE subscriber lagged, resending snapshot");
            SseEvent::Init {
                snapshot: snapshot_rx.borrow().clone(),
            }
        }
    });

    futures::stream::once(async move { init }).chain(live)
}

fn sse_event_to_axum(event: SseEvent) -> Event {
    let (event_type, data) = event_payload(event);
    Event::default().event(event_type).data(data.to_string())
}

/// Event name and JSON body for an SSE event
pub(crate) fn event_payload(event: SseEvent) -> (&'static str, serde_json::Value) {
    match event {
        SseEvent::Init { snapshot } => (
            "init",
            json!({
                "type": "init",
                "session": snapshot
            }),
        ),
        SseEvent::TurnAppended { index, turn } => (
            "turn_appended",
            json!({
                "type": "turn_appended",
                "index": index,
                "turn": turn
            }),
        ),
        SseEvent::TurnUpdated { index, turn } => (
            "turn_updated",
            json!({
                "type": "turn_updated",
                "index": index,
                "turn": turn
            }),
        ),
        SseEvent::TurnsCleared => (
            "turns_cleared",
            json!({
                "type": "turns_cleared"
            }),
        ),
        SseEvent::ProfileSaved { profile } => (
            "profile_saved",
            json!({
                "type": "profile_saved",
                "profile": profile
            }),
        ),
        SseEvent::Notice(notice) => (
            "notice",
            json!({
                "type": "notice",
                "level": notice.level,
                "message": notice.message
            }),
        ),
        SseEvent::ReplyDone { outcome } => (
            "reply_done",
            json!({
                "type": "reply_done",
                "outcome": outcome.as_str()
            }),
        ),
        SseEvent::Error { message } => (
            "error",
            json!({
                "type": "error",
                "message": message
            }),
        ),
    }
}
