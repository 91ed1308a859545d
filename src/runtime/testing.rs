//! Mock implementations for testing
//!
//! These mocks enable integration testing without real I/O.

use super::traits::LlmClient;
use super::{spawn_session, SessionHandle, SseEvent, SESSION_IDLE_TIMEOUT};
use crate::llm::{LlmError, LlmRequest, LlmResponse, TextStream};
use crate::session::{ConversationSession, SessionSnapshot};
use crate::state_machine::Event;
use async_trait::async_trait;
use futures::StreamExt;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, Notify};

type StreamScript = Result<Vec<Result<String, LlmError>>, LlmError>;

// ============================================================================
// Mock LLM Client
// ============================================================================

/// Mock LLM client that replays queued streams and responses
pub struct MockLlmClient {
    streams: Mutex<VecDeque<StreamScript>>,
    responses: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    model_id: String,
    /// Record of all `complete` requests
    pub requests: Mutex<Vec<LlmRequest>>,
    /// Record of all `open_stream` requests
    pub stream_requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlmClient {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            streams: Mutex::new(VecDeque::new()),
            responses: Mutex::new(VecDeque::new()),
            model_id: model_id.into(),
            requests: Mutex::new(Vec::new()),
            stream_requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a stream that yields the fragments and closes cleanly
    pub fn queue_stream(&self, fragments: &[&str]) {
        self.queue_stream_items(fragments.iter().map(|f| Ok((*f).to_string())).collect());
    }

    /// Queue a stream with explicit items, errors included
    pub fn queue_stream_items(&self, items: Vec<Result<String, LlmError>>) {
        self.streams.lock().unwrap().push_back(Ok(items));
    }

    /// Queue a failure to open the stream
    pub fn queue_stream_error(&self, error: LlmError) {
        self.streams.lock().unwrap().push_back(Err(error));
    }

    /// Queue a successful single-call response
    pub fn queue_response(&self, response: LlmResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue a single-call error
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded `complete` requests
    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Get recorded `open_stream` requests
    pub fn recorded_stream_requests(&self) -> Vec<LlmRequest> {
        self.stream_requests.lock().unwrap().clone()
    }

    pub fn complete_calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }

    async fn open_stream(&self, request: &LlmRequest) -> Result<TextStream, LlmError> {
        self.stream_requests.lock().unwrap().push(request.clone());
        let script = self
            .streams
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::unsupported("No mock stream queued")))?;
        Ok(futures::stream::iter(script).boxed())
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// ============================================================================
// Delayed Mock LLM Client
// ============================================================================

/// Mock LLM client whose single calls take a while (for ordering tests).
/// Streaming always reports unsupported.
pub struct DelayedMockLlmClient {
    inner: MockLlmClient,
    delay: Duration,
    /// Notified when a request starts (for test synchronization)
    pub request_started: Arc<Notify>,
}

impl DelayedMockLlmClient {
    pub fn new(model_id: impl Into<String>, delay: Duration) -> Self {
        Self {
            inner: MockLlmClient::new(model_id),
            delay,
            request_started: Arc::new(Notify::new()),
        }
    }

    pub fn queue_response(&self, response: LlmResponse) {
        self.inner.queue_response(response);
    }
}

#[async_trait]
impl LlmClient for DelayedMockLlmClient {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.request_started.notify_one();
        tokio::time::sleep(self.delay).await;
        self.inner.complete(request).await
    }

    async fn open_stream(&self, _request: &LlmRequest) -> Result<TextStream, LlmError> {
        Err(LlmError::unsupported("delayed mock does not stream"))
    }

    fn model_id(&self) -> &str {
        self.inner.model_id()
    }
}

// ============================================================================
// Test Runtime Builder
// ============================================================================

/// A running session wired to a mock client
pub struct TestRuntime<L: LlmClient + 'static> {
    pub handle: SessionHandle,
    pub broadcast_rx: broadcast::Receiver<SseEvent>,
    pub llm: Arc<L>,
}

impl TestRuntime<MockLlmClient> {
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> TestRuntimeBuilder<MockLlmClient> {
        TestRuntimeBuilder::new()
    }
}

pub struct TestRuntimeBuilder<L> {
    session_id: String,
    llm: Option<L>,
}

impl<L> TestRuntimeBuilder<L> {
    pub fn session_id(mut self, id: impl Into<String>) -> Self {
        self.session_id = id.into();
        self
    }

    /// Start the session with the given client
    pub fn start<C: LlmClient + 'static>(self, llm: C) -> TestRuntime<C> {
        let llm = Arc::new(llm);
        let handle = spawn_session(
            ConversationSession::new(self.session_id),
            llm.clone(),
            SESSION_IDLE_TIMEOUT,
        );
        let broadcast_rx = handle.broadcast_tx.subscribe();
        TestRuntime {
            handle,
            broadcast_rx,
            llm,
        }
    }
}

impl TestRuntimeBuilder<MockLlmClient> {
    pub fn new() -> Self {
        Self {
            session_id: "test-session".to_string(),
            llm: None,
        }
    }

    pub fn llm(mut self, llm: MockLlmClient) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn build(mut self) -> TestRuntime<MockLlmClient> {
        let llm = self.llm.take().unwrap_or_else(|| MockLlmClient::new("test-model"));
        self.start(llm)
    }
}

impl Default for TestRuntimeBuilder<MockLlmClient> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: LlmClient + 'static> TestRuntime<L> {
    pub async fn send(&self, event: Event) {
        self.handle
            .event_tx
            .send(event)
            .await
            .expect("Failed to send event");
    }

    /// Send user message to the runtime
    pub async fn send_message(&self, text: &str) {
        self.send(Event::SubmitUserMessage {
            text: text.to_string(),
        })
        .await;
    }

    /// Wait for `ReplyDone` with timeout, collecting everything seen on the way
    pub async fn wait_for_done(&mut self, timeout: Duration) -> Option<Vec<SseEvent>> {
        self.wait_for(timeout, |e| matches!(e, SseEvent::ReplyDone { .. }))
            .await
    }

    /// Wait for the first event matching `pred`, returning all events seen
    /// up to and including it
    pub async fn wait_for(
        &mut self,
        timeout: Duration,
        pred: impl Fn(&SseEvent) -> bool,
    ) -> Option<Vec<SseEvent>> {
        let mut seen = Vec::new();
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            match tokio::time::timeout(Duration::from_millis(50), self.broadcast_rx.recv()).await {
                Ok(Ok(event)) => {
                    let done = pred(&event);
                    seen.push(event);
                    if done {
                        return Some(seen);
                    }
                }
                _ => continue,
            }
        }
        None
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.handle.snapshot()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::ReplyOutcome;
    use crate::session::{Role, TravelStyle, TripProfile, Turn};
    use crate::state_machine::{Notice, NoticeLevel, CHAT_CLEARED, EMPTY_MESSAGE, PROFILE_SAVED};

    const WAIT: Duration = Duration::from_secs(2);

    fn turn_texts(events: &[SseEvent]) -> Vec<String> {
        events
            .iter()
            .filter_map(|e| match e {
                SseEvent::TurnUpdated { turn, .. } => Some(turn.text.clone()),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_mock_llm_client() {
        let llm = MockLlmClient::new("test-model");
        llm.queue_response(LlmResponse::text("Hello"));

        let request = LlmRequest::new("sys", "hi");
        let response = llm.complete(&request).await.unwrap();
        assert_eq!(response.text, "Hello");
        assert_eq!(llm.recorded_requests(), vec![request.clone()]);

        // Nothing queued: streaming is unsupported, completion errors
        assert!(llm.open_stream(&request).await.is_err());
        assert!(llm.complete(&request).await.is_err());
    }

    /// End to end: one message, one streamed answer
    #[tokio::test]
    async fn test_streamed_reply_end_to_end() {
        let llm = MockLlmClient::new("test-model");
        llm.queue_stream(&["Day ", "1: ", "Seoul"]);

        let mut rt = TestRuntime::new().llm(llm).build();
        rt.send_message("Plan a 2-day trip to Seoul").await;

        let events = rt.wait_for_done(WAIT).await.expect("reply finished");
        assert_eq!(turn_texts(&events), vec!["Day ", "Day 1: ", "Day 1: Seoul"]);
        assert!(matches!(
            events.last(),
            Some(SseEvent::ReplyDone {
                outcome: ReplyOutcome::Streamed
            })
        ));

        let snapshot = rt.snapshot();
        assert!(!snapshot.replying);
        assert_eq!(
            snapshot.turns,
            vec![
                Turn::user("Plan a 2-day trip to Seoul"),
                Turn::assistant("Day 1: Seoul"),
            ]
        );
    }

    #[tokio::test]
    async fn test_fallback_emits_warning_notice() {
        let llm = MockLlmClient::new("test-model");
        llm.queue_stream_error(LlmError::unsupported("streaming disabled"));
        llm.queue_response(LlmResponse::text("Batch answer"));

        let mut rt = TestRuntime::new().llm(llm).build();
        rt.send_message("hi").await;

        let events = rt.wait_for_done(WAIT).await.expect("reply finished");
        let warnings: Vec<&Notice> = events
            .iter()
            .filter_map(|e| match e {
                SseEvent::Notice(n) if n.level == NoticeLevel::Warning => Some(n),
                _ => None,
            })
            .collect();
        assert_eq!(warnings.len(), 1);
        assert_eq!(
            warnings[0].message,
            "Streaming failed or not supported in this environment: streaming disabled"
        );
        assert_eq!(rt.llm.complete_calls(), 1);
        assert_eq!(rt.snapshot().turns[1], Turn::assistant("Batch answer"));
    }

    #[tokio::test]
    async fn test_blank_message_is_noop() {
        let mut rt = TestRuntime::new().build();
        rt.send_message("   ").await;

        let events = rt
            .wait_for(WAIT, |e| matches!(e, SseEvent::Notice(_)))
            .await
            .expect("notice");
        assert!(matches!(
            events.last(),
            Some(SseEvent::Notice(n)) if n.message == EMPTY_MESSAGE
        ));
        assert!(rt.snapshot().turns.is_empty());
        assert!(rt.llm.recorded_stream_requests().is_empty());
    }

    #[tokio::test]
    async fn test_plan_itinerary_uses_profile() {
        let llm = MockLlmClient::new("test-model");
        llm.queue_stream(&["Itinerary"]);
        let mut rt = TestRuntime::new().llm(llm).build();

        rt.send(Event::SubmitProfile {
            profile: TripProfile {
                destination: Some("Busan".to_string()),
                nights: 3,
                people: 2,
                budget: Some("$500".to_string()),
                travel_style: TravelStyle::Luxury,
                ..TripProfile::default()
            },
        })
        .await;
        let events = rt
            .wait_for(WAIT, |e| matches!(e, SseEvent::Notice(_)))
            .await
            .expect("saved notice");
        assert!(matches!(events.last(), Some(SseEvent::Notice(n)) if n.message == PROFILE_SAVED));

        rt.send(Event::PlanFullItinerary).await;
        rt.wait_for_done(WAIT).await.expect("reply finished");

        let requests = rt.llm.recorded_stream_requests();
        assert_eq!(
            requests[0].user_text,
            "Please create a travel plan.\nDestination: Busan\nNights: 3\nPeople: 2\nBudget: $500\n\
             Travel style: Luxury\nIf any information is missing, ask a short clarifying question \
             before producing the full itinerary."
        );
        assert_eq!(rt.snapshot().turns.len(), 2);
    }

    #[tokio::test]
    async fn test_clear_keeps_profile() {
        let llm = MockLlmClient::new("test-model");
        llm.queue_stream(&["ok"]);
        let mut rt = TestRuntime::new().llm(llm).build();

        let profile = TripProfile {
            destination: Some("Jeju".to_string()),
            ..TripProfile::default()
        };
        rt.send(Event::SubmitProfile {
            profile: profile.clone(),
        })
        .await;
        rt.send_message("hello").await;
        rt.wait_for_done(WAIT).await.expect("reply finished");

        rt.send(Event::ClearConversation).await;
        rt.wait_for(WAIT, |e| matches!(e, SseEvent::Notice(n) if n.message == CHAT_CLEARED))
            .await
            .expect("cleared notice");

        let snapshot = rt.snapshot();
        assert!(snapshot.turns.is_empty());
        assert_eq!(snapshot.profile, Some(profile));
    }

    #[tokio::test]
    async fn test_invalid_profile_reports_error() {
        let mut rt = TestRuntime::new().build();
        rt.send(Event::SubmitProfile {
            profile: TripProfile {
                people: 0,
                ..TripProfile::default()
            },
        })
        .await;

        let events = rt
            .wait_for(WAIT, |e| matches!(e, SseEvent::Error { .. }))
            .await
            .expect("error event");
        let Some(SseEvent::Error { message }) = events.last() else {
            unreachable!()
        };
        assert!(message.contains("people"));
        assert!(rt.snapshot().profile.is_none());
    }

    /// Messages sent while a reply is in flight wait their turn, so the
    /// history still alternates.
    #[tokio::test]
    async fn test_messages_during_reply_keep_alternation() {
        let llm = DelayedMockLlmClient::new("slow", Duration::from_millis(100));
        llm.queue_response(LlmResponse::text("first answer"));
        llm.queue_response(LlmResponse::text("second answer"));
        let started = llm.request_started.clone();

        let mut rt = TestRuntimeBuilder::new().session_id("slow").start(llm);
        rt.send_message("first").await;
        started.notified().await;
        assert!(rt.snapshot().replying);
        rt.send_message("second").await;

        rt.wait_for_done(WAIT).await.expect("first reply");
        rt.wait_for_done(WAIT).await.expect("second reply");

        let roles: Vec<Role> = rt.snapshot().turns.iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User, Role::Assistant]);
        assert_eq!(rt.snapshot().turns[3], Turn::assistant("second answer"));
    }
}
