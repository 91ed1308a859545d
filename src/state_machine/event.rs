//! Events the UI layer sends into a session

use crate::session::TripProfile;

/// Inbound UI events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Save the trip form, replacing the previous profile
    SubmitProfile { profile: TripProfile },
    /// Free-text message typed by the user
    SubmitUserMessage { text: String },
    /// Compose a request from the saved profile and send it as a message
    PlanFullItinerary,
    /// Drop the conversation history
    ClearConversation,
}

impl Event {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Event::SubmitProfile { .. } => "submit_profile",
            Event::SubmitUserMessage { .. } => "submit_user_message",
            Event::PlanFullItinerary => "plan_full_itinerary",
            Event::ClearConversation => "clear_conversation",
        }
    }
}
