//! Prompt construction for the travel planner
//!
//! Every model call carries the fixed planner instruction plus the text of
//! the newest user turn. Earlier turns are not resent.

use crate::llm::LlmRequest;
use crate::session::TripProfile;
use std::fmt::Write;

/// Base system prompt establishing the assistant's role and output shape
pub const SYSTEM_PROMPT: &str = "You are a friendly, precise travel-planning assistant. \
Ask any clarification questions required to produce a high-quality multi-day travel itinerary, \
then produce: 1) destination summary, 2) recommended accommodation (3 options), \
3) day-by-day itinerary with timed suggestions for places to visit and meals, \
4) estimated budget breakdown. \
Be concise and present the final itinerary as numbered days with bullet points.";

/// Closing line of a composed itinerary request
pub const CLARIFY_INSTRUCTION: &str =
    "If any information is missing, ask a short clarifying question before producing the full itinerary.";

/// Build the model request for a user message
pub fn build_request(user_text: &str) -> LlmRequest {
    LlmRequest::new(SYSTEM_PROMPT, user_text)
}

/// Compose the "plan full itinerary" message from the saved profile.
///
/// Blank free-text fields are left out; numeric fields and the travel style
/// are included whenever a profile has been saved. Without one the message
/// is just the header and the clarifying instruction.
pub fn compose_itinerary_request(profile: Option<&TripProfile>) -> String {
    let mut text = String::from("Please create a travel plan.");
    if let Some(profile) = profile {
        write_profile_lines(&mut text, profile);
    }
    text.push('\n');
    text.push_str(CLARIFY_INSTRUCTION);
    text
}

fn write_profile_lines(text: &mut String, profile: &TripProfile) {
    if let Some(destination) = profile.destination() {
        let _ = write!(text, "\nDestination: {destination}");
    }
    if let Some(start_date) = profile.start_date {
        let _ = write!(text, "\nStart date: {}", start_date.format("%Y-%m-%d"));
    }
    let _ = write!(text, "\nNights: {}", profile.nights);
    let _ = write!(text, "\nPeople: {}", profile.people);
    if let Some(budget) = profile.budget() {
        let _ = write!(text, "\nBudget: {budget}");
    }
    let _ = write!(text, "\nTravel style: {}", profile.travel_style.label());
}
