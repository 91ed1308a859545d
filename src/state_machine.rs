//! Conversation event handling
//!
//! UI events are turned into effects by a pure transition function; the
//! session runtime applies the effects to the store.

mod effect;
mod event;
mod transition;


#[allow(unused_imports)] // Public API re-exports
pub use effect::{Effect, Notice, NoticeLevel};
pub use event::Event;
#[allow(unused_imports)] // Public API re-exports
pub use transition::{
    transition, TransitionError, TransitionResult, CHAT_CLEARED, EMPTY_MESSAGE, PROFILE_SAVED,
};
