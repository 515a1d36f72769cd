//! These models represent the objects we persist for a chat
//!
//! There are two related formats we need to interact with:
//! - persisted turns, stored per chat as a role plus a flat list of content
//! - agent messages (see [`crate::messages`]), exchanged with the model provider
//!
//! The persisted form only knows about the content the chatbot actually produces
//! (text and single-round tool use). The conversion between both formats lives in
//! [`crate::translate`].
pub mod chat;
pub mod content;
pub mod role;
pub mod turn;
