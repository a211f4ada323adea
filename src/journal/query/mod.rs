//! Read-only projections.

pub mod conversation_query;

pub use conversation_query::{
    Author, ConversationDetail, ConversationQuery, ConversationSummary, MessageView,
};
