//! Write-side services over the journal storage.

pub mod batch_form;
pub mod call_service;
pub mod conversation_service;

pub use batch_form::decode_message_batch;
pub use call_service::CallService;
pub use conversation_service::ConversationService;
