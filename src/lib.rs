// Library half of ChitChatty: conversation state and the reply simulation.
// The terminal front end lives in the binary.
pub mod clock;
pub mod config;
pub mod controller;
pub mod directory;
pub mod error;
pub mod models;
pub mod responder;
pub mod scheduler;
pub mod seed;
pub mod store;

// Re-export main types for convenience
pub use controller::{ConversationController, ConversationPhase, OverlapPolicy};
pub use models::*;
pub use scheduler::{ConversationEvent, ReplyChain, ReplyScheduler, ReplyTiming, TokioReplyScheduler};
