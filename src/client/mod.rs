pub mod api;
pub mod chat;
pub mod conversation;
pub mod invite_flow;
pub mod redirect;
pub mod sse;

pub use api::{ApiClient, ClientError};
pub use chat::ChatSession;
pub use conversation::{ChatMessage, ChatRole, Conversation};
pub use invite_flow::{
    AcceptanceState, GateDirective, InviteGate, MemoryInviteStore, PendingInviteStore,
};
pub use redirect::landing_route;
pub use sse::{SseEvent, SseParser, Utf8Decoder};
