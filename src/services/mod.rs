pub mod ai_access;
pub mod ai_gateway;
pub mod auth;
pub mod user_context;

pub use auth::Claims;
pub use user_context::UserContext;
