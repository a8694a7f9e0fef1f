pub mod ai;
pub mod auth;
pub mod invitations;
pub mod platform;
pub mod shared;
