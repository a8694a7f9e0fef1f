pub mod ai;
pub mod church;
pub mod features;
pub mod invitation;
pub mod user;

// Re-export all models for easy importing
pub use ai::*;
pub use church::*;
pub use features::*;
pub use invitation::*;
pub use user::*;
