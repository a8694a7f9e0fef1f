pub mod ai;
pub mod church;
pub mod features;
pub mod invitation;
pub mod user;
