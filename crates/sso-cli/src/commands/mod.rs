pub mod dispatch;
pub mod interactive;
pub mod list;
pub mod remove;
pub mod resolve;
pub mod roles;
pub mod setup;
pub mod token;
