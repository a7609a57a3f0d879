pub mod badge;
pub mod event;
pub mod stats;
pub mod user;
