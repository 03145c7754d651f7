//! Command implementations for flowctl

pub mod chat;
pub mod connection;
pub mod run;

pub use chat::run_chat;
pub use run::run_run;
