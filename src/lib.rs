pub mod error;
pub mod config;
pub mod operation;
pub mod envelope;
pub mod identity;
pub mod server;
pub mod client;
pub mod cli;
