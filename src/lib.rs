pub mod api;
pub mod capability;
pub mod config;
pub mod error;
pub mod server;
pub mod shutdown;
pub mod splitter;
pub mod workflow;
