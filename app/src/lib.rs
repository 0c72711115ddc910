pub mod error;
pub mod handlers;
pub mod hub;
pub mod ipc;
pub mod logger;
pub mod opts;
