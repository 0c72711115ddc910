pub mod audit;
pub mod broadcaster;
pub mod client;
pub mod registry;
pub mod router;
pub mod server;
pub mod utils;
