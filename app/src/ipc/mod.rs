pub mod message;
pub mod trait_impl;
pub mod traits;
pub mod utils;

pub use traits::HubReadSock;
pub use traits::HubWriteSock;
pub use utils::connect_to_socket;
pub use utils::send_and_receive;
