pub mod board;
pub mod client;
pub mod debug;
pub mod record;

pub use board::*;
pub use client::*;
pub use debug::send_http_request;
pub use record::*;
