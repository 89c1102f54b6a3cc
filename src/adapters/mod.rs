pub mod api;
pub mod http;
pub mod location;
pub mod preview;
