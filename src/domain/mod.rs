pub mod detection;
pub mod environment;
pub mod errors;
pub mod image;
pub mod notify;
pub mod pipeline;
